//! N-ary views over additive and multiplicative chains.
//!
//! Add/Sub/Neg and Mul/Neg chains flatten into shape-independent term and
//! factor lists: `a+(b+c)`, `(a+b)+c` and a balanced tree all produce the
//! same view. Rules and the constant folder operate on these lists and
//! rebuild canonical chains instead of pattern matching binary shapes.

use smallvec::SmallVec;
use sym_ast::{Context, Expr, ExprId};

/// Sign of a term inside an additive chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sign {
    Pos,
    Neg,
}

impl Sign {
    #[inline]
    pub fn negate(self) -> Sign {
        match self {
            Sign::Pos => Sign::Neg,
            Sign::Neg => Sign::Pos,
        }
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        matches!(self, Sign::Neg)
    }
}

/// Flattened view of an additive expression.
#[derive(Debug, Clone)]
pub struct AddView {
    pub root: ExprId,
    pub terms: SmallVec<[(ExprId, Sign); 8]>,
}

impl AddView {
    /// Flatten Add/Sub/Neg chains. Any other expression becomes the
    /// single-term view `[(expr, Pos)]`.
    pub fn from_expr(ctx: &Context, root: ExprId) -> Self {
        let mut terms = SmallVec::new();
        flatten_add(ctx, root, Sign::Pos, &mut terms);
        AddView { root, terms }
    }

    /// True when the view is more than a single positive term.
    pub fn is_chain(&self) -> bool {
        self.terms.len() > 1 || matches!(self.terms.first(), Some((_, Sign::Neg)))
    }
}

fn flatten_add(
    ctx: &Context,
    id: ExprId,
    sign: Sign,
    out: &mut SmallVec<[(ExprId, Sign); 8]>,
) {
    match ctx.get(id) {
        Expr::Add(l, r) => {
            flatten_add(ctx, *l, sign, out);
            flatten_add(ctx, *r, sign, out);
        }
        Expr::Sub(l, r) => {
            flatten_add(ctx, *l, sign, out);
            flatten_add(ctx, *r, sign.negate(), out);
        }
        Expr::Neg(inner) => flatten_add(ctx, *inner, sign.negate(), out),
        _ => out.push((id, sign)),
    }
}

/// Rebuild a signed term list as a left-associative Add/Sub chain.
/// Empty input yields `0`.
pub fn rebuild_sum(ctx: &mut Context, terms: &[(ExprId, Sign)]) -> ExprId {
    let mut iter = terms.iter();
    let mut acc = match iter.next() {
        None => return ctx.num(0),
        Some((id, Sign::Pos)) => *id,
        Some((id, Sign::Neg)) => ctx.add(Expr::Neg(*id)),
    };
    for (id, sign) in iter {
        acc = match sign {
            Sign::Pos => ctx.add(Expr::Add(acc, *id)),
            Sign::Neg => ctx.add(Expr::Sub(acc, *id)),
        };
    }
    acc
}

/// Flattened view of a multiplicative expression. A leading `Neg` anywhere
/// in the chain folds into the `negated` flag.
#[derive(Debug, Clone)]
pub struct MulView {
    pub root: ExprId,
    pub factors: SmallVec<[ExprId; 8]>,
    pub negated: bool,
}

impl MulView {
    pub fn from_expr(ctx: &Context, root: ExprId) -> Self {
        let mut factors = SmallVec::new();
        let mut negated = false;
        flatten_mul(ctx, root, &mut factors, &mut negated);
        MulView { root, factors, negated }
    }

    pub fn is_chain(&self) -> bool {
        self.factors.len() > 1 || self.negated
    }
}

fn flatten_mul(
    ctx: &Context,
    id: ExprId,
    out: &mut SmallVec<[ExprId; 8]>,
    negated: &mut bool,
) {
    match ctx.get(id) {
        Expr::Mul(l, r) => {
            flatten_mul(ctx, *l, out, negated);
            flatten_mul(ctx, *r, out, negated);
        }
        Expr::Neg(inner) => {
            *negated = !*negated;
            flatten_mul(ctx, *inner, out, negated);
        }
        _ => out.push(id),
    }
}

/// Rebuild a factor list as a left-associative Mul chain; empty yields `1`.
pub fn rebuild_product(ctx: &mut Context, factors: &[ExprId], negated: bool) -> ExprId {
    let mut iter = factors.iter();
    let mut acc = match iter.next() {
        None => ctx.num(1),
        Some(id) => *id,
    };
    for id in iter {
        acc = ctx.add(Expr::Mul(acc, *id));
    }
    if negated {
        ctx.add(Expr::Neg(acc))
    } else {
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sym_ast::DisplayExpr;

    fn render(ctx: &Context, id: ExprId) -> String {
        format!("{}", DisplayExpr { context: ctx, id })
    }

    #[test]
    fn add_view_is_shape_independent() {
        let mut ctx = Context::new();
        let a = ctx.var("a");
        let b = ctx.var("b");
        let c = ctx.var("c");
        let bc = ctx.add(Expr::Add(b, c));
        let right = ctx.add(Expr::Add(a, bc));
        let ab = ctx.add(Expr::Add(a, b));
        let left = ctx.add(Expr::Add(ab, c));

        let v1 = AddView::from_expr(&ctx, right);
        let v2 = AddView::from_expr(&ctx, left);
        assert_eq!(v1.terms, v2.terms);
        assert_eq!(v1.terms.len(), 3);
    }

    #[test]
    fn sub_and_neg_carry_signs() {
        let mut ctx = Context::new();
        let a = ctx.var("a");
        let b = ctx.var("b");
        let neg_b = ctx.add(Expr::Neg(b));
        let sum = ctx.add(Expr::Sub(a, neg_b));
        let view = AddView::from_expr(&ctx, sum);
        assert_eq!(view.terms[0], (a, Sign::Pos));
        assert_eq!(view.terms[1], (b, Sign::Pos));
    }

    #[test]
    fn rebuild_sum_uses_sub_for_negatives() {
        let mut ctx = Context::new();
        let a = ctx.var("a");
        let b = ctx.var("b");
        let rebuilt = rebuild_sum(&mut ctx, &[(a, Sign::Pos), (b, Sign::Neg)]);
        assert_eq!(render(&ctx, rebuilt), "a - b");
    }

    #[test]
    fn mul_view_folds_negations() {
        let mut ctx = Context::new();
        let a = ctx.var("a");
        let b = ctx.var("b");
        let neg_a = ctx.add(Expr::Neg(a));
        let neg_b = ctx.add(Expr::Neg(b));
        let prod = ctx.add(Expr::Mul(neg_a, neg_b));
        let view = MulView::from_expr(&ctx, prod);
        assert!(!view.negated);
        assert_eq!(view.factors.len(), 2);
    }
}
