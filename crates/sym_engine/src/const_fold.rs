//! Bottom-up exact constant folding.
//!
//! For associative/commutative chains the n-ary view partitions operands
//! into a constant group and a symbolic group, folds the constant group
//! into a single rational, and reassembles the rest alongside it (identity
//! elements are dropped outright). The pass is total: it never fails and
//! never restructures beyond the fold itself.

use crate::nary::{rebuild_sum, AddView, MulView, Sign};
use crate::numeric::{div_rational, pow_rational, NumericFold};
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use sym_ast::{Constant, Context, Expr, ExprId};

pub fn evaluate_constants(ctx: &mut Context, id: ExprId) -> ExprId {
    let expr = ctx.get(id).clone();
    match expr {
        Expr::Number(_) | Expr::Constant(_) | Expr::Variable(_) => id,
        Expr::Add(l, r) => {
            let nl = evaluate_constants(ctx, l);
            let nr = evaluate_constants(ctx, r);
            let node = ctx.add(Expr::Add(nl, nr));
            fold_additive(ctx, node)
        }
        Expr::Sub(l, r) => {
            let nl = evaluate_constants(ctx, l);
            let nr = evaluate_constants(ctx, r);
            let node = ctx.add(Expr::Sub(nl, nr));
            fold_additive(ctx, node)
        }
        Expr::Neg(inner) => {
            let ni = evaluate_constants(ctx, inner);
            let node = ctx.add(Expr::Neg(ni));
            fold_additive(ctx, node)
        }
        Expr::Mul(l, r) => {
            let nl = evaluate_constants(ctx, l);
            let nr = evaluate_constants(ctx, r);
            let node = ctx.add(Expr::Mul(nl, nr));
            fold_multiplicative(ctx, node)
        }
        Expr::Div(l, r) => {
            let nl = evaluate_constants(ctx, l);
            let nr = evaluate_constants(ctx, r);
            fold_div(ctx, nl, nr)
        }
        Expr::Pow(b, e) => {
            let nb = evaluate_constants(ctx, b);
            let ne = evaluate_constants(ctx, e);
            fold_pow(ctx, nb, ne)
        }
        Expr::Function(name, args) => {
            let new_args: Vec<ExprId> =
                args.iter().map(|a| evaluate_constants(ctx, *a)).collect();
            fold_function(ctx, &name, new_args)
        }
        Expr::Matrix { rows, cols, data } => {
            let new_data: Vec<ExprId> =
                data.iter().map(|a| evaluate_constants(ctx, *a)).collect();
            ctx.add(Expr::Matrix { rows, cols, data: new_data })
        }
    }
}

fn is_undefined(ctx: &Context, id: ExprId) -> bool {
    matches!(ctx.get(id), Expr::Constant(Constant::Undefined))
}

fn fold_additive(ctx: &mut Context, node: ExprId) -> ExprId {
    let view = AddView::from_expr(ctx, node);
    let mut constant = BigRational::zero();
    let mut rest: Vec<(ExprId, Sign)> = Vec::new();
    for (term, sign) in &view.terms {
        match ctx.get(*term) {
            Expr::Number(n) => {
                if sign.is_negative() {
                    constant -= n;
                } else {
                    constant += n;
                }
            }
            _ => rest.push((*term, *sign)),
        }
    }

    if rest.is_empty() {
        return ctx.rational(constant);
    }
    let mut terms: Vec<(ExprId, Sign)> = Vec::with_capacity(rest.len() + 1);
    if !constant.is_zero() {
        // Negative totals rebuild as a leading subtraction.
        if constant.is_negative() {
            terms.push((ctx.rational(-constant), Sign::Neg));
        } else {
            terms.push((ctx.rational(constant), Sign::Pos));
        }
    }
    terms.extend(rest);
    rebuild_sum(ctx, &terms)
}

fn fold_multiplicative(ctx: &mut Context, node: ExprId) -> ExprId {
    let view = MulView::from_expr(ctx, node);
    let mut coeff = if view.negated {
        -BigRational::one()
    } else {
        BigRational::one()
    };
    let mut rest: Vec<ExprId> = Vec::new();
    let mut saw_undefined = false;
    let mut saw_infinity = false;
    for factor in &view.factors {
        match ctx.get(*factor) {
            Expr::Number(n) => coeff *= n,
            Expr::Constant(Constant::Undefined) => saw_undefined = true,
            Expr::Constant(Constant::Infinity) => {
                saw_infinity = true;
                rest.push(*factor);
            }
            _ => rest.push(*factor),
        }
    }

    if saw_undefined {
        return ctx.constant(Constant::Undefined);
    }
    if coeff.is_zero() {
        return if saw_infinity {
            ctx.constant(Constant::Undefined)
        } else {
            ctx.num(0)
        };
    }
    if rest.is_empty() {
        return ctx.rational(coeff);
    }

    let product = chain_mul(ctx, &rest);
    if coeff.is_one() {
        product
    } else if coeff == -BigRational::one() {
        ctx.add(Expr::Neg(product))
    } else if coeff.is_negative() {
        let c = ctx.rational(-coeff);
        let m = ctx.add(Expr::Mul(c, product));
        ctx.add(Expr::Neg(m))
    } else {
        let c = ctx.rational(coeff);
        ctx.add(Expr::Mul(c, product))
    }
}

fn chain_mul(ctx: &mut Context, factors: &[ExprId]) -> ExprId {
    let mut iter = factors.iter();
    // Callers guarantee non-empty.
    let mut acc = *iter.next().expect("chain_mul: empty factor list");
    for f in iter {
        acc = ctx.add(Expr::Mul(acc, *f));
    }
    acc
}

fn fold_div(ctx: &mut Context, numer: ExprId, denom: ExprId) -> ExprId {
    if is_undefined(ctx, numer) || is_undefined(ctx, denom) {
        return ctx.constant(Constant::Undefined);
    }
    if let (Expr::Number(n), Expr::Number(d)) = (ctx.get(numer), ctx.get(denom)) {
        return match div_rational(&n.clone(), &d.clone()) {
            NumericFold::Exact(q) => ctx.rational(q),
            NumericFold::Undefined => ctx.constant(Constant::Undefined),
        };
    }
    if let Expr::Number(d) = ctx.get(denom) {
        if d.is_one() {
            return numer;
        }
    }
    ctx.add(Expr::Div(numer, denom))
}

fn fold_pow(ctx: &mut Context, base: ExprId, exp: ExprId) -> ExprId {
    if is_undefined(ctx, base) || is_undefined(ctx, exp) {
        return ctx.constant(Constant::Undefined);
    }
    if let (Expr::Number(b), Expr::Number(e)) = (ctx.get(base), ctx.get(exp)) {
        if let Some(folded) = pow_rational(&b.clone(), &e.clone()) {
            return match folded {
                NumericFold::Exact(v) => ctx.rational(v),
                NumericFold::Undefined => ctx.constant(Constant::Undefined),
            };
        }
    }
    // Trivial exponents on symbolic bases: the literal-zero base cases
    // were handled by the numeric branch above.
    if let Expr::Number(e) = ctx.get(exp) {
        if e.is_zero() {
            return ctx.num(1);
        }
        if e.is_one() {
            return base;
        }
    }
    ctx.add(Expr::Pow(base, exp))
}

fn fold_function(ctx: &mut Context, name: &str, args: Vec<ExprId>) -> ExprId {
    if args.len() == 1 {
        if let Expr::Number(n) = ctx.get(args[0]) {
            let n = n.clone();
            match name {
                "abs" => return ctx.rational(n.abs()),
                "sqrt" => {
                    if n.is_negative() {
                        return ctx.constant(Constant::Undefined);
                    }
                    if let Some(root) = crate::numeric::rational_root(&n, 2) {
                        return ctx.rational(root);
                    }
                }
                _ => {}
            }
        }
    }
    ctx.func(name, args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sym_ast::DisplayExpr;

    fn render(ctx: &Context, id: ExprId) -> String {
        format!("{}", DisplayExpr { context: ctx, id })
    }

    #[test]
    fn folds_constant_group_in_a_sum() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let one = ctx.num(1);
        let two = ctx.num(2);
        let a = ctx.add(Expr::Add(one, x));
        let b = ctx.add(Expr::Add(a, two));
        let folded = evaluate_constants(&mut ctx, b);
        assert_eq!(render(&ctx, folded), "3 + x");
    }

    #[test]
    fn folds_constant_group_in_a_product() {
        let mut ctx = Context::new();
        let a = ctx.var("a");
        let three = ctx.num(3);
        let four = ctx.num(4);
        let m1 = ctx.add(Expr::Mul(a, three));
        let m2 = ctx.add(Expr::Mul(m1, four));
        let folded = evaluate_constants(&mut ctx, m2);
        assert_eq!(render(&ctx, folded), "12 * a");
    }

    #[test]
    fn zero_annihilates_a_product() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let zero = ctx.num(0);
        let m = ctx.add(Expr::Mul(zero, x));
        let folded = evaluate_constants(&mut ctx, m);
        assert_eq!(render(&ctx, folded), "0");
    }

    #[test]
    fn division_by_zero_folds_to_undefined() {
        let mut ctx = Context::new();
        let one = ctx.num(1);
        let zero = ctx.num(0);
        let d = ctx.add(Expr::Div(one, zero));
        let folded = evaluate_constants(&mut ctx, d);
        assert!(matches!(ctx.get(folded), Expr::Constant(Constant::Undefined)));
    }

    #[test]
    fn nested_numeric_tree_folds_completely() {
        let mut ctx = Context::new();
        let two = ctx.num(2);
        let three = ctx.num(3);
        let p = ctx.add(Expr::Pow(two, three));
        let five = ctx.num(5);
        let s = ctx.add(Expr::Sub(p, five));
        let folded = evaluate_constants(&mut ctx, s);
        assert_eq!(render(&ctx, folded), "3");
    }

    #[test]
    fn identity_constant_is_dropped() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let zero = ctx.num(0);
        let s = ctx.add(Expr::Add(x, zero));
        let folded = evaluate_constants(&mut ctx, s);
        assert_eq!(folded, x);
    }

    #[test]
    fn negative_total_leads_with_subtraction() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let one = ctx.num(1);
        let four = ctx.num(4);
        let s = ctx.add(Expr::Add(x, one));
        let t = ctx.add(Expr::Sub(s, four));
        let folded = evaluate_constants(&mut ctx, t);
        assert_eq!(render(&ctx, folded), "-3 + x");
    }
}
