use crate::define_rule;
use crate::rule::Rewrite;
use sym_ast::Expr;

define_rule!(
    /// `(x^a)^b = x^(a*b)` for numeric exponents with integer `b`. The
    /// integer guard keeps `(x^2)^(1/2)` from silently dropping the sign
    /// branch — that case belongs to `sqrt(x^2) = |x|`.
    PowPowRule,
    "Power of a Power",
    Some(vec!["Pow"]),
    |ctx, expr| {
        if let Expr::Pow(base, outer_exp) = ctx.get(expr).clone() {
            if let Expr::Pow(inner_base, inner_exp) = ctx.get(base).clone() {
                let product = match (ctx.get(inner_exp), ctx.get(outer_exp)) {
                    (Expr::Number(a), Expr::Number(b)) if b.is_integer() => Some(a * b),
                    _ => None,
                };
                if let Some(p) = product {
                    let e = ctx.rational(p);
                    let new_expr = ctx.add(Expr::Pow(inner_base, e));
                    return Some(Rewrite::new(new_expr, "(x^a)^b = x^(a*b)"));
                }
            }
        }
        None
    }
);

pub fn register(simplifier: &mut crate::simplifier::Simplifier) {
    simplifier.add_rule(Box::new(PowPowRule));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Rule;
    use sym_ast::{Context, DisplayExpr};

    #[test]
    fn collapses_numeric_tower() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let two = ctx.num(2);
        let three = ctx.num(3);
        let inner = ctx.add(Expr::Pow(x, two));
        let outer = ctx.add(Expr::Pow(inner, three));
        let rewrite = PowPowRule.apply(&mut ctx, outer).unwrap();
        assert_eq!(
            format!("{}", DisplayExpr { context: &ctx, id: rewrite.new_expr }),
            "x^6"
        );
    }

    #[test]
    fn even_root_of_square_is_left_alone() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let two = ctx.num(2);
        let half = ctx.frac(1, 2);
        let inner = ctx.add(Expr::Pow(x, two));
        let outer = ctx.add(Expr::Pow(inner, half));
        assert!(PowPowRule.apply(&mut ctx, outer).is_none());
    }

    #[test]
    fn squared_square_root_folds() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let half = ctx.frac(1, 2);
        let two = ctx.num(2);
        let inner = ctx.add(Expr::Pow(x, half));
        let outer = ctx.add(Expr::Pow(inner, two));
        let rewrite = PowPowRule.apply(&mut ctx, outer).unwrap();
        assert_eq!(
            format!("{}", DisplayExpr { context: &ctx, id: rewrite.new_expr }),
            "x^1"
        );
    }
}
