use crate::define_rule;
use crate::numeric::rational_root;
use crate::rule::Rewrite;
use num_traits::Signed;
use sym_ast::Expr;

define_rule!(AbsNumberRule, "Absolute Value of a Number", Some(vec!["Function"]), |ctx, expr| {
    if let Expr::Function(name, args) = ctx.get(expr) {
        if name == "abs" && args.len() == 1 {
            if let Expr::Number(n) = ctx.get(args[0]) {
                let n = n.clone();
                let folded = ctx.rational(n.abs());
                return Some(Rewrite::new(folded, "|n| evaluates"));
            }
        }
    }
    None
});

define_rule!(AbsNegRule, "Absolute Value of a Negation", Some(vec!["Function"]), |ctx, expr| {
    if let Expr::Function(name, args) = ctx.get(expr) {
        if name == "abs" && args.len() == 1 {
            if let Expr::Neg(inner) = ctx.get(args[0]) {
                let inner = *inner;
                let new_expr = ctx.func("abs", vec![inner]);
                return Some(Rewrite::new(new_expr, "|-x| = |x|"));
            }
        }
    }
    None
});

define_rule!(AbsAbsRule, "Nested Absolute Value", Some(vec!["Function"]), |ctx, expr| {
    if let Expr::Function(name, args) = ctx.get(expr) {
        if name == "abs" && args.len() == 1 {
            if let Expr::Function(inner, _) = ctx.get(args[0]) {
                if inner == "abs" {
                    return Some(Rewrite::new(args[0], "||x|| = |x|"));
                }
            }
        }
    }
    None
});

define_rule!(SqrtNumberRule, "Square Root of a Perfect Square", Some(vec!["Function"]), |ctx, expr| {
    if let Expr::Function(name, args) = ctx.get(expr) {
        if name == "sqrt" && args.len() == 1 {
            if let Expr::Number(n) = ctx.get(args[0]) {
                let n = n.clone();
                if let Some(root) = rational_root(&n, 2) {
                    let folded = ctx.rational(root);
                    return Some(Rewrite::new(folded, "evaluate exact square root"));
                }
            }
        }
    }
    None
});

define_rule!(SqrtSquareRule, "Square Root of a Square", Some(vec!["Function"]), |ctx, expr| {
    if let Expr::Function(name, args) = ctx.get(expr) {
        if name == "sqrt" && args.len() == 1 {
            if let Expr::Pow(base, e) = ctx.get(args[0]) {
                let base = *base;
                let is_two = matches!(ctx.get(*e), Expr::Number(n) if *n == num_rational::BigRational::from_integer(2.into()));
                if is_two {
                    let new_expr = ctx.func("abs", vec![base]);
                    return Some(Rewrite::new(new_expr, "sqrt(x^2) = |x|"));
                }
            }
        }
    }
    None
});

pub fn register(simplifier: &mut crate::simplifier::Simplifier) {
    simplifier.add_rule(Box::new(AbsNumberRule));
    simplifier.add_rule(Box::new(AbsNegRule));
    simplifier.add_rule(Box::new(AbsAbsRule));
    simplifier.add_rule(Box::new(SqrtNumberRule));
    simplifier.add_rule(Box::new(SqrtSquareRule));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Rule;
    use sym_ast::{Context, DisplayExpr};

    #[test]
    fn abs_of_negative_number() {
        let mut ctx = Context::new();
        let n = ctx.frac(-3, 2);
        let abs = ctx.func("abs", vec![n]);
        let rewrite = AbsNumberRule.apply(&mut ctx, abs).unwrap();
        assert_eq!(
            format!("{}", DisplayExpr { context: &ctx, id: rewrite.new_expr }),
            "3/2"
        );
    }

    #[test]
    fn sqrt_of_square_becomes_abs() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let two = ctx.num(2);
        let sq = ctx.add(Expr::Pow(x, two));
        let sqrt = ctx.func("sqrt", vec![sq]);
        let rewrite = SqrtSquareRule.apply(&mut ctx, sqrt).unwrap();
        assert_eq!(
            format!("{}", DisplayExpr { context: &ctx, id: rewrite.new_expr }),
            "abs(x)"
        );
    }
}
