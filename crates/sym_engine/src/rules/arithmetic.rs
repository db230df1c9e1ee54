use crate::define_rule;
use crate::numeric::{div_rational, pow_rational, NumericFold};
use crate::rule::Rewrite;
use num_traits::{One, Zero};
use sym_ast::{Constant, Expr};

define_rule!(AddZeroRule, "Identity Property of Addition", Some(vec!["Add"]), |ctx, expr| {
    if let Expr::Add(lhs, rhs) = ctx.get(expr).clone() {
        if let Expr::Number(n) = ctx.get(rhs) {
            if n.is_zero() {
                return Some(Rewrite::new(lhs, "x + 0 = x"));
            }
        }
        if let Expr::Number(n) = ctx.get(lhs) {
            if n.is_zero() {
                return Some(Rewrite::new(rhs, "0 + x = x"));
            }
        }
    }
    None
});

define_rule!(MulOneRule, "Identity Property of Multiplication", Some(vec!["Mul"]), |ctx, expr| {
    if let Expr::Mul(lhs, rhs) = ctx.get(expr).clone() {
        if let Expr::Number(n) = ctx.get(rhs) {
            if n.is_one() {
                return Some(Rewrite::new(lhs, "x * 1 = x"));
            }
        }
        if let Expr::Number(n) = ctx.get(lhs) {
            if n.is_one() {
                return Some(Rewrite::new(rhs, "1 * x = x"));
            }
        }
    }
    None
});

define_rule!(MulZeroRule, "Zero Property of Multiplication", Some(vec!["Mul"]), |ctx, expr| {
    if let Expr::Mul(lhs, rhs) = ctx.get(expr).clone() {
        let zero_side = match (ctx.get(lhs), ctx.get(rhs)) {
            (Expr::Number(n), _) if n.is_zero() => true,
            (_, Expr::Number(n)) if n.is_zero() => true,
            _ => false,
        };
        if zero_side {
            let zero = ctx.num(0);
            return Some(Rewrite::new(zero, "x * 0 = 0"));
        }
    }
    None
});

define_rule!(SubZeroRule, "Subtracting Zero", Some(vec!["Sub"]), |ctx, expr| {
    if let Expr::Sub(lhs, rhs) = ctx.get(expr).clone() {
        if let Expr::Number(n) = ctx.get(rhs) {
            if n.is_zero() {
                return Some(Rewrite::new(lhs, "x - 0 = x"));
            }
        }
        if let Expr::Number(n) = ctx.get(lhs) {
            if n.is_zero() {
                let neg = ctx.add(Expr::Neg(rhs));
                return Some(Rewrite::new(neg, "0 - x = -x"));
            }
        }
    }
    None
});

define_rule!(DivOneRule, "Dividing by One", Some(vec!["Div"]), |ctx, expr| {
    if let Expr::Div(lhs, rhs) = ctx.get(expr).clone() {
        if let Expr::Number(n) = ctx.get(rhs) {
            if n.is_one() {
                return Some(Rewrite::new(lhs, "x / 1 = x"));
            }
        }
    }
    None
});

define_rule!(ZeroNumeratorRule, "Zero Numerator", Some(vec!["Div"]), |ctx, expr| {
    if let Expr::Div(lhs, rhs) = ctx.get(expr).clone() {
        if let Expr::Number(n) = ctx.get(lhs) {
            if n.is_zero() {
                // 0/0 is undefined; leave it for the numeric fold.
                if let Expr::Number(d) = ctx.get(rhs) {
                    if d.is_zero() {
                        return None;
                    }
                }
                let zero = ctx.num(0);
                return Some(Rewrite::new(zero, "0 / x = 0"));
            }
        }
    }
    None
});

define_rule!(PowOneRule, "Exponent One", Some(vec!["Pow"]), |ctx, expr| {
    if let Expr::Pow(base, exp) = ctx.get(expr).clone() {
        if let Expr::Number(n) = ctx.get(exp) {
            if n.is_one() {
                return Some(Rewrite::new(base, "x^1 = x"));
            }
        }
    }
    None
});

define_rule!(PowZeroRule, "Exponent Zero", Some(vec!["Pow"]), |ctx, expr| {
    if let Expr::Pow(base, exp) = ctx.get(expr).clone() {
        if let Expr::Number(n) = ctx.get(exp) {
            if n.is_zero() {
                // 0^0 stays for the numeric fold (undefined).
                if let Expr::Number(b) = ctx.get(base) {
                    if b.is_zero() {
                        return None;
                    }
                }
                let one = ctx.num(1);
                return Some(Rewrite::new(one, "x^0 = 1"));
            }
        }
    }
    None
});

define_rule!(OnePowRule, "Base One", Some(vec!["Pow"]), |ctx, expr| {
    if let Expr::Pow(base, _exp) = ctx.get(expr).clone() {
        if let Expr::Number(b) = ctx.get(base) {
            if b.is_one() {
                let one = ctx.num(1);
                return Some(Rewrite::new(one, "1^x = 1"));
            }
        }
    }
    None
});

define_rule!(NegNegRule, "Double Negation", Some(vec!["Neg"]), |ctx, expr| {
    if let Expr::Neg(inner) = ctx.get(expr) {
        if let Expr::Neg(e) = ctx.get(*inner) {
            return Some(Rewrite::new(*e, "-(-x) = x"));
        }
    }
    None
});

define_rule!(NegNumberRule, "Negate Number", Some(vec!["Neg"]), |ctx, expr| {
    if let Expr::Neg(inner) = ctx.get(expr) {
        if let Expr::Number(n) = ctx.get(*inner) {
            let n = n.clone();
            let folded = ctx.rational(-n);
            return Some(Rewrite::new(folded, "fold negated number"));
        }
    }
    None
});

/// Exact folding of purely numeric Sub/Div/Pow nodes. Add and Mul chains
/// are folded by the collection rules.
define_rule!(FoldNumericRule, "Fold Numeric Operation", Some(vec!["Sub", "Div", "Pow"]), |ctx, expr| {
    let folded = match ctx.get(expr).clone() {
        Expr::Sub(l, r) => match (ctx.get(l), ctx.get(r)) {
            (Expr::Number(a), Expr::Number(b)) => Some(NumericFold::Exact(a - b)),
            _ => None,
        },
        Expr::Div(l, r) => match (ctx.get(l), ctx.get(r)) {
            (Expr::Number(a), Expr::Number(b)) => Some(div_rational(a, b)),
            _ => None,
        },
        Expr::Pow(b, e) => match (ctx.get(b), ctx.get(e)) {
            (Expr::Number(base), Expr::Number(exp)) => pow_rational(base, exp),
            _ => None,
        },
        _ => None,
    }?;
    let new_expr = match folded {
        NumericFold::Exact(v) => ctx.rational(v),
        NumericFold::Undefined => ctx.constant(Constant::Undefined),
    };
    Some(Rewrite::new(new_expr, "fold numeric operation"))
});

pub fn register(simplifier: &mut crate::simplifier::Simplifier) {
    simplifier.add_rule(Box::new(AddZeroRule));
    simplifier.add_rule(Box::new(MulOneRule));
    simplifier.add_rule(Box::new(MulZeroRule));
    simplifier.add_rule(Box::new(SubZeroRule));
    simplifier.add_rule(Box::new(DivOneRule));
    simplifier.add_rule(Box::new(ZeroNumeratorRule));
    simplifier.add_rule(Box::new(PowOneRule));
    simplifier.add_rule(Box::new(PowZeroRule));
    simplifier.add_rule(Box::new(OnePowRule));
    simplifier.add_rule(Box::new(NegNegRule));
    simplifier.add_rule(Box::new(NegNumberRule));
    simplifier.add_rule(Box::new(FoldNumericRule));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Rule;
    use sym_ast::{Context, DisplayExpr};

    fn render(ctx: &Context, id: sym_ast::ExprId) -> String {
        format!("{}", DisplayExpr { context: ctx, id })
    }

    #[test]
    fn add_zero() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let zero = ctx.num(0);
        let expr = ctx.add(Expr::Add(x, zero));
        let rewrite = AddZeroRule.apply(&mut ctx, expr).unwrap();
        assert_eq!(render(&ctx, rewrite.new_expr), "x");
    }

    #[test]
    fn pow_zero_guards_zero_base() {
        let mut ctx = Context::new();
        let zero = ctx.num(0);
        let expr = ctx.add(Expr::Pow(zero, zero));
        assert!(PowZeroRule.apply(&mut ctx, expr).is_none());

        let x = ctx.var("x");
        let pow = ctx.add(Expr::Pow(x, zero));
        let rewrite = PowZeroRule.apply(&mut ctx, pow).unwrap();
        assert_eq!(render(&ctx, rewrite.new_expr), "1");
    }

    #[test]
    fn numeric_pow_folds_perfect_root() {
        let mut ctx = Context::new();
        let four = ctx.num(4);
        let half = ctx.frac(1, 2);
        let expr = ctx.add(Expr::Pow(four, half));
        let rewrite = FoldNumericRule.apply(&mut ctx, expr).unwrap();
        assert_eq!(render(&ctx, rewrite.new_expr), "2");
    }

    #[test]
    fn division_by_zero_folds_to_undefined() {
        let mut ctx = Context::new();
        let one = ctx.num(1);
        let zero = ctx.num(0);
        let expr = ctx.add(Expr::Div(one, zero));
        let rewrite = FoldNumericRule.apply(&mut ctx, expr).unwrap();
        assert!(matches!(
            ctx.get(rewrite.new_expr),
            Expr::Constant(Constant::Undefined)
        ));
    }
}
