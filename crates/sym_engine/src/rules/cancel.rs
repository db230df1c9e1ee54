use crate::define_rule;
use crate::rule::Rewrite;
use num_traits::Zero;
use sym_ast::Expr;

define_rule!(SubSelfRule, "Subtract Self", Some(vec!["Sub"]), |ctx, expr| {
    if let Expr::Sub(l, r) = ctx.get(expr) {
        if l == r {
            let zero = ctx.num(0);
            return Some(Rewrite::new(zero, "x - x = 0"));
        }
    }
    None
});

define_rule!(AddInverseRule, "Additive Inverse", Some(vec!["Add"]), |ctx, expr| {
    if let Expr::Add(l, r) = ctx.get(expr) {
        let (l, r) = (*l, *r);
        if let Expr::Neg(inner) = ctx.get(r) {
            if *inner == l {
                let zero = ctx.num(0);
                return Some(Rewrite::new(zero, "x + (-x) = 0"));
            }
        }
        if let Expr::Neg(inner) = ctx.get(l) {
            if *inner == r {
                let zero = ctx.num(0);
                return Some(Rewrite::new(zero, "(-x) + x = 0"));
            }
        }
    }
    None
});

define_rule!(
    /// `x / x = 1` whenever `x` is not the literal zero. A symbolic
    /// denominator is assumed nonzero, the usual simplification stance.
    DivSelfRule,
    "Divide Self",
    Some(vec!["Div"]),
    |ctx, expr| {
        if let Expr::Div(l, r) = ctx.get(expr) {
            if l == r {
                if let Expr::Number(n) = ctx.get(*l) {
                    if n.is_zero() {
                        return None;
                    }
                }
                let one = ctx.num(1);
                return Some(Rewrite::with_domain_assumption(
                    one,
                    "x / x = 1",
                    "denominator is nonzero",
                ));
            }
        }
        None
    }
);

pub fn register(simplifier: &mut crate::simplifier::Simplifier) {
    simplifier.add_rule(Box::new(SubSelfRule));
    simplifier.add_rule(Box::new(AddInverseRule));
    simplifier.add_rule(Box::new(DivSelfRule));
}
