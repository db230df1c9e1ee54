//! Logarithm and exponential inverses.
//!
//! `ln` is the one-argument natural log; `log` takes `(base, argument)`.
//! `exp(x)` and `e^x` are both recognized where it matters.

use crate::define_rule;
use crate::rule::Rewrite;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use sym_ast::{Constant, Context, Expr, ExprId};

fn is_e(ctx: &Context, id: ExprId) -> bool {
    matches!(ctx.get(id), Expr::Constant(Constant::E))
}

define_rule!(LnExpRule, "Log of Exponential", Some(vec!["Function"]), |ctx, expr| {
    if let Expr::Function(name, args) = ctx.get(expr) {
        if name == "ln" && args.len() == 1 {
            let arg = args[0];
            if let Expr::Function(inner, inner_args) = ctx.get(arg) {
                if inner == "exp" && inner_args.len() == 1 {
                    return Some(Rewrite::new(inner_args[0], "ln(exp(x)) = x"));
                }
            }
            if let Expr::Pow(base, e) = ctx.get(arg) {
                if is_e(ctx, *base) {
                    return Some(Rewrite::new(*e, "ln(e^x) = x"));
                }
            }
        }
    }
    None
});

define_rule!(ExpLnRule, "Exponential of Log", Some(vec!["Function"]), |ctx, expr| {
    if let Expr::Function(name, args) = ctx.get(expr) {
        if name == "exp" && args.len() == 1 {
            let arg = args[0];
            if let Expr::Function(inner, inner_args) = ctx.get(arg) {
                if inner == "ln" && inner_args.len() == 1 {
                    return Some(Rewrite::with_domain_assumption(
                        inner_args[0],
                        "exp(ln(x)) = x",
                        "x > 0 for ln(x)",
                    ));
                }
            }
        }
    }
    None
});

define_rule!(LogIdentityRule, "Log Identities", Some(vec!["Function"]), |ctx, expr| {
    if let Expr::Function(name, args) = ctx.get(expr) {
        if name == "log" && args.len() == 2 {
            let (base, arg) = (args[0], args[1]);
            if let Expr::Number(n) = ctx.get(arg) {
                if n.is_one() {
                    let zero = ctx.num(0);
                    return Some(Rewrite::new(zero, "log(b, 1) = 0"));
                }
            }
            if base == arg {
                let one = ctx.num(1);
                return Some(Rewrite::new(one, "log(b, b) = 1"));
            }
            // log(b, b^x) = x
            if let Expr::Pow(pb, pe) = ctx.get(arg) {
                if *pb == base {
                    return Some(Rewrite::new(*pe, "log(b, b^x) = x"));
                }
            }
        }
        if name == "ln" && args.len() == 1 {
            let arg = args[0];
            if let Expr::Number(n) = ctx.get(arg) {
                if n.is_one() {
                    let zero = ctx.num(0);
                    return Some(Rewrite::new(zero, "ln(1) = 0"));
                }
            }
            if is_e(ctx, arg) {
                let one = ctx.num(1);
                return Some(Rewrite::new(one, "ln(e) = 1"));
            }
        }
        if name == "exp" && args.len() == 1 {
            if let Expr::Number(n) = ctx.get(args[0]) {
                if n.is_zero() {
                    let one = ctx.num(1);
                    return Some(Rewrite::new(one, "exp(0) = 1"));
                }
            }
        }
    }
    None
});

define_rule!(PowLogRule, "Exponential of Matching Log", Some(vec!["Pow"]), |ctx, expr| {
    if let Expr::Pow(base, exp) = ctx.get(expr) {
        if let Expr::Function(name, args) = ctx.get(*exp) {
            if name == "log" && args.len() == 2 && args[0] == *base {
                return Some(Rewrite::with_domain_assumption(
                    args[1],
                    "b^log(b, x) = x",
                    "x > 0 for log(b, x)",
                ));
            }
            if name == "ln" && args.len() == 1 && is_e(ctx, *base) {
                return Some(Rewrite::with_domain_assumption(
                    args[0],
                    "e^ln(x) = x",
                    "x > 0 for ln(x)",
                ));
            }
        }
    }
    None
});

define_rule!(
    /// `log(b, n)` folds to `k` when `n = b^k` exactly for an integer `k`,
    /// e.g. `log(2, 8) = 3` and `log(2, 1/4) = -2`.
    LogNumericRule,
    "Evaluate Integer Log",
    Some(vec!["Function"]),
    |ctx, expr| {
        if let Expr::Function(name, args) = ctx.get(expr) {
            if name == "log" && args.len() == 2 {
                let (base, arg) = (args[0], args[1]);
                let pair = match (ctx.get(base), ctx.get(arg)) {
                    (Expr::Number(b), Expr::Number(n)) => Some((b.clone(), n.clone())),
                    _ => None,
                };
                if let Some((b, n)) = pair {
                    if let Some(k) = integer_log(&b, &n) {
                        let folded = ctx.num(k);
                        return Some(Rewrite::new(folded, "evaluate integer log"));
                    }
                }
            }
        }
        None
    }
);

/// Smallest integer `k` with `b^k == n`, if one exists. Searches both
/// directions up to a fixed bound.
fn integer_log(b: &BigRational, n: &BigRational) -> Option<i64> {
    if !b.is_positive() || b.is_one() || !n.is_positive() {
        return None;
    }
    if n.is_one() {
        return Some(0);
    }
    let mut acc = BigRational::one();
    for k in 1..=64i64 {
        acc *= b;
        if &acc == n {
            return Some(k);
        }
    }
    let mut acc = BigRational::one();
    for k in 1..=64i64 {
        acc /= b;
        if &acc == n {
            return Some(-k);
        }
    }
    None
}

pub fn register(simplifier: &mut crate::simplifier::Simplifier) {
    simplifier.add_rule(Box::new(LnExpRule));
    simplifier.add_rule(Box::new(ExpLnRule));
    simplifier.add_rule(Box::new(LogIdentityRule));
    simplifier.add_rule(Box::new(PowLogRule));
    simplifier.add_rule(Box::new(LogNumericRule));
}
