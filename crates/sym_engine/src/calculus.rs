//! Structural differentiation.
//!
//! `differentiate` folds over the symbol sequence left to right, taking
//! one derivative per symbol. Each step is purely structural — sum,
//! product, quotient, power (including the generalized `f^g` form) and
//! chain rules — followed by a constant-folding pass to combine like
//! differentiation terms. Heavier cleanup is the caller's job via
//! `simplify`.

use sym_ast::traversal::contains_var;
use sym_ast::{Context, Expr, ExprId};

/// Differentiate once per symbol, feeding each result into the next.
pub fn differentiate(ctx: &mut Context, symbols: &[&str], expr: ExprId) -> ExprId {
    let mut current = expr;
    for var in symbols {
        current = diff(ctx, current, var);
        current = crate::const_fold::evaluate_constants(ctx, current);
    }
    current
}

fn diff(ctx: &mut Context, expr: ExprId, var: &str) -> ExprId {
    // Constant rule: anything without the symbol differentiates to 0.
    if !contains_var(ctx, expr, var) {
        return ctx.num(0);
    }

    match ctx.get(expr).clone() {
        Expr::Variable(v) => {
            if v == var {
                ctx.num(1)
            } else {
                ctx.num(0)
            }
        }
        Expr::Add(l, r) => {
            let dl = diff(ctx, l, var);
            let dr = diff(ctx, r, var);
            ctx.add(Expr::Add(dl, dr))
        }
        Expr::Sub(l, r) => {
            let dl = diff(ctx, l, var);
            let dr = diff(ctx, r, var);
            ctx.add(Expr::Sub(dl, dr))
        }
        Expr::Neg(inner) => {
            let di = diff(ctx, inner, var);
            ctx.add(Expr::Neg(di))
        }
        Expr::Mul(l, r) => {
            // (uv)' = u'v + uv'
            let dl = diff(ctx, l, var);
            let dr = diff(ctx, r, var);
            let t1 = ctx.add(Expr::Mul(dl, r));
            let t2 = ctx.add(Expr::Mul(l, dr));
            ctx.add(Expr::Add(t1, t2))
        }
        Expr::Div(l, r) => {
            // (u/v)' = (u'v - uv') / v^2
            let dl = diff(ctx, l, var);
            let dr = diff(ctx, r, var);
            let t1 = ctx.add(Expr::Mul(dl, r));
            let t2 = ctx.add(Expr::Mul(l, dr));
            let num = ctx.add(Expr::Sub(t1, t2));
            let two = ctx.num(2);
            let den = ctx.add(Expr::Pow(r, two));
            ctx.add(Expr::Div(num, den))
        }
        Expr::Pow(base, exp) => diff_pow(ctx, expr, base, exp, var),
        Expr::Function(name, args) => diff_function(ctx, expr, &name, &args, var),
        Expr::Matrix { rows, cols, data } => {
            let new_data: Vec<ExprId> = data.iter().map(|&cell| diff(ctx, cell, var)).collect();
            ctx.add(Expr::Matrix { rows, cols, data: new_data })
        }
        Expr::Number(_) | Expr::Constant(_) => ctx.num(0),
    }
}

fn diff_pow(ctx: &mut Context, expr: ExprId, base: ExprId, exp: ExprId, var: &str) -> ExprId {
    let base_varies = contains_var(ctx, base, var);
    let exp_varies = contains_var(ctx, exp, var);

    if base_varies && !exp_varies {
        // (u^n)' = n * u^(n-1) * u'
        let db = diff(ctx, base, var);
        let one = ctx.num(1);
        let n_minus_one = ctx.add(Expr::Sub(exp, one));
        let pow = ctx.add(Expr::Pow(base, n_minus_one));
        let term = ctx.add(Expr::Mul(exp, pow));
        ctx.add(Expr::Mul(term, db))
    } else if !base_varies && exp_varies {
        // (a^u)' = a^u * ln(a) * u'
        let de = diff(ctx, exp, var);
        let ln_a = ctx.func("ln", vec![base]);
        let term = ctx.add(Expr::Mul(expr, ln_a));
        ctx.add(Expr::Mul(term, de))
    } else {
        // Generalized: (u^v)' = u^v * (v'*ln(u) + v*u'/u)
        let db = diff(ctx, base, var);
        let de = diff(ctx, exp, var);
        let ln_u = ctx.func("ln", vec![base]);
        let t1 = ctx.add(Expr::Mul(de, ln_u));
        let t2_num = ctx.add(Expr::Mul(exp, db));
        let t2 = ctx.add(Expr::Div(t2_num, base));
        let inner = ctx.add(Expr::Add(t1, t2));
        ctx.add(Expr::Mul(expr, inner))
    }
}

fn diff_function(
    ctx: &mut Context,
    expr: ExprId,
    name: &str,
    args: &[ExprId],
    var: &str,
) -> ExprId {
    if name == "log" && args.len() == 2 {
        let (base, arg) = (args[0], args[1]);
        if !contains_var(ctx, base, var) {
            // d/dx log(b, u) = u' / (u * ln(b))
            let da = diff(ctx, arg, var);
            let ln_b = ctx.func("ln", vec![base]);
            let den = ctx.add(Expr::Mul(arg, ln_b));
            return ctx.add(Expr::Div(da, den));
        }
        // Variable base: rewrite as ln(u)/ln(b) and use the quotient rule.
        let ln_arg = ctx.func("ln", vec![arg]);
        let ln_base = ctx.func("ln", vec![base]);
        let quotient = ctx.add(Expr::Div(ln_arg, ln_base));
        return diff(ctx, quotient, var);
    }

    if args.len() != 1 {
        // No differentiation rule; keep an explicit unevaluated node so
        // the operation stays total.
        let v = ctx.var(var);
        return ctx.func("derivative", vec![expr, v]);
    }

    let arg = args[0];
    let da = diff(ctx, arg, var);
    let outer = match name {
        "exp" => expr, // exp(u)' = exp(u)
        "ln" => {
            // ln(u)' = 1/u, folded into da/u below
            return ctx.add(Expr::Div(da, arg));
        }
        "sqrt" => {
            // sqrt(u)' = 1 / (2*sqrt(u))
            let two = ctx.num(2);
            let den = ctx.add(Expr::Mul(two, expr));
            return ctx.add(Expr::Div(da, den));
        }
        "abs" => {
            // |u|' = u/|u| * u'
            ctx.add(Expr::Div(arg, expr))
        }
        "sin" => ctx.func("cos", vec![arg]),
        "cos" => {
            let sin_u = ctx.func("sin", vec![arg]);
            ctx.add(Expr::Neg(sin_u))
        }
        "tan" => {
            // tan(u)' = 1/cos^2(u)
            let cos_u = ctx.func("cos", vec![arg]);
            let two = ctx.num(2);
            let cos_sq = ctx.add(Expr::Pow(cos_u, two));
            let one = ctx.num(1);
            ctx.add(Expr::Div(one, cos_sq))
        }
        _ => {
            let v = ctx.var(var);
            return ctx.func("derivative", vec![expr, v]);
        }
    };
    ctx.add(Expr::Mul(outer, da))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simplifier::Simplifier;
    use sym_ast::DisplayExpr;

    fn render(ctx: &Context, id: ExprId) -> String {
        format!("{}", DisplayExpr { context: ctx, id })
    }

    #[test]
    fn derivative_of_absent_symbol_is_zero() {
        let mut ctx = Context::new();
        let y = ctx.var("y");
        let d = differentiate(&mut ctx, &["x"], y);
        assert_eq!(render(&ctx, d), "0");
    }

    #[test]
    fn power_rule() {
        let mut s = Simplifier::with_default_rules();
        let x = s.context.var("x");
        let three = s.context.num(3);
        let cube = s.context.add(Expr::Pow(x, three));
        let d = differentiate(&mut s.context, &["x"], cube);
        let out = s.simplify(d).unwrap();
        assert_eq!(render(&s.context, out), "3 * x^2");
    }

    #[test]
    fn product_rule() {
        let mut s = Simplifier::with_default_rules();
        let x = s.context.var("x");
        let sin = s.context.func("sin", vec![x]);
        let prod = s.context.add(Expr::Mul(x, sin));
        let d = differentiate(&mut s.context, &["x"], prod);
        let out = s.simplify(d).unwrap();
        let rendered = render(&s.context, out);
        assert!(rendered.contains("sin(x)"), "got {rendered}");
        assert!(rendered.contains("cos(x)"), "got {rendered}");
    }

    #[test]
    fn chain_rule_through_exp() {
        let mut s = Simplifier::with_default_rules();
        let x = s.context.var("x");
        let two = s.context.num(2);
        let two_x = s.context.add(Expr::Mul(two, x));
        let e = s.context.func("exp", vec![two_x]);
        let d = differentiate(&mut s.context, &["x"], e);
        let out = s.simplify(d).unwrap();
        let rendered = render(&s.context, out);
        assert!(rendered.contains("exp(2 * x)"), "got {rendered}");
        assert!(rendered.contains('2'), "got {rendered}");
    }

    #[test]
    fn fifth_derivative_of_degree_five_is_constant() {
        // d^5/dx^5 (2x^3 + 4x^5) = 480
        let mut s = Simplifier::with_default_rules();
        let x = s.context.var("x");
        let two = s.context.num(2);
        let three = s.context.num(3);
        let four = s.context.num(4);
        let five = s.context.num(5);
        let x3 = s.context.add(Expr::Pow(x, three));
        let x5 = s.context.add(Expr::Pow(x, five));
        let t1 = s.context.add(Expr::Mul(two, x3));
        let t2 = s.context.add(Expr::Mul(four, x5));
        let sum = s.context.add(Expr::Add(t1, t2));

        let d = differentiate(&mut s.context, &["x", "x", "x", "x", "x"], sum);
        let out = s.simplify(d).unwrap();
        assert_eq!(render(&s.context, out), "480");
    }

    #[test]
    fn degree_plus_one_derivatives_vanish() {
        let mut s = Simplifier::with_default_rules();
        let x = s.context.var("x");
        let three = s.context.num(3);
        let seven = s.context.num(7);
        let x3 = s.context.add(Expr::Pow(x, three));
        let p = s.context.add(Expr::Mul(seven, x3));
        let d = differentiate(&mut s.context, &["x", "x", "x", "x"], p);
        let out = s.simplify(d).unwrap();
        assert_eq!(render(&s.context, out), "0");
    }
}
