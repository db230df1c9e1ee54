//! Substitution and evaluation at the numeric boundary.
//!
//! `evaluate` is the exact path: substitute bindings, then fold
//! constants, staying symbolic wherever symbols remain. `eval_f64` is the
//! floating collaborator that knows the transcendental primitives.

use num_traits::ToPrimitive;
use std::collections::HashMap;
use sym_ast::traversal::substitute_symbol;
use sym_ast::{Constant, Context, Expr, ExprId};

/// Apply a symbol-to-expression binding map.
pub fn substitute(ctx: &mut Context, expr: ExprId, bindings: &HashMap<String, ExprId>) -> ExprId {
    let mut current = expr;
    for (name, replacement) in bindings {
        current = substitute_symbol(ctx, current, name, *replacement);
    }
    current
}

/// Substitute then fold exactly. Symbolic residue stays symbolic.
pub fn evaluate(ctx: &mut Context, expr: ExprId, bindings: &HashMap<String, ExprId>) -> ExprId {
    let substituted = substitute(ctx, expr, bindings);
    crate::const_fold::evaluate_constants(ctx, substituted)
}

/// Floating-point evaluation. `None` when a symbol is unbound or a
/// function is unknown.
pub fn eval_f64(ctx: &Context, expr: ExprId, vars: &HashMap<String, f64>) -> Option<f64> {
    match ctx.get(expr) {
        Expr::Number(n) => n.to_f64(),
        Expr::Variable(v) => vars.get(v).copied(),
        Expr::Constant(c) => Some(match c {
            Constant::Pi => std::f64::consts::PI,
            Constant::E => std::f64::consts::E,
            Constant::Infinity => f64::INFINITY,
            Constant::Undefined => f64::NAN,
        }),
        Expr::Add(l, r) => Some(eval_f64(ctx, *l, vars)? + eval_f64(ctx, *r, vars)?),
        Expr::Sub(l, r) => Some(eval_f64(ctx, *l, vars)? - eval_f64(ctx, *r, vars)?),
        Expr::Mul(l, r) => Some(eval_f64(ctx, *l, vars)? * eval_f64(ctx, *r, vars)?),
        Expr::Div(l, r) => Some(eval_f64(ctx, *l, vars)? / eval_f64(ctx, *r, vars)?),
        Expr::Pow(b, e) => Some(eval_f64(ctx, *b, vars)?.powf(eval_f64(ctx, *e, vars)?)),
        Expr::Neg(e) => Some(-eval_f64(ctx, *e, vars)?),
        Expr::Function(name, args) => {
            let vals: Option<Vec<f64>> = args.iter().map(|a| eval_f64(ctx, *a, vars)).collect();
            let vals = vals?;
            match name.as_str() {
                "sin" => Some(vals.first()?.sin()),
                "cos" => Some(vals.first()?.cos()),
                "tan" => Some(vals.first()?.tan()),
                "exp" => Some(vals.first()?.exp()),
                "ln" => Some(vals.first()?.ln()),
                "log" => {
                    if vals.len() == 2 {
                        Some(vals[1].ln() / vals[0].ln())
                    } else if vals.len() == 1 {
                        Some(vals[0].log10())
                    } else {
                        None
                    }
                }
                "sqrt" => Some(vals.first()?.sqrt()),
                "abs" => Some(vals.first()?.abs()),
                _ => None,
            }
        }
        Expr::Matrix { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluate_substitutes_and_folds() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let one = ctx.num(1);
        let sum = ctx.add(Expr::Add(one, x));
        let mut bindings = HashMap::new();
        bindings.insert("x".to_string(), ctx.num(2));
        let out = evaluate(&mut ctx, sum, &bindings);
        assert_eq!(ctx.as_number(out), Some(num_rational::BigRational::from_integer(3.into())));
    }

    #[test]
    fn evaluate_keeps_symbolic_residue() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let y = ctx.var("y");
        let sum = ctx.add(Expr::Add(x, y));
        let mut bindings = HashMap::new();
        bindings.insert("x".to_string(), ctx.num(2));
        let out = evaluate(&mut ctx, sum, &bindings);
        assert!(sym_ast::traversal::contains_var(&ctx, out, "y"));
    }

    #[test]
    fn float_boundary_knows_transcendentals() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let sin = ctx.func("sin", vec![x]);
        let mut vars = HashMap::new();
        vars.insert("x".to_string(), 0.5f64);
        let v = eval_f64(&ctx, sin, &vars).unwrap();
        assert!((v - 0.5f64.sin()).abs() < 1e-12);
    }

    #[test]
    fn unbound_symbol_is_none() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        assert!(eval_f64(&ctx, x, &HashMap::new()).is_none());
    }
}
