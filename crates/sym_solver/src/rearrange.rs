//! Syntactic isolation of a single occurrence of an unknown.
//!
//! The walk peels the enclosing operator at each step by applying its
//! algebraic inverse to both sides. Multi-valued inverses (even powers,
//! absolute value) fork into one equation per branch, principal branch
//! first. No simplification is performed on the isolated side.

use crate::error::SolveError;
use sym_ast::traversal::{contains_var, count_var_occurrences};
use sym_ast::{Context, Equation, Expr, ExprId};
use tracing::trace;

pub fn rearrange(
    ctx: &mut Context,
    var: &str,
    equation: &Equation,
) -> Result<Vec<Equation>, SolveError> {
    let in_lhs = count_var_occurrences(ctx, equation.lhs, var);
    let in_rhs = count_var_occurrences(ctx, equation.rhs, var);
    match in_lhs + in_rhs {
        0 => return Err(SolveError::NoOccurrence(var.to_string())),
        1 => {}
        _ => return Err(SolveError::MultipleOccurrences(var.to_string())),
    }
    let (side, other) = if in_lhs == 1 {
        (equation.lhs, equation.rhs)
    } else {
        (equation.rhs, equation.lhs)
    };
    isolate(ctx, var, side, other)
}

fn isolate(
    ctx: &mut Context,
    var: &str,
    lhs: ExprId,
    rhs: ExprId,
) -> Result<Vec<Equation>, SolveError> {
    match ctx.get(lhs).clone() {
        Expr::Variable(v) if v == var => Ok(vec![Equation::new(lhs, rhs)]),
        Expr::Add(l, r) => {
            // a + x = b  ->  x = b - a
            if contains_var(ctx, l, var) {
                let new_rhs = ctx.add(Expr::Sub(rhs, r));
                isolate(ctx, var, l, new_rhs)
            } else {
                let new_rhs = ctx.add(Expr::Sub(rhs, l));
                isolate(ctx, var, r, new_rhs)
            }
        }
        Expr::Sub(l, r) => {
            if contains_var(ctx, l, var) {
                // x - a = b  ->  x = b + a
                let new_rhs = ctx.add(Expr::Add(rhs, r));
                isolate(ctx, var, l, new_rhs)
            } else {
                // a - x = b  ->  x = a - b
                let new_rhs = ctx.add(Expr::Sub(l, rhs));
                isolate(ctx, var, r, new_rhs)
            }
        }
        Expr::Mul(l, r) => {
            if contains_var(ctx, l, var) {
                let new_rhs = ctx.add(Expr::Div(rhs, r));
                isolate(ctx, var, l, new_rhs)
            } else {
                let new_rhs = ctx.add(Expr::Div(rhs, l));
                isolate(ctx, var, r, new_rhs)
            }
        }
        Expr::Div(l, r) => {
            if contains_var(ctx, l, var) {
                // x / a = b  ->  x = b * a
                let new_rhs = ctx.add(Expr::Mul(rhs, r));
                isolate(ctx, var, l, new_rhs)
            } else {
                // a / x = b  ->  x = a / b
                let new_rhs = ctx.add(Expr::Div(l, rhs));
                isolate(ctx, var, r, new_rhs)
            }
        }
        Expr::Neg(inner) => {
            let new_rhs = ctx.add(Expr::Neg(rhs));
            isolate(ctx, var, inner, new_rhs)
        }
        Expr::Pow(base, exp) => {
            if contains_var(ctx, base, var) {
                let one = ctx.num(1);
                let inv_exp = ctx.add(Expr::Div(one, exp));
                let principal = ctx.add(Expr::Pow(rhs, inv_exp));
                if is_even_integer(ctx, exp) {
                    // x^(2k) = b forks into the two real root branches.
                    trace!(var, "even power forks into two branches");
                    let negated = ctx.add(Expr::Neg(principal));
                    let mut branches = isolate(ctx, var, base, principal)?;
                    branches.extend(isolate(ctx, var, base, negated)?);
                    Ok(branches)
                } else {
                    isolate(ctx, var, base, principal)
                }
            } else {
                // a^x = b  ->  x = log(a, b)
                let new_rhs = ctx.func("log", vec![base, rhs]);
                isolate(ctx, var, exp, new_rhs)
            }
        }
        Expr::Function(name, args) => isolate_function(ctx, var, &name, &args, rhs),
        _ => Err(SolveError::UnsolvableStrategy(var.to_string())),
    }
}

fn isolate_function(
    ctx: &mut Context,
    var: &str,
    name: &str,
    args: &[ExprId],
    rhs: ExprId,
) -> Result<Vec<Equation>, SolveError> {
    if name == "log" && args.len() == 2 {
        let (base, arg) = (args[0], args[1]);
        if contains_var(ctx, arg, var) && !contains_var(ctx, base, var) {
            // log(b, x) = rhs  ->  x = b^rhs
            let new_rhs = ctx.add(Expr::Pow(base, rhs));
            return isolate(ctx, var, arg, new_rhs);
        }
        if contains_var(ctx, base, var) && !contains_var(ctx, arg, var) {
            // log(x, a) = rhs  ->  x = a^(1/rhs)
            let one = ctx.num(1);
            let inv = ctx.add(Expr::Div(one, rhs));
            let new_rhs = ctx.add(Expr::Pow(arg, inv));
            return isolate(ctx, var, base, new_rhs);
        }
        return Err(SolveError::UnsolvableStrategy(var.to_string()));
    }

    if args.len() != 1 {
        return Err(SolveError::UnsolvableStrategy(var.to_string()));
    }
    let arg = args[0];
    match name {
        "ln" => {
            let new_rhs = ctx.func("exp", vec![rhs]);
            isolate(ctx, var, arg, new_rhs)
        }
        "exp" => {
            let new_rhs = ctx.func("ln", vec![rhs]);
            isolate(ctx, var, arg, new_rhs)
        }
        "sqrt" => {
            let two = ctx.num(2);
            let new_rhs = ctx.add(Expr::Pow(rhs, two));
            isolate(ctx, var, arg, new_rhs)
        }
        "abs" => {
            // |x| = b forks into x = b and x = -b.
            trace!(var, "absolute value forks into two branches");
            let negated = ctx.add(Expr::Neg(rhs));
            let mut branches = isolate(ctx, var, arg, rhs)?;
            branches.extend(isolate(ctx, var, arg, negated)?);
            Ok(branches)
        }
        // Principal branches only for the trigonometric inverses.
        "sin" => {
            let new_rhs = ctx.func("arcsin", vec![rhs]);
            isolate(ctx, var, arg, new_rhs)
        }
        "cos" => {
            let new_rhs = ctx.func("arccos", vec![rhs]);
            isolate(ctx, var, arg, new_rhs)
        }
        "tan" => {
            let new_rhs = ctx.func("arctan", vec![rhs]);
            isolate(ctx, var, arg, new_rhs)
        }
        _ => Err(SolveError::UnsolvableStrategy(var.to_string())),
    }
}

fn is_even_integer(ctx: &Context, id: ExprId) -> bool {
    match ctx.get(id) {
        Expr::Number(n) => {
            n.is_integer() && num_integer::Integer::is_even(&n.to_integer())
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sym_ast::DisplayEquation;

    fn render(ctx: &Context, eq: &Equation) -> String {
        format!("{}", DisplayEquation { context: ctx, equation: *eq })
    }

    #[test]
    fn peels_addition() {
        let mut ctx = Context::new();
        let a = ctx.var("a");
        let x = ctx.var("x");
        let b = ctx.var("b");
        let lhs = ctx.add(Expr::Add(a, x));
        let eq = Equation::new(lhs, b);
        let out = rearrange(&mut ctx, "x", &eq).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(render(&ctx, &out[0]), "x = b - a");
    }

    #[test]
    fn even_power_forks() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let two = ctx.num(2);
        let b = ctx.var("b");
        let lhs = ctx.add(Expr::Pow(x, two));
        let eq = Equation::new(lhs, b);
        let out = rearrange(&mut ctx, "x", &eq).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(render(&ctx, &out[0]), "x = b^(1 / 2)");
        assert_eq!(render(&ctx, &out[1]), "x = -(b^(1 / 2))");
    }

    #[test]
    fn odd_power_keeps_one_branch() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let three = ctx.num(3);
        let b = ctx.var("b");
        let lhs = ctx.add(Expr::Pow(x, three));
        let eq = Equation::new(lhs, b);
        let out = rearrange(&mut ctx, "x", &eq).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(render(&ctx, &out[0]), "x = b^(1 / 3)");
    }

    #[test]
    fn abs_forks() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let abs = ctx.func("abs", vec![x]);
        let five = ctx.num(5);
        let eq = Equation::new(abs, five);
        let out = rearrange(&mut ctx, "x", &eq).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(render(&ctx, &out[0]), "x = 5");
        assert_eq!(render(&ctx, &out[1]), "x = -5");
    }

    #[test]
    fn exponent_occurrence_takes_logs() {
        let mut ctx = Context::new();
        let two = ctx.num(2);
        let x = ctx.var("x");
        let eight = ctx.num(8);
        let lhs = ctx.add(Expr::Pow(two, x));
        let eq = Equation::new(lhs, eight);
        let out = rearrange(&mut ctx, "x", &eq).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(render(&ctx, &out[0]), "x = log(2, 8)");
    }

    #[test]
    fn rejects_multiple_occurrences() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let sum = ctx.add(Expr::Add(x, x));
        let one = ctx.num(1);
        let eq = Equation::new(sum, one);
        assert!(matches!(
            rearrange(&mut ctx, "x", &eq),
            Err(SolveError::MultipleOccurrences(_))
        ));
    }

    #[test]
    fn rejects_missing_unknown() {
        let mut ctx = Context::new();
        let a = ctx.var("a");
        let one = ctx.num(1);
        let eq = Equation::new(a, one);
        assert!(matches!(
            rearrange(&mut ctx, "y", &eq),
            Err(SolveError::NoOccurrence(_))
        ));
    }

    #[test]
    fn unknown_on_right_side_is_fine() {
        let mut ctx = Context::new();
        let b = ctx.var("b");
        let x = ctx.var("x");
        let two = ctx.num(2);
        let prod = ctx.add(Expr::Mul(two, x));
        let eq = Equation::new(b, prod);
        let out = rearrange(&mut ctx, "x", &eq).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(render(&ctx, &out[0]), "x = b / 2");
    }
}
