//! Back-substitution verification of candidate solutions.
//!
//! Even-power and log-elimination branches can introduce spurious roots;
//! each candidate binding is substituted into the original equations and
//! refuted candidates are discarded. Exact checks run first; the float
//! boundary decides irrational candidates. A candidate that cannot be
//! refuted is kept.

use crate::solution::Binding;
use num_traits::Zero;
use std::collections::HashMap;
use sym_ast::traversal::{collect_variables, substitute_symbol};
use sym_ast::{Constant, Equation, Expr};
use sym_engine::{eval_f64, Simplifier, SimplifyOptions};
use tracing::debug;

const TOLERANCE: f64 = 1e-9;

/// Does `binding` satisfy `equation`? `None` means undecidable.
pub fn binding_satisfies(
    simplifier: &mut Simplifier,
    binding: &Binding,
    equation: &Equation,
) -> Option<bool> {
    let ctx = &mut simplifier.context;
    let mut lhs = equation.lhs;
    let mut rhs = equation.rhs;
    for (name, &value) in binding {
        lhs = substitute_symbol(ctx, lhs, name, value);
        rhs = substitute_symbol(ctx, rhs, name, value);
    }
    let diff = ctx.add(Expr::Sub(lhs, rhs));

    let reduced = simplifier
        .simplify_with_options(diff, SimplifyOptions::with_ratio(16.0))
        .unwrap_or_else(|_| simplifier.evaluate_constants(diff));

    match simplifier.context.get(reduced) {
        Expr::Number(n) => return Some(n.is_zero()),
        Expr::Constant(Constant::Undefined) => return Some(false),
        _ => {}
    }

    // Residual symbols (free parameters, surds): check numerically at an
    // arbitrary assignment.
    let free = collect_variables(&simplifier.context, reduced);
    let mut vars: HashMap<String, f64> = HashMap::new();
    for (i, name) in free.iter().enumerate() {
        vars.insert(name.clone(), 1.2345678 + 0.31 * i as f64);
    }
    match eval_f64(&simplifier.context, reduced, &vars) {
        Some(v) if v.is_nan() => {
            // A domain violation refutes only a fully concrete candidate.
            if free.is_empty() {
                Some(false)
            } else {
                None
            }
        }
        Some(v) => Some(v.abs() < TOLERANCE),
        None => None,
    }
}

/// Keep the bindings that no original equation refutes.
pub fn filter_refuted(
    simplifier: &mut Simplifier,
    bindings: Vec<Binding>,
    originals: &[Equation],
) -> Vec<Binding> {
    bindings
        .into_iter()
        .filter(|binding| {
            for equation in originals {
                if binding_satisfies(simplifier, binding, equation) == Some(false) {
                    debug!("discarding refuted candidate");
                    return false;
                }
            }
            true
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_true_root() {
        let mut s = Simplifier::with_default_rules();
        let x = s.context.var("x");
        let one = s.context.num(1);
        let three = s.context.num(3);
        let lhs = s.context.add(Expr::Add(one, x));
        let eq = Equation::new(lhs, three);
        let mut binding = Binding::new();
        binding.insert("x".to_string(), s.context.num(2));
        assert_eq!(binding_satisfies(&mut s, &binding, &eq), Some(true));
    }

    #[test]
    fn refutes_spurious_abs_branch() {
        // |x| = -5 has no solutions; the branch x = -5 must be refuted.
        let mut s = Simplifier::with_default_rules();
        let x = s.context.var("x");
        let abs = s.context.func("abs", vec![x]);
        let five = s.context.num(5);
        let neg_five = s.context.add(Expr::Neg(five));
        let eq = Equation::new(abs, neg_five);
        let mut binding = Binding::new();
        binding.insert("x".to_string(), neg_five);
        assert_eq!(binding_satisfies(&mut s, &binding, &eq), Some(false));
    }

    #[test]
    fn accepts_irrational_root_numerically() {
        // x^2 = 2 at x = 2^(1/2)
        let mut s = Simplifier::with_default_rules();
        let x = s.context.var("x");
        let two = s.context.num(2);
        let sq = s.context.add(Expr::Pow(x, two));
        let eq = Equation::new(sq, two);
        let half = s.context.frac(1, 2);
        let root = s.context.add(Expr::Pow(two, half));
        let mut binding = Binding::new();
        binding.insert("x".to_string(), root);
        assert_eq!(binding_satisfies(&mut s, &binding, &eq), Some(true));
    }
}
