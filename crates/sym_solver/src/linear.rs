//! Linear-system detection and exact Gaussian elimination.
//!
//! An equation joins the fast path only if, with all terms moved to one
//! side, it is linear in the full unknown set with numeric coefficients:
//! total degree <= 1 per unknown and no unknown-unknown products.
//! Anything else declines the path and falls back to substitution.
//! Elimination runs over `BigRational`, so results are exact fractions.

use crate::error::SolveError;
use crate::fresh::FreshSymbols;
use crate::solution::{Binding, SolutionSet};
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use sym_ast::{Context, Expr, ExprId};
use tracing::debug;

/// `expr` as `sum(coeffs[i] * unknowns[i]) + constant`.
#[derive(Debug, Clone)]
pub struct LinearForm {
    pub coeffs: Vec<BigRational>,
    pub constant: BigRational,
}

impl LinearForm {
    fn constant_only(n: BigRational, width: usize) -> Self {
        LinearForm { coeffs: vec![BigRational::zero(); width], constant: n }
    }

    fn is_constant(&self) -> bool {
        self.coeffs.iter().all(|c| c.is_zero())
    }

    fn scale(&self, factor: &BigRational) -> Self {
        LinearForm {
            coeffs: self.coeffs.iter().map(|c| c * factor).collect(),
            constant: &self.constant * factor,
        }
    }

    fn add(&self, other: &Self) -> Self {
        LinearForm {
            coeffs: self
                .coeffs
                .iter()
                .zip(other.coeffs.iter())
                .map(|(a, b)| a + b)
                .collect(),
            constant: &self.constant + &other.constant,
        }
    }

    fn neg(&self) -> Self {
        LinearForm {
            coeffs: self.coeffs.iter().map(|c| -c).collect(),
            constant: -self.constant.clone(),
        }
    }
}

/// Extract the linear form of `expr` over `unknowns`, or `None` when the
/// expression is nonlinear or has non-numeric coefficients.
pub fn linear_form(ctx: &Context, expr: ExprId, unknowns: &[&str]) -> Option<LinearForm> {
    let width = unknowns.len();
    match ctx.get(expr) {
        Expr::Number(n) => Some(LinearForm::constant_only(n.clone(), width)),
        Expr::Variable(v) => {
            let idx = unknowns.iter().position(|u| u == v)?;
            let mut coeffs = vec![BigRational::zero(); width];
            coeffs[idx] = BigRational::one();
            Some(LinearForm { coeffs, constant: BigRational::zero() })
        }
        Expr::Add(l, r) => {
            let lf = linear_form(ctx, *l, unknowns)?;
            let rf = linear_form(ctx, *r, unknowns)?;
            Some(lf.add(&rf))
        }
        Expr::Sub(l, r) => {
            let lf = linear_form(ctx, *l, unknowns)?;
            let rf = linear_form(ctx, *r, unknowns)?;
            Some(lf.add(&rf.neg()))
        }
        Expr::Neg(inner) => Some(linear_form(ctx, *inner, unknowns)?.neg()),
        Expr::Mul(l, r) => {
            let lf = linear_form(ctx, *l, unknowns)?;
            let rf = linear_form(ctx, *r, unknowns)?;
            if lf.is_constant() {
                Some(rf.scale(&lf.constant))
            } else if rf.is_constant() {
                Some(lf.scale(&rf.constant))
            } else {
                // unknown * unknown
                None
            }
        }
        Expr::Div(l, r) => {
            let lf = linear_form(ctx, *l, unknowns)?;
            let rf = linear_form(ctx, *r, unknowns)?;
            if rf.is_constant() && !rf.constant.is_zero() {
                let inv = BigRational::one() / rf.constant;
                Some(lf.scale(&inv))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// One row of the augmented system: `coeffs * x = rhs`.
#[derive(Debug, Clone)]
struct Row {
    coeffs: Vec<BigRational>,
    rhs: BigRational,
}

/// Solve `rows` by Gauss-Jordan elimination with exact arithmetic.
///
/// Outcomes: a unique binding, `InconsistentSystem`, or a parametrized
/// binding with free unknowns bound to fresh placeholder symbols.
pub fn solve_linear_system(
    ctx: &mut Context,
    unknowns: &[&str],
    forms: &[LinearForm],
    fresh: &mut FreshSymbols,
) -> Result<SolutionSet, SolveError> {
    let width = unknowns.len();
    let mut rows: Vec<Row> = forms
        .iter()
        .map(|f| Row { coeffs: f.coeffs.clone(), rhs: -f.constant.clone() })
        .collect();

    // Forward pass to reduced row echelon form.
    let mut pivot_of_col: Vec<Option<usize>> = vec![None; width];
    let mut next_row = 0usize;
    for col in 0..width {
        let Some(pivot_row) = (next_row..rows.len()).find(|&r| !rows[r].coeffs[col].is_zero())
        else {
            continue;
        };
        rows.swap(next_row, pivot_row);

        let lead = rows[next_row].coeffs[col].clone();
        let inv = BigRational::one() / lead;
        for c in rows[next_row].coeffs.iter_mut() {
            *c *= &inv;
        }
        rows[next_row].rhs *= &inv;

        for r in 0..rows.len() {
            if r == next_row || rows[r].coeffs[col].is_zero() {
                continue;
            }
            let factor = rows[r].coeffs[col].clone();
            let pivot_row_copy = rows[next_row].clone();
            for (c, pc) in rows[r].coeffs.iter_mut().zip(pivot_row_copy.coeffs.iter()) {
                *c -= &factor * pc;
            }
            rows[r].rhs -= &factor * &pivot_row_copy.rhs;
        }

        pivot_of_col[col] = Some(next_row);
        next_row += 1;
        if next_row == rows.len() {
            break;
        }
    }

    // A zero row with a nonzero right-hand side is a contradiction.
    for row in &rows {
        if row.coeffs.iter().all(|c| c.is_zero()) && !row.rhs.is_zero() {
            debug!("linear elimination derived a contradiction");
            return Err(SolveError::InconsistentSystem);
        }
    }

    // Free columns get placeholder symbols; pivot columns back out of
    // their (already reduced) rows.
    let mut placeholders: Vec<Option<ExprId>> = vec![None; width];
    for col in 0..width {
        if pivot_of_col[col].is_none() {
            placeholders[col] = Some(fresh.fresh(ctx));
        }
    }

    let mut binding = Binding::new();
    for col in 0..width {
        let value = match pivot_of_col[col] {
            None => placeholders[col].expect("free column has a placeholder"),
            Some(row_idx) => {
                let row = &rows[row_idx];
                let mut value = ctx.rational(row.rhs.clone());
                for free_col in 0..width {
                    let c = &row.coeffs[free_col];
                    if free_col == col || c.is_zero() {
                        continue;
                    }
                    let free_sym =
                        placeholders[free_col].expect("nonzero entries past the pivot are free");
                    let term = if c.is_one() {
                        free_sym
                    } else if (-c).is_one() {
                        // folded into the Sub below
                        free_sym
                    } else {
                        let mag = ctx.rational(c.abs());
                        ctx.add(Expr::Mul(mag, free_sym))
                    };
                    // Row reads pivot + c*free = rhs, so the pivot value
                    // subtracts positive coefficients.
                    value = if c.is_negative() {
                        ctx.add(Expr::Add(value, term))
                    } else {
                        ctx.add(Expr::Sub(value, term))
                    };
                }
                sym_engine::evaluate_constants(ctx, value)
            }
        };
        binding.insert(unknowns[col].to_string(), value);
    }

    Ok(SolutionSet::Solutions(vec![binding]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sym_ast::DisplayExpr;

    fn rat(n: i64, d: i64) -> BigRational {
        BigRational::new(n.into(), d.into())
    }

    fn build_form(ctx: &mut Context, expr: ExprId, unknowns: &[&str]) -> LinearForm {
        let folded = sym_engine::evaluate_constants(ctx, expr);
        linear_form(ctx, folded, unknowns).expect("linear")
    }

    #[test]
    fn extracts_two_variable_form() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let y = ctx.var("y");
        let three = ctx.num(3);
        let four = ctx.num(4);
        let hundred = ctx.num(100);
        let t1 = ctx.add(Expr::Mul(three, x));
        let t2 = ctx.add(Expr::Mul(four, y));
        let sum = ctx.add(Expr::Add(t1, t2));
        let expr = ctx.add(Expr::Sub(sum, hundred));

        let form = build_form(&mut ctx, expr, &["x", "y"]);
        assert_eq!(form.coeffs[0], rat(3, 1));
        assert_eq!(form.coeffs[1], rat(4, 1));
        assert_eq!(form.constant, rat(-100, 1));
    }

    #[test]
    fn declines_unknown_products() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let y = ctx.var("y");
        let prod = ctx.add(Expr::Mul(x, y));
        assert!(linear_form(&ctx, prod, &["x", "y"]).is_none());
    }

    #[test]
    fn declines_symbolic_coefficients() {
        let mut ctx = Context::new();
        let a = ctx.var("a");
        let x = ctx.var("x");
        let prod = ctx.add(Expr::Mul(a, x));
        assert!(linear_form(&ctx, prod, &["x"]).is_none());
    }

    #[test]
    fn unique_solution_is_exact() {
        // 3x + 4y = 100, x - y = 20 -> x = 180/7, y = 40/7
        let mut ctx = Context::new();
        let mut fresh = FreshSymbols::new();
        let forms = vec![
            LinearForm { coeffs: vec![rat(3, 1), rat(4, 1)], constant: rat(-100, 1) },
            LinearForm { coeffs: vec![rat(1, 1), rat(-1, 1)], constant: rat(-20, 1) },
        ];
        let set = solve_linear_system(&mut ctx, &["x", "y"], &forms, &mut fresh).unwrap();
        let SolutionSet::Solutions(bindings) = set else {
            panic!("expected solutions");
        };
        assert_eq!(bindings.len(), 1);
        let b = &bindings[0];
        assert_eq!(ctx.as_number(b["x"]), Some(rat(180, 7)));
        assert_eq!(ctx.as_number(b["y"]), Some(rat(40, 7)));
    }

    #[test]
    fn contradiction_is_reported() {
        // x + y = 1, x + y = 2
        let mut ctx = Context::new();
        let mut fresh = FreshSymbols::new();
        let forms = vec![
            LinearForm { coeffs: vec![rat(1, 1), rat(1, 1)], constant: rat(-1, 1) },
            LinearForm { coeffs: vec![rat(1, 1), rat(1, 1)], constant: rat(-2, 1) },
        ];
        let err = solve_linear_system(&mut ctx, &["x", "y"], &forms, &mut fresh).unwrap_err();
        assert_eq!(err, SolveError::InconsistentSystem);
    }

    #[test]
    fn underdetermined_system_gets_placeholders() {
        // x + y = 10 alone: y is free.
        let mut ctx = Context::new();
        let mut fresh = FreshSymbols::new();
        let forms = vec![LinearForm {
            coeffs: vec![rat(1, 1), rat(1, 1)],
            constant: rat(-10, 1),
        }];
        let set = solve_linear_system(&mut ctx, &["x", "y"], &forms, &mut fresh).unwrap();
        let SolutionSet::Solutions(bindings) = set else {
            panic!("expected solutions");
        };
        let b = &bindings[0];
        assert_eq!(
            format!("{}", DisplayExpr { context: &ctx, id: b["x"] }),
            "10 - _0"
        );
        assert_eq!(
            format!("{}", DisplayExpr { context: &ctx, id: b["y"] }),
            "_0"
        );
    }
}
