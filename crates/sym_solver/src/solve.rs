//! Strategy selection and system reduction.
//!
//! One equation, one unknown: rearrange when the unknown occurs once,
//! else the polynomial path (with exponential-kernel substitution), else
//! log elimination. Systems: the exact linear/matrix fast path when every
//! equation is linear over the unknowns, otherwise pick a solvable
//! (equation, unknown) pair, substitute each solution branch into the
//! rest, recurse, and back-substitute. Candidates are verified against
//! the original equations at the end; refuted branches are dropped.

use crate::error::SolveError;
use crate::fresh::FreshSymbols;
use crate::linear;
use crate::log_solve;
use crate::poly_solve::{self, PolyRoots};
use crate::rearrange;
use crate::solution::{Binding, SolutionSet};
use crate::verify;
use num_traits::{Signed, Zero};
use sym_ast::traversal::{contains_var, count_var_occurrences, substitute_symbol};
use sym_ast::{Constant, Equation, Expr, ExprId};
use sym_engine::poly::{as_polynomial, as_polynomial_in_kernel, PolyKernel};
use sym_engine::{Simplifier, SimplifyOptions};
use tracing::debug;

pub struct Solver {
    pub simplifier: Simplifier,
    fresh: FreshSymbols,
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver {
    pub fn new() -> Self {
        Solver {
            simplifier: Simplifier::with_default_rules(),
            fresh: FreshSymbols::new(),
        }
    }

    pub fn context(&mut self) -> &mut sym_ast::Context {
        &mut self.simplifier.context
    }

    /// The placeholder generator: explicit, monotone, caller-visible.
    pub fn fresh_symbols(&self) -> &FreshSymbols {
        &self.fresh
    }

    /// Syntactic isolation; see [`rearrange::rearrange`].
    pub fn rearrange(
        &mut self,
        var: &str,
        equation: &Equation,
    ) -> Result<Vec<Equation>, SolveError> {
        rearrange::rearrange(&mut self.simplifier.context, var, equation)
    }

    /// Solve `equations` for `unknowns`. Empty result means no solution;
    /// `AllValues` means every assignment satisfies the system.
    pub fn solve(
        &mut self,
        unknowns: &[&str],
        equations: &[Equation],
    ) -> Result<SolutionSet, SolveError> {
        assert!(!unknowns.is_empty(), "solve: no unknowns given");
        assert!(!equations.is_empty(), "solve: no equations given");

        let set = self.solve_system(unknowns, equations)?;
        Ok(match set {
            SolutionSet::Solutions(bindings) => {
                let kept = verify::filter_refuted(&mut self.simplifier, bindings, equations);
                if kept.is_empty() {
                    SolutionSet::Empty
                } else {
                    SolutionSet::Solutions(kept)
                }
            }
            other => other,
        })
    }

    /// Single-equation entry with verification.
    pub fn solve_single(&mut self, var: &str, equation: &Equation) -> Result<SolutionSet, SolveError> {
        self.solve(&[var], std::slice::from_ref(equation))
    }

    fn simplify_side(&mut self, id: ExprId) -> ExprId {
        // A ratio miss must not abort solving; fall back to plain folding.
        match self
            .simplifier
            .simplify_with_options(id, SimplifyOptions::with_ratio(4.0))
        {
            Ok(v) => v,
            Err(_) => self.simplifier.evaluate_constants(id),
        }
    }

    fn solve_system(
        &mut self,
        unknowns: &[&str],
        equations: &[Equation],
    ) -> Result<SolutionSet, SolveError> {
        let mut pending: Vec<Equation> = Vec::with_capacity(equations.len());
        for eq in equations {
            let lhs = self.simplify_side(eq.lhs);
            let rhs = self.simplify_side(eq.rhs);
            if lhs == rhs {
                // Trivially true: drops out of the system.
                continue;
            }
            let raw_diff = self.simplifier.context.add(Expr::Sub(lhs, rhs));
            let diff = self.simplifier.evaluate_constants(raw_diff);
            match self.simplifier.context.get(diff) {
                Expr::Number(n) => {
                    if n.is_zero() {
                        continue;
                    }
                    debug!("trivially false equation makes the system unsatisfiable");
                    return Ok(SolutionSet::Empty);
                }
                Expr::Constant(Constant::Undefined) => return Ok(SolutionSet::Empty),
                _ => {}
            }
            if !unknowns
                .iter()
                .any(|u| contains_var(&self.simplifier.context, diff, u))
            {
                // A residual constraint over foreign symbols; nothing the
                // strategy set can decide.
                return Err(SolveError::UnsolvableStrategy(unknowns.join(", ")));
            }
            pending.push(Equation::new(lhs, rhs));
        }

        if pending.is_empty() {
            return Ok(SolutionSet::AllValues);
        }

        if unknowns.len() == 1 && pending.len() == 1 {
            return self.solve_single_equation(unknowns[0], &pending[0]);
        }

        if let Some(forms) = self.extract_linear_forms(unknowns, &pending) {
            debug!(unknowns = ?unknowns, "taking the linear fast path");
            return match linear::solve_linear_system(
                &mut self.simplifier.context,
                unknowns,
                &forms,
                &mut self.fresh,
            ) {
                Ok(set) => Ok(set),
                Err(SolveError::InconsistentSystem) => Ok(SolutionSet::Empty),
                Err(other) => Err(other),
            };
        }

        self.solve_by_substitution(unknowns, &pending)
    }

    fn extract_linear_forms(
        &mut self,
        unknowns: &[&str],
        equations: &[Equation],
    ) -> Option<Vec<linear::LinearForm>> {
        let mut forms = Vec::with_capacity(equations.len());
        for eq in equations {
            let raw = self.simplifier.context.add(Expr::Sub(eq.lhs, eq.rhs));
            let diff = self.simplifier.evaluate_constants(raw);
            forms.push(linear::linear_form(&self.simplifier.context, diff, unknowns)?);
        }
        Some(forms)
    }

    /// Strategy selection for one equation and one unknown. No final
    /// verification here — recursive callers verify at the top.
    pub(crate) fn solve_single_equation(
        &mut self,
        var: &str,
        equation: &Equation,
    ) -> Result<SolutionSet, SolveError> {
        let lhs = self.simplify_side(equation.lhs);
        let rhs = self.simplify_side(equation.rhs);
        let occurrences = count_var_occurrences(&self.simplifier.context, lhs, var)
            + count_var_occurrences(&self.simplifier.context, rhs, var);

        if occurrences == 0 {
            if lhs == rhs {
                return Ok(SolutionSet::AllValues);
            }
            let raw = self.simplifier.context.add(Expr::Sub(lhs, rhs));
            let diff = self.simplifier.evaluate_constants(raw);
            return match self.simplifier.context.get(diff) {
                Expr::Number(n) if n.is_zero() => Ok(SolutionSet::AllValues),
                Expr::Number(_) => Ok(SolutionSet::Empty),
                _ => Err(SolveError::NoOccurrence(var.to_string())),
            };
        }

        let simplified = Equation::new(lhs, rhs);

        if occurrences == 1 {
            debug!(var, "single occurrence: rearranging");
            let branches =
                rearrange::rearrange(&mut self.simplifier.context, var, &simplified)?;
            let mut roots: Vec<ExprId> = Vec::new();
            for branch in branches {
                let root = self.simplify_side(branch.rhs);
                if matches!(
                    self.simplifier.context.get(root),
                    Expr::Constant(Constant::Undefined)
                ) {
                    continue;
                }
                if !roots.contains(&root) {
                    roots.push(root);
                }
            }
            return Ok(SolutionSet::of_roots(var, roots));
        }

        let raw_diff = self.simplifier.context.add(Expr::Sub(lhs, rhs));
        let diff = self.simplify_side(raw_diff);

        if let Ok(poly) = as_polynomial(&mut self.simplifier.context, var, diff) {
            debug!(var, degree = poly.degree(), "polynomial strategy");
            return self.poly_solution(var, &poly, None);
        }

        if let Some(base) =
            sym_engine::detect_exponential_kernel(&self.simplifier.context, var, diff)
        {
            let kernel = PolyKernel::Exponential { base, var: var.to_string() };
            if let Ok(poly) =
                as_polynomial_in_kernel(&mut self.simplifier.context, &kernel, diff)
            {
                debug!(var, "exponential substitution strategy");
                return self.poly_solution(var, &poly, Some(base));
            }
        }

        if let Some(set) = log_solve::try_log_elimination(self, var, diff)? {
            debug!(var, "log elimination strategy");
            return Ok(set);
        }

        Err(SolveError::UnsolvableStrategy(var.to_string()))
    }

    /// Turn polynomial roots into bindings, back-substituting through the
    /// exponential kernel when one was used.
    fn poly_solution(
        &mut self,
        var: &str,
        poly: &sym_engine::Poly,
        kernel_base: Option<ExprId>,
    ) -> Result<SolutionSet, SolveError> {
        match poly_solve::solve_poly(&mut self.simplifier.context, poly)? {
            PolyRoots::AllValues => Ok(SolutionSet::AllValues),
            PolyRoots::Empty => Ok(SolutionSet::Empty),
            PolyRoots::Roots(roots) => {
                let mut out: Vec<ExprId> = Vec::new();
                for root in roots {
                    let value = match kernel_base {
                        None => self.simplify_side(root),
                        Some(base) => {
                            // t = b^x, so x = log(b, t); only positive t
                            // has a real preimage.
                            if let Some(n) = self.simplifier.context.as_number(root) {
                                if !n.is_positive() {
                                    continue;
                                }
                            }
                            let log = self.simplifier.context.func("log", vec![base, root]);
                            self.simplify_side(log)
                        }
                    };
                    if !out.contains(&value) {
                        out.push(value);
                    }
                }
                Ok(SolutionSet::of_roots(var, out))
            }
        }
    }

    /// Non-linear system path: eliminate one unknown per step.
    fn solve_by_substitution(
        &mut self,
        unknowns: &[&str],
        equations: &[Equation],
    ) -> Result<SolutionSet, SolveError> {
        for (ei, eq) in equations.iter().enumerate() {
            for (ui, &var) in unknowns.iter().enumerate() {
                {
                    let ctx = &self.simplifier.context;
                    if !contains_var(ctx, eq.lhs, var) && !contains_var(ctx, eq.rhs, var) {
                        continue;
                    }
                }
                let bindings = match self.solve_single_equation(var, eq) {
                    Ok(SolutionSet::Solutions(b)) => b,
                    Ok(SolutionSet::Empty) => return Ok(SolutionSet::Empty),
                    Ok(SolutionSet::AllValues) => continue,
                    Err(_) => continue,
                };
                debug!(var, equation = ei, "eliminating unknown by substitution");

                let rest_unknowns: Vec<&str> = unknowns
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != ui)
                    .map(|(_, &u)| u)
                    .collect();
                let rest_equations: Vec<Equation> = equations
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != ei)
                    .map(|(_, &e)| e)
                    .collect();

                let mut combined: Vec<Binding> = Vec::new();
                let mut pair_failed = false;
                for binding in bindings {
                    let Some(&root) = binding.get(var) else { continue };

                    if rest_unknowns.is_empty() {
                        let consistent = rest_equations.iter().all(|r| {
                            verify::binding_satisfies(&mut self.simplifier, &binding, r)
                                != Some(false)
                        });
                        if consistent {
                            combined.push(binding);
                        }
                        continue;
                    }

                    let substituted: Vec<Equation> = rest_equations
                        .iter()
                        .map(|r| {
                            let ctx = &mut self.simplifier.context;
                            let l = substitute_symbol(ctx, r.lhs, var, root);
                            let rr = substitute_symbol(ctx, r.rhs, var, root);
                            Equation::new(l, rr)
                        })
                        .collect();

                    match self.solve_system(&rest_unknowns, &substituted) {
                        Ok(SolutionSet::Empty) => continue,
                        Ok(SolutionSet::AllValues) => {
                            // The rest of the system vanished: remaining
                            // unknowns are free parameters.
                            let mut full = Binding::new();
                            for &ru in &rest_unknowns {
                                let placeholder =
                                    self.fresh.fresh(&mut self.simplifier.context);
                                full.insert(ru.to_string(), placeholder);
                            }
                            let value = self.back_substitute(root, &full);
                            full.insert(var.to_string(), value);
                            combined.push(full);
                        }
                        Ok(SolutionSet::Solutions(sub_bindings)) => {
                            for sub in sub_bindings {
                                let value = self.back_substitute(root, &sub);
                                let mut full = sub;
                                full.insert(var.to_string(), value);
                                combined.push(full);
                            }
                        }
                        Err(_) => {
                            // This pair cannot finish the reduction; try
                            // another rather than report partial results.
                            pair_failed = true;
                            break;
                        }
                    }
                }
                if pair_failed {
                    continue;
                }
                return Ok(if combined.is_empty() {
                    SolutionSet::Empty
                } else {
                    SolutionSet::Solutions(combined)
                });
            }
        }
        Err(SolveError::UnsolvableStrategy(unknowns.join(", ")))
    }

    /// Replace solved unknowns inside `root` and simplify.
    fn back_substitute(&mut self, root: ExprId, solved: &Binding) -> ExprId {
        let mut value = root;
        for (name, &v) in solved {
            value = substitute_symbol(&mut self.simplifier.context, value, name, v);
        }
        self.simplify_side(value)
    }
}
