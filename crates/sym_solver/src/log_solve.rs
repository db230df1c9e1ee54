//! Log-elimination strategy.
//!
//! Applies when every occurrence of the unknown sits inside `ln`/`log`
//! arguments. Same-base log terms combine through the product law, the
//! single remaining log is isolated and both sides exponentiate, and the
//! resulting algebraic equation recurses into the ordinary strategies.
//! Roots that land outside a log's domain are dropped before
//! verification ever sees them.

use crate::error::SolveError;
use crate::solution::SolutionSet;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive};
use sym_ast::traversal::{contains_var, substitute_symbol};
use sym_ast::{Constant, Context, Equation, Expr, ExprId};
use sym_engine::nary::{rebuild_sum, AddView, MulView, Sign};
use tracing::debug;

/// Base of a logarithmic term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogBase {
    Natural,
    Explicit(ExprId),
}

/// One additive term `sign * count * log(base, arg)` with the unknown in
/// `arg`.
#[derive(Debug, Clone)]
struct LogTerm {
    base: LogBase,
    arg: ExprId,
    /// Signed integer multiplicity: `2*ln(u)` contributes 2.
    exponent: i64,
}

/// True when every occurrence of `var` is inside a log argument.
fn occurrences_confined_to_logs(ctx: &Context, var: &str, expr: ExprId) -> bool {
    if !contains_var(ctx, expr, var) {
        return true;
    }
    match ctx.get(expr) {
        Expr::Variable(_) => false,
        Expr::Function(name, args) => match (name.as_str(), args.len()) {
            ("ln", 1) => true,
            ("log", 2) => !contains_var(ctx, args[0], var),
            _ => false,
        },
        Expr::Add(l, r) | Expr::Sub(l, r) | Expr::Mul(l, r) | Expr::Div(l, r)
        | Expr::Pow(l, r) => {
            occurrences_confined_to_logs(ctx, var, *l)
                && occurrences_confined_to_logs(ctx, var, *r)
        }
        Expr::Neg(inner) => occurrences_confined_to_logs(ctx, var, *inner),
        Expr::Matrix { .. } => false,
        Expr::Number(_) | Expr::Constant(_) => true,
    }
}

/// Parse one additive term as a log term in `var`, or recognize it as
/// var-free rest.
fn parse_log_term(ctx: &Context, var: &str, term: ExprId) -> Option<LogTerm> {
    // Peel an integer coefficient: 2 * ln(u).
    let view = MulView::from_expr(ctx, term);
    let mut count = BigRational::from_integer(1.into());
    let mut log_part: Option<ExprId> = None;
    for f in &view.factors {
        match ctx.get(*f) {
            Expr::Number(n) => count *= n,
            Expr::Function(_, _) if log_part.is_none() => log_part = Some(*f),
            _ => return None,
        }
    }
    if view.negated {
        count = -count;
    }
    let log_id = log_part?;
    if !count.is_integer() {
        return None;
    }
    let exponent = count.to_integer().to_i64()?;

    if let Expr::Function(name, args) = ctx.get(log_id) {
        match (name.as_str(), args.len()) {
            ("ln", 1) if contains_var(ctx, args[0], var) => Some(LogTerm {
                base: LogBase::Natural,
                arg: args[0],
                exponent,
            }),
            ("log", 2)
                if contains_var(ctx, args[1], var) && !contains_var(ctx, args[0], var) =>
            {
                Some(LogTerm {
                    base: LogBase::Explicit(args[0]),
                    arg: args[1],
                    exponent,
                })
            }
            _ => None,
        }
    } else {
        None
    }
}

/// Try to eliminate logs from `diff = 0`. `Ok(None)` means the strategy
/// does not apply; the caller moves on.
pub fn try_log_elimination(
    solver: &mut crate::solve::Solver,
    var: &str,
    diff: ExprId,
) -> Result<Option<SolutionSet>, SolveError> {
    {
        let ctx = &solver.simplifier.context;
        if !contains_var(ctx, diff, var) || !occurrences_confined_to_logs(ctx, var, diff) {
            return Ok(None);
        }
    }

    let view = AddView::from_expr(&solver.simplifier.context, diff);
    let mut log_terms: Vec<LogTerm> = Vec::new();
    let mut rest: Vec<(ExprId, Sign)> = Vec::new();
    for (term, sign) in &view.terms {
        let ctx = &solver.simplifier.context;
        if !contains_var(ctx, *term, var) {
            rest.push((*term, *sign));
            continue;
        }
        let Some(mut lt) = parse_log_term(ctx, var, *term) else {
            // A var-containing term that is not a clean log term.
            return Ok(None);
        };
        if sign.is_negative() {
            lt.exponent = -lt.exponent;
        }
        log_terms.push(lt);
    }
    if log_terms.is_empty() {
        return Ok(None);
    }
    let base = log_terms[0].base;
    if log_terms.iter().any(|t| t.base != base) {
        return Ok(None);
    }

    let ctx = &mut solver.simplifier.context;

    // Combine: sum of k_i * log(b, u_i) = log(b, prod u_i^(k_i)).
    let mut merged_arg: Option<ExprId> = None;
    for t in &log_terms {
        let factor = if t.exponent == 1 {
            t.arg
        } else {
            let k = ctx.num(t.exponent);
            ctx.add(Expr::Pow(t.arg, k))
        };
        merged_arg = Some(match merged_arg {
            None => factor,
            Some(acc) => ctx.add(Expr::Mul(acc, factor)),
        });
    }
    let merged_arg = merged_arg.expect("at least one log term");

    // log(b, merged) + R = 0  ->  merged = b^(-R)
    let neg_rest: Vec<(ExprId, Sign)> = rest.iter().map(|(t, s)| (*t, s.negate())).collect();
    let exponent = rebuild_sum(ctx, &neg_rest);
    let rhs = match base {
        LogBase::Natural => {
            let e = ctx.constant(Constant::E);
            ctx.add(Expr::Pow(e, exponent))
        }
        LogBase::Explicit(b) => ctx.add(Expr::Pow(b, exponent)),
    };

    debug!(var, "log elimination produced an algebraic equation");
    let equation = Equation::new(merged_arg, rhs);
    let solved = solver.solve_single_equation(var, &equation)?;

    // Domain guard: drop roots that push any original log argument to a
    // non-positive number.
    let filtered = match solved {
        SolutionSet::Solutions(bindings) => {
            let kept: Vec<_> = bindings
                .into_iter()
                .filter(|binding| {
                    let Some(&root) = binding.get(var) else { return true };
                    log_terms.iter().all(|t| {
                        let arg_at_root = {
                            let ctx = &mut solver.simplifier.context;
                            let substituted = substitute_symbol(ctx, t.arg, var, root);
                            sym_engine::evaluate_constants(ctx, substituted)
                        };
                        match solver.simplifier.context.get(arg_at_root) {
                            Expr::Number(n) => n.is_positive(),
                            _ => true,
                        }
                    })
                })
                .collect();
            if kept.is_empty() {
                SolutionSet::Empty
            } else {
                SolutionSet::Solutions(kept)
            }
        }
        other => other,
    };
    Ok(Some(filtered))
}
