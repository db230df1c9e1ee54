//! Full expansion: distribution rules applied to fixpoint.
//!
//! `multiply_out` repeatedly rewrites products of sums into sums of
//! products, pushes negation and division through sums, and expands
//! integer powers of sums through the exact multinomial path. Expansion
//! terminates when no distribution rule matches; a term budget guards the
//! power path.

use crate::multinomial::{expand_power, ExpandBudget};
use crate::nary::{rebuild_sum, AddView, Sign};
use num_traits::{Signed, ToPrimitive};
use sym_ast::{Context, Expr, ExprId};
use tracing::trace;

/// Fixpoint passes before giving up. Distribution strictly reduces the
/// number of sum-under-product positions, so this is a safety net for
/// budget-declined powers, not an expected exit.
const MAX_PASSES: usize = 64;

pub fn multiply_out(ctx: &mut Context, id: ExprId) -> ExprId {
    let budget = ExpandBudget::default();
    let mut current = id;
    for pass in 0..MAX_PASSES {
        let next = expand_pass(ctx, current, &budget);
        if next == current {
            return current;
        }
        trace!(pass, "expansion pass rewrote expression");
        current = next;
    }
    current
}

fn expand_pass(ctx: &mut Context, id: ExprId, budget: &ExpandBudget) -> ExprId {
    let expr = ctx.get(id).clone();
    match expr {
        Expr::Number(_) | Expr::Constant(_) | Expr::Variable(_) => id,
        Expr::Add(l, r) => {
            let nl = expand_pass(ctx, l, budget);
            let nr = expand_pass(ctx, r, budget);
            ctx.add(Expr::Add(nl, nr))
        }
        Expr::Sub(l, r) => {
            let nl = expand_pass(ctx, l, budget);
            let nr = expand_pass(ctx, r, budget);
            ctx.add(Expr::Sub(nl, nr))
        }
        Expr::Neg(inner) => {
            let ni = expand_pass(ctx, inner, budget);
            // -(a + b) -> -a - b
            let view = AddView::from_expr(ctx, ni);
            if view.terms.len() > 1 {
                let negated: Vec<(ExprId, Sign)> =
                    view.terms.iter().map(|(t, s)| (*t, s.negate())).collect();
                rebuild_sum(ctx, &negated)
            } else {
                ctx.add(Expr::Neg(ni))
            }
        }
        Expr::Mul(l, r) => {
            let nl = expand_pass(ctx, l, budget);
            let nr = expand_pass(ctx, r, budget);
            distribute_mul(ctx, nl, nr)
        }
        Expr::Div(l, r) => {
            let nl = expand_pass(ctx, l, budget);
            let nr = expand_pass(ctx, r, budget);
            // (a + b) / d -> a/d + b/d
            let view = AddView::from_expr(ctx, nl);
            if view.terms.len() > 1 {
                let split: Vec<(ExprId, Sign)> = view
                    .terms
                    .iter()
                    .map(|(t, s)| (ctx.add(Expr::Div(*t, nr)), *s))
                    .collect();
                rebuild_sum(ctx, &split)
            } else {
                ctx.add(Expr::Div(nl, nr))
            }
        }
        Expr::Pow(base, exp) => {
            let nb = expand_pass(ctx, base, budget);
            let ne = expand_pass(ctx, exp, budget);
            expand_pow(ctx, nb, ne, budget)
        }
        Expr::Function(name, args) => {
            let new_args: Vec<ExprId> =
                args.iter().map(|a| expand_pass(ctx, *a, budget)).collect();
            ctx.add(Expr::Function(name, new_args))
        }
        Expr::Matrix { rows, cols, data } => {
            let new_data: Vec<ExprId> =
                data.iter().map(|a| expand_pass(ctx, *a, budget)).collect();
            ctx.add(Expr::Matrix { rows, cols, data: new_data })
        }
    }
}

/// Distribute a binary product over additive operands on either side.
fn distribute_mul(ctx: &mut Context, l: ExprId, r: ExprId) -> ExprId {
    let lv = AddView::from_expr(ctx, l);
    let rv = AddView::from_expr(ctx, r);
    if lv.terms.len() == 1 && rv.terms.len() == 1 && !lv.is_chain() && !rv.is_chain() {
        return ctx.add(Expr::Mul(l, r));
    }
    let mut products: Vec<(ExprId, Sign)> = Vec::with_capacity(lv.terms.len() * rv.terms.len());
    for (lt, ls) in &lv.terms {
        for (rt, rs) in &rv.terms {
            let p = ctx.add(Expr::Mul(*lt, *rt));
            let sign = if ls.is_negative() == rs.is_negative() {
                Sign::Pos
            } else {
                Sign::Neg
            };
            products.push((p, sign));
        }
    }
    rebuild_sum(ctx, &products)
}

fn expand_pow(ctx: &mut Context, base: ExprId, exp: ExprId, budget: &ExpandBudget) -> ExprId {
    let n = match ctx.get(exp) {
        Expr::Number(n) if n.is_integer() && n.is_positive() => n.to_integer().to_u32(),
        _ => None,
    };
    let Some(n) = n else {
        return ctx.add(Expr::Pow(base, exp));
    };

    // (b^m)^n -> b^(m*n) so repeated powers keep collapsing while we expand.
    if let Expr::Pow(inner_base, inner_exp) = ctx.get(base) {
        let (inner_base, inner_exp) = (*inner_base, *inner_exp);
        let folded = match (ctx.get(inner_exp), ctx.get(exp)) {
            (Expr::Number(m), Expr::Number(k)) if m.is_integer() => Some(m * k),
            _ => None,
        };
        if let Some(prod) = folded {
            let new_exp = ctx.rational(prod);
            return expand_pow(ctx, inner_base, new_exp, budget);
        }
    }

    // (a * b)^n -> a^n * b^n keeps products expandable underneath.
    if let Expr::Mul(a, b) = ctx.get(base) {
        let (a, b) = (*a, *b);
        let pa = ctx.add(Expr::Pow(a, exp));
        let pb = ctx.add(Expr::Pow(b, exp));
        return ctx.add(Expr::Mul(pa, pb));
    }

    let view = AddView::from_expr(ctx, base);
    if view.terms.len() < 2 {
        return ctx.add(Expr::Pow(base, exp));
    }
    match expand_power(ctx, &view.terms, n, budget) {
        Some(expanded) => expanded,
        None => ctx.add(Expr::Pow(base, exp)),
    }
}
