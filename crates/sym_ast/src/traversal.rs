//! Read-only walks and rebuilding substitutions over interned trees.

use crate::context::Context;
use crate::expression::{Expr, ExprId};
use std::collections::BTreeSet;

pub fn contains_var(ctx: &Context, expr: ExprId, var: &str) -> bool {
    match ctx.get(expr) {
        Expr::Variable(v) => v == var,
        Expr::Number(_) | Expr::Constant(_) => false,
        Expr::Add(l, r) | Expr::Sub(l, r) | Expr::Mul(l, r) | Expr::Div(l, r) | Expr::Pow(l, r) => {
            contains_var(ctx, *l, var) || contains_var(ctx, *r, var)
        }
        Expr::Neg(e) => contains_var(ctx, *e, var),
        Expr::Function(_, args) => args.iter().any(|a| contains_var(ctx, *a, var)),
        Expr::Matrix { data, .. } => data.iter().any(|a| contains_var(ctx, *a, var)),
    }
}

/// Number of occurrences of `var`, counting shared subterms per occurrence.
pub fn count_var_occurrences(ctx: &Context, expr: ExprId, var: &str) -> usize {
    match ctx.get(expr) {
        Expr::Variable(v) => usize::from(v == var),
        Expr::Number(_) | Expr::Constant(_) => 0,
        Expr::Add(l, r) | Expr::Sub(l, r) | Expr::Mul(l, r) | Expr::Div(l, r) | Expr::Pow(l, r) => {
            count_var_occurrences(ctx, *l, var) + count_var_occurrences(ctx, *r, var)
        }
        Expr::Neg(e) => count_var_occurrences(ctx, *e, var),
        Expr::Function(_, args) => args
            .iter()
            .map(|a| count_var_occurrences(ctx, *a, var))
            .sum(),
        Expr::Matrix { data, .. } => data
            .iter()
            .map(|a| count_var_occurrences(ctx, *a, var))
            .sum(),
    }
}

/// All variable names occurring in `expr`, in name order.
pub fn collect_variables(ctx: &Context, expr: ExprId) -> BTreeSet<String> {
    let mut vars = BTreeSet::new();
    collect_variables_into(ctx, expr, &mut vars);
    vars
}

fn collect_variables_into(ctx: &Context, expr: ExprId, out: &mut BTreeSet<String>) {
    match ctx.get(expr) {
        Expr::Variable(v) => {
            out.insert(v.clone());
        }
        Expr::Number(_) | Expr::Constant(_) => {}
        Expr::Add(l, r) | Expr::Sub(l, r) | Expr::Mul(l, r) | Expr::Div(l, r) | Expr::Pow(l, r) => {
            collect_variables_into(ctx, *l, out);
            collect_variables_into(ctx, *r, out);
        }
        Expr::Neg(e) => collect_variables_into(ctx, *e, out),
        Expr::Function(_, args) => {
            for a in args {
                collect_variables_into(ctx, *a, out);
            }
        }
        Expr::Matrix { data, .. } => {
            for a in data {
                collect_variables_into(ctx, *a, out);
            }
        }
    }
}

/// Replace every occurrence of the variable `var` with `replacement`,
/// building new nodes along changed paths only.
pub fn substitute_symbol(
    ctx: &mut Context,
    root: ExprId,
    var: &str,
    replacement: ExprId,
) -> ExprId {
    let target = ctx.var(var);
    substitute_expr(ctx, root, target, replacement)
}

/// Replace every occurrence of the subterm `target` with `replacement`.
pub fn substitute_expr(
    ctx: &mut Context,
    root: ExprId,
    target: ExprId,
    replacement: ExprId,
) -> ExprId {
    if root == target {
        return replacement;
    }
    let expr = ctx.get(root).clone();
    match expr {
        Expr::Number(_) | Expr::Constant(_) | Expr::Variable(_) => root,
        Expr::Add(l, r) => {
            let (nl, nr) = (
                substitute_expr(ctx, l, target, replacement),
                substitute_expr(ctx, r, target, replacement),
            );
            if nl != l || nr != r {
                ctx.add(Expr::Add(nl, nr))
            } else {
                root
            }
        }
        Expr::Sub(l, r) => {
            let (nl, nr) = (
                substitute_expr(ctx, l, target, replacement),
                substitute_expr(ctx, r, target, replacement),
            );
            if nl != l || nr != r {
                ctx.add(Expr::Sub(nl, nr))
            } else {
                root
            }
        }
        Expr::Mul(l, r) => {
            let (nl, nr) = (
                substitute_expr(ctx, l, target, replacement),
                substitute_expr(ctx, r, target, replacement),
            );
            if nl != l || nr != r {
                ctx.add(Expr::Mul(nl, nr))
            } else {
                root
            }
        }
        Expr::Div(l, r) => {
            let (nl, nr) = (
                substitute_expr(ctx, l, target, replacement),
                substitute_expr(ctx, r, target, replacement),
            );
            if nl != l || nr != r {
                ctx.add(Expr::Div(nl, nr))
            } else {
                root
            }
        }
        Expr::Pow(b, e) => {
            let (nb, ne) = (
                substitute_expr(ctx, b, target, replacement),
                substitute_expr(ctx, e, target, replacement),
            );
            if nb != b || ne != e {
                ctx.add(Expr::Pow(nb, ne))
            } else {
                root
            }
        }
        Expr::Neg(e) => {
            let ne = substitute_expr(ctx, e, target, replacement);
            if ne != e {
                ctx.add(Expr::Neg(ne))
            } else {
                root
            }
        }
        Expr::Function(name, args) => {
            let mut changed = false;
            let mut new_args = Vec::with_capacity(args.len());
            for a in args {
                let na = substitute_expr(ctx, a, target, replacement);
                changed |= na != a;
                new_args.push(na);
            }
            if changed {
                ctx.add(Expr::Function(name, new_args))
            } else {
                root
            }
        }
        Expr::Matrix { rows, cols, data } => {
            let mut changed = false;
            let mut new_data = Vec::with_capacity(data.len());
            for a in data {
                let na = substitute_expr(ctx, a, target, replacement);
                changed |= na != a;
                new_data.push(na);
            }
            if changed {
                ctx.add(Expr::Matrix { rows, cols, data: new_data })
            } else {
                root
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DisplayExpr;

    #[test]
    fn counts_occurrences_across_both_sides() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let two = ctx.num(2);
        let pow = ctx.add(Expr::Pow(x, two));
        let sum = ctx.add(Expr::Add(pow, x));
        assert_eq!(count_var_occurrences(&ctx, sum, "x"), 2);
        assert!(contains_var(&ctx, sum, "x"));
        assert!(!contains_var(&ctx, sum, "y"));
    }

    #[test]
    fn substitution_rebuilds_changed_paths_only() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let y = ctx.var("y");
        let sum = ctx.add(Expr::Add(x, y));
        let three = ctx.num(3);
        let replaced = substitute_symbol(&mut ctx, sum, "x", three);
        assert_eq!(
            format!("{}", DisplayExpr { context: &ctx, id: replaced }),
            "3 + y"
        );
        // Untouched tree substitutes to itself.
        let same = substitute_symbol(&mut ctx, sum, "z", three);
        assert_eq!(same, sum);
    }

    #[test]
    fn collects_variables_sorted() {
        let mut ctx = Context::new();
        let y = ctx.var("y");
        let x = ctx.var("x");
        let prod = ctx.add(Expr::Mul(y, x));
        let vars: Vec<String> = collect_variables(&ctx, prod).into_iter().collect();
        assert_eq!(vars, vec!["x".to_string(), "y".to_string()]);
    }
}
