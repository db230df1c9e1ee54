//! Canonical structural ordering over interned expressions.
//!
//! Numbers sort before named constants, constants before variables, and
//! atoms before compounds, so canonical rebuilds place numeric factors
//! first (`12 * a`, `2 + x`). The ordering is total and deterministic but
//! carries no algebraic meaning.

use crate::context::Context;
use crate::expression::{Constant, Expr, ExprId};
use std::cmp::Ordering;

fn rank(expr: &Expr) -> u8 {
    match expr {
        Expr::Number(_) => 0,
        Expr::Constant(_) => 1,
        Expr::Variable(_) => 2,
        Expr::Function(_, _) => 3,
        Expr::Pow(_, _) => 4,
        Expr::Neg(_) => 5,
        Expr::Mul(_, _) => 6,
        Expr::Div(_, _) => 7,
        Expr::Add(_, _) => 8,
        Expr::Sub(_, _) => 9,
        Expr::Matrix { .. } => 10,
    }
}

fn constant_rank(c: Constant) -> u8 {
    match c {
        Constant::Pi => 0,
        Constant::E => 1,
        Constant::Infinity => 2,
        Constant::Undefined => 3,
    }
}

pub fn compare_expr(ctx: &Context, a: ExprId, b: ExprId) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    let ea = ctx.get(a);
    let eb = ctx.get(b);
    match rank(ea).cmp(&rank(eb)) {
        Ordering::Equal => {}
        other => return other,
    }
    match (ea, eb) {
        (Expr::Number(x), Expr::Number(y)) => x.cmp(y),
        (Expr::Constant(x), Expr::Constant(y)) => constant_rank(*x).cmp(&constant_rank(*y)),
        (Expr::Variable(x), Expr::Variable(y)) => x.cmp(y),
        (Expr::Function(nx, ax), Expr::Function(ny, ay)) => nx
            .cmp(ny)
            .then_with(|| compare_args(ctx, ax, ay)),
        (Expr::Neg(x), Expr::Neg(y)) => compare_expr(ctx, *x, *y),
        (Expr::Add(lx, rx), Expr::Add(ly, ry))
        | (Expr::Sub(lx, rx), Expr::Sub(ly, ry))
        | (Expr::Mul(lx, rx), Expr::Mul(ly, ry))
        | (Expr::Div(lx, rx), Expr::Div(ly, ry))
        | (Expr::Pow(lx, rx), Expr::Pow(ly, ry)) => {
            compare_expr(ctx, *lx, *ly).then_with(|| compare_expr(ctx, *rx, *ry))
        }
        (
            Expr::Matrix { rows: r1, cols: c1, data: d1 },
            Expr::Matrix { rows: r2, cols: c2, data: d2 },
        ) => r1
            .cmp(r2)
            .then_with(|| c1.cmp(c2))
            .then_with(|| compare_args(ctx, d1, d2)),
        // Ranks matched above, so the variants match too.
        _ => Ordering::Equal,
    }
}

fn compare_args(ctx: &Context, a: &[ExprId], b: &[ExprId]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        match compare_expr(ctx, *x, *y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

/// Sort and deduplicate by canonical order.
pub fn sort_and_dedup_exprs(ctx: &Context, exprs: &mut Vec<ExprId>) {
    exprs.sort_by(|a, b| compare_expr(ctx, *a, *b));
    exprs.dedup();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_sort_before_variables() {
        let mut ctx = Context::new();
        let a = ctx.var("a");
        let twelve = ctx.num(12);
        assert_eq!(compare_expr(&ctx, twelve, a), Ordering::Less);
    }

    #[test]
    fn variables_sort_by_name() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let y = ctx.var("y");
        assert_eq!(compare_expr(&ctx, x, y), Ordering::Less);
        assert_eq!(compare_expr(&ctx, y, x), Ordering::Greater);
    }

    #[test]
    fn sort_and_dedup() {
        let mut ctx = Context::new();
        let one = ctx.num(1);
        let two = ctx.num(2);
        let mut v = vec![two, one, two];
        sort_and_dedup_exprs(&ctx, &mut v);
        assert_eq!(v, vec![one, two]);
    }
}
