//! Rules lowering arithmetic on matrix literals to cell arithmetic.

use crate::define_rule;
use crate::matrix::Matrix;
use crate::rule::Rewrite;
use sym_ast::Expr;

define_rule!(MatrixAddRule, "Matrix Addition", Some(vec!["Add", "Sub"]), |ctx, expr| {
    let (l, r, subtract) = match ctx.get(expr) {
        Expr::Add(l, r) => (*l, *r, false),
        Expr::Sub(l, r) => (*l, *r, true),
        _ => return None,
    };
    let m1 = Matrix::from_expr(ctx, l)?;
    let m2 = Matrix::from_expr(ctx, r)?;
    let result = if subtract {
        m1.sub(&m2, ctx)
    } else {
        m1.add(&m2, ctx)
    };
    let new_expr = result.to_expr(ctx);
    Some(Rewrite::new(new_expr, "element-wise matrix addition"))
});

define_rule!(MatrixScalarMulRule, "Scalar Times Matrix", Some(vec!["Mul"]), |ctx, expr| {
    if let Expr::Mul(l, r) = ctx.get(expr) {
        let (l, r) = (*l, *r);
        let l_is_matrix = matches!(ctx.get(l), Expr::Matrix { .. });
        let r_is_matrix = matches!(ctx.get(r), Expr::Matrix { .. });
        let (scalar, matrix_id) = match (l_is_matrix, r_is_matrix) {
            (false, true) => (l, r),
            (true, false) => (r, l),
            _ => return None,
        };
        let m = Matrix::from_expr(ctx, matrix_id)?;
        let result = m.scalar_mul(scalar, ctx);
        let new_expr = result.to_expr(ctx);
        return Some(Rewrite::new(new_expr, "scalar distributes over cells"));
    }
    None
});

define_rule!(
    /// Matrix product, including the vector inner product: a 1×1 result
    /// unwraps to its single cell.
    MatrixMulRule,
    "Matrix Product",
    Some(vec!["Mul"]),
    |ctx, expr| {
        if let Expr::Mul(l, r) = ctx.get(expr) {
            let (l, r) = (*l, *r);
            let m1 = Matrix::from_expr(ctx, l)?;
            let m2 = Matrix::from_expr(ctx, r)?;
            let result = m1.multiply(&m2, ctx);
            let new_expr = if result.rows == 1 && result.cols == 1 {
                result.data[0]
            } else {
                result.to_expr(ctx)
            };
            return Some(Rewrite::new(new_expr, "row-by-column product"));
        }
        None
    }
);

define_rule!(MatrixNegRule, "Matrix Negation", Some(vec!["Neg"]), |ctx, expr| {
    if let Expr::Neg(inner) = ctx.get(expr) {
        let inner = *inner;
        let m = Matrix::from_expr(ctx, inner)?;
        let result = m.neg(ctx);
        let new_expr = result.to_expr(ctx);
        return Some(Rewrite::new(new_expr, "negation distributes over cells"));
    }
    None
});

pub fn register(simplifier: &mut crate::simplifier::Simplifier) {
    simplifier.add_rule(Box::new(MatrixAddRule));
    simplifier.add_rule(Box::new(MatrixScalarMulRule));
    simplifier.add_rule(Box::new(MatrixMulRule));
    simplifier.add_rule(Box::new(MatrixNegRule));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Rule;
    use sym_ast::{Context, DisplayExpr};

    #[test]
    fn matrix_sum_lowers_to_cells() {
        let mut ctx = Context::new();
        let d1 = vec![ctx.num(1), ctx.num(2)];
        let d2 = vec![ctx.num(3), ctx.num(4)];
        let m1 = ctx.matrix(1, 2, d1).unwrap();
        let m2 = ctx.matrix(1, 2, d2).unwrap();
        let sum = ctx.add(Expr::Add(m1, m2));
        let rewrite = MatrixAddRule.apply(&mut ctx, sum).unwrap();
        assert_eq!(
            format!("{}", DisplayExpr { context: &ctx, id: rewrite.new_expr }),
            "[[1 + 3, 2 + 4]]"
        );
    }

    #[test]
    fn inner_product_unwraps_to_scalar() {
        let mut ctx = Context::new();
        let d1 = vec![ctx.num(1), ctx.num(2)];
        let d2 = vec![ctx.num(3), ctx.num(4)];
        let row = ctx.matrix(1, 2, d1).unwrap();
        let col = ctx.matrix(2, 1, d2).unwrap();
        let prod = ctx.add(Expr::Mul(row, col));
        let rewrite = MatrixMulRule.apply(&mut ctx, prod).unwrap();
        assert_eq!(
            format!("{}", DisplayExpr { context: &ctx, id: rewrite.new_expr }),
            "1 * 3 + 2 * 4"
        );
    }
}
