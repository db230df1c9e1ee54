//! Matrix arithmetic over expression cells.
//!
//! Vectors are 1xN or Nx1 matrices; cells are arbitrary expressions, so
//! matrix arithmetic composes with the rest of the rewrite machinery.
//! Dimension mismatches are programmer errors and panic loudly, distinct
//! from the recoverable solver outcomes.

use sym_ast::{Context, Expr, ExprId};

#[derive(Debug, Clone)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<ExprId>,
}

impl Matrix {
    pub fn from_expr(ctx: &Context, id: ExprId) -> Option<Self> {
        if let Expr::Matrix { rows, cols, data } = ctx.get(id) {
            Some(Matrix { rows: *rows, cols: *cols, data: data.clone() })
        } else {
            None
        }
    }

    pub fn to_expr(&self, ctx: &mut Context) -> ExprId {
        ctx.matrix(self.rows, self.cols, self.data.clone())
            .expect("matrix helper produced mismatched dimensions")
    }

    pub fn can_add(&self, other: &Self) -> bool {
        self.rows == other.rows && self.cols == other.cols
    }

    pub fn can_multiply(&self, other: &Self) -> bool {
        self.cols == other.rows
    }

    pub fn add(&self, other: &Self, ctx: &mut Context) -> Self {
        assert!(
            self.can_add(other),
            "matrix addition dimension mismatch: {}x{} vs {}x{}",
            self.rows, self.cols, other.rows, other.cols
        );
        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(&a, &b)| ctx.add(Expr::Add(a, b)))
            .collect();
        Matrix { rows: self.rows, cols: self.cols, data }
    }

    pub fn sub(&self, other: &Self, ctx: &mut Context) -> Self {
        assert!(
            self.can_add(other),
            "matrix subtraction dimension mismatch: {}x{} vs {}x{}",
            self.rows, self.cols, other.rows, other.cols
        );
        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(&a, &b)| ctx.add(Expr::Sub(a, b)))
            .collect();
        Matrix { rows: self.rows, cols: self.cols, data }
    }

    pub fn scalar_mul(&self, scalar: ExprId, ctx: &mut Context) -> Self {
        let data = self
            .data
            .iter()
            .map(|&cell| ctx.add(Expr::Mul(scalar, cell)))
            .collect();
        Matrix { rows: self.rows, cols: self.cols, data }
    }

    pub fn neg(&self, ctx: &mut Context) -> Self {
        let data = self.data.iter().map(|&cell| ctx.add(Expr::Neg(cell))).collect();
        Matrix { rows: self.rows, cols: self.cols, data }
    }

    /// `self (m×n) * other (n×p) -> m×p`. The inner-product of two vectors
    /// comes out as a 1×1 matrix; callers may unwrap it to a scalar.
    pub fn multiply(&self, other: &Self, ctx: &mut Context) -> Self {
        assert!(
            self.can_multiply(other),
            "matrix product dimension mismatch: {}x{} * {}x{}",
            self.rows, self.cols, other.rows, other.cols
        );
        let (m, n, p) = (self.rows, self.cols, other.cols);
        let mut data = Vec::with_capacity(m * p);
        for i in 0..m {
            for j in 0..p {
                let mut sum: Option<ExprId> = None;
                for k in 0..n {
                    let a = self.data[i * n + k];
                    let b = other.data[k * p + j];
                    let prod = ctx.add(Expr::Mul(a, b));
                    sum = Some(match sum {
                        None => prod,
                        Some(acc) => ctx.add(Expr::Add(acc, prod)),
                    });
                }
                data.push(sum.unwrap_or_else(|| ctx.num(0)));
            }
        }
        Matrix { rows: m, cols: p, data }
    }

    pub fn transpose(&self) -> Self {
        let mut data = Vec::with_capacity(self.data.len());
        for j in 0..self.cols {
            for i in 0..self.rows {
                data.push(self.data[i * self.cols + j]);
            }
        }
        Matrix { rows: self.cols, cols: self.rows, data }
    }
}
