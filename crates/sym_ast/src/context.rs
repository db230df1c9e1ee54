use crate::expression::{Constant, Expr, ExprId};
use num_rational::BigRational;
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Structural errors raised by checked constructors.
///
/// These indicate programmer errors (malformed input), not recoverable
/// solver outcomes; callers are expected to treat them as bugs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AstError {
    #[error("matrix dimension mismatch: {rows}x{cols} needs {expected} cells, got {got}")]
    MatrixShape {
        rows: usize,
        cols: usize,
        expected: usize,
        got: usize,
    },
}

/// Arena of interned expression nodes.
///
/// `add` hash-conses: structurally equal nodes share one `ExprId`, so id
/// equality is structural equality and rewrites can never corrupt a shared
/// subterm — they only ever allocate new nodes.
#[derive(Debug, Clone, Default)]
pub struct Context {
    nodes: Vec<Expr>,
    memo: FxHashMap<Expr, ExprId>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a node, returning the id of the canonical copy.
    pub fn add(&mut self, expr: Expr) -> ExprId {
        if let Some(&id) = self.memo.get(&expr) {
            return id;
        }
        let id = ExprId::new(self.nodes.len());
        self.nodes.push(expr.clone());
        self.memo.insert(expr, id);
        id
    }

    pub fn get(&self, id: ExprId) -> &Expr {
        &self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn num(&mut self, n: i64) -> ExprId {
        self.add(Expr::Number(BigRational::from_integer(n.into())))
    }

    pub fn rational(&mut self, n: BigRational) -> ExprId {
        self.add(Expr::Number(n))
    }

    /// Exact fraction `numer / denom`. Panics on a zero denominator, which
    /// is a programmer error at a construction site.
    pub fn frac(&mut self, numer: i64, denom: i64) -> ExprId {
        assert!(denom != 0, "frac: zero denominator");
        self.add(Expr::Number(BigRational::new(numer.into(), denom.into())))
    }

    pub fn var(&mut self, name: &str) -> ExprId {
        self.add(Expr::Variable(name.to_string()))
    }

    pub fn constant(&mut self, c: Constant) -> ExprId {
        self.add(Expr::Constant(c))
    }

    pub fn func(&mut self, name: &str, args: Vec<ExprId>) -> ExprId {
        self.add(Expr::Function(name.to_string(), args))
    }

    /// Checked matrix constructor. Vectors are 1xN or Nx1 matrices.
    pub fn matrix(
        &mut self,
        rows: usize,
        cols: usize,
        data: Vec<ExprId>,
    ) -> Result<ExprId, AstError> {
        if rows * cols != data.len() {
            return Err(AstError::MatrixShape {
                rows,
                cols,
                expected: rows * cols,
                got: data.len(),
            });
        }
        Ok(self.add(Expr::Matrix { rows, cols, data }))
    }

    /// Balanced Add tree over `terms`. Empty input yields `0`.
    pub fn build_balanced_add(&mut self, terms: &[ExprId]) -> ExprId {
        match terms.len() {
            0 => self.num(0),
            1 => terms[0],
            2 => self.add(Expr::Add(terms[0], terms[1])),
            n => {
                let mid = n / 2;
                let left = self.build_balanced_add(&terms[..mid]);
                let right = self.build_balanced_add(&terms[mid..]);
                self.add(Expr::Add(left, right))
            }
        }
    }

    /// Balanced Mul tree over `factors`. Empty input yields `1`.
    pub fn build_balanced_mul(&mut self, factors: &[ExprId]) -> ExprId {
        match factors.len() {
            0 => self.num(1),
            1 => factors[0],
            2 => self.add(Expr::Mul(factors[0], factors[1])),
            n => {
                let mid = n / 2;
                let left = self.build_balanced_mul(&factors[..mid]);
                let right = self.build_balanced_mul(&factors[mid..]);
                self.add(Expr::Mul(left, right))
            }
        }
    }

    /// Number of nodes in the tree rooted at `id`, counting shared
    /// subterms once per occurrence. Used by the simplifier's ratio bound.
    pub fn node_count(&self, id: ExprId) -> usize {
        match self.get(id) {
            Expr::Number(_) | Expr::Constant(_) | Expr::Variable(_) => 1,
            Expr::Add(l, r)
            | Expr::Sub(l, r)
            | Expr::Mul(l, r)
            | Expr::Div(l, r)
            | Expr::Pow(l, r) => 1 + self.node_count(*l) + self.node_count(*r),
            Expr::Neg(e) => 1 + self.node_count(*e),
            Expr::Function(_, args) => {
                1 + args.iter().map(|a| self.node_count(*a)).sum::<usize>()
            }
            Expr::Matrix { data, .. } => {
                1 + data.iter().map(|a| self.node_count(*a)).sum::<usize>()
            }
        }
    }

    /// The numeric value of `id` when it is a plain number or a negated
    /// plain number.
    pub fn as_number(&self, id: ExprId) -> Option<BigRational> {
        match self.get(id) {
            Expr::Number(n) => Some(n.clone()),
            Expr::Neg(inner) => self.as_number(*inner).map(|n| -n),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_shares_ids() {
        let mut ctx = Context::new();
        let x1 = ctx.var("x");
        let x2 = ctx.var("x");
        assert_eq!(x1, x2);

        let one = ctx.num(1);
        let a = ctx.add(Expr::Add(x1, one));
        let b = ctx.add(Expr::Add(x2, one));
        assert_eq!(a, b);
    }

    #[test]
    fn matrix_shape_is_checked() {
        let mut ctx = Context::new();
        let cells = vec![ctx.num(1), ctx.num(2), ctx.num(3)];
        let err = ctx.matrix(2, 2, cells).unwrap_err();
        assert!(matches!(err, AstError::MatrixShape { expected: 4, got: 3, .. }));
    }

    #[test]
    fn node_count_counts_occurrences() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let xx = ctx.add(Expr::Mul(x, x));
        assert_eq!(ctx.node_count(xx), 3);
    }

    #[test]
    fn as_number_sees_through_neg() {
        let mut ctx = Context::new();
        let five = ctx.num(5);
        let neg = ctx.add(Expr::Neg(five));
        assert_eq!(ctx.as_number(neg), Some(BigRational::from_integer((-5).into())));
    }
}
