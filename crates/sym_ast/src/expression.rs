use num_rational::BigRational;

/// Handle to an interned expression node inside a [`crate::Context`].
///
/// Because the context hash-conses nodes, two ids are equal if and only if
/// the trees they denote are structurally equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(u32);

impl ExprId {
    pub(crate) fn new(index: usize) -> Self {
        ExprId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Named mathematical constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constant {
    Pi,
    E,
    Infinity,
    Undefined,
}

impl std::fmt::Display for Constant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Constant::Pi => write!(f, "pi"),
            Constant::E => write!(f, "e"),
            Constant::Infinity => write!(f, "infinity"),
            Constant::Undefined => write!(f, "undefined"),
        }
    }
}

/// A term in the expression tree.
///
/// Exact rationals are the only in-tree numeric type; floating values live
/// at the evaluation boundary (`sym_engine::eval::eval_f64`). Add and Mul
/// are binary nodes; variadic sums/products are chains of these, flattened
/// on demand by the engine's n-ary views.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Number(BigRational),
    Constant(Constant),
    Variable(String),
    Add(ExprId, ExprId),
    Sub(ExprId, ExprId),
    Mul(ExprId, ExprId),
    Div(ExprId, ExprId),
    Pow(ExprId, ExprId),
    Neg(ExprId),
    Function(String, Vec<ExprId>),
    Matrix {
        rows: usize,
        cols: usize,
        data: Vec<ExprId>,
    },
}

impl Expr {
    /// Variant name used for rule dispatch (see `sym_engine::rule::Rule::target_types`).
    pub fn variant_name(&self) -> &'static str {
        match self {
            Expr::Number(_) => "Number",
            Expr::Constant(_) => "Constant",
            Expr::Variable(_) => "Variable",
            Expr::Add(_, _) => "Add",
            Expr::Sub(_, _) => "Sub",
            Expr::Mul(_, _) => "Mul",
            Expr::Div(_, _) => "Div",
            Expr::Pow(_, _) => "Pow",
            Expr::Neg(_) => "Neg",
            Expr::Function(_, _) => "Function",
            Expr::Matrix { .. } => "Matrix",
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Expr::Number(_))
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Expr::Variable(_))
    }
}
