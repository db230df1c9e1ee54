use thiserror::Error;

/// Recoverable engine outcomes. These are result variants the caller can
/// branch on, never control flow inside the engine itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// `simplify` reached a fixpoint whose size exceeds the requested
    /// ratio of the input size. The caller gets no partial result.
    #[error("simplified form has {achieved} nodes, exceeding the budget of {budget}")]
    RatioNotMet { budget: usize, achieved: usize },

    /// The expression cannot be written as a polynomial in the requested
    /// main variable.
    #[error("not a polynomial in '{0}'")]
    NotPolynomial(String),
}
