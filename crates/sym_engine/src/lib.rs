//! Rule-based rewrite engine over `sym_ast` terms.
//!
//! The boundary operations:
//! - [`const_fold::evaluate_constants`] — bottom-up exact folding, total.
//! - [`expand::multiply_out`] — distribution to fixpoint with exact
//!   multinomial expansion of integer powers of sums.
//! - [`Simplifier::simplify`] — the full rule set to fixpoint under a
//!   size-ratio bound ([`error::EngineError::RatioNotMet`] on violation).
//! - [`Simplifier::to_polynomial_normal_form`] — canonical ascending
//!   polynomial form ([`error::EngineError::NotPolynomial`] on failure).
//! - [`calculus::differentiate`] — structural derivatives, one per symbol.
//! - [`eval::evaluate`] / [`eval::eval_f64`] — the substitution evaluator
//!   and the floating boundary.

pub mod calculus;
pub mod collect;
pub mod const_fold;
pub mod error;
pub mod eval;
pub mod expand;
pub mod macros;
pub mod matrix;
pub mod multinomial;
pub mod nary;
pub mod numeric;
pub mod poly;
pub mod rule;
pub mod rules;
pub mod simplifier;

pub use calculus::differentiate;
pub use const_fold::evaluate_constants;
pub use error::EngineError;
pub use eval::{eval_f64, evaluate, substitute};
pub use expand::multiply_out;
pub use poly::{
    as_polynomial, as_polynomial_in_kernel, detect_exponential_kernel, Poly, PolyKernel,
};
pub use rule::{Rewrite, Rule};
pub use simplifier::{Simplifier, SimplifyOptions};
