use thiserror::Error;

/// Recoverable solver outcomes. "No solution found by this engine" is a
/// legitimate reading of `UnsolvableStrategy`; none of these indicate a
/// defect, and none are used for control flow between solution branches
/// (branch misses are filtered, not thrown).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolveError {
    /// The unknown does not occur in the equation at all.
    #[error("unknown '{0}' does not occur in the equation")]
    NoOccurrence(String),

    /// Rearrangement needs exactly one occurrence of the unknown;
    /// multi-occurrence isolation requires solving, not rearranging.
    #[error("unknown '{0}' occurs more than once; rearrangement needs a single occurrence")]
    MultipleOccurrences(String),

    /// Every recognized strategy declined the equation or system.
    #[error("no applicable strategy solves for '{0}'")]
    UnsolvableStrategy(String),

    /// Linear elimination derived a contradiction.
    #[error("linear system is inconsistent")]
    InconsistentSystem,
}
