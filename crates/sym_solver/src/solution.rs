//! Solver result types.

use std::collections::BTreeMap;
use sym_ast::{Context, DisplayExpr, ExprId};

/// One solution: an assignment from unknown names to value expressions.
/// Values may be exact constants, symbolic expressions over other free
/// symbols, or parametrized in fresh placeholder symbols.
pub type Binding = BTreeMap<String, ExprId>;

/// The solver's result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolutionSet {
    /// No assignment satisfies the equations.
    Empty,
    /// Every assignment satisfies the equations (identities only).
    AllValues,
    /// One or more concrete or parametrized assignments.
    Solutions(Vec<Binding>),
}

impl SolutionSet {
    pub fn is_empty(&self) -> bool {
        matches!(self, SolutionSet::Empty)
    }

    pub fn single(var: &str, value: ExprId) -> Self {
        let mut binding = Binding::new();
        binding.insert(var.to_string(), value);
        SolutionSet::Solutions(vec![binding])
    }

    pub fn of_roots(var: &str, roots: impl IntoIterator<Item = ExprId>) -> Self {
        let bindings: Vec<Binding> = roots
            .into_iter()
            .map(|root| {
                let mut b = Binding::new();
                b.insert(var.to_string(), root);
                b
            })
            .collect();
        if bindings.is_empty() {
            SolutionSet::Empty
        } else {
            SolutionSet::Solutions(bindings)
        }
    }

    /// The value bound for `var` across all solutions, for single-unknown
    /// results.
    pub fn roots_for(&self, var: &str) -> Vec<ExprId> {
        match self {
            SolutionSet::Solutions(bindings) => {
                bindings.iter().filter_map(|b| b.get(var).copied()).collect()
            }
            _ => vec![],
        }
    }

    /// Human-readable rendering for diagnostics and tests.
    pub fn render(&self, ctx: &Context) -> String {
        match self {
            SolutionSet::Empty => "{}".to_string(),
            SolutionSet::AllValues => "all values".to_string(),
            SolutionSet::Solutions(bindings) => {
                let rendered: Vec<String> = bindings
                    .iter()
                    .map(|b| {
                        let pairs: Vec<String> = b
                            .iter()
                            .map(|(name, &id)| {
                                format!("{}: {}", name, DisplayExpr { context: ctx, id })
                            })
                            .collect();
                        format!("{{{}}}", pairs.join(", "))
                    })
                    .collect();
                rendered.join(" | ")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn of_roots_with_no_roots_is_empty() {
        let set = SolutionSet::of_roots("x", std::iter::empty());
        assert!(set.is_empty());
    }

    #[test]
    fn render_shows_assignments() {
        let mut ctx = Context::new();
        let two = ctx.num(2);
        let set = SolutionSet::single("x", two);
        assert_eq!(set.render(&ctx), "{x: 2}");
    }
}
