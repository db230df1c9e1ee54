use sym_ast::{Context, ExprId};

/// Result of a successful rule application.
pub struct Rewrite {
    /// The transformed expression.
    pub new_expr: ExprId,
    /// Human-readable description of the transformation.
    pub description: String,
    /// Domain assumption the rewrite relies on (e.g. "x > 0 for ln(x)").
    pub domain_assumption: Option<&'static str>,
}

impl Rewrite {
    pub fn new(new_expr: ExprId, description: impl Into<String>) -> Self {
        Rewrite {
            new_expr,
            description: description.into(),
            domain_assumption: None,
        }
    }

    pub fn with_domain_assumption(
        new_expr: ExprId,
        description: impl Into<String>,
        assumption: &'static str,
    ) -> Self {
        Rewrite {
            new_expr,
            description: description.into(),
            domain_assumption: Some(assumption),
        }
    }
}

/// A rewrite rule: pattern match plus replacement builder, optionally
/// guarded inside `apply`. Application is pure with respect to the input
/// term — it either returns a new term or `None`, never mutates in place.
pub trait Rule {
    fn name(&self) -> &str;

    fn apply(&self, ctx: &mut Context, expr: ExprId) -> Option<Rewrite>;

    /// AST variant names this rule targets; `None` means every node.
    /// Used by the simplifier to index rules per variant.
    fn target_types(&self) -> Option<Vec<&'static str>> {
        None
    }
}
