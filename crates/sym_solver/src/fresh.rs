//! Fresh placeholder symbols for parametrized solutions.
//!
//! Underdetermined systems expose free unknowns through placeholder
//! symbols `_0, _1, ...`. The generator is explicit, caller-visible
//! state owned by the solver: names are monotone across calls on the
//! same solver and reset only by constructing a new one.

use sym_ast::{Context, ExprId};

#[derive(Debug, Default, Clone)]
pub struct FreshSymbols {
    next: usize,
}

impl FreshSymbols {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name the next placeholder without consuming it.
    pub fn peek(&self) -> String {
        format!("_{}", self.next)
    }

    /// Mint the next placeholder symbol.
    pub fn fresh(&mut self, ctx: &mut Context) -> ExprId {
        let name = self.peek();
        self.next += 1;
        ctx.var(&name)
    }

    /// Number of placeholders minted so far.
    pub fn minted(&self) -> usize {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sym_ast::{DisplayExpr, Expr};

    #[test]
    fn names_are_monotone() {
        let mut ctx = Context::new();
        let mut fresh = FreshSymbols::new();
        let a = fresh.fresh(&mut ctx);
        let b = fresh.fresh(&mut ctx);
        assert_eq!(format!("{}", DisplayExpr { context: &ctx, id: a }), "_0");
        assert_eq!(format!("{}", DisplayExpr { context: &ctx, id: b }), "_1");
        assert_eq!(fresh.minted(), 2);
        assert!(matches!(ctx.get(b), Expr::Variable(_)));
    }
}
