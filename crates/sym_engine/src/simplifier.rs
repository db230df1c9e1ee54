//! The rewrite loop: bottom-up rule application to fixpoint under a size
//! ratio bound.

use crate::error::EngineError;
use crate::rule::Rule;
use rustc_hash::{FxHashMap, FxHashSet};
use std::rc::Rc;
use sym_ast::{Context, Expr, ExprId};
use tracing::debug;

/// Options for a `simplify` call.
#[derive(Debug, Clone, Copy)]
pub struct SimplifyOptions {
    /// The result must satisfy `node_count(result) <= ratio * node_count(input)`.
    /// The default allows mild canonicalization growth while rejecting
    /// fixpoints that ballooned.
    pub ratio: f64,
    /// Upper bound on full rewrite passes; reaching it without a fixpoint
    /// stops rewriting at the current form.
    pub max_passes: usize,
}

impl Default for SimplifyOptions {
    fn default() -> Self {
        Self { ratio: 1.5, max_passes: 32 }
    }
}

impl SimplifyOptions {
    pub fn with_ratio(ratio: f64) -> Self {
        Self { ratio, ..Default::default() }
    }
}

/// Per-node rule applications before declaring a local cycle. Rules are
/// written to be size-reducing or canonicalizing, so this is a backstop.
const MAX_LOCAL_REWRITES: usize = 50;

/// Rule registry plus the arena the rules rewrite into.
///
/// Rules are registered once and never change during solving; the
/// registry is keyed by target AST variant with a separate list for
/// rules that inspect every node.
pub struct Simplifier {
    pub context: Context,
    rules: FxHashMap<&'static str, Vec<Rc<dyn Rule>>>,
    global_rules: Vec<Rc<dyn Rule>>,
}

impl Default for Simplifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Simplifier {
    pub fn new() -> Self {
        Self {
            context: Context::new(),
            rules: FxHashMap::default(),
            global_rules: Vec::new(),
        }
    }

    pub fn with_default_rules() -> Self {
        let mut s = Self::new();
        s.register_default_rules();
        s
    }

    pub fn register_default_rules(&mut self) {
        use crate::rules::*;

        arithmetic::register(self);
        cancel::register(self);
        exponents::register(self);
        logarithms::register(self);
        functions::register(self);
        // Matrix lowering must run before collection so cell arithmetic
        // exists by the time terms are regrouped.
        matrix_ops::register(self);
        crate::collect::register(self);
    }

    pub fn add_rule(&mut self, rule: Box<dyn Rule>) {
        let rule: Rc<dyn Rule> = rule.into();
        if let Some(targets) = rule.target_types() {
            for target in targets {
                self.rules.entry(target).or_default().push(rule.clone());
            }
        } else {
            self.global_rules.push(rule);
        }
    }

    pub fn rule_names(&self) -> Vec<String> {
        let mut names: FxHashSet<String> = FxHashSet::default();
        for rule in &self.global_rules {
            names.insert(rule.name().to_string());
        }
        for rules in self.rules.values() {
            for rule in rules {
                names.insert(rule.name().to_string());
            }
        }
        let mut sorted: Vec<String> = names.into_iter().collect();
        sorted.sort();
        sorted
    }

    /// Bottom-up exact constant folding; total, no rules involved.
    pub fn evaluate_constants(&mut self, expr: ExprId) -> ExprId {
        crate::const_fold::evaluate_constants(&mut self.context, expr)
    }

    /// Distribution to fixpoint; total, budget-bounded for powers.
    pub fn multiply_out(&mut self, expr: ExprId) -> ExprId {
        crate::expand::multiply_out(&mut self.context, expr)
    }

    pub fn simplify(&mut self, expr: ExprId) -> Result<ExprId, EngineError> {
        self.simplify_with_options(expr, SimplifyOptions::default())
    }

    /// Run the rule set to fixpoint. Fails with `RatioNotMet` when the
    /// fixpoint is larger than `ratio` times the input; the caller gets
    /// no partial result in that case.
    pub fn simplify_with_options(
        &mut self,
        expr: ExprId,
        options: SimplifyOptions,
    ) -> Result<ExprId, EngineError> {
        let start_size = self.context.node_count(expr);
        let mut current = expr;
        let mut seen: FxHashSet<ExprId> = FxHashSet::default();
        seen.insert(current);

        for pass in 0..options.max_passes {
            let mut cache: FxHashMap<ExprId, ExprId> = FxHashMap::default();
            let next = self.rewrite_pass(current, &mut cache);
            if next == current {
                debug!(pass, "simplification reached fixpoint");
                break;
            }
            if !seen.insert(next) {
                debug!(pass, "rewrite cycle detected; stopping at current form");
                current = next;
                break;
            }
            current = next;
        }

        let achieved = self.context.node_count(current);
        let budget = (options.ratio * start_size as f64).floor() as usize;
        let budget = budget.max(1);
        if achieved > budget {
            debug!(achieved, budget, "simplified form exceeds ratio budget");
            return Err(EngineError::RatioNotMet { budget, achieved });
        }
        Ok(current)
    }

    /// One full bottom-up pass: children first, then rules at the node
    /// until none applies.
    fn rewrite_pass(&mut self, id: ExprId, cache: &mut FxHashMap<ExprId, ExprId>) -> ExprId {
        if let Some(&done) = cache.get(&id) {
            return done;
        }

        let expr = self.context.get(id).clone();
        let rebuilt = match expr {
            Expr::Number(_) | Expr::Constant(_) | Expr::Variable(_) => id,
            Expr::Add(l, r) => {
                let nl = self.rewrite_pass(l, cache);
                let nr = self.rewrite_pass(r, cache);
                self.context.add(Expr::Add(nl, nr))
            }
            Expr::Sub(l, r) => {
                let nl = self.rewrite_pass(l, cache);
                let nr = self.rewrite_pass(r, cache);
                self.context.add(Expr::Sub(nl, nr))
            }
            Expr::Mul(l, r) => {
                let nl = self.rewrite_pass(l, cache);
                let nr = self.rewrite_pass(r, cache);
                self.context.add(Expr::Mul(nl, nr))
            }
            Expr::Div(l, r) => {
                let nl = self.rewrite_pass(l, cache);
                let nr = self.rewrite_pass(r, cache);
                self.context.add(Expr::Div(nl, nr))
            }
            Expr::Pow(b, e) => {
                let nb = self.rewrite_pass(b, cache);
                let ne = self.rewrite_pass(e, cache);
                self.context.add(Expr::Pow(nb, ne))
            }
            Expr::Neg(inner) => {
                let ni = self.rewrite_pass(inner, cache);
                self.context.add(Expr::Neg(ni))
            }
            Expr::Function(name, args) => {
                let new_args: Vec<ExprId> =
                    args.iter().map(|a| self.rewrite_pass(*a, cache)).collect();
                self.context.add(Expr::Function(name, new_args))
            }
            Expr::Matrix { rows, cols, data } => {
                let new_data: Vec<ExprId> =
                    data.iter().map(|a| self.rewrite_pass(*a, cache)).collect();
                self.context.add(Expr::Matrix { rows, cols, data: new_data })
            }
        };

        let mut current = rebuilt;
        let mut local_seen: FxHashSet<ExprId> = FxHashSet::default();
        local_seen.insert(current);
        for _ in 0..MAX_LOCAL_REWRITES {
            match self.apply_rules_at(current) {
                Some(next) => {
                    if !local_seen.insert(next) {
                        debug!("local rule cycle detected");
                        current = next;
                        break;
                    }
                    current = next;
                }
                None => break,
            }
        }

        cache.insert(id, current);
        current
    }

    /// First matching rule wins; `None` when no rule changes the node.
    fn apply_rules_at(&mut self, id: ExprId) -> Option<ExprId> {
        let variant = self.context.get(id).variant_name();
        let targeted = self.rules.get(variant);

        let candidates = targeted
            .into_iter()
            .flatten()
            .chain(self.global_rules.iter());
        // The registry is disjoint from the arena, so rules may mutate the
        // context while the rule lists stay borrowed.
        let context = &mut self.context;
        for rule in candidates {
            if let Some(rewrite) = rule.apply(context, id) {
                if rewrite.new_expr != id {
                    debug!(rule = rule.name(), "{}", rewrite.description);
                    return Some(rewrite.new_expr);
                }
            }
        }
        None
    }
}
