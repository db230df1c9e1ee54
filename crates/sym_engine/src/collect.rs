//! Collection of like terms and like factors across AC chains.
//!
//! Additive chains regroup as `constant + Σ coeff·core` with distinct
//! cores merged and canonically ordered; multiplicative chains regroup as
//! `coefficient · Π base^exponent` with repeated bases merged. Both rules
//! return `None` when the chain is already in collected form, which is
//! what lets the simplifier's fixpoint loop terminate.

use crate::nary::{rebuild_sum, AddView, MulView, Sign};
use crate::rule::{Rewrite, Rule};
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use rustc_hash::FxHashMap;
use sym_ast::ordering::compare_expr;
use sym_ast::{Context, Expr, ExprId};

/// Numeric coefficient and symbolic core of one additive term.
/// `2 * x` splits as `(2, x)`; a bare number has no core.
fn split_term(ctx: &mut Context, id: ExprId) -> (BigRational, Option<ExprId>) {
    match ctx.get(id).clone() {
        Expr::Number(n) => (n, None),
        Expr::Neg(inner) => {
            let (c, core) = split_term(ctx, inner);
            (-c, core)
        }
        Expr::Div(num, den) => {
            if let Expr::Number(d) = ctx.get(den) {
                if !d.is_zero() {
                    let d = d.clone();
                    let (c, core) = split_term(ctx, num);
                    return (c / d, core);
                }
            }
            (BigRational::one(), Some(id))
        }
        Expr::Mul(_, _) => {
            let view = MulView::from_expr(ctx, id);
            // Matrix factors are non-commutative; leave the term opaque.
            if view.factors.iter().any(|f| matches!(ctx.get(*f), Expr::Matrix { .. })) {
                return (BigRational::one(), Some(id));
            }
            let mut coeff = if view.negated {
                -BigRational::one()
            } else {
                BigRational::one()
            };
            let mut rest: Vec<ExprId> = Vec::new();
            for f in &view.factors {
                match ctx.get(*f) {
                    Expr::Number(n) => coeff *= n,
                    _ => rest.push(*f),
                }
            }
            if rest.is_empty() {
                return (coeff, None);
            }
            rest.sort_by(|a, b| compare_expr(ctx, *a, *b));
            let core = chain_mul(ctx, &rest);
            (coeff, Some(core))
        }
        _ => (BigRational::one(), Some(id)),
    }
}

fn chain_mul(ctx: &mut Context, factors: &[ExprId]) -> ExprId {
    let mut iter = factors.iter();
    let mut acc = *iter.next().expect("chain_mul: empty factor list");
    for f in iter {
        acc = ctx.add(Expr::Mul(acc, *f));
    }
    acc
}

/// Collect like terms in an additive chain:
/// `x + 2*x + (-2*x)` becomes `x`, `a*3 + a` becomes `4*a`.
pub struct CollectLikeTermsRule;

impl Rule for CollectLikeTermsRule {
    fn name(&self) -> &str {
        "Collect Like Terms"
    }

    fn target_types(&self) -> Option<Vec<&'static str>> {
        Some(vec!["Add", "Sub"])
    }

    fn apply(&self, ctx: &mut Context, expr: ExprId) -> Option<Rewrite> {
        if !matches!(ctx.get(expr), Expr::Add(_, _) | Expr::Sub(_, _)) {
            return None;
        }
        let view = AddView::from_expr(ctx, expr);

        let mut constant = BigRational::zero();
        let mut order: Vec<ExprId> = Vec::new();
        let mut coeffs: FxHashMap<ExprId, BigRational> = FxHashMap::default();
        for (term, sign) in &view.terms {
            let (mut c, core) = split_term(ctx, *term);
            if sign.is_negative() {
                c = -c;
            }
            match core {
                None => constant += c,
                Some(core) => {
                    if let Some(existing) = coeffs.get_mut(&core) {
                        *existing += c;
                    } else {
                        order.push(core);
                        coeffs.insert(core, c);
                    }
                }
            }
        }

        order.sort_by(|a, b| compare_expr(ctx, *a, *b));

        let mut terms_out: Vec<(ExprId, Sign)> = Vec::new();
        if !constant.is_zero() {
            let sign = if constant.is_negative() { Sign::Neg } else { Sign::Pos };
            let c = ctx.rational(constant.abs());
            terms_out.push((c, sign));
        }
        for core in order {
            let coeff = &coeffs[&core];
            if coeff.is_zero() {
                continue;
            }
            let sign = if coeff.is_negative() { Sign::Neg } else { Sign::Pos };
            let mag = coeff.abs();
            let term = if mag.is_one() {
                core
            } else {
                let c = ctx.rational(mag);
                ctx.add(Expr::Mul(c, core))
            };
            terms_out.push((term, sign));
        }

        let result = rebuild_sum(ctx, &terms_out);
        if result == expr {
            return None;
        }
        Some(Rewrite::new(result, "collect like terms"))
    }
}

/// Exponent accumulated for one base inside a product.
struct BaseExponents {
    numeric: BigRational,
    symbolic: Vec<ExprId>,
}

/// Collect like factors in a multiplicative chain:
/// `a * 3 * 4` becomes `12 * a`, `x * x^2` becomes `x^3`.
pub struct CollectLikeFactorsRule;

impl Rule for CollectLikeFactorsRule {
    fn name(&self) -> &str {
        "Collect Like Factors"
    }

    fn target_types(&self) -> Option<Vec<&'static str>> {
        Some(vec!["Mul"])
    }

    fn apply(&self, ctx: &mut Context, expr: ExprId) -> Option<Rewrite> {
        if !matches!(ctx.get(expr), Expr::Mul(_, _)) {
            return None;
        }
        let view = MulView::from_expr(ctx, expr);
        // Reordering is only sound for commutative factors.
        if view.factors.iter().any(|f| matches!(ctx.get(*f), Expr::Matrix { .. })) {
            return None;
        }

        let mut coeff = if view.negated {
            -BigRational::one()
        } else {
            BigRational::one()
        };
        let mut order: Vec<ExprId> = Vec::new();
        let mut exps: FxHashMap<ExprId, BaseExponents> = FxHashMap::default();
        for factor in &view.factors {
            let (base, num_exp, sym_exp) = match ctx.get(*factor) {
                Expr::Number(n) => {
                    coeff *= n;
                    continue;
                }
                Expr::Pow(b, e) => match ctx.get(*e) {
                    Expr::Number(n) => (*b, n.clone(), None),
                    _ => (*b, BigRational::zero(), Some(*e)),
                },
                _ => (*factor, BigRational::one(), None),
            };
            let entry = exps.entry(base).or_insert_with(|| {
                order.push(base);
                BaseExponents { numeric: BigRational::zero(), symbolic: Vec::new() }
            });
            entry.numeric += num_exp;
            if let Some(e) = sym_exp {
                entry.symbolic.push(e);
            }
        }

        if coeff.is_zero() {
            let zero = ctx.num(0);
            if zero == expr {
                return None;
            }
            return Some(Rewrite::new(zero, "zero factor annihilates product"));
        }

        let mut factors_out: Vec<ExprId> = Vec::new();
        for base in order {
            let acc = &exps[&base];
            let factor = if acc.symbolic.is_empty() {
                if acc.numeric.is_zero() {
                    continue;
                }
                if acc.numeric.is_one() {
                    base
                } else {
                    let e = ctx.rational(acc.numeric.clone());
                    ctx.add(Expr::Pow(base, e))
                }
            } else {
                let mut exponent = acc.symbolic[0];
                for e in &acc.symbolic[1..] {
                    exponent = ctx.add(Expr::Add(exponent, *e));
                }
                if !acc.numeric.is_zero() {
                    let n = ctx.rational(acc.numeric.clone());
                    exponent = ctx.add(Expr::Add(exponent, n));
                }
                ctx.add(Expr::Pow(base, exponent))
            };
            factors_out.push(factor);
        }

        // Sort rebuilt factors with the same comparator the like-terms rule
        // uses for its cores, so both rules converge on one shape:
        // coefficient wrapping a sorted factor chain.
        factors_out.sort_by(|a, b| compare_expr(ctx, *a, *b));

        let negative = coeff.is_negative();
        let mag = coeff.abs();
        let result = if factors_out.is_empty() {
            let c = ctx.rational(mag);
            c
        } else {
            let product = chain_mul(ctx, &factors_out);
            if mag.is_one() {
                product
            } else {
                let c = ctx.rational(mag);
                ctx.add(Expr::Mul(c, product))
            }
        };
        let result = if negative {
            ctx.add(Expr::Neg(result))
        } else {
            result
        };

        if result == expr {
            return None;
        }
        Some(Rewrite::new(result, "collect like factors"))
    }
}

pub fn register(simplifier: &mut crate::simplifier::Simplifier) {
    simplifier.add_rule(Box::new(CollectLikeTermsRule));
    simplifier.add_rule(Box::new(CollectLikeFactorsRule));
}
