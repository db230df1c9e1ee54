//! Exact multinomial expansion of `(t1 + t2 + ... + tk)^n`.
//!
//! Direct enumeration of compositions with multinomial coefficients is
//! O(output terms) instead of O(terms^2) for repeated multiplication, and
//! the coefficients come out exact (`BigInt`).

use crate::nary::Sign;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};
use rustc_hash::FxHashMap;
use sym_ast::{Context, Expr, ExprId};

/// Budget limits preventing runaway expansion.
#[derive(Clone, Copy, Debug)]
pub struct ExpandBudget {
    pub max_exp: u32,
    pub max_base_terms: usize,
    pub max_output_terms: usize,
}

impl Default for ExpandBudget {
    fn default() -> Self {
        Self {
            max_exp: 64,
            max_base_terms: 16,
            max_output_terms: 10_000,
        }
    }
}

/// One summand of the base: numeric coefficient times an optional atom.
/// Atoms are arbitrary non-numeric subexpressions; the expansion is
/// purely algebraic and does not care what they denote.
#[derive(Clone, Debug)]
struct BaseTerm {
    coeff: BigRational,
    atom: Option<ExprId>,
}

/// Monomial key: one exponent per distinct atom, in atom order.
#[derive(Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
struct MonoKey(Vec<u16>);

/// Expand `(sum of terms)^n` where `terms` comes from an additive view.
/// Returns `None` when the shape or the budget rules it out; the caller
/// falls back to leaving the power unexpanded.
pub fn expand_power(
    ctx: &mut Context,
    terms: &[(ExprId, Sign)],
    n: u32,
    budget: &ExpandBudget,
) -> Option<ExprId> {
    if n < 2 || n > budget.max_exp {
        return None;
    }
    let k = terms.len();
    if k < 2 || k > budget.max_base_terms {
        return None;
    }

    let base: Vec<BaseTerm> = terms
        .iter()
        .map(|(id, sign)| {
            let mut t = parse_base_term(ctx, *id);
            if sign.is_negative() {
                t.coeff = -t.coeff;
            }
            t
        })
        .collect();

    let estimated = term_count_estimate(n, k, budget.max_output_terms)?;
    if estimated > budget.max_output_terms {
        return None;
    }

    // Canonical atom ordering: by arena index, deterministic.
    let mut atoms: Vec<ExprId> = base.iter().filter_map(|t| t.atom).collect();
    atoms.sort_by_key(|id| id.index());
    atoms.dedup();
    let atom_index: FxHashMap<ExprId, usize> =
        atoms.iter().enumerate().map(|(i, &id)| (id, i)).collect();

    let fact = factorial_table(n);
    let pow_tables: Vec<Vec<BigRational>> =
        base.iter().map(|t| pow_table(&t.coeff, n)).collect();

    let mut acc: FxHashMap<MonoKey, BigRational> = FxHashMap::default();
    let mut composition = vec![0u32; k];
    enumerate_compositions(n, k, &mut composition, &mut |comp| {
        let mut coeff = BigRational::from(multinomial_coeff(&fact, n, comp));
        for (i, &e) in comp.iter().enumerate() {
            coeff *= &pow_tables[i][e as usize];
        }
        if coeff.is_zero() {
            return;
        }
        let mut exps = vec![0u16; atoms.len()];
        for (i, &e) in comp.iter().enumerate() {
            if let Some(atom) = base[i].atom {
                if let Some(&idx) = atom_index.get(&atom) {
                    exps[idx] += e as u16;
                }
            }
        }
        let key = MonoKey(exps);
        acc.entry(key).and_modify(|c| *c += &coeff).or_insert(coeff);
    });

    let mut collected: Vec<(MonoKey, BigRational)> =
        acc.into_iter().filter(|(_, c)| !c.is_zero()).collect();
    collected.sort_by(|a, b| b.0.cmp(&a.0));

    Some(emit_sum(ctx, &atoms, collected))
}

fn parse_base_term(ctx: &Context, id: ExprId) -> BaseTerm {
    match ctx.get(id) {
        Expr::Number(n) => BaseTerm { coeff: n.clone(), atom: None },
        Expr::Mul(l, r) => match (ctx.get(*l), ctx.get(*r)) {
            (Expr::Number(n), other) if !other.is_number() => BaseTerm {
                coeff: n.clone(),
                atom: Some(*r),
            },
            (other, Expr::Number(n)) if !other.is_number() => BaseTerm {
                coeff: n.clone(),
                atom: Some(*l),
            },
            _ => BaseTerm { coeff: BigRational::one(), atom: Some(id) },
        },
        _ => BaseTerm { coeff: BigRational::one(), atom: Some(id) },
    }
}

/// Output term count `C(n + k - 1, k - 1)`, or `None` past `max`.
fn term_count_estimate(n: u32, k: usize, max: usize) -> Option<usize> {
    let top = n as usize + k - 1;
    let bot = k - 1;
    let mut result: u128 = 1;
    for i in 0..bot {
        result = result * (top - i) as u128 / (i + 1) as u128;
        if result > max as u128 {
            return None;
        }
    }
    Some(result as usize)
}

fn factorial_table(n: u32) -> Vec<BigInt> {
    let mut fact = vec![BigInt::one()];
    for i in 1..=n {
        let prev = fact[fact.len() - 1].clone();
        fact.push(prev * BigInt::from(i));
    }
    fact
}

fn multinomial_coeff(fact: &[BigInt], n: u32, parts: &[u32]) -> BigInt {
    let mut denom = BigInt::one();
    for &p in parts {
        denom *= &fact[p as usize];
    }
    &fact[n as usize] / denom
}

fn pow_table(c: &BigRational, n: u32) -> Vec<BigRational> {
    let mut table = vec![BigRational::one()];
    for _ in 1..=n {
        let prev = table[table.len() - 1].clone();
        table.push(prev * c);
    }
    table
}

fn enumerate_compositions<F: FnMut(&[u32])>(n: u32, k: usize, buf: &mut [u32], f: &mut F) {
    debug_assert_eq!(buf.len(), k);
    compositions_rec(n, k, 0, buf, f);
}

fn compositions_rec<F: FnMut(&[u32])>(
    remaining: u32,
    total_k: usize,
    pos: usize,
    buf: &mut [u32],
    f: &mut F,
) {
    if pos == total_k - 1 {
        buf[pos] = remaining;
        f(buf);
        return;
    }
    for val in 0..=remaining {
        buf[pos] = val;
        compositions_rec(remaining - val, total_k, pos + 1, buf, f);
    }
}

fn emit_sum(ctx: &mut Context, atoms: &[ExprId], terms: Vec<(MonoKey, BigRational)>) -> ExprId {
    if terms.is_empty() {
        return ctx.num(0);
    }
    let signed: Vec<(ExprId, Sign)> = terms
        .into_iter()
        .map(|(mono, coeff)| emit_term(ctx, atoms, &mono, coeff))
        .collect();
    crate::nary::rebuild_sum(ctx, &signed)
}

fn emit_term(
    ctx: &mut Context,
    atoms: &[ExprId],
    mono: &MonoKey,
    coeff: BigRational,
) -> (ExprId, Sign) {
    use num_traits::Signed;
    let sign = if coeff.is_negative() { Sign::Neg } else { Sign::Pos };
    let coeff = coeff.abs();

    let mut factors: Vec<ExprId> = Vec::new();
    for (i, &exp) in mono.0.iter().enumerate() {
        if exp == 0 {
            continue;
        }
        let atom = atoms[i];
        let factor = if exp == 1 {
            atom
        } else {
            let e = ctx.num(exp as i64);
            ctx.add(Expr::Pow(atom, e))
        };
        factors.push(factor);
    }

    if factors.is_empty() {
        return (ctx.rational(coeff), sign);
    }
    let monomial = ctx.build_balanced_mul(&factors);
    let term = if coeff.is_one() {
        monomial
    } else {
        let c = ctx.rational(coeff);
        ctx.add(Expr::Mul(c, monomial))
    };
    (term, sign)
}
