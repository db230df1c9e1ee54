//! Roots of polynomial equations `p = 0`.
//!
//! Degree <= 2 solves in closed form with an exact discriminant. Higher
//! degrees solve only when rational-root candidates factor the
//! polynomial down to solvable pieces; otherwise the strategy declines.

use crate::error::SolveError;
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use sym_ast::{Context, Expr, ExprId};
use sym_engine::numeric::{divisors, rational_root};
use sym_engine::Poly;
use tracing::debug;

/// Roots of one polynomial, before any back-substitution.
#[derive(Debug, Clone)]
pub enum PolyRoots {
    /// The zero polynomial: every value is a root.
    AllValues,
    /// A nonzero constant: no roots.
    Empty,
    /// Concrete root expressions.
    Roots(Vec<ExprId>),
}

pub fn solve_poly(ctx: &mut Context, poly: &Poly) -> Result<PolyRoots, SolveError> {
    if poly.is_zero() {
        return Ok(PolyRoots::AllValues);
    }
    if poly.degree() == 0 {
        return Ok(PolyRoots::Empty);
    }

    if let Some(coeffs) = poly.numeric_coeffs(ctx) {
        let roots = numeric_roots(&coeffs, poly.kernel.var())?;
        let ids = roots
            .into_iter()
            .map(|r| r.into_expr(ctx))
            .collect::<Vec<_>>();
        return Ok(PolyRoots::Roots(ids));
    }

    symbolic_roots(ctx, poly)
}

fn numeric_roots(coeffs: &[BigRational], var: &str) -> Result<Vec<RootSpec>, SolveError> {
    let mut work: Vec<BigRational> = coeffs.to_vec();
    let mut roots: Vec<RootSpec> = Vec::new();

    // Factor out x^k for a zero constant term.
    while work.len() > 1 && work[0].is_zero() {
        roots.push(RootSpec::Rational(BigRational::zero()));
        work.remove(0);
    }

    loop {
        match work.len() {
            0 | 1 => break,
            2 => {
                // c0 + c1 x = 0
                roots.push(RootSpec::Rational(-&work[0] / &work[1]));
                break;
            }
            3 => {
                roots.extend(quadratic_roots(&work[0], &work[1], &work[2]));
                break;
            }
            _ => {
                let Some(root) = find_rational_root(&work) else {
                    debug!(var, degree = work.len() - 1, "no rational root found");
                    return Err(SolveError::UnsolvableStrategy(var.to_string()));
                };
                work = synthetic_divide(&work, &root);
                roots.push(RootSpec::Rational(root));
            }
        }
    }
    Ok(roots)
}

/// Root description produced by the numeric path.
enum RootSpec {
    Rational(BigRational),
    /// `(-b ± sqrt(delta)) / (2a)` with an irrational discriminant.
    Surd {
        a: BigRational,
        b: BigRational,
        delta: BigRational,
        negative_branch: bool,
    },
}

/// The quadratic discriminant `b^2 - 4ac`.
fn discriminant(a: &BigRational, b: &BigRational, c: &BigRational) -> BigRational {
    b * b - BigRational::from_integer(4.into()) * a * c
}

fn quadratic_roots(c0: &BigRational, c1: &BigRational, c2: &BigRational) -> Vec<RootSpec> {
    let delta = discriminant(c2, c1, c0);
    if delta.is_negative() {
        // No real roots.
        return vec![];
    }
    let two_a = BigRational::from_integer(2.into()) * c2;
    if let Some(sqrt_delta) = rational_root(&delta, 2) {
        if sqrt_delta.is_zero() {
            return vec![RootSpec::Rational(-c1 / &two_a)];
        }
        let r1 = (-c1 - &sqrt_delta) / &two_a;
        let r2 = (-c1 + &sqrt_delta) / &two_a;
        return vec![RootSpec::Rational(r1), RootSpec::Rational(r2)];
    }
    // Irrational discriminant: keep exact surds.
    vec![
        RootSpec::Surd { a: c2.clone(), b: c1.clone(), delta: delta.clone(), negative_branch: true },
        RootSpec::Surd { a: c2.clone(), b: c1.clone(), delta, negative_branch: false },
    ]
}

impl RootSpec {
    fn into_expr(self, ctx: &mut Context) -> ExprId {
        match self {
            RootSpec::Rational(r) => ctx.rational(r),
            RootSpec::Surd { a, b, delta, negative_branch } => {
                let delta_id = ctx.rational(delta);
                let sqrt_delta = sqrt_expr(ctx, delta_id);
                let neg_b = ctx.rational(-b);
                let numer = if negative_branch {
                    ctx.add(Expr::Sub(neg_b, sqrt_delta))
                } else {
                    ctx.add(Expr::Add(neg_b, sqrt_delta))
                };
                let two_a = ctx.rational(BigRational::from_integer(2.into()) * a);
                let root = ctx.add(Expr::Div(numer, two_a));
                sym_engine::evaluate_constants(ctx, root)
            }
        }
    }
}

/// Build `sqrt(radicand)` as `radicand^(1/2)`.
pub fn sqrt_expr(ctx: &mut Context, radicand: ExprId) -> ExprId {
    let half = ctx.frac(1, 2);
    ctx.add(Expr::Pow(radicand, half))
}

/// Scan `±p/q` candidates (p | constant, q | leading) for a root of the
/// integer-normalized polynomial.
fn find_rational_root(coeffs: &[BigRational]) -> Option<BigRational> {
    let ints = to_integer_coeffs(coeffs);
    let constant = ints.first()?.clone();
    let leading = ints.last()?.clone();
    if constant.is_zero() {
        return Some(BigRational::zero());
    }
    let ps = divisors(&constant);
    let qs = divisors(&leading);
    for p in &ps {
        for q in &qs {
            for sign in [1i64, -1] {
                let candidate = BigRational::new(p * BigInt::from(sign), q.clone());
                if eval_poly(coeffs, &candidate).is_zero() {
                    return Some(candidate);
                }
            }
        }
    }
    None
}

/// Clear denominators: multiply by the lcm so candidates enumerate over
/// integer divisors.
fn to_integer_coeffs(coeffs: &[BigRational]) -> Vec<BigInt> {
    let mut lcm = BigInt::one();
    for c in coeffs {
        lcm = lcm.lcm(c.denom());
    }
    coeffs
        .iter()
        .map(|c| (c * BigRational::from_integer(lcm.clone())).to_integer())
        .collect()
}

/// Horner evaluation, exact.
fn eval_poly(coeffs: &[BigRational], x: &BigRational) -> BigRational {
    let mut acc = BigRational::zero();
    for c in coeffs.iter().rev() {
        acc = acc * x + c;
    }
    acc
}

/// Divide by `(x - root)`, assuming `root` is exact. Returns the
/// quotient coefficients (ascending).
fn synthetic_divide(coeffs: &[BigRational], root: &BigRational) -> Vec<BigRational> {
    let mut quotient: Vec<BigRational> = Vec::with_capacity(coeffs.len() - 1);
    let mut carry = BigRational::zero();
    for c in coeffs.iter().rev() {
        carry = carry * root + c;
        quotient.push(carry.clone());
    }
    // The last carry is the remainder (zero for a true root).
    quotient.pop();
    quotient.reverse();
    quotient
}

/// Symbolic coefficients: linear isolation or the quadratic formula.
fn symbolic_roots(ctx: &mut Context, poly: &Poly) -> Result<PolyRoots, SolveError> {
    let var = poly.kernel.var().to_string();
    match poly.degree() {
        1 => {
            let c0 = poly.coeffs[0];
            let c1 = poly.coeffs[1];
            let neg_c0 = ctx.add(Expr::Neg(c0));
            let root = ctx.add(Expr::Div(neg_c0, c1));
            let root = sym_engine::evaluate_constants(ctx, root);
            Ok(PolyRoots::Roots(vec![root]))
        }
        2 => {
            let c = poly.coeffs[0];
            let b = poly.coeffs[1];
            let a = poly.coeffs[2];
            // delta = b^2 - 4ac, symbolic
            let two = ctx.num(2);
            let b_sq = ctx.add(Expr::Pow(b, two));
            let four = ctx.num(4);
            let ac = ctx.add(Expr::Mul(a, c));
            let four_ac = ctx.add(Expr::Mul(four, ac));
            let delta = ctx.add(Expr::Sub(b_sq, four_ac));
            let delta = sym_engine::evaluate_constants(ctx, delta);
            let sqrt_delta = sqrt_expr(ctx, delta);

            let neg_b = ctx.add(Expr::Neg(b));
            let two_a = ctx.add(Expr::Mul(two, a));
            let n1 = ctx.add(Expr::Sub(neg_b, sqrt_delta));
            let n2 = ctx.add(Expr::Add(neg_b, sqrt_delta));
            let r1 = ctx.add(Expr::Div(n1, two_a));
            let r2 = ctx.add(Expr::Div(n2, two_a));
            let r1 = sym_engine::evaluate_constants(ctx, r1);
            let r2 = sym_engine::evaluate_constants(ctx, r2);
            Ok(PolyRoots::Roots(vec![r1, r2]))
        }
        _ => Err(SolveError::UnsolvableStrategy(var)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sym_ast::DisplayExpr;
    use sym_engine::as_polynomial;

    fn rat(n: i64) -> BigRational {
        BigRational::from_integer(n.into())
    }

    fn render(ctx: &Context, id: ExprId) -> String {
        format!("{}", DisplayExpr { context: ctx, id })
    }

    #[test]
    fn linear_root() {
        // 2x - 6 = 0 -> x = 3
        let coeffs = vec![rat(-6), rat(2)];
        let roots = numeric_roots(&coeffs, "x").unwrap();
        assert_eq!(roots.len(), 1);
        let mut ctx = Context::new();
        let id = roots.into_iter().next().unwrap().into_expr(&mut ctx);
        assert_eq!(render(&ctx, id), "3");
    }

    #[test]
    fn quadratic_with_rational_roots() {
        // x^2 - 5x + 6 = 0 -> 2, 3
        let coeffs = vec![rat(6), rat(-5), rat(1)];
        let mut ctx = Context::new();
        let roots: Vec<String> = numeric_roots(&coeffs, "x")
            .unwrap()
            .into_iter()
            .map(|r| {
                let id = r.into_expr(&mut ctx);
                render(&ctx, id)
            })
            .collect();
        assert_eq!(roots, vec!["2", "3"]);
    }

    #[test]
    fn negative_discriminant_has_no_real_roots() {
        // x^2 + 1 = 0
        let coeffs = vec![rat(1), rat(0), rat(1)];
        let roots = numeric_roots(&coeffs, "x").unwrap();
        assert!(roots.is_empty());
    }

    #[test]
    fn irrational_discriminant_keeps_surds() {
        // x^2 - 2 = 0 -> ±sqrt(2)
        let coeffs = vec![rat(-2), rat(0), rat(1)];
        let mut ctx = Context::new();
        let roots: Vec<String> = numeric_roots(&coeffs, "x")
            .unwrap()
            .into_iter()
            .map(|r| {
                let id = r.into_expr(&mut ctx);
                render(&ctx, id)
            })
            .collect();
        assert_eq!(roots.len(), 2);
        assert!(roots.iter().all(|r| r.contains("8^(1/2)") || r.contains("2")), "got {roots:?}");
    }

    #[test]
    fn cubic_factors_through_rational_root() {
        // (x-1)(x-2)(x-3) = x^3 - 6x^2 + 11x - 6
        let coeffs = vec![rat(-6), rat(11), rat(-6), rat(1)];
        let mut ctx = Context::new();
        let mut roots: Vec<String> = numeric_roots(&coeffs, "x")
            .unwrap()
            .into_iter()
            .map(|r| {
                let id = r.into_expr(&mut ctx);
                render(&ctx, id)
            })
            .collect();
        roots.sort();
        assert_eq!(roots, vec!["1", "2", "3"]);
    }

    #[test]
    fn irreducible_cubic_declines() {
        // x^3 - 2 = 0 has no rational root.
        let coeffs = vec![rat(-2), rat(0), rat(0), rat(1)];
        assert!(matches!(
            numeric_roots(&coeffs, "x"),
            Err(SolveError::UnsolvableStrategy(_))
        ));
    }

    #[test]
    fn zero_polynomial_is_all_values() {
        let mut ctx = Context::new();
        let zero = ctx.num(0);
        let poly = as_polynomial(&mut ctx, "x", zero).unwrap();
        assert!(matches!(solve_poly(&mut ctx, &poly).unwrap(), PolyRoots::AllValues));
    }

    #[test]
    fn symbolic_linear_solves_by_division() {
        // a*x + b = 0 -> x = -b / a
        let mut ctx = Context::new();
        let a = ctx.var("a");
        let x = ctx.var("x");
        let b = ctx.var("b");
        let ax = ctx.add(Expr::Mul(a, x));
        let expr = ctx.add(Expr::Add(ax, b));
        let poly = as_polynomial(&mut ctx, "x", expr).unwrap();
        let PolyRoots::Roots(roots) = solve_poly(&mut ctx, &poly).unwrap() else {
            panic!("expected roots");
        };
        assert_eq!(roots.len(), 1);
        assert_eq!(render(&ctx, roots[0]), "-b / a");
    }
}
