//! Exact numeric kernels shared by the constant folder and the rule set.

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

/// Outcome of folding a purely numeric operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumericFold {
    Exact(BigRational),
    Undefined,
}

/// Largest integer exponent the folder will expand. Beyond this the node
/// is left symbolic rather than materializing a huge rational.
const MAX_FOLD_EXP: i64 = 4096;

/// Fold `base ^ exp` exactly when possible.
///
/// Integer exponents fold directly; fractional exponents fold only when
/// the base has an exact rational root (perfect powers), so `9^(1/2)`
/// folds to `3` while `2^(1/2)` stays symbolic.
pub fn pow_rational(base: &BigRational, exp: &BigRational) -> Option<NumericFold> {
    if exp.is_integer() {
        let e = exp.to_integer().to_i64()?;
        if base.is_zero() {
            // 0^0 and 0^negative are undefined; 0^positive is 0.
            return Some(if e > 0 {
                NumericFold::Exact(BigRational::zero())
            } else {
                NumericFold::Undefined
            });
        }
        if e.abs() > MAX_FOLD_EXP {
            return None;
        }
        return Some(NumericFold::Exact(base.pow(e.to_i32()?)));
    }

    // base^(p/q): fold only for an exact q-th root.
    let p = exp.numer().to_i64()?;
    let q = exp.denom().to_u32()?;
    if base.is_zero() {
        return Some(if p > 0 {
            NumericFold::Exact(BigRational::zero())
        } else {
            NumericFold::Undefined
        });
    }
    // Even roots of negatives have no real value.
    if base.is_negative() && q.is_even() {
        return Some(NumericFold::Undefined);
    }
    let root = rational_root(base, q)?;
    if p.abs() > MAX_FOLD_EXP {
        return None;
    }
    if p < 0 && root.is_zero() {
        return Some(NumericFold::Undefined);
    }
    Some(NumericFold::Exact(root.pow(p.to_i32()?)))
}

/// Exact `q`-th root of a rational, when one exists.
pub fn rational_root(n: &BigRational, q: u32) -> Option<BigRational> {
    if q == 0 {
        return None;
    }
    if n.is_negative() && q.is_even() {
        return None;
    }
    let numer = int_root(n.numer(), q)?;
    let denom = int_root(n.denom(), q)?;
    Some(BigRational::new(numer, denom))
}

fn int_root(n: &BigInt, q: u32) -> Option<BigInt> {
    use num_integer::Roots;
    if n.is_negative() {
        // Odd roots of negatives: root through the magnitude.
        let mag = int_root(&-n, q)?;
        return Some(-mag);
    }
    let root = n.nth_root(q);
    if num_traits::pow(root.clone(), q as usize) == *n {
        Some(root)
    } else {
        None
    }
}

/// Fold `numer / denom`, mapping division by exact zero to undefined.
pub fn div_rational(numer: &BigRational, denom: &BigRational) -> NumericFold {
    if denom.is_zero() {
        NumericFold::Undefined
    } else {
        NumericFold::Exact(numer / denom)
    }
}

/// Integer divisors of `|n|` in ascending order. Root-candidate
/// enumeration for the solver's rational-root scan.
pub fn divisors(n: &BigInt) -> Vec<BigInt> {
    let n = n.abs();
    if n.is_zero() {
        return vec![];
    }
    let mut small = Vec::new();
    let mut large = Vec::new();
    let mut d = BigInt::one();
    while &d * &d <= n {
        if (&n % &d).is_zero() {
            small.push(d.clone());
            let other = &n / &d;
            if other != d {
                large.push(other);
            }
        }
        d += 1u32;
        // Candidate scans only make sense for small constants.
        if small.len() + large.len() > 64 {
            break;
        }
    }
    large.reverse();
    small.extend(large);
    small
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rat(n: i64) -> BigRational {
        BigRational::from_integer(n.into())
    }

    fn frac(n: i64, d: i64) -> BigRational {
        BigRational::new(n.into(), d.into())
    }

    #[test]
    fn integer_pow_folds() {
        assert_eq!(
            pow_rational(&rat(2), &rat(10)),
            Some(NumericFold::Exact(rat(1024)))
        );
        assert_eq!(
            pow_rational(&rat(2), &rat(-2)),
            Some(NumericFold::Exact(frac(1, 4)))
        );
    }

    #[test]
    fn zero_base_edge_cases() {
        assert_eq!(pow_rational(&rat(0), &rat(0)), Some(NumericFold::Undefined));
        assert_eq!(pow_rational(&rat(0), &rat(-1)), Some(NumericFold::Undefined));
        assert_eq!(
            pow_rational(&rat(0), &rat(3)),
            Some(NumericFold::Exact(rat(0)))
        );
    }

    #[test]
    fn even_root_of_negative_is_undefined() {
        assert_eq!(
            pow_rational(&rat(-4), &frac(1, 2)),
            Some(NumericFold::Undefined)
        );
    }

    #[test]
    fn perfect_roots_fold() {
        assert_eq!(
            pow_rational(&rat(9), &frac(1, 2)),
            Some(NumericFold::Exact(rat(3)))
        );
        assert_eq!(
            pow_rational(&rat(8), &frac(2, 3)),
            Some(NumericFold::Exact(rat(4)))
        );
        assert_eq!(
            pow_rational(&rat(-8), &frac(1, 3)),
            Some(NumericFold::Exact(rat(-2)))
        );
        assert_eq!(pow_rational(&rat(2), &frac(1, 2)), None);
    }

    #[test]
    fn division_by_zero_is_undefined() {
        assert_eq!(div_rational(&rat(1), &rat(0)), NumericFold::Undefined);
        assert_eq!(div_rational(&rat(6), &rat(3)), NumericFold::Exact(rat(2)));
    }

    #[test]
    fn divisor_enumeration() {
        let d: Vec<i64> = divisors(&BigInt::from(12))
            .into_iter()
            .map(|b| b.to_i64().unwrap())
            .collect();
        assert_eq!(d, vec![1, 2, 3, 4, 6, 12]);
    }
}
