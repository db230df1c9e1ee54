//! Recursive univariate polynomial form with expression coefficients.
//!
//! A `Poly` is a coefficient vector over a *kernel*: either the main
//! symbol itself or a recognized substitution kernel `b^x`. Coefficients
//! are arbitrary kernel-free expressions, so `a*x^2 + sin(b)*x + 1` is a
//! polynomial in `x` even though its coefficients are symbolic. The
//! substitution-kernel recognition (`b^(2x)` as `(b^x)^2`, `b^(x+1)` as
//! `b * b^x`) is what the solver's exponential strategy reuses.

use crate::const_fold::evaluate_constants;
use crate::error::EngineError;
use crate::nary::{AddView, MulView};
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use sym_ast::traversal::contains_var;
use sym_ast::{Context, Expr, ExprId};

/// Largest structural power the converter will expand.
const MAX_POLY_POW: i64 = 64;

/// What the polynomial is expressed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolyKernel {
    /// The main symbol itself.
    Symbol(String),
    /// The substitution kernel `base^var` with a var-free base.
    Exponential { base: ExprId, var: String },
}

impl PolyKernel {
    pub fn var(&self) -> &str {
        match self {
            PolyKernel::Symbol(v) => v,
            PolyKernel::Exponential { var, .. } => var,
        }
    }

    pub fn to_expr(&self, ctx: &mut Context) -> ExprId {
        match self {
            PolyKernel::Symbol(v) => ctx.var(v),
            PolyKernel::Exponential { base, var } => {
                let v = ctx.var(var);
                ctx.add(Expr::Pow(*base, v))
            }
        }
    }
}

/// Polynomial in ascending-power coefficient form. Trailing zero
/// coefficients are trimmed; the zero polynomial has no coefficients.
#[derive(Debug, Clone)]
pub struct Poly {
    pub kernel: PolyKernel,
    pub coeffs: Vec<ExprId>,
}

impl Poly {
    pub fn zero(kernel: PolyKernel) -> Self {
        Poly { kernel, coeffs: vec![] }
    }

    pub fn constant(ctx: &Context, kernel: PolyKernel, value: ExprId) -> Self {
        let mut p = Poly { kernel, coeffs: vec![value] };
        p.trim(ctx);
        p
    }

    pub fn identity(ctx: &mut Context, kernel: PolyKernel) -> Self {
        let zero = ctx.num(0);
        let one = ctx.num(1);
        Poly { kernel, coeffs: vec![zero, one] }
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    pub fn leading(&self, ctx: &mut Context) -> ExprId {
        match self.coeffs.last() {
            Some(&c) => c,
            None => ctx.num(0),
        }
    }

    fn trim(&mut self, ctx: &Context) {
        while let Some(&last) = self.coeffs.last() {
            if is_zero_expr(ctx, last) {
                self.coeffs.pop();
            } else {
                break;
            }
        }
    }

    pub fn add(&self, other: &Self, ctx: &mut Context) -> Self {
        let len = self.coeffs.len().max(other.coeffs.len());
        let mut coeffs = Vec::with_capacity(len);
        for i in 0..len {
            let a = self.coeffs.get(i).copied();
            let b = other.coeffs.get(i).copied();
            let c = match (a, b) {
                (Some(a), Some(b)) => coeff_fold(ctx, Expr::Add(a, b)),
                (Some(a), None) => a,
                (None, Some(b)) => b,
                (None, None) => ctx.num(0),
            };
            coeffs.push(c);
        }
        let mut p = Poly { kernel: self.kernel.clone(), coeffs };
        p.trim(ctx);
        p
    }

    pub fn sub(&self, other: &Self, ctx: &mut Context) -> Self {
        let negated = other.neg(ctx);
        self.add(&negated, ctx)
    }

    pub fn neg(&self, ctx: &mut Context) -> Self {
        let coeffs = self
            .coeffs
            .iter()
            .map(|&c| coeff_fold(ctx, Expr::Neg(c)))
            .collect();
        Poly { kernel: self.kernel.clone(), coeffs }
    }

    pub fn mul(&self, other: &Self, ctx: &mut Context) -> Self {
        if self.is_zero() || other.is_zero() {
            return Poly::zero(self.kernel.clone());
        }
        let len = self.coeffs.len() + other.coeffs.len() - 1;
        let zero = ctx.num(0);
        let mut coeffs = vec![zero; len];
        for (i, &a) in self.coeffs.iter().enumerate() {
            for (j, &b) in other.coeffs.iter().enumerate() {
                let prod = ctx.add(Expr::Mul(a, b));
                let sum = ctx.add(Expr::Add(coeffs[i + j], prod));
                coeffs[i + j] = evaluate_constants(ctx, sum);
            }
        }
        let mut p = Poly { kernel: self.kernel.clone(), coeffs };
        p.trim(ctx);
        p
    }

    pub fn pow(&self, n: usize, ctx: &mut Context) -> Self {
        let one = ctx.num(1);
        let mut result = Poly::constant(ctx, self.kernel.clone(), one);
        for _ in 0..n {
            result = result.mul(self, ctx);
        }
        result
    }

    /// Scale every coefficient by `1 / divisor` (kernel-free divisor).
    pub fn scale_div(&self, divisor: ExprId, ctx: &mut Context) -> Self {
        let coeffs = self
            .coeffs
            .iter()
            .map(|&c| coeff_fold(ctx, Expr::Div(c, divisor)))
            .collect();
        let mut p = Poly { kernel: self.kernel.clone(), coeffs };
        p.trim(ctx);
        p
    }

    /// Exact numeric coefficients, when every coefficient is a number.
    pub fn numeric_coeffs(&self, ctx: &Context) -> Option<Vec<BigRational>> {
        self.coeffs
            .iter()
            .map(|&c| match ctx.get(c) {
                Expr::Number(n) => Some(n.clone()),
                _ => ctx.as_number(c),
            })
            .collect()
    }

    /// Canonical sum-of-power-terms form, ascending in the kernel, each
    /// power at most once.
    pub fn to_expr(&self, ctx: &mut Context) -> ExprId {
        if self.is_zero() {
            return ctx.num(0);
        }
        let kernel = self.kernel.to_expr(ctx);
        let mut acc: Option<ExprId> = None;
        for (power, &coeff) in self.coeffs.iter().enumerate() {
            if is_zero_expr(ctx, coeff) {
                continue;
            }
            let term = monomial(ctx, coeff, kernel, power);
            acc = Some(match acc {
                None => term,
                Some(prev) => ctx.add(Expr::Add(prev, term)),
            });
        }
        acc.unwrap_or_else(|| ctx.num(0))
    }
}

fn monomial(ctx: &mut Context, coeff: ExprId, kernel: ExprId, power: usize) -> ExprId {
    if power == 0 {
        return coeff;
    }
    let pow_part = if power == 1 {
        kernel
    } else {
        let p = ctx.num(power as i64);
        ctx.add(Expr::Pow(kernel, p))
    };
    match ctx.get(coeff) {
        Expr::Number(n) if n.is_one() => pow_part,
        Expr::Number(n) if (-n).is_one() => ctx.add(Expr::Neg(pow_part)),
        _ => ctx.add(Expr::Mul(coeff, pow_part)),
    }
}

fn is_zero_expr(ctx: &Context, id: ExprId) -> bool {
    matches!(ctx.get(id), Expr::Number(n) if n.is_zero())
}

fn coeff_fold(ctx: &mut Context, expr: Expr) -> ExprId {
    let id = ctx.add(expr);
    evaluate_constants(ctx, id)
}

/// Convert `expr` into a polynomial in the plain symbol `var`.
pub fn as_polynomial(ctx: &mut Context, var: &str, expr: ExprId) -> Result<Poly, EngineError> {
    let kernel = PolyKernel::Symbol(var.to_string());
    convert(ctx, &kernel, expr)
}

/// Convert `expr` into a polynomial in an explicit kernel.
pub fn as_polynomial_in_kernel(
    ctx: &mut Context,
    kernel: &PolyKernel,
    expr: ExprId,
) -> Result<Poly, EngineError> {
    convert(ctx, kernel, expr)
}

fn not_poly(kernel: &PolyKernel) -> EngineError {
    EngineError::NotPolynomial(kernel.var().to_string())
}

fn convert(ctx: &mut Context, kernel: &PolyKernel, expr: ExprId) -> Result<Poly, EngineError> {
    let var = kernel.var();
    if !contains_var(ctx, expr, var) {
        return Ok(Poly::constant(ctx, kernel.clone(), expr));
    }

    match ctx.get(expr).clone() {
        Expr::Variable(v) => {
            if let PolyKernel::Symbol(kv) = kernel {
                if &v == kv {
                    return Ok(Poly::identity(ctx, kernel.clone()));
                }
            }
            // The variable occurs outside the exponential kernel.
            Err(not_poly(kernel))
        }
        Expr::Add(l, r) => {
            let pl = convert(ctx, kernel, l)?;
            let pr = convert(ctx, kernel, r)?;
            Ok(pl.add(&pr, ctx))
        }
        Expr::Sub(l, r) => {
            let pl = convert(ctx, kernel, l)?;
            let pr = convert(ctx, kernel, r)?;
            Ok(pl.sub(&pr, ctx))
        }
        Expr::Neg(inner) => {
            let p = convert(ctx, kernel, inner)?;
            Ok(p.neg(ctx))
        }
        Expr::Mul(l, r) => {
            let pl = convert(ctx, kernel, l)?;
            let pr = convert(ctx, kernel, r)?;
            Ok(pl.mul(&pr, ctx))
        }
        Expr::Div(l, r) => {
            if contains_var(ctx, r, var) {
                // A kernel occurrence in a denominator is irreducible here.
                return Err(not_poly(kernel));
            }
            let p = convert(ctx, kernel, l)?;
            Ok(p.scale_div(r, ctx))
        }
        Expr::Pow(base, exp) => convert_pow(ctx, kernel, base, exp),
        // The variable sits inside a transcendental argument or a matrix.
        Expr::Function(_, _) | Expr::Matrix { .. } => Err(not_poly(kernel)),
        Expr::Number(_) | Expr::Constant(_) => unreachable!("kernel-free atoms handled above"),
    }
}

fn convert_pow(
    ctx: &mut Context,
    kernel: &PolyKernel,
    base: ExprId,
    exp: ExprId,
) -> Result<Poly, EngineError> {
    let var = kernel.var();

    // Substitution kernel: base^exponent with matching base and an
    // exponent linear in the variable. b^(n*x + m) = b^m * (b^x)^n.
    if let PolyKernel::Exponential { base: kbase, .. } = kernel {
        if base == *kbase && contains_var(ctx, exp, var) {
            let (n, m) = linear_integer_exponent(ctx, exp, var).ok_or_else(|| not_poly(kernel))?;
            if n <= 0 {
                return Err(not_poly(kernel));
            }
            let coeff = if m.is_zero() {
                ctx.num(1)
            } else {
                let m_expr = ctx.rational(m);
                let pow = ctx.add(Expr::Pow(base, m_expr));
                evaluate_constants(ctx, pow)
            };
            let mut coeffs = vec![ctx.num(0); n as usize + 1];
            coeffs[n as usize] = coeff;
            let mut p = Poly { kernel: kernel.clone(), coeffs };
            p.trim(ctx);
            return Ok(p);
        }
    }

    // Structural power of a polynomial base.
    if contains_var(ctx, base, var) {
        let n = match ctx.get(exp) {
            Expr::Number(n) if n.is_integer() && !n.is_negative() => n.to_integer().to_i64(),
            _ => None,
        };
        let n = n.filter(|&n| n <= MAX_POLY_POW).ok_or_else(|| not_poly(kernel))?;
        let p = convert(ctx, kernel, base)?;
        return Ok(p.pow(n as usize, ctx));
    }

    // Variable in the exponent of a non-kernel base.
    Err(not_poly(kernel))
}

/// Decompose `exp` as `n*var + m` with integer `n` and numeric `m`.
fn linear_integer_exponent(ctx: &Context, exp: ExprId, var: &str) -> Option<(i64, BigRational)> {
    let view = AddView::from_expr(ctx, exp);
    let mut n: i64 = 0;
    let mut m = BigRational::zero();
    for (term, sign) in &view.terms {
        let factor = if sign.is_negative() { -1i64 } else { 1i64 };
        match ctx.get(*term) {
            Expr::Number(k) => {
                let k = k.clone();
                m += if factor < 0 { -k } else { k };
            }
            Expr::Variable(v) if v == var => n += factor,
            _ => {
                // c * var with integer c
                let mul = MulView::from_expr(ctx, *term);
                let mut coeff = BigRational::from_integer(1.into());
                let mut var_count = 0usize;
                for f in &mul.factors {
                    match ctx.get(*f) {
                        Expr::Number(k) => coeff *= k,
                        Expr::Variable(v) if v == var => var_count += 1,
                        _ => return None,
                    }
                }
                if var_count != 1 || !coeff.is_integer() {
                    return None;
                }
                let k = coeff.to_integer().to_i64()?;
                let k = if mul.negated { -k } else { k };
                n += k * factor;
            }
        }
    }
    Some((n, m))
}

/// Find a substitution base `b` such that every occurrence of `var` in
/// `expr` sits inside a term `b^(linear in var)`. Returns the base.
pub fn detect_exponential_kernel(ctx: &Context, var: &str, expr: ExprId) -> Option<ExprId> {
    let mut bases: Vec<ExprId> = Vec::new();
    if !scan_kernel(ctx, var, expr, &mut bases) {
        return None;
    }
    let first = *bases.first()?;
    if bases.iter().all(|&b| b == first) {
        Some(first)
    } else {
        None
    }
}

/// True when every occurrence of `var` below `expr` is covered by an
/// exponential kernel term; collects the bases seen.
fn scan_kernel(ctx: &Context, var: &str, expr: ExprId, bases: &mut Vec<ExprId>) -> bool {
    if !contains_var(ctx, expr, var) {
        return true;
    }
    match ctx.get(expr) {
        Expr::Variable(_) => false,
        Expr::Pow(base, exp) => {
            if !contains_var(ctx, *base, var)
                && contains_var(ctx, *exp, var)
                && linear_integer_exponent(ctx, *exp, var).is_some()
            {
                bases.push(*base);
                true
            } else {
                scan_kernel(ctx, var, *base, bases) && scan_kernel(ctx, var, *exp, bases)
            }
        }
        Expr::Add(l, r) | Expr::Sub(l, r) | Expr::Mul(l, r) | Expr::Div(l, r) => {
            scan_kernel(ctx, var, *l, bases) && scan_kernel(ctx, var, *r, bases)
        }
        Expr::Neg(inner) => scan_kernel(ctx, var, *inner, bases),
        // An occurrence inside a function argument or matrix cell is not
        // covered by the exponential kernel.
        Expr::Function(_, _) | Expr::Matrix { .. } => false,
        Expr::Number(_) | Expr::Constant(_) => true,
    }
}

impl crate::simplifier::Simplifier {
    /// Canonical polynomial normal form in `var`: ascending powers, each
    /// power at most once, coefficients simplified.
    pub fn to_polynomial_normal_form(
        &mut self,
        var: &str,
        expr: ExprId,
    ) -> Result<ExprId, EngineError> {
        let mut poly = as_polynomial(&mut self.context, var, expr)?;
        let permissive = crate::simplifier::SimplifyOptions::with_ratio(8.0);
        for coeff in poly.coeffs.iter_mut() {
            if let Ok(simplified) = self.simplify_with_options(*coeff, permissive) {
                *coeff = simplified;
            }
        }
        Ok(poly.to_expr(&mut self.context))
    }
}
