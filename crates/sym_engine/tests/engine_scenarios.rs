//! End-to-end scenarios over the engine's boundary operations.

use sym_ast::{Context, DisplayExpr, Expr, ExprId};
use sym_engine::{differentiate, evaluate_constants, multiply_out, EngineError, Simplifier};

fn render(ctx: &Context, id: ExprId) -> String {
    format!("{}", DisplayExpr { context: ctx, id })
}

#[test]
fn simplify_constant_product_with_symbol() {
    // a * 3 * 4 simplifies to 12 * a
    let mut s = Simplifier::with_default_rules();
    let a = s.context.var("a");
    let three = s.context.num(3);
    let four = s.context.num(4);
    let m1 = s.context.add(Expr::Mul(a, three));
    let m2 = s.context.add(Expr::Mul(m1, four));
    let out = s.simplify(m2).unwrap();
    assert_eq!(render(&s.context, out), "12 * a");
}

#[test]
fn simplify_handles_identities_and_annihilators() {
    let mut s = Simplifier::with_default_rules();
    let x = s.context.var("x");
    let zero = s.context.num(0);
    let one = s.context.num(1);

    let a = s.context.add(Expr::Add(x, zero));
    assert_eq!(s.simplify(a).unwrap(), x);

    let m = s.context.add(Expr::Mul(x, one));
    assert_eq!(s.simplify(m).unwrap(), x);

    let z = s.context.add(Expr::Mul(x, zero));
    let z_out = s.simplify(z).unwrap();
    assert_eq!(render(&s.context, z_out), "0");

    let p = s.context.add(Expr::Pow(x, one));
    assert_eq!(s.simplify(p).unwrap(), x);

    let d = s.context.add(Expr::Div(x, one));
    assert_eq!(s.simplify(d).unwrap(), x);

    let sub = s.context.add(Expr::Sub(x, zero));
    assert_eq!(s.simplify(sub).unwrap(), x);
}

#[test]
fn simplify_cancels_inverse_terms() {
    // x + 2x + (-2x) -> x
    let mut s = Simplifier::with_default_rules();
    let x = s.context.var("x");
    let two = s.context.num(2);
    let two_x = s.context.add(Expr::Mul(two, x));
    let neg_two_x = s.context.add(Expr::Neg(two_x));
    let sum1 = s.context.add(Expr::Add(x, two_x));
    let sum2 = s.context.add(Expr::Add(sum1, neg_two_x));
    let out = s.simplify(sum2).unwrap();
    assert_eq!(render(&s.context, out), "x");
}

#[test]
fn multiply_out_expands_binomial_power() {
    let mut ctx = Context::new();
    let x = ctx.var("x");
    let one = ctx.num(1);
    let three = ctx.num(3);
    let sum = ctx.add(Expr::Add(x, one));
    let cube = ctx.add(Expr::Pow(sum, three));
    let out = multiply_out(&mut ctx, cube);
    assert_eq!(render(&ctx, out), "x^3 + 3 * x^2 + 3 * x + 1");
}

#[test]
fn expand_then_simplify_contracts_differences() {
    // (x+1)^2 - (x^2 + 2x) simplifies to 1 after expansion.
    let mut s = Simplifier::with_default_rules();
    let x = s.context.var("x");
    let one = s.context.num(1);
    let two = s.context.num(2);
    let sum = s.context.add(Expr::Add(x, one));
    let squared = s.context.add(Expr::Pow(sum, two));
    let x_sq = s.context.add(Expr::Pow(x, two));
    let two_x = s.context.add(Expr::Mul(two, x));
    let rest = s.context.add(Expr::Add(x_sq, two_x));
    let diff = s.context.add(Expr::Sub(squared, rest));

    let expanded = s.multiply_out(diff);
    let out = s.simplify(expanded).unwrap();
    assert_eq!(render(&s.context, out), "1");
}

#[test]
fn evaluate_constants_folds_mixed_chain() {
    let mut ctx = Context::new();
    let x = ctx.var("x");
    let two = ctx.num(2);
    let five = ctx.num(5);
    let sum1 = ctx.add(Expr::Add(two, x));
    let sum2 = ctx.add(Expr::Add(sum1, five));
    let out = evaluate_constants(&mut ctx, sum2);
    assert_eq!(render(&ctx, out), "7 + x");
}

#[test]
fn ratio_failure_is_a_typed_outcome() {
    let mut s = Simplifier::with_default_rules();
    let x = s.context.var("x");
    let sin = s.context.func("sin", vec![x]);
    let cos = s.context.func("cos", vec![x]);
    let sum = s.context.add(Expr::Add(sin, cos));
    let err = s
        .simplify_with_options(sum, sym_engine::SimplifyOptions { ratio: 0.2, max_passes: 8 })
        .unwrap_err();
    match err {
        EngineError::RatioNotMet { budget, achieved } => {
            assert!(achieved > budget);
        }
        other => panic!("expected RatioNotMet, got {other:?}"),
    }
}

#[test]
fn polynomial_normal_form_spots_disguised_structure() {
    let mut s = Simplifier::with_default_rules();
    // (x+1)*(x-1) -> -1 + x^2 in normal form.
    let x = s.context.var("x");
    let one = s.context.num(1);
    let plus = s.context.add(Expr::Add(x, one));
    let minus = s.context.add(Expr::Sub(x, one));
    let prod = s.context.add(Expr::Mul(plus, minus));
    let nf = s.to_polynomial_normal_form("x", prod).unwrap();
    assert_eq!(render(&s.context, nf), "-1 + x^2");
}

#[test]
fn fifth_derivative_collapses_to_a_constant() {
    // d^5/dx^5 (2x^3 + 4x^5) = 480, checked at the float boundary too.
    let mut s = Simplifier::with_default_rules();
    let x = s.context.var("x");
    let two = s.context.num(2);
    let three = s.context.num(3);
    let four = s.context.num(4);
    let five = s.context.num(5);
    let x3 = s.context.add(Expr::Pow(x, three));
    let x5 = s.context.add(Expr::Pow(x, five));
    let t1 = s.context.add(Expr::Mul(two, x3));
    let t2 = s.context.add(Expr::Mul(four, x5));
    let sum = s.context.add(Expr::Add(t1, t2));

    let d5 = differentiate(&mut s.context, &["x", "x", "x", "x", "x"], sum);
    let out = s.simplify(d5).unwrap();
    assert_eq!(render(&s.context, out), "480");

    let val = sym_engine::eval_f64(&s.context, out, &std::collections::HashMap::new()).unwrap();
    assert!((val - 480.0).abs() < 1e-9);
}

#[test]
fn inner_product_of_vectors_evaluates() {
    let mut s = Simplifier::with_default_rules();
    let d1 = vec![s.context.num(1), s.context.num(2), s.context.num(3)];
    let d2 = vec![s.context.num(4), s.context.num(5), s.context.num(6)];
    let row = s.context.matrix(1, 3, d1).unwrap();
    let col = s.context.matrix(3, 1, d2).unwrap();
    let prod = s.context.add(Expr::Mul(row, col));
    let out = s.simplify(prod).unwrap();
    // 1*4 + 2*5 + 3*6 = 32
    assert_eq!(render(&s.context, out), "32");
}

#[test]
fn matrix_sum_simplifies_cell_wise() {
    let mut s = Simplifier::with_default_rules();
    let x = s.context.var("x");
    let d1 = vec![s.context.num(1), x];
    let d2 = vec![s.context.num(2), x];
    let m1 = s.context.matrix(1, 2, d1).unwrap();
    let m2 = s.context.matrix(1, 2, d2).unwrap();
    let sum = s.context.add(Expr::Add(m1, m2));
    let out = s.simplify(sum).unwrap();
    assert_eq!(render(&s.context, out), "[[3, 2 * x]]");
}
