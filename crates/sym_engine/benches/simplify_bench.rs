use criterion::{criterion_group, criterion_main, Criterion};
use sym_ast::{Expr, ExprId};
use sym_engine::Simplifier;

/// (x + 1)^6 expanded and re-simplified: exercises the multinomial path,
/// collection, and the fixpoint loop together.
fn expand_and_simplify(c: &mut Criterion) {
    c.bench_function("expand_simplify_binomial_pow6", |b| {
        b.iter(|| {
            let mut s = Simplifier::with_default_rules();
            let x = s.context.var("x");
            let one = s.context.num(1);
            let six = s.context.num(6);
            let sum = s.context.add(Expr::Add(x, one));
            let pow = s.context.add(Expr::Pow(sum, six));
            let expanded = s.multiply_out(pow);
            let _ = s.simplify(expanded);
        })
    });
}

fn deep_collection(c: &mut Criterion) {
    c.bench_function("collect_fifty_like_terms", |b| {
        b.iter(|| {
            let mut s = Simplifier::with_default_rules();
            let x = s.context.var("x");
            let mut sum: Option<ExprId> = None;
            for i in 1..=50 {
                let coeff = s.context.num(i);
                let term = s.context.add(Expr::Mul(coeff, x));
                sum = Some(match sum {
                    None => term,
                    Some(acc) => s.context.add(Expr::Add(acc, term)),
                });
            }
            let sum = sum.expect("nonempty");
            let _ = s.simplify(sum);
        })
    });
}

criterion_group!(benches, expand_and_simplify, deep_collection);
criterion_main!(benches);
