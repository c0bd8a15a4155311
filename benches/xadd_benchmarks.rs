//! Benchmarks for the hot recursive paths: `apply`, `make_canonical`, and
//! `reduce_lp`, each exercised on a synthetic diagram built from a chain of
//! decisions rather than on any one real-world model.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use xadd_core::manager::XaddContext;
use xadd_core::{ApplyOp, Expr};

/// Builds `min(x0, min(x1, min(x2, ...)))` over `depth` variables, which
/// forces `apply`'s cofactor recursion through `depth` distinct decisions.
fn build_min_chain(ctx: &XaddContext, depth: usize) -> xadd_core::NodeId {
    let mut leaves: Vec<_> = (0..depth)
        .map(|i| ctx.intern_leaf(Expr::var(&format!("x{i}"))))
        .collect();
    let mut acc = leaves.pop().unwrap();
    while let Some(next) = leaves.pop() {
        acc = ctx.apply(next, acc, ApplyOp::Min).unwrap();
    }
    acc
}

fn bench_apply(c: &mut Criterion) {
    c.bench_function("apply_min_chain_depth_16", |b| {
        b.iter(|| {
            let ctx = XaddContext::new();
            black_box(build_min_chain(&ctx, 16))
        });
    });
}

fn bench_make_canonical(c: &mut Criterion) {
    c.bench_function("make_canonical_on_min_chain", |b| {
        b.iter(|| {
            let ctx = XaddContext::new();
            let id = build_min_chain(&ctx, 16);
            black_box(ctx.make_canonical(id).unwrap())
        });
    });
}

fn bench_reduce_lp(c: &mut Criterion) {
    c.bench_function("reduce_lp_on_min_chain", |b| {
        b.iter(|| {
            let ctx = XaddContext::new();
            let id = build_min_chain(&ctx, 8);
            black_box(ctx.reduce_lp_default(id, &[]))
        });
    });
}

criterion_group!(benches, bench_apply, bench_make_canonical, bench_reduce_lp);
criterion_main!(benches);
