//! Benchmarks for pattern generation, the mutation operators and the
//! parse/render path.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use tidal_gp::gp::{GrowthConfig, Operator, generate, generate_many_par};
use tidal_gp::grammar::{Catalog, parse, render};

const MEDIUM: &str = r#"overlay (stack [s("bd") # n "0 4", s("sn"), fast 2 (s("hh"))]) (euclid (3) (8) (s("cp") # n (scale "major" "0 2 4")))"#;

fn bench_generate(c: &mut Criterion) {
    let catalog = Catalog::default();
    let config = GrowthConfig::default();

    c.bench_function("generate_one", |b| {
        let mut rng = Xoshiro256StarStar::seed_from_u64(42);
        b.iter(|| black_box(generate(black_box(&config), &catalog, &mut rng)));
    });

    c.bench_function("generate_256_par", |b| {
        b.iter(|| black_box(generate_many_par(256, black_box(&config), &catalog, 42)));
    });
}

fn bench_operators(c: &mut Criterion) {
    let catalog = Catalog::default();
    let tree = parse(MEDIUM).unwrap();
    let mut group = c.benchmark_group("operator");

    for op in Operator::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(op), &tree, |b, tree| {
            let mut rng = Xoshiro256StarStar::seed_from_u64(7);
            b.iter(|| black_box(op.apply(black_box(tree), &catalog, &mut rng)));
        });
    }
    group.finish();
}

fn bench_parse_render(c: &mut Criterion) {
    let tree = parse(MEDIUM).unwrap();

    c.bench_function("parse_medium", |b| {
        b.iter(|| black_box(parse(black_box(MEDIUM))));
    });

    c.bench_function("render_medium", |b| {
        b.iter(|| black_box(render(black_box(&tree))));
    });
}

criterion_group!(benches, bench_generate, bench_operators, bench_parse_render);
criterion_main!(benches);
