use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mpl_compiler_core::{compile, CompileCache, CompilerConfig};

/// A document with `n` poses cycled through one long animation.
fn synthetic(n: usize) -> String {
    let mut src = String::new();
    for i in 0..n {
        let angle = (i * 5) % 90;
        src.push_str(&format!(
            "@pose p{i} {{ arm_l bend forward {angle}, sway left 10; elbow_l bend forward {angle}; head turn left {}; }}\n",
            angle / 2
        ));
    }
    src.push_str("@animation loop {\n");
    for i in 0..n {
        src.push_str(&format!("  {}: p{i};\n", i as f64 * 0.1));
    }
    src.push_str("}\nmain { loop; loop; }\n");
    src
}

fn bench_compile(c: &mut Criterion) {
    let config = CompilerConfig::default();
    let wave = mpl_test_fixtures::documents::source("wave").expect("wave fixture");
    let large = synthetic(500);

    c.bench_function("compile_wave", |b| {
        b.iter(|| compile(black_box(&wave), &config).expect("compile"))
    });

    c.bench_function("compile_500_poses", |b| {
        b.iter(|| compile(black_box(&large), &config).expect("compile"))
    });

    let cache = CompileCache::new(config.clone()).expect("cache");
    c.bench_function("cache_hit_500_poses", |b| {
        b.iter(|| cache.get_or_compile(black_box(&large)).expect("compile"))
    });
}

criterion_group!(benches, bench_compile);
criterion_main!(benches);
