use criterion::{black_box, criterion_group, criterion_main, Criterion};
use drmreg::{IoctlCode, Registry};

pub fn bench_build(c: &mut Criterion) {
    c.bench_function("build_x86_64", |b| {
        b.iter(|| Registry::for_target(black_box("x86_64")))
    });
}

pub fn bench_lookup(c: &mut Criterion) {
    let registry = Registry::for_target("x86_64").unwrap();
    c.bench_function("lookup", |b| {
        b.iter(|| registry.lookup(black_box("MODE_ATOMIC")))
    });
    c.bench_function("decode", |b| {
        b.iter(|| registry.decode(black_box(IoctlCode::new(0xc038_64bc))))
    });
    c.bench_function("combine", |b| {
        b.iter(|| registry.combine("atomic_flag", black_box(&["TEST_ONLY", "NONBLOCK"])))
    });
}

criterion_group!(benches, bench_build, bench_lookup);
criterion_main!(benches);
