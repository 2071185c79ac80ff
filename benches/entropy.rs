use core::hint::black_box;
use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::time::SystemTime;
use usid::{
    unix_ts_ms, EntropySource, FastRng, LockedRng, MachineEntropy, SecureEntropy, UsidMillis,
};

// Number of IDs generated per benchmark iteration.
const TOTAL_IDS: usize = 4096;

fn bench_source(c: &mut Criterion, group_name: &str, mut source: impl EntropySource) {
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{}", TOTAL_IDS), |b| {
        b.iter(|| {
            let ts = unix_ts_ms(SystemTime::now());
            for _ in 0..TOTAL_IDS {
                black_box(UsidMillis::must_new(black_box(ts), Some(&mut source)));
            }
        });
    });

    group.finish();
}

fn bench_no_entropy(c: &mut Criterion) {
    let mut group = c.benchmark_group("usid/none");
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{}", TOTAL_IDS), |b| {
        b.iter(|| {
            let ts = unix_ts_ms(SystemTime::now());
            for _ in 0..TOTAL_IDS {
                black_box(UsidMillis::must_new(black_box(ts), None));
            }
        });
    });

    group.finish();
}

fn bench_fast(c: &mut Criterion) {
    bench_source(c, "usid/fast", FastRng::new());
}

fn bench_locked(c: &mut Criterion) {
    bench_source(c, "usid/locked", LockedRng::new());
}

fn bench_secure(c: &mut Criterion) {
    bench_source(c, "usid/secure", SecureEntropy);
}

fn bench_machine(c: &mut Criterion) {
    bench_source(c, "usid/machine", MachineEntropy);
}

fn bench_global(c: &mut Criterion) {
    let mut group = c.benchmark_group("usid/global");
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{}", TOTAL_IDS), |b| {
        b.iter(|| {
            for _ in 0..TOTAL_IDS {
                black_box(usid::usid());
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_no_entropy,
    bench_fast,
    bench_locked,
    bench_secure,
    bench_machine,
    bench_global,
);
criterion_main!(benches);
