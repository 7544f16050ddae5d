use criterion::{criterion_group, criterion_main, Criterion};
use ndarray::Array4;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use patch_eval::mask::generate_mask;
use patch_eval::normalize::Normalize;
use patch_eval::patch::{composite, ApplyPatch};
use patch_eval::transform::RandomAffine;
use pprof::criterion::{Output, PProfProfiler};
use rand::SeedableRng;
use rand_pcg::Pcg64;
use std::time::Duration;

fn bench(c: &mut Criterion) {
    let mut rng = Pcg64::seed_from_u64(69);
    let dist = Uniform::new(0f32, 1.);
    let batch = Array4::random_using((10, 3, 224, 224), dist, &mut rng);
    let patch = ndarray::Array3::random_using((3, 224, 224), dist, &mut rng);
    let mask = generate_mask((3, 224, 224), 50).unwrap();

    c.bench_function("mask::generate_mask 224@50", |b| {
        b.iter(|| generate_mask((3, 224, 224), 50).unwrap())
    });

    c.bench_function("patch::composite 10x3x224x224", |b| {
        b.iter(|| composite(batch.view(), &patch, &mask).unwrap())
    });

    let mut group = c.benchmark_group("apply_patch");
    group.measurement_time(Duration::from_secs(20));
    let applier = ApplyPatch::new(patch.clone(), 513, RandomAffine::default(), 50).unwrap();
    group.bench_function("apply_patch::apply random affine", |b| {
        b.iter(|| applier.apply(batch.view(), &mut rng).unwrap())
    });
    let normalizer = Normalize::imagenet();
    group.bench_function("apply_patch::apply + normalize", |b| {
        b.iter(|| {
            let adv = applier.apply(batch.view(), &mut rng).unwrap();
            normalizer.apply(adv.view()).unwrap()
        })
    });
    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default().with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)));
    targets = bench
}
criterion_main!(benches);
