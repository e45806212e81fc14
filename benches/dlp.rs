use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ipfe_suite::{
    dlp::{bsgs, DlogGroup, GtGroup},
    group::ZpGroup,
};
use num_bigint_dig::BigUint;
use rand::Rng;

fn bench_bsgs(c: &mut Criterion) {
    let zp = ZpGroup::precomputed(2048).unwrap().unwrap();
    let gt = GtGroup::new();
    let mut group = c.benchmark_group("BSGS");
    for bound in [10u64.pow(4), 10u64.pow(6)] {
        let x = rand::thread_rng().gen_range(0..bound);
        let h = zp.exp_g(&BigUint::from(x));
        group.bench_with_input(BenchmarkId::new("Zp", bound), &bound, |b, &bound| {
            b.iter(|| bsgs::solve(&zp, &h, bound).unwrap())
        });
        let h = gt.pow(&gt.generator(), x);
        group.bench_with_input(BenchmarkId::new("Gt", bound), &bound, |b, &bound| {
            b.iter(|| bsgs::solve(&gt, &h, bound).unwrap())
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = bench_bsgs
);
criterion_main!(benches);
