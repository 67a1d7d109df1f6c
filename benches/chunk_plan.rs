use std::num::NonZeroU64;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use gridstore::array::plan_chunk_shape;

fn chunk_plan(c: &mut Criterion) {
    let item_nbytes = NonZeroU64::new(4).unwrap();
    let mut group = c.benchmark_group("plan_chunk_shape");
    for rank in [1usize, 2, 3, 4] {
        let data_shape = vec![1024u64; rank];
        group.bench_function(BenchmarkId::new("rank", rank), |b| {
            b.iter(|| plan_chunk_shape(&data_shape, item_nbytes, None, None));
        });
    }
    group.finish();
}

criterion_group!(benches, chunk_plan);
criterion_main!(benches);
