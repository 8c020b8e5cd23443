use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use hasher::fuzzy_hash;

fn bench_fuzzy_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("fuzzy_hash");

    for size in [4_096, 65_536, 1_048_576].iter() {
        let data = "the quick brown fox jumps over the lazy dog. ".repeat(size / 40 + 1);
        let data = data.as_bytes()[..*size.min(&data.len())].to_vec();
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_function(format!("bytes_{size}"), |b| {
            b.iter(|| fuzzy_hash(black_box(&data)).expect("fuzzy_hash"))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_fuzzy_hash);
criterion_main!(benches);
