use criterion::{criterion_group, criterion_main, Criterion};
use taskpool::Pool;

fn run_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("run");

    for concurrency in [1u32, 2, 4, 8] {
        group.bench_function(format!("workers_{concurrency}"), |b| {
            b.iter_batched(
                || {
                    let pool = Pool::<String>::new(concurrency).unwrap();
                    for _ in 0..100 {
                        pool.add(|| Ok(()));
                    }
                    pool
                },
                |pool| pool.run().unwrap(),
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn failure_collection_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("failures");

    group.bench_function("half_failing", |b| {
        b.iter_batched(
            || {
                let pool = Pool::new(4).unwrap();
                for i in 0..100 {
                    if i % 2 == 0 {
                        pool.add(move || Err(format!("task {i}")));
                    } else {
                        pool.add(|| Ok(()));
                    }
                }
                pool
            },
            |pool| pool.run().unwrap(),
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, run_bench, failure_collection_bench);
criterion_main!(benches);
