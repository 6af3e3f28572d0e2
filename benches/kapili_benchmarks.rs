//! Kapili RPC Benchmarks
//!
//! Benchmarks for the codec and the dispatch engine, using the Criterion framework.
//!
//! To run the benchmarks:
//! ```bash
//! cargo bench --features benchmarking
//! ```

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use criterion::{
    black_box, criterion_group, criterion_main, BenchmarkId, Criterion, SamplingMode, Throughput,
};
use tokio_util::sync::CancellationToken;

use kapili_rpc::protocol::jsonrpc::{codec, create_registry, Dispatcher};

fn batch_payload(size: usize) -> Bytes {
    let members: Vec<String> = (0..size)
        .map(|i| {
            format!(r#"{{"jsonrpc":"2.0","method":"Main.Echo","params":{{"name":"user-{i}"}},"id":{i}}}"#)
        })
        .collect();
    Bytes::from(format!("[{}]", members.join(",")))
}

/// Benchmark payload decoding
fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    group.sampling_mode(SamplingMode::Flat);
    group.measurement_time(Duration::from_secs(2));
    group.warm_up_time(Duration::from_secs(1));

    for size in [1, 10, 100] {
        let payload = batch_payload(size);
        group.throughput(Throughput::Bytes(payload.len() as u64));
        group.bench_with_input(BenchmarkId::new("decode_batch", size), &payload, |b, payload| {
            b.iter(|| codec::decode(black_box(payload), 0));
        });
    }

    group.finish();
}

/// Benchmark full dispatch through middleware and handler chains
fn bench_dispatch(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build runtime");
    let dispatcher = Dispatcher::new(Arc::new(create_registry().expect("registration failed")));

    let mut group = c.benchmark_group("dispatch");
    group.measurement_time(Duration::from_secs(2));
    group.warm_up_time(Duration::from_secs(1));

    let single = Bytes::from_static(
        br#"{"jsonrpc":"2.0","method":"Main.Positional","params":[3,1,1,3,5,3],"id":1}"#,
    );
    group.throughput(Throughput::Elements(1));
    group.bench_function("single_call", |b| {
        b.to_async(&runtime)
            .iter(|| dispatcher.handle(single.clone(), CancellationToken::new()));
    });

    for size in [10, 100] {
        let payload = batch_payload(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("batch", size), &payload, |b, payload| {
            b.to_async(&runtime)
                .iter(|| dispatcher.handle(payload.clone(), CancellationToken::new()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_codec, bench_dispatch);
criterion_main!(benches);
