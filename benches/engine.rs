//! Engine throughput benchmarks (Criterion).
//!
//! Run: `cargo bench` or `cargo bench --bench engine`.

use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use tickbook::market_data_gen::{replay_into_engine, Command, Generator, GeneratorConfig};
use tickbook::{MatchingEngine, OrderId, Price, Quantity};

fn add_only_config(seed: u64, num_commands: usize) -> GeneratorConfig {
    GeneratorConfig {
        seed,
        num_commands,
        cancel_ratio: 0.0,
        modify_ratio: 0.0,
        ..Default::default()
    }
}

fn resting_book(seed: u64, orders: usize) -> (MatchingEngine, Vec<(OrderId, Quantity, Price)>) {
    let mut engine = MatchingEngine::new();
    let commands = Generator::new(add_only_config(seed, orders)).all_commands();
    let mut submitted = Vec::with_capacity(orders);
    for command in &commands {
        if let Command::Add {
            id,
            quantity,
            price,
            ..
        } = command
        {
            submitted.push((*id, *quantity, *price));
        }
    }
    replay_into_engine(&mut engine, commands);
    (engine, submitted)
}

fn bench_add_order_throughput(c: &mut Criterion) {
    const N: usize = 1000;
    let mut group = c.benchmark_group("engine");
    group.throughput(Throughput::Elements(N as u64));
    group.bench_function("add_order_1000", |b| {
        b.iter_batched(
            || {
                let engine = MatchingEngine::new();
                let commands = Generator::new(add_only_config(42, N)).all_commands();
                (engine, commands)
            },
            |(mut engine, commands)| {
                replay_into_engine(&mut engine, commands);
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_cancel_order(c: &mut Criterion) {
    const RESTING: usize = 500;
    const CANCELS: usize = 100;
    let mut group = c.benchmark_group("engine");
    group.throughput(Throughput::Elements(CANCELS as u64));
    group.bench_function("cancel_order_100_after_500_resting", |b| {
        b.iter_batched(
            || {
                let (engine, submitted) = resting_book(123, RESTING);
                let ids: Vec<OrderId> = submitted[..CANCELS].iter().map(|(id, _, _)| *id).collect();
                (engine, ids)
            },
            |(mut engine, ids)| {
                for id in ids {
                    let _ = engine.cancel_order(id);
                }
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_modify_order(c: &mut Criterion) {
    const RESTING: usize = 200;
    const MODIFIES: usize = 50;
    let mut group = c.benchmark_group("engine");
    group.throughput(Throughput::Elements(MODIFIES as u64));
    group.bench_function("modify_order_50_after_200_resting", |b| {
        b.iter_batched(
            || {
                let (engine, submitted) = resting_book(456, RESTING);
                let targets: Vec<(OrderId, Quantity, Price)> = submitted[..MODIFIES]
                    .iter()
                    .map(|(id, qty, price)| (*id, *qty, price + 1))
                    .collect();
                (engine, targets)
            },
            |(mut engine, targets)| {
                for (id, qty, price) in targets {
                    let _ = engine.modify_order(id, qty, price);
                }
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_add_order_throughput,
    bench_cancel_order,
    bench_modify_order
);
criterion_main!(benches);
