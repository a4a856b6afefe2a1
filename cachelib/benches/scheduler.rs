use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use cachelib::config::SimulationConfig;
use cachelib::simulator::Simulator;
use cachelib::trace::Instruction;

/// A reproducible mix of loads, stores and short computes over a 64KiB working set
fn synthetic_trace(seed: u64, length: usize) -> Vec<Instruction> {
    let mut state = seed;
    (0..length)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let value = state >> 33;
            match value % 8 {
                0 => Instruction::Compute(value % 16 + 1),
                1 | 2 => Instruction::Store(value % 0x10000),
                _ => Instruction::Load(value % 0x10000),
            }
        })
        .collect()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Scheduler");

    for (cores, associativity) in [(1, 1), (1, 8), (4, 2)] {
        let config = SimulationConfig {
            associativity,
            ..SimulationConfig::new("MESI", "synthetic")
        };
        let traces: Vec<_> = (0..cores).map(|seed| synthetic_trace(seed, 20_000)).collect();
        let id = format!("{cores} core(s), {associativity}-way");
        group.bench_with_input(BenchmarkId::new("Synthetic", id), &(config, traces), |bench, (conf, traces)| {
            bench.iter(|| {
                Simulator::from_traces(conf, traces.clone()).unwrap().simulate().total_cycles
            });
        });
    }
}

criterion_group!(
    name = benches;
    config = Criterion::default().significance_level(0.1).sample_size(10);
    targets = criterion_benchmark
);
criterion_main!(benches);
