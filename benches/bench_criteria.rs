use std::time::Duration;

use benchstop::{
    EntropyCriterion, ParamBag, StdRelCriterion, StoppingCriterion,
    bench_utils::{Workload, generate_durations},
};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

const SEED: u64 = 0xE27A;
const SAMPLE_SIZE: usize = 20;
const WARM_UP: Duration = Duration::from_millis(300);
const MEASURE: Duration = Duration::from_millis(500);

fn run_lengths() -> &'static [usize] {
    #[cfg(feature = "bench-ci")]
    {
        &[100, 500]
    }
    #[cfg(not(feature = "bench-ci"))]
    {
        &[100, 1_000, 5_000]
    }
}

fn workloads() -> Vec<(&'static str, Workload)> {
    vec![
        ("steady", Workload::Steady { mean_s: 1e-3 }),
        (
            "noisy",
            Workload::Noisy {
                mean_s: 1e-3,
                jitter: 0.05,
            },
        ),
        (
            "bimodal",
            Workload::Bimodal {
                fast_s: 1e-3,
                slow_s: 1.5e-3,
                p_slow: 0.1,
            },
        ),
    ]
}

fn feed<C: StoppingCriterion>(criterion: &mut C, samples: &[f64]) -> bool {
    criterion.initialize(&ParamBag::new()).expect("initialize");
    let mut finished = false;
    for &sample in samples {
        criterion.add_measurement(sample);
        finished = criterion.is_finished();
    }
    finished
}

fn bench_entropy(c: &mut Criterion) {
    let mut group = c.benchmark_group("entropy_run");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP);
    group.measurement_time(MEASURE);
    for (label, workload) in workloads() {
        for &len in run_lengths() {
            let samples = generate_durations(workload, len, SEED + len as u64);
            group.bench_with_input(
                BenchmarkId::new(label, len),
                &samples,
                |b, samples| {
                    let mut criterion = EntropyCriterion::new();
                    b.iter(|| black_box(feed(&mut criterion, samples)));
                },
            );
        }
    }
    group.finish();
}

fn bench_stdrel(c: &mut Criterion) {
    let mut group = c.benchmark_group("stdrel_run");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP);
    group.measurement_time(MEASURE);
    for (label, workload) in workloads() {
        for &len in run_lengths() {
            let samples = generate_durations(workload, len, SEED + len as u64);
            group.bench_with_input(
                BenchmarkId::new(label, len),
                &samples,
                |b, samples| {
                    let mut criterion = StdRelCriterion::new();
                    b.iter(|| black_box(feed(&mut criterion, samples)));
                },
            );
        }
    }
    group.finish();
}

criterion_group!(
    name = criteria_benches;
    config = Criterion::default();
    targets = bench_entropy, bench_stdrel
);
criterion_main!(criteria_benches);
