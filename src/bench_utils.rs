use std::str::FromStr;

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::CriterionError;

/// Shape of a synthetic duration stream.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Workload {
    /// Every sample is exactly `mean_s`.
    Steady { mean_s: f64 },
    /// Uniform jitter of `±jitter` (relative) around `mean_s`.
    Noisy { mean_s: f64, jitter: f64 },
    /// Like `Noisy`, with the mean growing by `drift` (relative) per sample.
    Drifting { mean_s: f64, jitter: f64, drift: f64 },
    /// Two modes: `fast_s` most of the time, `slow_s` with probability `p_slow`.
    Bimodal { fast_s: f64, slow_s: f64, p_slow: f64 },
}

impl FromStr for Workload {
    type Err = CriterionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "steady" => Ok(Workload::Steady { mean_s: 1e-3 }),
            "noisy" => Ok(Workload::Noisy {
                mean_s: 1e-3,
                jitter: 0.02,
            }),
            "drifting" => Ok(Workload::Drifting {
                mean_s: 1e-3,
                jitter: 0.02,
                drift: 1e-4,
            }),
            "bimodal" => Ok(Workload::Bimodal {
                fast_s: 1e-3,
                slow_s: 1.5e-3,
                p_slow: 0.1,
            }),
            other => Err(CriterionError::invalid_input(format!(
                "unknown workload {other}"
            ))),
        }
    }
}

/// Seeded, reproducible stream of durations in seconds.
#[derive(Clone, Debug)]
pub struct DurationStream {
    workload: Workload,
    rng: StdRng,
    index: u64,
}

impl DurationStream {
    pub fn new(workload: Workload, seed: u64) -> Self {
        Self {
            workload,
            rng: StdRng::seed_from_u64(seed),
            index: 0,
        }
    }

    pub fn next_sample(&mut self) -> f64 {
        let i = self.index;
        self.index += 1;
        let sample = match self.workload {
            Workload::Steady { mean_s } => mean_s,
            Workload::Noisy { mean_s, jitter } => jittered(&mut self.rng, mean_s, jitter),
            Workload::Drifting {
                mean_s,
                jitter,
                drift,
            } => jittered(&mut self.rng, mean_s * (1.0 + drift * i as f64), jitter),
            Workload::Bimodal {
                fast_s,
                slow_s,
                p_slow,
            } => {
                if self.rng.r#gen::<f64>() < p_slow {
                    slow_s
                } else {
                    fast_s
                }
            }
        };
        sample.max(0.0)
    }
}

impl Iterator for DurationStream {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.next_sample())
    }
}

/// Collects `count` samples of `workload`.
pub fn generate_durations(workload: Workload, count: usize, seed: u64) -> Vec<f64> {
    DurationStream::new(workload, seed).take(count).collect()
}

fn jittered(rng: &mut StdRng, mean_s: f64, jitter: f64) -> f64 {
    if jitter <= 0.0 {
        return mean_s;
    }
    mean_s * (1.0 + rng.gen_range(-jitter..=jitter))
}
