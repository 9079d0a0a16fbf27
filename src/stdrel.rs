//! Relative standard deviation ("noise") stopping criterion.
//!
//! A run is finished once it has accumulated at least `min-time` seconds of
//! measurements and either the relative standard deviation of all samples
//! dropped below `max-noise`, or that noise figure itself stopped moving.
//! The second rule lets inherently noisy workloads terminate.

use std::collections::VecDeque;

use tracing::debug;

use crate::{
    CriterionError,
    criterion::StoppingCriterion,
    params::{ParamBag, ParamSchema, ParamType},
    stats,
};

pub const NAME: &str = "stdrel";
pub const MAX_NOISE: &str = "max-noise";
pub const MIN_TIME: &str = "min-time";

/// 0.5 %
pub const DEFAULT_MAX_NOISE: f64 = 0.005;
pub const DEFAULT_MIN_TIME: f64 = 0.5;

/// Number of most recent noise readings kept.
pub const NOISE_WINDOW: usize = 512;
/// Readings needed before the noise-of-noise rule applies.
pub const MIN_NOISE_READINGS: usize = 64;
/// Relative spread of the tracked noise below which it counts as settled.
pub const NOISE_STABILITY_THRESHOLD: f64 = 0.05;

#[derive(Clone, Debug)]
pub struct StdRelCriterion {
    max_noise: f64,
    min_time: f64,
    total_samples: u64,
    total_time: f64,
    samples: Vec<f64>,
    noise: VecDeque<f64>,
}

impl Default for StdRelCriterion {
    fn default() -> Self {
        Self::new()
    }
}

impl StdRelCriterion {
    pub fn new() -> Self {
        Self {
            max_noise: DEFAULT_MAX_NOISE,
            min_time: DEFAULT_MIN_TIME,
            total_samples: 0,
            total_time: 0.0,
            samples: Vec::new(),
            noise: VecDeque::with_capacity(NOISE_WINDOW),
        }
    }

    pub fn max_noise(&self) -> f64 {
        self.max_noise
    }

    pub fn min_time(&self) -> f64 {
        self.min_time
    }

    pub fn total_samples(&self) -> u64 {
        self.total_samples
    }

    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    /// Latest relative standard deviation of the samples, if defined.
    pub fn current_noise(&self) -> Option<f64> {
        self.noise.back().copied()
    }

    pub fn noise_readings(&self) -> usize {
        self.noise.len()
    }

    fn noise_settled(&self) -> bool {
        if self.noise.len() <= MIN_NOISE_READINGS {
            return false;
        }
        let (front, back) = self.noise.as_slices();
        let readings: Vec<f64> = front.iter().chain(back).copied().collect();
        let spread = stats::relative_standard_deviation(&readings);
        spread.is_finite() && spread < NOISE_STABILITY_THRESHOLD
    }
}

impl StoppingCriterion for StdRelCriterion {
    fn name(&self) -> &str {
        NAME
    }

    fn initialize(&mut self, params: &ParamBag) -> Result<(), CriterionError> {
        let max_noise = params.float64_or(MAX_NOISE, DEFAULT_MAX_NOISE)?;
        let min_time = params.float64_or(MIN_TIME, DEFAULT_MIN_TIME)?;

        self.max_noise = max_noise;
        self.min_time = min_time;
        self.total_samples = 0;
        self.total_time = 0.0;
        self.samples.clear();
        self.noise.clear();

        debug!(criterion = NAME, max_noise, min_time, "initialized");
        Ok(())
    }

    fn add_measurement(&mut self, sample: f64) {
        self.total_samples += 1;
        self.total_time += sample;
        self.samples.push(sample);

        let mean = self.total_time / self.total_samples as f64;
        let noise = stats::standard_deviation(&self.samples, mean) / mean;
        if noise.is_finite() {
            if self.noise.len() == NOISE_WINDOW {
                self.noise.pop_front();
            }
            self.noise.push_back(noise);
        }
    }

    fn is_finished(&self) -> bool {
        if self.total_time <= self.min_time {
            return false;
        }
        let Some(noise) = self.current_noise() else {
            return false;
        };
        if noise < self.max_noise {
            debug!(
                criterion = NAME,
                samples = self.total_samples,
                noise,
                "noise below threshold"
            );
            return true;
        }
        if self.noise_settled() {
            debug!(
                criterion = NAME,
                samples = self.total_samples,
                noise,
                "noise stabilized above threshold"
            );
            return true;
        }
        false
    }

    fn params(&self) -> ParamSchema {
        ParamSchema::new()
            .with(MAX_NOISE, ParamType::Float64)
            .with(MIN_TIME, ParamType::Float64)
    }
}
