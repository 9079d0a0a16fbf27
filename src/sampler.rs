//! Reference sampling loop driving a stopping criterion.
//!
//! The loop owns nothing but a budget: the caller supplies the measurement
//! closure (returning one duration in seconds) and the criterion. Sampling
//! stops when the criterion is satisfied, when `max_samples` measurements
//! were taken, or when the wall-clock `timeout` elapses.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    CriterionError, config::RunConfig, criterion::StoppingCriterion, params::ParamBag,
    registry::CriterionRegistry,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SamplingBudget {
    /// Measurements taken before the criterion is consulted.
    pub min_samples: u64,
    pub max_samples: u64,
    pub timeout: Option<Duration>,
}

impl Default for SamplingBudget {
    fn default() -> Self {
        Self {
            min_samples: 10,
            max_samples: 100_000,
            timeout: Some(Duration::from_secs(15)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    Converged,
    MaxSamples,
    Timeout,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SamplingReport {
    pub criterion: String,
    pub samples: u64,
    /// Sum of the measured durations, in seconds.
    pub total_time: f64,
    pub reason: StopReason,
}

impl SamplingReport {
    pub fn converged(&self) -> bool {
        self.reason == StopReason::Converged
    }

    pub fn mean(&self) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }
        self.total_time / self.samples as f64
    }

    pub fn summary(&self) -> String {
        format!(
            "criterion={} samples={} converged={} mean={:.9}",
            self.criterion,
            self.samples,
            self.converged(),
            self.mean()
        )
    }
}

/// Feeds `measure` into an already initialized `criterion` until it is
/// finished or the budget runs out.
pub fn run_sampling<C, F>(
    criterion: &mut C,
    budget: &SamplingBudget,
    mut measure: F,
) -> SamplingReport
where
    C: StoppingCriterion + ?Sized,
    F: FnMut() -> f64,
{
    let started = Instant::now();
    let mut samples = 0u64;
    let mut total_time = 0.0;

    let reason = loop {
        if samples >= budget.max_samples {
            break StopReason::MaxSamples;
        }
        if let Some(timeout) = budget.timeout {
            if started.elapsed() >= timeout {
                break StopReason::Timeout;
            }
        }

        let sample = measure();
        criterion.add_measurement(sample);
        samples += 1;
        total_time += sample;

        if samples >= budget.min_samples && criterion.is_finished() {
            break StopReason::Converged;
        }
    };

    let report = SamplingReport {
        criterion: criterion.name().to_string(),
        samples,
        total_time,
        reason,
    };
    debug!(
        criterion = %report.criterion,
        samples = report.samples,
        reason = ?report.reason,
        "sampling stopped"
    );
    report
}

/// Initializes `criterion` with `params`, then runs [`run_sampling`].
pub fn run_with_params<C, F>(
    criterion: &mut C,
    params: &ParamBag,
    budget: &SamplingBudget,
    measure: F,
) -> Result<SamplingReport, CriterionError>
where
    C: StoppingCriterion + ?Sized,
    F: FnMut() -> f64,
{
    criterion.initialize(params)?;
    Ok(run_sampling(criterion, budget, measure))
}

/// Looks up the configured criterion in `registry` and samples with it.
pub fn run_configured<F>(
    registry: &mut CriterionRegistry,
    config: &RunConfig,
    budget: &SamplingBudget,
    measure: F,
) -> Result<SamplingReport, CriterionError>
where
    F: FnMut() -> f64,
{
    let criterion = registry.get_mut(&config.criterion)?;
    let report = run_with_params(criterion, &config.params, budget, measure)?;
    info!(summary = %report.summary(), "benchmark sampled");
    Ok(report)
}
