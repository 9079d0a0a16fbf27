//! Entropy-trend stopping criterion.
//!
//! Every measurement is quantized to a 1 µs grid and counted in a sorted
//! frequency table. After each measurement the Shannon entropy of the
//! observed distribution is appended to a history. The run is considered
//! converged once a straight line fitted to that history is flat enough
//! (`max-angle`) and explains it well enough (`min-r2`): new timings have
//! stopped changing the shape of the distribution.

use tracing::{debug, trace};

use crate::{
    CriterionError,
    criterion::StoppingCriterion,
    params::{ParamBag, ParamSchema, ParamType},
    stats::LineFit,
};

pub const NAME: &str = "entropy";
pub const MAX_ANGLE: &str = "max-angle";
pub const MIN_R2: &str = "min-r2";

pub const DEFAULT_MAX_ANGLE: f64 = 0.048;
pub const DEFAULT_MIN_R2: f64 = 0.36;

/// Half a microsecond, the finest timer resolution the binning assumes.
pub const RESOLUTION_S: f64 = 0.5e-6;
/// Width of a histogram bucket.
pub const EPSILON: f64 = RESOLUTION_S * 2.0;

/// Bucket index of a duration in seconds.
///
/// Saturates for durations outside [`is_binnable`].
pub fn quantize(sample: f64) -> i64 {
    (sample / EPSILON).round() as i64
}

/// Whether `sample` is finite and its bucket index fits in an `i64`.
pub fn is_binnable(sample: f64) -> bool {
    sample.is_finite() && (sample / EPSILON).round().abs() < i64::MAX as f64
}

/// Sorted `(bucket, count)` pairs with unique buckets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    bins: Vec<(i64, u64)>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self { bins: Vec::new() }
    }

    /// Counts one more occurrence of `bucket`.
    pub fn record(&mut self, bucket: i64) {
        match self.bins.binary_search_by_key(&bucket, |(key, _)| *key) {
            Ok(idx) => self.bins[idx].1 += 1,
            Err(idx) => self.bins.insert(idx, (bucket, 1)),
        }
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn clear(&mut self) {
        self.bins.clear();
    }

    pub fn count(&self, bucket: i64) -> u64 {
        self.bins
            .binary_search_by_key(&bucket, |(key, _)| *key)
            .map(|idx| self.bins[idx].1)
            .unwrap_or(0)
    }

    pub fn buckets(&self) -> &[(i64, u64)] {
        &self.bins
    }

    /// Shannon entropy in bits, with probabilities relative to `total`.
    pub fn entropy(&self, total: u64) -> f64 {
        if total == 0 {
            return 0.0;
        }
        let total = total as f64;
        self.bins
            .iter()
            .map(|(_, count)| *count as f64 / total)
            .map(|p| -p * p.log2())
            .sum()
    }
}

#[derive(Clone, Debug)]
pub struct EntropyCriterion {
    max_angle: f64,
    min_r2: f64,
    total_samples: u64,
    total_time: f64,
    freq: FrequencyTable,
    entropy_history: Vec<f64>,
}

impl Default for EntropyCriterion {
    fn default() -> Self {
        Self::new()
    }
}

impl EntropyCriterion {
    pub fn new() -> Self {
        Self {
            max_angle: DEFAULT_MAX_ANGLE,
            min_r2: DEFAULT_MIN_R2,
            total_samples: 0,
            total_time: 0.0,
            freq: FrequencyTable::new(),
            entropy_history: Vec::new(),
        }
    }

    pub fn max_angle(&self) -> f64 {
        self.max_angle
    }

    pub fn min_r2(&self) -> f64 {
        self.min_r2
    }

    pub fn total_samples(&self) -> u64 {
        self.total_samples
    }

    /// Sum of every recorded duration, in seconds.
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    pub fn frequencies(&self) -> &FrequencyTable {
        &self.freq
    }

    /// Quantized durations with their counts, in increasing order.
    pub fn bins(&self) -> impl Iterator<Item = (f64, u64)> + '_ {
        self.freq
            .buckets()
            .iter()
            .map(|(bucket, count)| (*bucket as f64 * EPSILON, *count))
    }

    pub fn entropy_history(&self) -> &[f64] {
        &self.entropy_history
    }

    /// Line fitted to the current entropy history.
    pub fn trend(&self) -> Option<LineFit> {
        LineFit::fit(&self.entropy_history)
    }

    /// Applies the convergence rule to an arbitrary entropy series.
    pub fn trend_converged(&self, history: &[f64]) -> bool {
        LineFit::fit(history).is_some_and(|fit| self.accepts(&fit))
    }

    fn accepts(&self, fit: &LineFit) -> bool {
        fit.slope <= self.max_angle && fit.r2 >= self.min_r2
    }
}

impl StoppingCriterion for EntropyCriterion {
    fn name(&self) -> &str {
        NAME
    }

    fn initialize(&mut self, params: &ParamBag) -> Result<(), CriterionError> {
        let max_angle = params.float64_or(MAX_ANGLE, DEFAULT_MAX_ANGLE)?;
        let min_r2 = params.float64_or(MIN_R2, DEFAULT_MIN_R2)?;

        self.max_angle = max_angle;
        self.min_r2 = min_r2;
        self.total_samples = 0;
        self.total_time = 0.0;
        self.freq.clear();
        self.entropy_history.clear();

        debug!(criterion = NAME, max_angle, min_r2, "initialized");
        Ok(())
    }

    fn add_measurement(&mut self, sample: f64) {
        if !is_binnable(sample) {
            debug!(criterion = NAME, sample, "skipping sample outside the binnable range");
            return;
        }
        self.total_samples += 1;
        self.total_time += sample;
        self.freq.record(quantize(sample));

        let entropy = self.freq.entropy(self.total_samples);
        self.entropy_history.push(entropy);
        trace!(
            criterion = NAME,
            sample,
            bins = self.freq.len(),
            entropy,
            "measurement recorded"
        );
    }

    fn is_finished(&self) -> bool {
        let Some(fit) = self.trend() else {
            return false;
        };
        let finished = self.accepts(&fit);
        if finished {
            debug!(
                criterion = NAME,
                samples = self.total_samples,
                slope = fit.slope,
                r2 = fit.r2,
                "entropy trend converged"
            );
        }
        finished
    }

    fn params(&self) -> ParamSchema {
        ParamSchema::new()
            .with(MAX_ANGLE, ParamType::Float64)
            .with(MIN_R2, ParamType::Float64)
    }
}
