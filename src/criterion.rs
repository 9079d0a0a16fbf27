//! The contract every stopping criterion implements.

use crate::{
    CriterionError,
    params::{ParamBag, ParamSchema},
};

/// Decides, one measurement at a time, whether a benchmark has been sampled
/// enough.
///
/// A harness calls [`initialize`](StoppingCriterion::initialize) once per
/// run, then alternates [`add_measurement`](StoppingCriterion::add_measurement)
/// and [`is_finished`](StoppingCriterion::is_finished) until the latter
/// returns `true` or its own budget runs out.
pub trait StoppingCriterion: Send {
    /// Registry-independent identifier used in logs.
    fn name(&self) -> &str;

    /// Clears all accumulated state and applies the recognized parameters in
    /// `params`. Parameters absent from `params` go back to their defaults.
    fn initialize(&mut self, params: &ParamBag) -> Result<(), CriterionError>;

    /// Records one duration, in seconds.
    fn add_measurement(&mut self, sample: f64);

    /// Whether the accumulated measurements are trustworthy.
    fn is_finished(&self) -> bool;

    /// Parameter names and types this criterion accepts.
    fn params(&self) -> ParamSchema;
}

impl<C> StoppingCriterion for Box<C>
where
    C: StoppingCriterion + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn initialize(&mut self, params: &ParamBag) -> Result<(), CriterionError> {
        (**self).initialize(params)
    }

    fn add_measurement(&mut self, sample: f64) {
        (**self).add_measurement(sample)
    }

    fn is_finished(&self) -> bool {
        (**self).is_finished()
    }

    fn params(&self) -> ParamSchema {
        (**self).params()
    }
}
