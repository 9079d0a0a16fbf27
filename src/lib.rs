//! Stopping criteria for benchmark sampling loops.
//!
//! benchstop answers one question for a benchmarking harness: have enough
//! timing samples been collected to trust the statistics? A harness picks a
//! criterion by name from a [`CriterionRegistry`], initializes it with a
//! [`ParamBag`], then feeds it one duration at a time until
//! [`StoppingCriterion::is_finished`] returns `true`.
//!
//! # Quick Start
//!
//! ```rust
//! use benchstop::{CriterionRegistry, ParamBag};
//!
//! let mut registry = CriterionRegistry::new();
//! let criterion = registry.get_mut("entropy")?;
//! criterion.initialize(&ParamBag::new().with_float64("min-r2", 0.5))?;
//! for _ in 0..3 {
//!     criterion.add_measurement(0.002);
//! }
//! assert!(criterion.is_finished());
//! # Ok::<(), benchstop::CriterionError>(())
//! ```
//!
//! # Built-in criteria
//!
//! - `entropy` ([`EntropyCriterion`]): bins durations on a 1 µs grid and stops
//!   when the Shannon entropy of the bins follows a flat, well-fitting trend.
//!   Parameters `max-angle` and `min-r2`.
//! - `stdrel` ([`StdRelCriterion`]): stops when the relative standard
//!   deviation of the samples is small enough, or has stopped changing.
//!   Parameters `max-noise` and `min-time`.
//!
//! # Extending
//!
//! Any type implementing [`StoppingCriterion`] can be added with
//! [`CriterionRegistry::register_criterion`]. Its parameter schema is merged
//! with the others by [`CriterionRegistry::params_description`], which rejects
//! a parameter name declared with two different types.

pub mod config;
pub mod criterion;
pub mod entropy;
pub mod errors;
pub mod params;
pub mod registry;
pub mod sampler;
pub mod stats;
pub mod stdrel;

pub mod bench_utils; // Public for benches and the driver binary

pub use config::RunConfig;
pub use criterion::StoppingCriterion;
pub use entropy::{EntropyCriterion, FrequencyTable};
pub use errors::CriterionError;
pub use params::{ParamBag, ParamSchema, ParamType, ParamValue};
pub use registry::CriterionRegistry;
pub use sampler::{SamplingBudget, SamplingReport, StopReason, run_sampling};
pub use stats::LineFit;
pub use stdrel::StdRelCriterion;
