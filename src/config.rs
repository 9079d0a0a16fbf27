//! Run configuration: which criterion to use and with which parameters.
//!
//! A [`RunConfig`] can be read from JSON, overridden from the environment and
//! from `name=value` assignments. Assignments are typed through the merged
//! parameter schema of a [`CriterionRegistry`], so `--param min-time=2`
//! becomes a float64 because some criterion declared `min-time` as one.
//!
//! # Examples
//!
//! ```rust
//! use benchstop::{CriterionRegistry, RunConfig};
//!
//! let registry = CriterionRegistry::new();
//! let mut cfg = RunConfig::from_json_str(r#"{"criterion": "entropy"}"#).unwrap();
//! cfg.apply_assignment(&registry, "max-angle=0.1").unwrap();
//! assert_eq!(cfg.params.get_float64("max-angle"), Ok(0.1));
//! ```

use std::{env, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    CriterionError,
    params::{ParamBag, ParamSchema},
    registry::{CriterionRegistry, DEFAULT_CRITERION},
};

/// Environment variable overriding the configured criterion name.
pub const CRITERION_ENV: &str = "BENCHSTOP_CRITERION";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Registry name of the stopping criterion.
    #[serde(default = "default_criterion")]
    pub criterion: String,
    /// Parameters handed to the criterion's `initialize`.
    #[serde(default)]
    pub params: ParamBag,
}

fn default_criterion() -> String {
    DEFAULT_CRITERION.to_string()
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            criterion: default_criterion(),
            params: ParamBag::new(),
        }
    }
}

impl RunConfig {
    pub fn new(criterion: impl Into<String>) -> Self {
        Self {
            criterion: criterion.into(),
            params: ParamBag::new(),
        }
    }

    pub fn from_json_str(data: &str) -> Result<Self, CriterionError> {
        serde_json::from_str(data).map_err(|e| CriterionError::invalid_input(e.to_string()))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CriterionError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .map_err(|e| CriterionError::io(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&data)
    }

    pub fn to_json(&self) -> Result<String, CriterionError> {
        serde_json::to_string_pretty(self).map_err(|e| CriterionError::invalid_input(e.to_string()))
    }

    /// Replaces the criterion name with `BENCHSTOP_CRITERION` when set.
    pub fn apply_env(&mut self) {
        if let Ok(name) = env::var(CRITERION_ENV) {
            if !name.is_empty() {
                self.criterion = name;
            }
        }
    }

    /// Parses `name=value` and stores it with the type the registry declares
    /// for `name`.
    pub fn apply_assignment(
        &mut self,
        registry: &CriterionRegistry,
        assignment: &str,
    ) -> Result<(), CriterionError> {
        let schema = registry.params_description()?;
        self.apply_assignment_with(&schema, assignment)
    }

    pub fn apply_assignment_with(
        &mut self,
        schema: &ParamSchema,
        assignment: &str,
    ) -> Result<(), CriterionError> {
        let (name, raw) = assignment.split_once('=').ok_or_else(|| {
            CriterionError::invalid_input(format!("expected NAME=VALUE, got {assignment:?}"))
        })?;
        let name = name.trim();
        let kind = schema
            .get(name)
            .ok_or_else(|| CriterionError::invalid_input(format!("unknown parameter \"{name}\"")))?;
        let value = kind.parse_value(raw)?;
        self.params.set(name, value);
        Ok(())
    }

    /// Checks the criterion exists and coerces every parameter to its
    /// declared type.
    pub fn validate(&mut self, registry: &CriterionRegistry) -> Result<(), CriterionError> {
        registry.get(&self.criterion)?;
        let schema = registry.params_description()?;
        self.params.conform_to(&schema)
    }
}
