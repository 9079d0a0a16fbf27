//! Catalog of stopping criteria addressable by name.
//!
//! The registry is an ordinary value owned by the harness. Built-in criteria
//! are registered by [`CriterionRegistry::new`]; third-party criteria are added
//! with [`CriterionRegistry::register_criterion`] during setup, before any
//! measurement starts.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::{
    CriterionError,
    criterion::StoppingCriterion,
    entropy::{self, EntropyCriterion},
    params::ParamSchema,
    stdrel::{self, StdRelCriterion},
};

/// Name of the criterion used when none is configured.
pub const DEFAULT_CRITERION: &str = stdrel::NAME;

pub struct CriterionRegistry {
    criteria: BTreeMap<String, Box<dyn StoppingCriterion>>,
}

impl Default for CriterionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CriterionRegistry {
    /// Registry holding the built-in `stdrel` and `entropy` criteria.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_criterion(stdrel::NAME, Box::new(StdRelCriterion::new()));
        registry.register_criterion(entropy::NAME, Box::new(EntropyCriterion::new()));
        registry
    }

    pub fn empty() -> Self {
        Self {
            criteria: BTreeMap::new(),
        }
    }

    /// Adds `criterion` under `name`. Returns `false`, leaving the existing
    /// entry in place, if the name is taken.
    pub fn register_criterion(
        &mut self,
        name: impl Into<String>,
        criterion: Box<dyn StoppingCriterion>,
    ) -> bool {
        let name = name.into();
        if self.criteria.contains_key(&name) {
            warn!(criterion = %name, "stopping criterion already registered");
            return false;
        }
        debug!(criterion = %name, "registered stopping criterion");
        self.criteria.insert(name, criterion);
        true
    }

    pub fn get(&self, name: &str) -> Result<&dyn StoppingCriterion, CriterionError> {
        self.criteria
            .get(name)
            .map(|c| &**c)
            .ok_or_else(|| CriterionError::not_found(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut dyn StoppingCriterion, CriterionError> {
        match self.criteria.get_mut(name) {
            Some(criterion) => Ok(&mut **criterion),
            None => Err(CriterionError::not_found(name)),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.criteria.contains_key(name)
    }

    /// Registered names in lexicographic order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.criteria.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Union of every registered criterion's parameters.
    ///
    /// Fails if two criteria declare the same parameter with different types.
    pub fn params_description(&self) -> Result<ParamSchema, CriterionError> {
        let mut desc = ParamSchema::new();
        for (name, criterion) in &self.criteria {
            desc.merge_from(name, &criterion.params())?;
        }
        Ok(desc)
    }
}
