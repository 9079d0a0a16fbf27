//! Typed parameter bag and parameter schemas.
//!
//! A [`ParamBag`] carries the named values a caller hands to a stopping
//! criterion at `initialize` time. A [`ParamSchema`] is the ordered list of
//! `(name, type)` pairs a criterion accepts; schemas of every registered
//! criterion are merged into one so an outer configuration surface never sees
//! the same name with two types.

use std::fmt;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::CriterionError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Float64,
    Int64,
    String,
    Bool,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::Float64 => "float64",
            ParamType::Int64 => "int64",
            ParamType::String => "string",
            ParamType::Bool => "bool",
        }
    }

    /// Parses a raw command-line style value into a value of this type.
    pub fn parse_value(&self, raw: &str) -> Result<ParamValue, CriterionError> {
        let raw = raw.trim();
        match self {
            ParamType::Float64 => raw.parse::<f64>().map(ParamValue::Float64).map_err(|e| {
                CriterionError::invalid_input(format!("{raw:?} is not a float64: {e}"))
            }),
            ParamType::Int64 => raw.parse::<i64>().map(ParamValue::Int64).map_err(|e| {
                CriterionError::invalid_input(format!("{raw:?} is not an int64: {e}"))
            }),
            ParamType::String => Ok(ParamValue::String(raw.to_string())),
            ParamType::Bool => match raw {
                "true" | "1" | "yes" | "on" => Ok(ParamValue::Bool(true)),
                "false" | "0" | "no" | "off" => Ok(ParamValue::Bool(false)),
                other => Err(CriterionError::invalid_input(format!(
                    "{other:?} is not a bool"
                ))),
            },
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single typed parameter value.
///
/// Deserializes from plain JSON scalars: integers become `Int64`, every
/// other number becomes `Float64`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int64(i64),
    Float64(f64),
    String(String),
}

impl ParamValue {
    pub fn kind(&self) -> ParamType {
        match self {
            ParamValue::Float64(_) => ParamType::Float64,
            ParamValue::Int64(_) => ParamType::Int64,
            ParamValue::String(_) => ParamType::String,
            ParamValue::Bool(_) => ParamType::Bool,
        }
    }

    /// Converts the value to `target` when the conversion is lossless in
    /// spirit (an integer literal used for a float parameter).
    pub fn coerce(self, target: ParamType) -> Result<ParamValue, ParamValue> {
        match (self, target) {
            (ParamValue::Int64(v), ParamType::Float64) => Ok(ParamValue::Float64(v as f64)),
            (value, target) if value.kind() == target => Ok(value),
            (value, _) => Err(value),
        }
    }
}

/// Named configuration values queried by criteria during `initialize`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamBag {
    values: AHashMap<String, ParamValue>,
}

impl ParamBag {
    pub fn new() -> Self {
        Self {
            values: AHashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn has_value(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn value(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: ParamValue) -> &mut Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn set_float64(&mut self, name: impl Into<String>, value: f64) -> &mut Self {
        self.set(name, ParamValue::Float64(value))
    }

    pub fn set_int64(&mut self, name: impl Into<String>, value: i64) -> &mut Self {
        self.set(name, ParamValue::Int64(value))
    }

    pub fn set_string(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.set(name, ParamValue::String(value.into()))
    }

    pub fn set_bool(&mut self, name: impl Into<String>, value: bool) -> &mut Self {
        self.set(name, ParamValue::Bool(value))
    }

    pub fn with_float64(mut self, name: impl Into<String>, value: f64) -> Self {
        self.set_float64(name, value);
        self
    }

    pub fn with_int64(mut self, name: impl Into<String>, value: i64) -> Self {
        self.set_int64(name, value);
        self
    }

    pub fn get_float64(&self, name: &str) -> Result<f64, CriterionError> {
        match self.lookup(name)? {
            ParamValue::Float64(v) => Ok(*v),
            other => Err(CriterionError::type_mismatch(name, ParamType::Float64, other.kind())),
        }
    }

    pub fn get_int64(&self, name: &str) -> Result<i64, CriterionError> {
        match self.lookup(name)? {
            ParamValue::Int64(v) => Ok(*v),
            other => Err(CriterionError::type_mismatch(name, ParamType::Int64, other.kind())),
        }
    }

    pub fn get_string(&self, name: &str) -> Result<&str, CriterionError> {
        match self.lookup(name)? {
            ParamValue::String(v) => Ok(v.as_str()),
            other => Err(CriterionError::type_mismatch(name, ParamType::String, other.kind())),
        }
    }

    pub fn get_bool(&self, name: &str) -> Result<bool, CriterionError> {
        match self.lookup(name)? {
            ParamValue::Bool(v) => Ok(*v),
            other => Err(CriterionError::type_mismatch(name, ParamType::Bool, other.kind())),
        }
    }

    /// Returns the float value of `name` if present, `default` otherwise.
    /// A present value of another type is still an error.
    pub fn float64_or(&self, name: &str, default: f64) -> Result<f64, CriterionError> {
        if self.has_value(name) {
            self.get_float64(name)
        } else {
            Ok(default)
        }
    }

    /// Rewrites every value declared in `schema` to its declared type.
    ///
    /// Names the schema does not know are rejected, as are values that
    /// cannot be coerced. The bag is left untouched on error.
    pub fn conform_to(&mut self, schema: &ParamSchema) -> Result<(), CriterionError> {
        let mut conformed = AHashMap::with_capacity(self.values.len());
        for (name, value) in &self.values {
            let declared = schema.get(name).ok_or_else(|| {
                CriterionError::invalid_input(format!("unknown parameter \"{name}\""))
            })?;
            let value = value
                .clone()
                .coerce(declared)
                .map_err(|value| CriterionError::type_mismatch(name, declared, value.kind()))?;
            conformed.insert(name.clone(), value);
        }
        self.values = conformed;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn lookup(&self, name: &str) -> Result<&ParamValue, CriterionError> {
        self.values
            .get(name)
            .ok_or_else(|| CriterionError::param_missing(name))
    }
}

/// Ordered `(name, type)` declarations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamSchema {
    entries: Vec<(String, ParamType)>,
}

impl ParamSchema {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, kind: ParamType) -> Self {
        self.entries.push((name.into(), kind));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<ParamType> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, kind)| *kind)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ParamType)> {
        self.entries.iter().map(|(n, k)| (n.as_str(), *k))
    }

    /// Appends the declarations of `criterion`'s schema.
    ///
    /// A name already present with the same type is kept once; the same name
    /// with a different type is a configuration conflict.
    pub fn merge_from(
        &mut self,
        criterion: &str,
        other: &ParamSchema,
    ) -> Result<(), CriterionError> {
        for (name, kind) in other.iter() {
            match self.get(name) {
                Some(existing) if existing == kind => {}
                Some(_) => return Err(CriterionError::conflict(criterion, name)),
                None => self.entries.push((name.to_string(), kind)),
            }
        }
        Ok(())
    }
}
