use thiserror::Error;

/// Error type for stopping-criterion lookup and configuration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CriterionError {
    #[error("no stopping criterion named \"{0}\"")]
    NotFound(String),
    #[error("parameter \"{0}\" is not set")]
    ParamMissing(String),
    #[error("parameter \"{name}\" has type {actual}, expected {expected}")]
    ParamTypeMismatch {
        name: String,
        expected: String,
        actual: String,
    },
    #[error(
        "stopping criterion \"{criterion}\" parameter \"{param}\" is already used by another criterion with a different type"
    )]
    ConfigConflict { criterion: String, param: String },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("io error: {0}")]
    Io(String),
}

impl CriterionError {
    pub fn not_found<T: Into<String>>(name: T) -> Self {
        CriterionError::NotFound(name.into())
    }

    pub fn param_missing<T: Into<String>>(name: T) -> Self {
        CriterionError::ParamMissing(name.into())
    }

    pub fn type_mismatch<T, E, A>(name: T, expected: E, actual: A) -> Self
    where
        T: Into<String>,
        E: ToString,
        A: ToString,
    {
        CriterionError::ParamTypeMismatch {
            name: name.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    pub fn conflict<C: Into<String>, P: Into<String>>(criterion: C, param: P) -> Self {
        CriterionError::ConfigConflict {
            criterion: criterion.into(),
            param: param.into(),
        }
    }

    pub fn invalid_input<T: Into<String>>(msg: T) -> Self {
        CriterionError::InvalidInput(msg.into())
    }

    pub fn io<T: Into<String>>(msg: T) -> Self {
        CriterionError::Io(msg.into())
    }
}
