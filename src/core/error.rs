use thiserror::Error;

/// The single failure kind of the engine: a caller-supplied value was rejected
/// before any computation ran.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },
}

impl EngineError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            EngineError::InvalidInput { field, .. } => field,
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

pub(crate) fn require_finite(field: &'static str, value: f64) -> EngineResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::invalid(field, "must be a finite number"))
    }
}

pub(crate) fn require_non_negative(field: &'static str, value: f64) -> EngineResult<f64> {
    require_finite(field, value)?;
    if value < 0.0 {
        return Err(EngineError::invalid(field, "must be >= 0"));
    }
    Ok(value)
}

pub(crate) fn require_positive(field: &'static str, value: f64) -> EngineResult<f64> {
    require_finite(field, value)?;
    if value <= 0.0 {
        return Err(EngineError::invalid(field, "must be > 0"));
    }
    Ok(value)
}
