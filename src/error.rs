// src/error.rs

use crate::models::ItemId;
use thiserror::Error;

/// Errors raised by the adaptive testing core.
#[derive(Debug, Error)]
pub enum AssessmentError {
    /// No unanswered item is left in the candidate pool.
    #[error("No eligible item left in the candidate pool")]
    NoEligibleItem,

    /// Configuration failed validation at load time.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Caller supplied a value that would corrupt the estimate (NaN, out of range, ...).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Response refers to an item the pool does not contain.
    #[error("Unknown item: {0}")]
    UnknownItem(ItemId),

    /// Item was already presented in this session.
    #[error("Item already answered: {0}")]
    ItemAlreadyAnswered(ItemId),

    /// Session reached its stopping rule and accepts no more responses.
    #[error("Assessment session is already complete")]
    SessionComplete,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AssessmentError>;

/// Rejects NaN and infinities with a descriptive message.
pub(crate) fn ensure_finite(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AssessmentError::InvalidInput(format!(
            "{} must be finite, got {}",
            name, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_finite_rejects_nan_and_infinity() {
        assert!(ensure_finite("difficulty", 0.4).is_ok());
        assert!(matches!(
            ensure_finite("difficulty", f64::NAN),
            Err(AssessmentError::InvalidInput(_))
        ));
        assert!(matches!(
            ensure_finite("difficulty", f64::INFINITY),
            Err(AssessmentError::InvalidInput(_))
        ));
    }

    #[test]
    fn error_messages_name_the_item() {
        let err = AssessmentError::ItemAlreadyAnswered(ItemId::from("q-7"));
        assert_eq!(err.to_string(), "Item already answered: q-7");
    }
}
