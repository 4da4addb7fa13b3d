use thiserror::Error;

use crate::database::store::StoreError;

/// Observer system errors with structured error types
#[derive(Debug, Error)]
pub enum ObserverError {
    /// Field-level messages, reported together
    #[error("Validation error: {}", .0.join(", "))]
    ValidationError(Vec<String>),

    /// Domain rule rejected the write (400)
    #[error("{0}")]
    BusinessError(String),

    #[error("Timeout error: {0}")]
    TimeoutError(String),

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ObserverError {
    pub fn validation(message: impl Into<String>) -> Self {
        ObserverError::ValidationError(vec![message.into()])
    }

    /// Fold the errors collected in one ring into a single error. Validation
    /// messages from several observers are merged; anything else wins outright.
    pub fn merge(errors: Vec<ObserverError>) -> Option<ObserverError> {
        let mut messages = Vec::new();
        for error in errors {
            match error {
                ObserverError::ValidationError(m) => messages.extend(m),
                other => return Some(other),
            }
        }
        if messages.is_empty() {
            None
        } else {
            Some(ObserverError::ValidationError(messages))
        }
    }
}
