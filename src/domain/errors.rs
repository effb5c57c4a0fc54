use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },
    /// The resource exists but is still referenced and must be kept.
    #[error("Not allowed: {0}")]
    NotAllowed(String),
    #[error("Transaction failed: {0}")]
    TransactionFailure(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Event delivery failed: {0}")]
    Delivery(String),
}

impl DomainError {
    pub fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        DomainError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// Re-labels storage failures raised inside an atomic section so callers
    /// know the whole unit of work was rolled back and may be retried.
    pub fn into_transaction_failure(self) -> Self {
        match self {
            DomainError::Storage(msg) => DomainError::TransactionFailure(msg),
            other => other,
        }
    }
}

/// Rejects blank text and text longer than `max_chars` characters.
pub fn require_text(field: &'static str, value: &str, max_chars: usize) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::invalid_input(field, "may not be blank"));
    }
    if value.chars().count() > max_chars {
        return Err(DomainError::invalid_input(
            field,
            format!("must be at most {max_chars} characters"),
        ));
    }
    Ok(())
}
