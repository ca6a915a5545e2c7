//! Business-logic errors.

use thiserror::Error;

/// Errors returned by [`Service`](crate::customer::Service) operations.
///
/// The display strings double as the wire messages in `{"error": ...}`
/// bodies, so [`ServiceError::from_message`] can recover the variant on the
/// client side.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("not found")]
    NotFound,

    #[error("already exists")]
    AlreadyExists,

    #[error("inconsistent IDs")]
    InconsistentIds,

    #[error("missing required field: {0}")]
    MissingRequiredField(String),

    #[error("context deadline exceeded")]
    DeadlineExceeded,

    /// Infrastructure failure observed by a client (network, decode, retries exhausted).
    #[error("transport error: {0}")]
    Transport(String),
}

const MISSING_FIELD_PREFIX: &str = "missing required field: ";

impl ServiceError {
    /// Recover a business error from its wire message.
    ///
    /// Returns `None` for messages that do not name a business error.
    pub fn from_message(message: &str) -> Option<Self> {
        match message {
            "not found" => Some(Self::NotFound),
            "already exists" => Some(Self::AlreadyExists),
            "inconsistent IDs" => Some(Self::InconsistentIds),
            "context deadline exceeded" => Some(Self::DeadlineExceeded),
            other => other
                .strip_prefix(MISSING_FIELD_PREFIX)
                .map(|field| Self::MissingRequiredField(field.to_string())),
        }
    }

    /// True for errors produced by business logic rather than infrastructure.
    pub fn is_business(&self) -> bool {
        !matches!(self, Self::Transport(_))
    }
}
