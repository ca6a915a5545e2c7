//! Per-call context.

use std::time::{Duration, Instant};
use uuid::Uuid;

/// Carried through every service call.
///
/// Cancellation in async Rust happens by dropping the future; the context
/// only adds a correlation id and an optional deadline that the store
/// checks before taking its lock.
#[derive(Debug, Clone)]
pub struct Context {
    request_id: String,
    deadline: Option<Instant>,
}

impl Context {
    /// Context with a fresh request id and no deadline.
    pub fn new() -> Self {
        Self::with_request_id(Uuid::new_v4().to_string())
    }

    pub fn with_request_id(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            deadline: None,
        }
    }

    /// Set a deadline `timeout` from now. A timeout too large to represent
    /// leaves the context without a deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Instant::now().checked_add(timeout);
        self
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
