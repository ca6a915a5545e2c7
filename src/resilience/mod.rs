//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Client call:
//!     → retry.rs (pick an endpoint from the balancer, bound the attempt)
//!     → On failure: backoff.rs (jittered delay), then next attempt
//!     → All attempts failed: RetryError with every attempt's error
//! ```
//!
//! # Design Decisions
//! - Every attempt has its own deadline
//! - Only endpoint errors are retried; business errors are answers
//! - Each attempt asks the balancer again, so a retry lands on another instance

pub mod backoff;
pub mod retry;

pub use backoff::ExponentialBackoff;
pub use retry::{retry, RetryError, RetryPolicy};
