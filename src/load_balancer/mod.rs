//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Client call
//!     → Endpointer (current endpoints for the passing instances)
//!     → round_robin.rs (rotate through them)
//!     → Endpoint or NoEndpoints
//! ```
//!
//! # Design Decisions
//! - Balancers hold no instance list; they ask the endpointer on every pick
//!   so registry changes apply to the next call
//! - Unhealthy instances are filtered by the registry query, not here

pub mod instance;
pub mod round_robin;

use crate::endpoint::{Endpoint, EndpointError};

pub use instance::{HealthState, HealthThresholds, Instance};
pub use round_robin::RoundRobin;

/// Picks one endpoint per call.
pub trait Balancer<Req, Resp>: Send + Sync {
    fn endpoint(&self) -> Result<Endpoint<Req, Resp>, EndpointError>;
}
