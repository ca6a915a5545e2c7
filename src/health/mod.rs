//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active health checks (active.rs):
//!     Periodic timer
//!     → Probe GET /health on every registered instance
//!     → Instance::mark_success / mark_failure
//!
//! Passive health checks (discovery::Endpointer):
//!     Endpoint error observed
//!     → Instance::mark_failure
//! ```
//!
//! # Design Decisions
//! - Active and passive checks are complementary
//! - State transitions require consecutive successes/failures
//! - Critical instances drop out of passing-only registry queries

pub mod active;

pub use active::HealthMonitor;
