//! Service discovery subsystem.
//!
//! # Data Flow
//! ```text
//! config / registry file
//!     → registry.rs (instance set, queried by service, tags, health)
//!     → endpointer.rs (instance → endpoint via factory, cached)
//!     → load_balancer (pick one endpoint)
//!
//! On registry file change:
//!     watcher.rs reloads the file
//!     → atomic swap of the instance set
//! ```
//!
//! # Design Decisions
//! - Registry reads are lock-free (ArcSwap); writers swap whole sets
//! - Instances that survive a reload keep their health state
//! - Endpoint construction failures skip the instance, they never fail a call

pub mod endpointer;
pub mod registry;
pub mod watcher;

pub use endpointer::{Endpointer, Factory};
pub use registry::{Query, Registry, StaticRegistry};
pub use watcher::RegistryWatcher;
