//! Customer domain subsystem.
//!
//! # Data Flow
//! ```text
//! endpoint layer
//!     → middleware.rs (logging, instrumentation)
//!     → service.rs (validation, existence checks)
//!     → store.rs (single RwLock over the customer map)
//! ```
//!
//! # Design Decisions
//! - Service is a trait object so decorators can wrap it transparently
//! - Business errors are values, never transport failures
//! - Validation that needs no store state runs before any lock is taken

pub mod context;
pub mod error;
pub mod middleware;
pub mod model;
pub mod service;
pub mod store;

pub use context::Context;
pub use error::ServiceError;
pub use middleware::Middleware;
pub use model::{Address, Customer};
pub use service::{InmemService, Service};
pub use store::CustomerStore;
