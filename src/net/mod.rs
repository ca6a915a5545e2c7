//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! --http-addr / listener.bind_address
//!     → listener.rs (normalize, bind)
//!     → Hand off to HTTP layer
//! ```

pub mod listener;

pub use listener::{bind, normalize_bind_address, ListenerError};
