//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!
//! registry file (TOML, client side)
//!     → loader.rs (load_registry)
//!     → discovery::StaticRegistry (swapped on change by the watcher)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_registry, ConfigError};
pub use schema::{
    ClientConfig, HealthCheckConfig, InstanceConfig, ListenerConfig, LogFormat,
    ObservabilityConfig, RegistryConfig, RetryConfig, SecurityConfig, ServiceConfig,
    TimeoutConfig,
};
