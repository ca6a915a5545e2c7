//! Customer service library.
//!
//! # Architecture Overview
//!
//! ```text
//!   Server                                     Client
//!   ──────                                     ──────
//!   net listener                               Service call on Endpoints
//!     → http server (decode)                     → resilience::retry
//!     → endpoint (request → response value)      → load_balancer::RoundRobin
//!     → customer middleware (log, metrics)       → discovery::Endpointer
//!     → InmemService → CustomerStore             → http client → remote server
//! ```

// Core subsystems
pub mod customer;
pub mod endpoint;
pub mod http;
pub mod net;

// Client side
pub mod client;
pub mod discovery;
pub mod health;
pub mod load_balancer;
pub mod resilience;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use config::schema::ServiceConfig;
pub use customer::{Address, Context, Customer, InmemService, Service, ServiceError};
pub use endpoint::Endpoints;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
