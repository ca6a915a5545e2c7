//! HTTP binding subsystem.
//!
//! # Data Flow
//! ```text
//! Server:
//!     TCP connection
//!     → server.rs (Axum router, request ID, tracing, limits)
//!     → transport.rs (decode path vars + body)
//!     → Endpoint → Service
//!     → transport.rs (encode response or {"error": ...})
//!
//! Client:
//!     Endpoint request
//!     → client.rs (method, path, JSON body, x-request-id)
//!     → remote server
//!     → client.rs (typed response, business error, or EndpointError)
//! ```

pub mod client;
pub mod middleware;
pub mod request;
pub mod server;
pub mod transport;

pub use client::{make_client_endpoints, make_client_endpoints_with};
pub use request::{RequestContext, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
