//! Endpoint layer.
//!
//! # Data Flow
//! ```text
//! Server: transport decode → Endpoint::call → Service → response value
//! Client: Service call on Endpoints → Endpoint::call → HTTP → response value
//! ```
//!
//! # Design Decisions
//! - One generic `Endpoint<Req, Resp>` shape per operation keeps requests
//!   and responses typed while decorators (retry, balancing) stay generic
//! - Business errors travel inside the response value; `EndpointError` is
//!   reserved for transport and infrastructure failures, so retries and
//!   health tracking never count a "not found" as a broken instance

pub mod server;
pub mod service;
pub mod types;

use axum::http::StatusCode;
use futures_util::future::{BoxFuture, FutureExt};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::resilience::retry::RetryError;

pub use types::*;

/// Infrastructure failure while invoking an endpoint.
#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("invalid instance {instance}: {reason}")]
    InvalidInstance { instance: String, reason: String },

    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to build request: {0}")]
    Request(#[from] axum::http::Error),

    #[error("http request failed: {0}")]
    Http(#[from] hyper_util::client::legacy::Error),

    #[error("failed to read response body: {0}")]
    Body(#[from] axum::Error),

    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("no endpoints available")]
    NoEndpoints,

    #[error(transparent)]
    Retry(#[from] RetryError),
}

type EndpointFn<Req, Resp> =
    dyn Fn(Req) -> BoxFuture<'static, Result<Resp, EndpointError>> + Send + Sync;

/// A single operation as an async function from request to response.
pub struct Endpoint<Req, Resp> {
    inner: Arc<EndpointFn<Req, Resp>>,
}

impl<Req, Resp> Endpoint<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Resp, EndpointError>> + Send + 'static,
    {
        let inner: Arc<EndpointFn<Req, Resp>> = Arc::new(move |req: Req| f(req).boxed());
        Self { inner }
    }

    pub fn call(&self, req: Req) -> BoxFuture<'static, Result<Resp, EndpointError>> {
        (self.inner)(req)
    }
}

impl<Req, Resp> Clone for Endpoint<Req, Resp> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<Req, Resp> fmt::Debug for Endpoint<Req, Resp> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint").finish_non_exhaustive()
    }
}

/// All endpoints of the customer service.
///
/// On a server each field invokes the local service; on a client each field
/// talks to remote instances, and the struct itself implements
/// [`Service`](crate::customer::Service).
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub create_customer: Endpoint<CreateCustomerRequest, CreateCustomerResponse>,
    pub get_customer: Endpoint<GetCustomerRequest, GetCustomerResponse>,
    pub replace_customer: Endpoint<ReplaceCustomerRequest, ReplaceCustomerResponse>,
    pub update_customer: Endpoint<UpdateCustomerRequest, UpdateCustomerResponse>,
    pub delete_customer: Endpoint<DeleteCustomerRequest, DeleteCustomerResponse>,
    pub list_addresses: Endpoint<ListAddressesRequest, ListAddressesResponse>,
    pub get_address: Endpoint<GetAddressRequest, GetAddressResponse>,
    pub add_address: Endpoint<AddAddressRequest, AddAddressResponse>,
    pub remove_address: Endpoint<RemoveAddressRequest, RemoveAddressResponse>,
}
