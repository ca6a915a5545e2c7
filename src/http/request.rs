//! Request context extraction.
//!
//! # Responsibilities
//! - Carry the `x-request-id` set by the request-id layer into the service
//!   [`Context`]
//! - Fall back to a fresh id when the header is missing or not ASCII

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderName;
use std::convert::Infallible;

use crate::customer::Context;

pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Service context for the current request.
#[derive(Debug, Clone)]
pub struct RequestContext(pub Context);

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts
            .headers
            .get(&X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(Context::with_request_id)
            .unwrap_or_default();
        Ok(Self(ctx))
    }
}
