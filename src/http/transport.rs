//! Request decoders and response encoders for the HTTP binding.
//!
//! # Responsibilities
//! - Turn path variables and body bytes into endpoint requests
//! - Turn endpoint responses into status codes and JSON bodies
//! - Map business errors to HTTP status codes

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::customer::{Address, Context, Customer, ServiceError};
use crate::endpoint::types::*;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Path variables of the matched route.
pub type PathVars = HashMap<String, String>;

/// Failure while decoding an incoming request.
#[derive(Debug, Error)]
pub enum TransportError {
    /// A route was wired to a decoder expecting a variable it doesn't have.
    #[error("inconsistent mapping between route and handler (programmer error)")]
    BadRouting,

    #[error("{0}")]
    Decode(#[from] serde_json::Error),
}

/// Wire shape of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

fn var(vars: &PathVars, name: &str) -> Result<String, TransportError> {
    vars.get(name).cloned().ok_or(TransportError::BadRouting)
}

pub fn decode_create_customer_request(
    ctx: Context,
    _vars: &PathVars,
    body: &[u8],
) -> Result<CreateCustomerRequest, TransportError> {
    let customer: Customer = serde_json::from_slice(body)?;
    Ok(CreateCustomerRequest { ctx, customer })
}

pub fn decode_get_customer_request(
    ctx: Context,
    vars: &PathVars,
    _body: &[u8],
) -> Result<GetCustomerRequest, TransportError> {
    Ok(GetCustomerRequest { ctx, id: var(vars, "id")? })
}

pub fn decode_replace_customer_request(
    ctx: Context,
    vars: &PathVars,
    body: &[u8],
) -> Result<ReplaceCustomerRequest, TransportError> {
    let id = var(vars, "id")?;
    let customer: Customer = serde_json::from_slice(body)?;
    Ok(ReplaceCustomerRequest { ctx, id, customer })
}

pub fn decode_update_customer_request(
    ctx: Context,
    vars: &PathVars,
    body: &[u8],
) -> Result<UpdateCustomerRequest, TransportError> {
    let id = var(vars, "id")?;
    let customer: Customer = serde_json::from_slice(body)?;
    Ok(UpdateCustomerRequest { ctx, id, customer })
}

pub fn decode_delete_customer_request(
    ctx: Context,
    vars: &PathVars,
    _body: &[u8],
) -> Result<DeleteCustomerRequest, TransportError> {
    Ok(DeleteCustomerRequest { ctx, id: var(vars, "id")? })
}

pub fn decode_list_addresses_request(
    ctx: Context,
    vars: &PathVars,
    _body: &[u8],
) -> Result<ListAddressesRequest, TransportError> {
    Ok(ListAddressesRequest { ctx, customer_id: var(vars, "id")? })
}

pub fn decode_get_address_request(
    ctx: Context,
    vars: &PathVars,
    _body: &[u8],
) -> Result<GetAddressRequest, TransportError> {
    Ok(GetAddressRequest {
        ctx,
        customer_id: var(vars, "id")?,
        address_id: var(vars, "address_id")?,
    })
}

pub fn decode_add_address_request(
    ctx: Context,
    vars: &PathVars,
    body: &[u8],
) -> Result<AddAddressRequest, TransportError> {
    let customer_id = var(vars, "id")?;
    let address: Address = serde_json::from_slice(body)?;
    Ok(AddAddressRequest { ctx, customer_id, address })
}

pub fn decode_remove_address_request(
    ctx: Context,
    vars: &PathVars,
    _body: &[u8],
) -> Result<RemoveAddressRequest, TransportError> {
    Ok(RemoveAddressRequest {
        ctx,
        customer_id: var(vars, "id")?,
        address_id: var(vars, "address_id")?,
    })
}

/// Encode a response, or its business error if it carries one.
pub fn encode_response<R: Serialize + Failer>(resp: &R) -> Response {
    if let Some(err) = resp.failed() {
        return encode_error(code_from(err), &err.to_string());
    }
    match serde_json::to_vec(resp) {
        Ok(body) => json(StatusCode::OK, body),
        Err(e) => encode_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
    }
}

/// `{"error": message}` with the given status.
pub fn encode_error(status: StatusCode, message: &str) -> Response {
    let body = ErrorBody { error: message.to_string() };
    match serde_json::to_vec(&body) {
        Ok(body) => json(status, body),
        Err(_) => status.into_response(),
    }
}

fn json(status: StatusCode, body: Vec<u8>) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))],
        body,
    )
        .into_response()
}

/// HTTP status for a business error.
pub fn code_from(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::NotFound => StatusCode::NOT_FOUND,
        ServiceError::AlreadyExists | ServiceError::InconsistentIds => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
