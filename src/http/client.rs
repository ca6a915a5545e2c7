//! Client-side HTTP binding.
//!
//! # Responsibilities
//! - Encode endpoint requests as method, percent-encoded path and JSON body
//! - Propagate the request ID from the context
//! - Decode responses into typed values, business errors, or endpoint errors

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::customer::{Context, ServiceError};
use crate::endpoint::types::*;
use crate::endpoint::{Endpoint, EndpointError, Endpoints};
use crate::http::request::X_REQUEST_ID;
use crate::http::transport::{ErrorBody, JSON_CONTENT_TYPE};
use crate::load_balancer::Instance;

/// Largest response body the client will buffer.
const MAX_RESPONSE_BYTES: usize = 4 * 1024 * 1024;

pub type HttpClient = Client<HttpConnector, Body>;

pub fn http_client() -> HttpClient {
    Client::builder(TokioExecutor::new()).build(HttpConnector::new())
}

/// Base URL of an instance registered as `host:port` or as a URL.
pub fn base_url(address: &str) -> Result<Url, EndpointError> {
    let invalid = |reason: String| EndpointError::InvalidInstance {
        instance: address.to_string(),
        reason,
    };

    let raw = if address.contains("://") {
        address.to_string()
    } else {
        format!("http://{address}")
    };
    let url = Url::parse(&raw).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(invalid("missing host".into()));
    }
    Ok(url)
}

/// Endpoints talking to a single instance over a fresh client.
pub fn make_client_endpoints(instance: &Instance) -> Result<Endpoints, EndpointError> {
    make_client_endpoints_with(http_client(), instance)
}

/// Endpoints talking to a single instance over `client`.
pub fn make_client_endpoints_with(
    client: HttpClient,
    instance: &Instance,
) -> Result<Endpoints, EndpointError> {
    let base = base_url(&instance.address)?;
    Ok(Endpoints {
        create_customer: make_endpoint(&client, &base, encode_create_customer_request),
        get_customer: make_endpoint(&client, &base, encode_get_customer_request),
        replace_customer: make_endpoint(&client, &base, encode_replace_customer_request),
        update_customer: make_endpoint(&client, &base, encode_update_customer_request),
        delete_customer: make_endpoint(&client, &base, encode_delete_customer_request),
        list_addresses: make_endpoint(&client, &base, encode_list_addresses_request),
        get_address: make_endpoint(&client, &base, encode_get_address_request),
        add_address: make_endpoint(&client, &base, encode_add_address_request),
        remove_address: make_endpoint(&client, &base, encode_remove_address_request),
    })
}

/// An encoded request, before it is bound to an instance.
#[derive(Debug)]
pub struct Outgoing {
    pub ctx: Context,
    pub method: Method,
    pub segments: Vec<String>,
    /// Collection routes end in a slash.
    pub collection: bool,
    pub body: Option<Vec<u8>>,
}

impl Outgoing {
    fn new(ctx: Context, method: Method, segments: &[&str]) -> Self {
        Self {
            ctx,
            method,
            segments: segments.iter().map(|s| s.to_string()).collect(),
            collection: false,
            body: None,
        }
    }

    fn collection(mut self) -> Self {
        self.collection = true;
        self
    }

    fn json<T: Serialize>(mut self, value: &T) -> Result<Self, EndpointError> {
        self.body = Some(serde_json::to_vec(value).map_err(EndpointError::Encode)?);
        Ok(self)
    }

    /// Full URL below `base`; each segment is percent-encoded.
    pub fn url(&self, base: &Url) -> Result<Url, EndpointError> {
        let mut url = base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| EndpointError::InvalidInstance {
                instance: base.to_string(),
                reason: "cannot be a base".into(),
            })?;
            path.pop_if_empty().extend(&self.segments);
            if self.collection {
                path.push("");
            }
        }
        Ok(url)
    }
}

type Encoder<Req> = fn(Req) -> Result<Outgoing, EndpointError>;

fn make_endpoint<Req, Resp>(client: &HttpClient, base: &Url, encode: Encoder<Req>) -> Endpoint<Req, Resp>
where
    Req: Send + 'static,
    Resp: DeserializeOwned + Failer + Send + 'static,
{
    let client = client.clone();
    let base = base.clone();
    Endpoint::new(move |req: Req| {
        let client = client.clone();
        let outgoing = encode(req).and_then(|out| Ok((out.url(&base)?, out)));
        async move {
            let (url, outgoing) = outgoing?;
            let request = Request::builder()
                .method(outgoing.method)
                .uri(url.as_str())
                .header(header::CONTENT_TYPE, JSON_CONTENT_TYPE)
                .header(&X_REQUEST_ID, outgoing.ctx.request_id())
                .body(outgoing.body.map(Body::from).unwrap_or_else(Body::empty))?;

            let response = client.request(request).await?;
            let status = response.status();
            let bytes = axum::body::to_bytes(Body::new(response.into_body()), MAX_RESPONSE_BYTES).await?;
            decode_response(status, &bytes)
        }
    })
}

/// 2xx → typed response; a body naming a business error → response carrying
/// that error; anything else → [`EndpointError::Status`].
pub fn decode_response<Resp>(status: StatusCode, body: &[u8]) -> Result<Resp, EndpointError>
where
    Resp: DeserializeOwned + Failer,
{
    if status.is_success() {
        return serde_json::from_slice(body).map_err(EndpointError::Decode);
    }

    if let Ok(ErrorBody { error }) = serde_json::from_slice::<ErrorBody>(body) {
        if let Some(err) = ServiceError::from_message(&error) {
            return Ok(Resp::from_failure(err));
        }
    }

    Err(EndpointError::Status {
        status,
        body: String::from_utf8_lossy(body).into_owned(),
    })
}

pub fn encode_create_customer_request(req: CreateCustomerRequest) -> Result<Outgoing, EndpointError> {
    Outgoing::new(req.ctx, Method::POST, &["customers"])
        .collection()
        .json(&req.customer)
}

pub fn encode_get_customer_request(req: GetCustomerRequest) -> Result<Outgoing, EndpointError> {
    Ok(Outgoing::new(req.ctx, Method::GET, &["customers", &req.id]))
}

pub fn encode_replace_customer_request(req: ReplaceCustomerRequest) -> Result<Outgoing, EndpointError> {
    Outgoing::new(req.ctx, Method::PUT, &["customers", &req.id]).json(&req.customer)
}

pub fn encode_update_customer_request(req: UpdateCustomerRequest) -> Result<Outgoing, EndpointError> {
    Outgoing::new(req.ctx, Method::PATCH, &["customers", &req.id]).json(&req.customer)
}

pub fn encode_delete_customer_request(req: DeleteCustomerRequest) -> Result<Outgoing, EndpointError> {
    Ok(Outgoing::new(req.ctx, Method::DELETE, &["customers", &req.id]))
}

pub fn encode_list_addresses_request(req: ListAddressesRequest) -> Result<Outgoing, EndpointError> {
    Ok(Outgoing::new(req.ctx, Method::GET, &["customers", &req.customer_id, "addresses"]).collection())
}

pub fn encode_get_address_request(req: GetAddressRequest) -> Result<Outgoing, EndpointError> {
    Ok(Outgoing::new(
        req.ctx,
        Method::GET,
        &["customers", &req.customer_id, "addresses", &req.address_id],
    ))
}

pub fn encode_add_address_request(req: AddAddressRequest) -> Result<Outgoing, EndpointError> {
    Outgoing::new(req.ctx, Method::POST, &["customers", &req.customer_id, "addresses"])
        .collection()
        .json(&req.address)
}

pub fn encode_remove_address_request(req: RemoveAddressRequest) -> Result<Outgoing, EndpointError> {
    Ok(Outgoing::new(
        req.ctx,
        Method::DELETE,
        &["customers", &req.customer_id, "addresses", &req.address_id],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer::{Address, Customer};

    #[test]
    fn test_base_url() {
        assert_eq!(base_url("127.0.0.1:8080").unwrap().as_str(), "http://127.0.0.1:8080/");
        assert_eq!(
            base_url("https://svc.local/api").unwrap().as_str(),
            "https://svc.local/api"
        );
        assert!(matches!(
            base_url("http://"),
            Err(EndpointError::InvalidInstance { .. })
        ));
    }

    #[test]
    fn test_paths_are_percent_encoded() {
        let base = base_url("svc:80").unwrap();
        let out = encode_get_address_request(GetAddressRequest {
            ctx: Context::new(),
            customer_id: "a b/c".into(),
            address_id: "x?y".into(),
        })
        .unwrap();
        assert_eq!(
            out.url(&base).unwrap().as_str(),
            "http://svc/customers/a%20b%2Fc/addresses/x%3Fy"
        );
    }

    #[test]
    fn test_collection_routes_keep_trailing_slash() {
        let base = base_url("svc:8080/prefix/").unwrap();
        let out = encode_add_address_request(AddAddressRequest {
            ctx: Context::new(),
            customer_id: "1".into(),
            address: Address::new("home", "Main St"),
        })
        .unwrap();
        assert_eq!(out.method, Method::POST);
        assert_eq!(
            out.url(&base).unwrap().as_str(),
            "http://svc:8080/prefix/customers/1/addresses/"
        );
        assert_eq!(
            out.body.unwrap(),
            br#"{"id":"home","location":"Main St"}"#.to_vec()
        );
    }

    #[test]
    fn test_request_body_is_the_raw_record() {
        let out = encode_replace_customer_request(ReplaceCustomerRequest {
            ctx: Context::new(),
            id: "1".into(),
            customer: Customer::new("1", "Ann", "ann@x.com"),
        })
        .unwrap();
        assert_eq!(out.method, Method::PUT);
        assert_eq!(
            out.body.unwrap(),
            br#"{"id":"1","name":"Ann","email":"ann@x.com"}"#.to_vec()
        );
    }

    #[test]
    fn test_decode_success() {
        let resp: GetCustomerResponse =
            decode_response(StatusCode::OK, br#"{"customer":{"id":"1","name":"A"}}"#).unwrap();
        assert_eq!(resp.customer.unwrap().name, "A");
        assert!(resp.err.is_none());
    }

    #[test]
    fn test_decode_business_error_regardless_of_status() {
        let resp: GetCustomerResponse =
            decode_response(StatusCode::NOT_FOUND, br#"{"error":"not found"}"#).unwrap();
        assert_eq!(resp.failed(), Some(&ServiceError::NotFound));

        let resp: CreateCustomerResponse = decode_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            br#"{"error":"missing required field: email"}"#,
        )
        .unwrap();
        assert_eq!(
            resp.failed(),
            Some(&ServiceError::MissingRequiredField("email".into()))
        );
    }

    #[test]
    fn test_decode_other_failures_are_endpoint_errors() {
        let err = decode_response::<DeleteCustomerResponse>(
            StatusCode::BAD_GATEWAY,
            b"upstream down",
        )
        .unwrap_err();
        assert!(matches!(err, EndpointError::Status { status, .. } if status == StatusCode::BAD_GATEWAY));

        let err = decode_response::<DeleteCustomerResponse>(
            StatusCode::INTERNAL_SERVER_ERROR,
            br#"{"error":"EOF while parsing"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, EndpointError::Status { .. }));
    }
}
