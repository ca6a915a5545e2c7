//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with one handler per endpoint
//! - Wire up middleware (request ID, tracing, timeout, body limit, metrics)
//! - Bind server to listener and shut down gracefully

use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::customer::{Context, Service};
use crate::endpoint::{Endpoint, Endpoints, Failer};
use crate::http::middleware::track_metrics;
use crate::http::request::{RequestContext, X_REQUEST_ID};
use crate::http::transport::{self, PathVars, TransportError};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub endpoints: Arc<Endpoints>,
    /// Deadline given to every service call.
    pub request_timeout: Duration,
}

impl AppState {
    fn context(&self, RequestContext(ctx): RequestContext) -> Context {
        ctx.with_timeout(self.request_timeout)
    }
}

/// HTTP server for the customer service.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Serve `service` with the given configuration.
    pub fn new(config: &ServiceConfig, service: Arc<dyn Service>) -> Self {
        let state = AppState {
            endpoints: Arc::new(Endpoints::server(service)),
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
        };
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new()
            .route("/customers/", post(create_customer))
            .route(
                "/customers/{id}",
                get(get_customer)
                    .put(replace_customer)
                    .patch(update_customer)
                    .delete(delete_customer),
            )
            .route(
                "/customers/{id}/addresses/",
                get(list_addresses).post(add_address),
            )
            .route(
                "/customers/{id}/addresses/{address_id}",
                get(get_address).delete(remove_address),
            )
            .route("/health", get(health))
            .with_state(state)
            .layer(middleware::from_fn(track_metrics))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(
                        |request: &Request<Body>| {
                            let request_id = request
                                .headers()
                                .get(&X_REQUEST_ID)
                                .and_then(|v| v.to_str().ok())
                                .unwrap_or("unknown");
                            tracing::info_span!(
                                "http_request",
                                method = %request.method(),
                                uri = %request.uri(),
                                request_id = %request_id,
                            )
                        },
                    ))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    ))),
            )
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Decode, invoke, encode.
async fn serve<Req, Resp>(
    endpoint: &Endpoint<Req, Resp>,
    decoded: Result<Req, TransportError>,
) -> Response
where
    Req: Send + 'static,
    Resp: Serialize + Failer + Send + 'static,
{
    let req = match decoded {
        Ok(req) => req,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to decode request");
            return transport::encode_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string());
        }
    };

    match endpoint.call(req).await {
        Ok(resp) => transport::encode_response(&resp),
        Err(e) => {
            tracing::warn!(error = %e, "Endpoint failed");
            transport::encode_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

async fn create_customer(
    State(state): State<AppState>,
    rc: RequestContext,
    body: Bytes,
) -> Response {
    let ctx = state.context(rc);
    let decoded = transport::decode_create_customer_request(ctx, &PathVars::new(), &body);
    serve(&state.endpoints.create_customer, decoded).await
}

async fn get_customer(
    State(state): State<AppState>,
    rc: RequestContext,
    Path(vars): Path<PathVars>,
) -> Response {
    let ctx = state.context(rc);
    let decoded = transport::decode_get_customer_request(ctx, &vars, &[]);
    serve(&state.endpoints.get_customer, decoded).await
}

async fn replace_customer(
    State(state): State<AppState>,
    rc: RequestContext,
    Path(vars): Path<PathVars>,
    body: Bytes,
) -> Response {
    let ctx = state.context(rc);
    let decoded = transport::decode_replace_customer_request(ctx, &vars, &body);
    serve(&state.endpoints.replace_customer, decoded).await
}

async fn update_customer(
    State(state): State<AppState>,
    rc: RequestContext,
    Path(vars): Path<PathVars>,
    body: Bytes,
) -> Response {
    let ctx = state.context(rc);
    let decoded = transport::decode_update_customer_request(ctx, &vars, &body);
    serve(&state.endpoints.update_customer, decoded).await
}

async fn delete_customer(
    State(state): State<AppState>,
    rc: RequestContext,
    Path(vars): Path<PathVars>,
) -> Response {
    let ctx = state.context(rc);
    let decoded = transport::decode_delete_customer_request(ctx, &vars, &[]);
    serve(&state.endpoints.delete_customer, decoded).await
}

async fn list_addresses(
    State(state): State<AppState>,
    rc: RequestContext,
    Path(vars): Path<PathVars>,
) -> Response {
    let ctx = state.context(rc);
    let decoded = transport::decode_list_addresses_request(ctx, &vars, &[]);
    serve(&state.endpoints.list_addresses, decoded).await
}

async fn get_address(
    State(state): State<AppState>,
    rc: RequestContext,
    Path(vars): Path<PathVars>,
) -> Response {
    let ctx = state.context(rc);
    let decoded = transport::decode_get_address_request(ctx, &vars, &[]);
    serve(&state.endpoints.get_address, decoded).await
}

async fn add_address(
    State(state): State<AppState>,
    rc: RequestContext,
    Path(vars): Path<PathVars>,
    body: Bytes,
) -> Response {
    let ctx = state.context(rc);
    let decoded = transport::decode_add_address_request(ctx, &vars, &body);
    serve(&state.endpoints.add_address, decoded).await
}

async fn remove_address(
    State(state): State<AppState>,
    rc: RequestContext,
    Path(vars): Path<PathVars>,
) -> Response {
    let ctx = state.context(rc);
    let decoded = transport::decode_remove_address_request(ctx, &vars, &[]);
    serve(&state.endpoints.remove_address, decoded).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer::InmemService;
    use axum::http::header;
    use tower::ServiceExt;

    fn app() -> Router {
        HttpServer::new(&ServiceConfig::default(), InmemService::shared()).router()
    }

    async fn send(app: &Router, method: &str, uri: &str, body: &str) -> (StatusCode, String) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(), "GET", "/health", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let app = app();
        let (status, body) = send(
            &app,
            "POST",
            "/customers/",
            r#"{"id":"1","name":"Ann","email":"ann@x.com"}"#,
        )
        .await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, "{}"));

        let (status, body) = send(&app, "GET", "/customers/1", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            r#"{"customer":{"id":"1","name":"Ann","email":"ann@x.com"}}"#
        );
    }

    #[tokio::test]
    async fn test_errors_map_to_status_codes() {
        let app = app();
        let (status, body) = send(&app, "GET", "/customers/nope", "").await;
        assert_eq!((status, body.as_str()), (StatusCode::NOT_FOUND, r#"{"error":"not found"}"#));

        let (status, body) = send(&app, "POST", "/customers/", r#"{"id":"1","email":"a@x.com"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, r#"{"error":"missing required field: name"}"#);

        let (status, _) = send(&app, "POST", "/customers/", "{not json").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_request_id_is_generated_and_propagated() {
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert!(resp.headers().contains_key("x-request-id"));

        let req = Request::builder()
            .uri("/health")
            .header("x-request-id", "fixed-id")
            .body(Body::empty())
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.headers().get("x-request-id").unwrap(), "fixed-id");
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let mut config = ServiceConfig::default();
        config.security.max_body_size = 64;
        let app = HttpServer::new(&config, InmemService::shared()).router();

        let body = format!(
            r#"{{"id":"1","name":"{}","email":"a@x.com"}}"#,
            "x".repeat(256)
        );
        let req = Request::builder()
            .method("POST")
            .uri("/customers/")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CONTENT_LENGTH, body.len())
            .body(Body::from(body))
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

        // Nothing reached the store.
        let (status, _) = send(&app, "GET", "/customers/1", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            "POST",
            "/customers/",
            r#"{"id":"2","name":"Bo","email":"b@x.com"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_huge_request_timeout_is_served() {
        let mut config = ServiceConfig::default();
        config.timeouts.request_secs = u64::MAX;
        let app = HttpServer::new(&config, InmemService::shared()).router();

        let (status, _) = send(
            &app,
            "POST",
            "/customers/",
            r#"{"id":"1","name":"Ann","email":"ann@x.com"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, "GET", "/customers/1", "").await;
        assert_eq!(status, StatusCode::OK);
    }
}
