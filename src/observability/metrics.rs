//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_requests_total` (counter): requests by method, status
//! - `http_request_duration_seconds` (histogram): latency by method
//! - `customer_service_requests_total` (counter): service calls by method, outcome
//! - `customer_service_request_duration_seconds` (histogram): service latency
//! - `customer_service_instance_health` (gauge): 1=passing, 0=critical
//! - `customer_client_attempts_total` (counter): client attempts by outcome

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

use crate::customer::ServiceError;

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("http_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_service_call(method: &'static str, err: Option<&ServiceError>, start: Instant) {
    let outcome = match err {
        None => "ok",
        Some(e) if e.is_business() => "business_error",
        Some(_) => "error",
    };
    counter!("customer_service_requests_total", "method" => method, "outcome" => outcome)
        .increment(1);
    histogram!("customer_service_request_duration_seconds", "method" => method)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_instance_health(instance: &str, passing: bool) {
    gauge!("customer_service_instance_health", "instance" => instance.to_string())
        .set(if passing { 1.0 } else { 0.0 });
}

pub fn record_attempt(outcome: &'static str) {
    counter!("customer_client_attempts_total", "outcome" => outcome).increment(1);
}
