//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe registered instances
//! - Update instance health state based on results

use axum::body::Body;
use axum::http::Request;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time;
use url::Url;

use crate::config::HealthCheckConfig;
use crate::discovery::Registry;
use crate::endpoint::EndpointError;
use crate::http::client::base_url;
use crate::load_balancer::{HealthThresholds, Instance};
use crate::observability::metrics;

pub struct HealthMonitor {
    registry: Arc<dyn Registry>,
    config: HealthCheckConfig,
    client: Client<HttpConnector, Body>,
}

impl HealthMonitor {
    pub fn new(registry: Arc<dyn Registry>, config: HealthCheckConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Self {
            registry,
            config,
            client,
        }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if !self.config.enabled {
            tracing::info!("Active health checks disabled");
            return;
        }

        tracing::info!(
            interval = self.config.interval_secs,
            path = %self.config.path,
            "Health monitor starting"
        );

        let mut ticker = time::interval(Duration::from_secs(self.config.interval_secs));

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check_all().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Probe every registered instance once.
    pub async fn check_all(&self) {
        let thresholds = HealthThresholds {
            healthy: self.config.healthy_threshold as usize,
            unhealthy: self.config.unhealthy_threshold as usize,
        };

        for instance in self.registry.all() {
            if self.probe(&instance).await {
                instance.mark_success(thresholds);
            } else {
                instance.mark_failure(thresholds);
            }
            metrics::record_instance_health(&instance.id, instance.is_passing());
        }
    }

    async fn probe(&self, instance: &Instance) -> bool {
        let uri = match health_url(&instance.address, &self.config.path) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(instance = %instance.id, error = %e, "Health check skipped");
                return false;
            }
        };

        let request = match Request::get(uri.as_str())
            .header("user-agent", "customer-health-check")
            .body(Body::empty())
        {
            Ok(req) => req,
            Err(e) => {
                tracing::error!("Failed to build health check request: {}", e);
                return false;
            }
        };

        let timeout = Duration::from_secs(self.config.timeout_secs);
        match time::timeout(timeout, self.client.request(request)).await {
            Ok(Ok(response)) => {
                let success = response.status().is_success();
                if !success {
                    tracing::warn!(instance = %instance.id, status = %response.status(), "Health check failed: non-success status");
                }
                success
            }
            Ok(Err(e)) => {
                tracing::warn!(instance = %instance.id, error = %e, "Health check failed: connection error");
                false
            }
            Err(_) => {
                tracing::warn!(instance = %instance.id, "Health check failed: timeout");
                false
            }
        }
    }
}

/// The health path joined onto the instance's base path.
fn health_url(address: &str, path: &str) -> Result<Url, EndpointError> {
    let mut url = base_url(address)?;
    if let Ok(mut segments) = url.path_segments_mut() {
        segments
            .pop_if_empty()
            .extend(path.split('/').filter(|s| !s.is_empty()));
    }
    Ok(url)
}
