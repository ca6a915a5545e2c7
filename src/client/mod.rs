//! Service client.
//!
//! # Data Flow
//! ```text
//! Service call on Endpoints
//!     → retry (per-attempt timeout, backoff)
//!     → RoundRobin (next endpoint)
//!     → Endpointer (one cached endpoint per passing instance)
//!     → http::client (HTTP request to that instance)
//! ```
//!
//! # Design Decisions
//! - One balancer and retry chain per operation
//! - All operations share one connection pool
//! - Registry changes apply on the next call; nothing is pinned

use notify::RecommendedWatcher;
use std::ops::Deref;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{load_registry, ClientConfig, ConfigError, HealthCheckConfig, ServiceConfig};
use crate::discovery::{Endpointer, Factory, Query, Registry, RegistryWatcher, StaticRegistry};
use crate::health::HealthMonitor;
use crate::lifecycle::Shutdown;
use crate::endpoint::{Endpoint, Endpoints};
use crate::http::client::{http_client, make_client_endpoints_with, HttpClient};
use crate::load_balancer::{HealthThresholds, Instance, RoundRobin};
use crate::resilience::{retry, RetryPolicy};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to load registry: {0}")]
    Registry(#[from] ConfigError),

    #[error("failed to watch registry file: {0}")]
    Watch(#[from] notify::Error),
}

/// Instance set named by the client config: the registry file if one is
/// set, the inline list otherwise.
pub fn registry_from(config: &ClientConfig) -> Result<Arc<StaticRegistry>, ConfigError> {
    let instances = match &config.registry_file {
        Some(path) => load_registry(path)?.instances,
        None => config.registry.instances.clone(),
    };
    Ok(Arc::new(StaticRegistry::new(&instances)))
}

/// A running client: endpoints plus the background tasks keeping its
/// instance set current. Background tasks stop when it is dropped.
pub struct Client {
    endpoints: Endpoints,
    registry: Arc<StaticRegistry>,
    shutdown: Shutdown,
    _watcher: Option<RecommendedWatcher>,
}

impl Client {
    /// Build the registry, start the file watcher and health monitor, and
    /// wire the endpoints. Must be called inside a Tokio runtime.
    pub fn connect(config: &ServiceConfig) -> Result<Self, ClientError> {
        let registry = registry_from(&config.client)?;
        Self::with_registry(config, registry)
    }

    pub fn with_registry(
        config: &ServiceConfig,
        registry: Arc<StaticRegistry>,
    ) -> Result<Self, ClientError> {
        let watcher = match &config.client.registry_file {
            Some(path) => Some(RegistryWatcher::new(path, registry.clone()).run()?),
            None => None,
        };

        let shutdown = Shutdown::new();
        if config.health_check.enabled {
            let monitor = HealthMonitor::new(registry.clone(), config.health_check.clone());
            let signal = shutdown.subscribe();
            tokio::spawn(async move {
                monitor.run(signal).await;
            });
        }

        let endpoints = new(&config.client, &config.health_check, registry.clone());
        Ok(Self {
            endpoints,
            registry,
            shutdown,
            _watcher: watcher,
        })
    }

    pub fn registry(&self) -> &Arc<StaticRegistry> {
        &self.registry
    }
}

impl Deref for Client {
    type Target = Endpoints;

    fn deref(&self) -> &Endpoints {
        &self.endpoints
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Client [`Endpoints`] over every instance `registry` yields for the
/// configured service and tags. The result implements
/// [`Service`](crate::customer::Service).
pub fn new(
    config: &ClientConfig,
    health: &HealthCheckConfig,
    registry: Arc<dyn Registry>,
) -> Endpoints {
    let wiring = Wiring {
        registry,
        query: Query::from(config),
        thresholds: HealthThresholds {
            healthy: health.healthy_threshold as usize,
            unhealthy: health.unhealthy_threshold as usize,
        },
        policy: RetryPolicy::from(&config.retry),
        client: http_client(),
    };

    tracing::debug!(
        service = %wiring.query.service,
        tags = ?wiring.query.tags,
        attempts = wiring.policy.max_attempts,
        "Building service client"
    );

    Endpoints {
        create_customer: wiring.balanced(|e| e.create_customer),
        get_customer: wiring.balanced(|e| e.get_customer),
        replace_customer: wiring.balanced(|e| e.replace_customer),
        update_customer: wiring.balanced(|e| e.update_customer),
        delete_customer: wiring.balanced(|e| e.delete_customer),
        list_addresses: wiring.balanced(|e| e.list_addresses),
        get_address: wiring.balanced(|e| e.get_address),
        add_address: wiring.balanced(|e| e.add_address),
        remove_address: wiring.balanced(|e| e.remove_address),
    }
}

struct Wiring {
    registry: Arc<dyn Registry>,
    query: Query,
    thresholds: HealthThresholds,
    policy: RetryPolicy,
    client: HttpClient,
}

impl Wiring {
    fn balanced<Req, Resp>(&self, pick: fn(Endpoints) -> Endpoint<Req, Resp>) -> Endpoint<Req, Resp>
    where
        Req: Clone + Send + 'static,
        Resp: Send + 'static,
    {
        let client = self.client.clone();
        let factory: Factory<Req, Resp> = Arc::new(move |instance: &Instance| {
            make_client_endpoints_with(client.clone(), instance).map(pick)
        });
        let endpointer = Arc::new(Endpointer::new(
            self.registry.clone(),
            self.query.clone(),
            factory,
            self.thresholds,
        ));
        retry(self.policy, Arc::new(RoundRobin::new(endpointer)))
    }
}
