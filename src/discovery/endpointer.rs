//! Instance set → endpoint set.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::discovery::registry::{Query, Registry};
use crate::endpoint::{Endpoint, EndpointError};
use crate::load_balancer::{HealthThresholds, Instance};

/// Builds the endpoint for one instance.
pub type Factory<Req, Resp> =
    Arc<dyn Fn(&Instance) -> Result<Endpoint<Req, Resp>, EndpointError> + Send + Sync>;

/// Resolves the current instances of a service into endpoints.
///
/// Endpoints are cached per instance and dropped once the instance leaves
/// the registry. Each endpoint reports its outcome to the instance's health
/// state (passive health checking): endpoint errors and calls abandoned
/// mid-flight count as failures.
pub struct Endpointer<Req, Resp> {
    registry: Arc<dyn Registry>,
    query: Query,
    factory: Factory<Req, Resp>,
    thresholds: HealthThresholds,
    cache: Mutex<HashMap<String, Endpoint<Req, Resp>>>,
}

impl<Req, Resp> Endpointer<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    pub fn new(
        registry: Arc<dyn Registry>,
        query: Query,
        factory: Factory<Req, Resp>,
        thresholds: HealthThresholds,
    ) -> Self {
        Self {
            registry,
            query,
            factory,
            thresholds,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Endpoints for the instances currently matching the query.
    pub fn endpoints(&self) -> Vec<Endpoint<Req, Resp>> {
        let instances = self.registry.instances(&self.query);
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);

        let live: Vec<String> = instances.iter().map(|i| i.key()).collect();
        cache.retain(|key, _| live.contains(key));

        let mut endpoints = Vec::with_capacity(instances.len());
        for (instance, key) in instances.into_iter().zip(live) {
            if let Some(endpoint) = cache.get(&key) {
                endpoints.push(endpoint.clone());
                continue;
            }
            match (self.factory)(instance.as_ref()) {
                Ok(endpoint) => {
                    let endpoint = self.track_health(instance, endpoint);
                    cache.insert(key, endpoint.clone());
                    endpoints.push(endpoint);
                }
                Err(e) => {
                    tracing::warn!(instance = %instance.id, error = %e, "Skipping instance");
                }
            }
        }
        endpoints
    }

    fn track_health(
        &self,
        instance: Arc<Instance>,
        inner: Endpoint<Req, Resp>,
    ) -> Endpoint<Req, Resp> {
        let thresholds = self.thresholds;
        Endpoint::new(move |req: Req| {
            let inner = inner.clone();
            let mut outcome = Outcome::new(instance.clone(), thresholds);
            async move {
                let result = inner.call(req).await;
                outcome.settle(result.is_ok());
                result
            }
        })
    }
}

/// Reports one call's outcome to its instance.
///
/// A call dropped before it settles (an attempt timeout, or a caller giving
/// up) counts as a failure.
struct Outcome {
    instance: Arc<Instance>,
    thresholds: HealthThresholds,
    settled: bool,
}

impl Outcome {
    fn new(instance: Arc<Instance>, thresholds: HealthThresholds) -> Self {
        Self {
            instance,
            thresholds,
            settled: false,
        }
    }

    fn settle(&mut self, ok: bool) {
        self.settled = true;
        if ok {
            self.instance.mark_success(self.thresholds);
        } else {
            self.instance.mark_failure(self.thresholds);
        }
    }
}

impl Drop for Outcome {
    fn drop(&mut self) {
        if !self.settled {
            self.instance.mark_failure(self.thresholds);
        }
    }
}
