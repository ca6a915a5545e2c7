//! Instance registry.

use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{ClientConfig, InstanceConfig};
use crate::load_balancer::Instance;

/// What a client looks up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub service: String,
    pub tags: Vec<String>,
    pub passing_only: bool,
}

impl From<&ClientConfig> for Query {
    fn from(config: &ClientConfig) -> Self {
        Self {
            service: config.service_name.clone(),
            tags: config.tags.clone(),
            passing_only: config.passing_only,
        }
    }
}

/// Source of service instances.
pub trait Registry: Send + Sync {
    /// Instances matching `query`, in registration order.
    fn instances(&self, query: &Query) -> Vec<Arc<Instance>>;

    /// Every registered instance, for health checking.
    fn all(&self) -> Vec<Arc<Instance>>;
}

/// Registry over a fixed instance set that can be swapped at runtime.
#[derive(Debug)]
pub struct StaticRegistry {
    instances: ArcSwap<Vec<Arc<Instance>>>,
}

impl StaticRegistry {
    pub fn new(configs: &[InstanceConfig]) -> Self {
        let instances = configs.iter().map(|c| Arc::new(Instance::from(c))).collect();
        Self {
            instances: ArcSwap::from_pointee(instances),
        }
    }

    /// Replace the instance set. Instances with the same id and address are
    /// kept as-is so their health history survives.
    pub fn replace(&self, configs: &[InstanceConfig]) {
        let current = self.instances.load_full();
        let mut existing: HashMap<String, &Arc<Instance>> =
            current.iter().map(|i| (i.key(), i)).collect();

        let next: Vec<Arc<Instance>> = configs
            .iter()
            .map(|c| {
                let fresh = Instance::from(c);
                match existing.remove(&fresh.key()) {
                    Some(kept) if kept.service == fresh.service && kept.tags == fresh.tags => {
                        kept.clone()
                    }
                    _ => Arc::new(fresh),
                }
            })
            .collect();

        tracing::info!(
            previous = current.len(),
            current = next.len(),
            "Registry instance set replaced"
        );
        self.instances.store(Arc::new(next));
    }

    pub fn len(&self) -> usize {
        self.instances.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Registry for StaticRegistry {
    fn instances(&self, query: &Query) -> Vec<Arc<Instance>> {
        self.instances
            .load()
            .iter()
            .filter(|i| i.service == query.service)
            .filter(|i| i.has_tags(&query.tags))
            .filter(|i| !query.passing_only || i.is_passing())
            .cloned()
            .collect()
    }

    fn all(&self) -> Vec<Arc<Instance>> {
        self.instances.load().iter().cloned().collect()
    }
}
