//! Discovered service instance.
//!
//! # Responsibilities
//! - Represent a single registered server
//! - Match registry queries (service name, tags)
//! - Track health state (Passing/Critical) with hysteresis

use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

use crate::config::InstanceConfig;

/// Health state of an instance.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Unknown = 0,
    Passing = 1,
    Critical = 2,
}

impl From<u8> for HealthState {
    fn from(val: u8) -> Self {
        match val {
            1 => HealthState::Passing,
            2 => HealthState::Critical,
            _ => HealthState::Unknown,
        }
    }
}

/// Consecutive outcomes needed before the health state flips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthThresholds {
    pub healthy: usize,
    pub unhealthy: usize,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            healthy: 2,
            unhealthy: 3,
        }
    }
}

/// A single registered instance of a service.
#[derive(Debug)]
pub struct Instance {
    pub id: String,
    pub service: String,
    /// As registered: `host:port` or a URL.
    pub address: String,
    pub tags: Vec<String>,

    state: AtomicU8,
    consecutive_failures: AtomicUsize,
    consecutive_successes: AtomicUsize,
}

impl Instance {
    pub fn new(
        id: impl Into<String>,
        service: impl Into<String>,
        address: impl Into<String>,
        tags: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            service: service.into(),
            address: address.into(),
            tags,
            state: AtomicU8::new(HealthState::Unknown as u8),
            consecutive_failures: AtomicUsize::new(0),
            consecutive_successes: AtomicUsize::new(0),
        }
    }

    /// Identity used to decide whether two registrations are the same instance.
    pub fn key(&self) -> String {
        format!("{}@{}", self.id, self.address)
    }

    /// True if the instance carries every tag in `tags`.
    pub fn has_tags(&self, tags: &[String]) -> bool {
        tags.iter().all(|t| self.tags.contains(t))
    }

    pub fn health(&self) -> HealthState {
        HealthState::from(self.state.load(Ordering::Relaxed))
    }

    /// Passing or not yet checked.
    pub fn is_passing(&self) -> bool {
        self.health() != HealthState::Critical
    }

    /// Report a successful call or probe. Returns true on a transition to Passing.
    pub fn mark_success(&self, thresholds: HealthThresholds) -> bool {
        self.consecutive_failures.store(0, Ordering::Relaxed);

        if self.health() == HealthState::Passing {
            return false;
        }

        let successes = self.consecutive_successes.fetch_add(1, Ordering::Relaxed) + 1;
        if successes >= thresholds.healthy {
            self.consecutive_successes.store(0, Ordering::Relaxed);
            self.state.store(HealthState::Passing as u8, Ordering::Relaxed);
            tracing::info!(instance = %self.id, address = %self.address, "Instance passing");
            return true;
        }
        false
    }

    /// Report a failed call or probe. Returns true on a transition to Critical.
    pub fn mark_failure(&self, thresholds: HealthThresholds) -> bool {
        self.consecutive_successes.store(0, Ordering::Relaxed);

        if self.health() == HealthState::Critical {
            return false;
        }

        let failures = self.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1;
        if failures >= thresholds.unhealthy {
            self.consecutive_failures.store(0, Ordering::Relaxed);
            self.state.store(HealthState::Critical as u8, Ordering::Relaxed);
            tracing::warn!(instance = %self.id, address = %self.address, "Instance critical");
            return true;
        }
        false
    }
}

impl From<&InstanceConfig> for Instance {
    fn from(config: &InstanceConfig) -> Self {
        Self::new(
            config.id.clone(),
            config.service.clone(),
            config.address.clone(),
            config.tags.clone(),
        )
    }
}
