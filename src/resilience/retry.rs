//! Retry logic.
//!
//! # Responsibilities
//! - Pick a fresh endpoint from the balancer for every attempt
//! - Bound each attempt with its own timeout
//! - Sleep with jittered exponential backoff between attempts
//! - Report every attempt's error once the attempts are exhausted

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time;

use crate::config::RetryConfig;
use crate::endpoint::{Endpoint, EndpointError};
use crate::load_balancer::Balancer;
use crate::observability::metrics;
use crate::resilience::backoff::ExponentialBackoff;

/// Every attempt failed.
#[derive(Debug, Error)]
pub struct RetryError {
    pub errors: Vec<EndpointError>,
}

impl RetryError {
    pub fn last(&self) -> Option<&EndpointError> {
        self.errors.last()
    }
}

impl fmt::Display for RetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "retry failed after {} attempts", self.errors.len())?;
        if let Some(last) = self.last() {
            write!(f, ": {last}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub attempt_timeout: Duration,
    pub backoff: ExponentialBackoff,
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            attempt_timeout: Duration::from_millis(config.attempt_timeout_ms),
            backoff: ExponentialBackoff::from(config),
        }
    }
}

/// Endpoint that invokes whatever `balancer` picks, retrying failed attempts.
pub fn retry<Req, Resp>(
    policy: RetryPolicy,
    balancer: Arc<dyn Balancer<Req, Resp>>,
) -> Endpoint<Req, Resp>
where
    Req: Clone + Send + 'static,
    Resp: Send + 'static,
{
    Endpoint::new(move |req: Req| {
        let balancer = balancer.clone();
        async move {
            let mut errors = Vec::new();

            for attempt in 1..=policy.max_attempts {
                match attempt_once(&policy, balancer.as_ref(), req.clone()).await {
                    Ok(resp) => {
                        metrics::record_attempt("success");
                        return Ok(resp);
                    }
                    Err(e) => {
                        metrics::record_attempt(match e {
                            EndpointError::Timeout(_) => "timeout",
                            _ => "failure",
                        });
                        tracing::debug!(attempt, error = %e, "Attempt failed");
                        errors.push(e);
                    }
                }

                if attempt < policy.max_attempts {
                    time::sleep(policy.backoff.delay(attempt)).await;
                }
            }

            tracing::warn!(attempts = errors.len(), "All attempts failed");
            Err(EndpointError::Retry(RetryError { errors }))
        }
    })
}

async fn attempt_once<Req, Resp>(
    policy: &RetryPolicy,
    balancer: &dyn Balancer<Req, Resp>,
    req: Req,
) -> Result<Resp, EndpointError>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    let endpoint = balancer.endpoint()?;
    match time::timeout(policy.attempt_timeout, endpoint.call(req)).await {
        Ok(result) => result,
        Err(_) => Err(EndpointError::Timeout(policy.attempt_timeout)),
    }
}
