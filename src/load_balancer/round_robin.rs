//! Round-robin load balancing strategy.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::discovery::Endpointer;
use crate::endpoint::{Endpoint, EndpointError};
use crate::load_balancer::Balancer;

/// Round-robin selector.
/// Stores an internal counter to rotate through the current endpoints.
pub struct RoundRobin<Req, Resp> {
    endpointer: Arc<Endpointer<Req, Resp>>,
    counter: AtomicUsize,
}

impl<Req, Resp> RoundRobin<Req, Resp> {
    pub fn new(endpointer: Arc<Endpointer<Req, Resp>>) -> Self {
        Self {
            endpointer,
            counter: AtomicUsize::new(0),
        }
    }
}

impl<Req, Resp> Balancer<Req, Resp> for RoundRobin<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    fn endpoint(&self) -> Result<Endpoint<Req, Resp>, EndpointError> {
        let endpoints = self.endpointer.endpoints();
        if endpoints.is_empty() {
            return Err(EndpointError::NoEndpoints);
        }
        let index = self.counter.fetch_add(1, Ordering::Relaxed) % endpoints.len();
        Ok(endpoints[index].clone())
    }
}
