//! Service middlewares.
//!
//! A middleware takes a [`Service`] and returns a [`Service`] with the same
//! contract. Results and errors pass through untouched.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

use crate::customer::context::Context;
use crate::customer::error::ServiceError;
use crate::customer::model::{Address, Customer};
use crate::customer::service::Service;
use crate::observability::metrics;

/// Service decorator.
pub type Middleware = Box<dyn Fn(Arc<dyn Service>) -> Arc<dyn Service> + Send + Sync>;

/// Wrap `service` in `middlewares`; the first one ends up innermost.
pub fn chain(service: Arc<dyn Service>, middlewares: Vec<Middleware>) -> Arc<dyn Service> {
    middlewares.into_iter().fold(service, |next, mw| mw(next))
}

/// Emits one structured event per call.
pub fn logging_middleware() -> Middleware {
    Box::new(|next| Arc::new(LoggingMiddleware { next }))
}

/// Records call counts and latencies.
pub fn instrumenting_middleware() -> Middleware {
    Box::new(|next| Arc::new(InstrumentingMiddleware { next }))
}

fn outcome<T>(result: &Result<T, ServiceError>) -> Option<&ServiceError> {
    result.as_ref().err()
}

struct LoggingMiddleware {
    next: Arc<dyn Service>,
}

#[async_trait]
impl Service for LoggingMiddleware {
    async fn create_customer(&self, ctx: &Context, customer: Customer) -> Result<(), ServiceError> {
        let begin = Instant::now();
        let id = customer.id.clone();
        let result = self.next.create_customer(ctx, customer).await;
        tracing::info!(
            request_id = %ctx.request_id(),
            method = "CreateCustomer",
            id = %id,
            took = ?begin.elapsed(),
            err = ?outcome(&result),
            "service call"
        );
        result
    }

    async fn get_customer(&self, ctx: &Context, id: &str) -> Result<Customer, ServiceError> {
        let begin = Instant::now();
        let result = self.next.get_customer(ctx, id).await;
        tracing::info!(
            request_id = %ctx.request_id(),
            method = "GetCustomer",
            id = %id,
            took = ?begin.elapsed(),
            err = ?outcome(&result),
            "service call"
        );
        result
    }

    async fn replace_customer(
        &self,
        ctx: &Context,
        id: &str,
        customer: Customer,
    ) -> Result<(), ServiceError> {
        let begin = Instant::now();
        let result = self.next.replace_customer(ctx, id, customer).await;
        tracing::info!(
            request_id = %ctx.request_id(),
            method = "ReplaceCustomer",
            id = %id,
            took = ?begin.elapsed(),
            err = ?outcome(&result),
            "service call"
        );
        result
    }

    async fn update_customer(
        &self,
        ctx: &Context,
        id: &str,
        partial: Customer,
    ) -> Result<(), ServiceError> {
        let begin = Instant::now();
        let result = self.next.update_customer(ctx, id, partial).await;
        tracing::info!(
            request_id = %ctx.request_id(),
            method = "UpdateCustomer",
            id = %id,
            took = ?begin.elapsed(),
            err = ?outcome(&result),
            "service call"
        );
        result
    }

    async fn delete_customer(&self, ctx: &Context, id: &str) -> Result<(), ServiceError> {
        let begin = Instant::now();
        let result = self.next.delete_customer(ctx, id).await;
        tracing::info!(
            request_id = %ctx.request_id(),
            method = "DeleteCustomer",
            id = %id,
            took = ?begin.elapsed(),
            err = ?outcome(&result),
            "service call"
        );
        result
    }

    async fn list_addresses(
        &self,
        ctx: &Context,
        customer_id: &str,
    ) -> Result<Vec<Address>, ServiceError> {
        let begin = Instant::now();
        let result = self.next.list_addresses(ctx, customer_id).await;
        tracing::info!(
            request_id = %ctx.request_id(),
            method = "ListAddresses",
            customer_id = %customer_id,
            took = ?begin.elapsed(),
            err = ?outcome(&result),
            "service call"
        );
        result
    }

    async fn get_address(
        &self,
        ctx: &Context,
        customer_id: &str,
        address_id: &str,
    ) -> Result<Address, ServiceError> {
        let begin = Instant::now();
        let result = self.next.get_address(ctx, customer_id, address_id).await;
        tracing::info!(
            request_id = %ctx.request_id(),
            method = "GetAddress",
            customer_id = %customer_id,
            address_id = %address_id,
            took = ?begin.elapsed(),
            err = ?outcome(&result),
            "service call"
        );
        result
    }

    async fn add_address(
        &self,
        ctx: &Context,
        customer_id: &str,
        address: Address,
    ) -> Result<(), ServiceError> {
        let begin = Instant::now();
        let address_id = address.id.clone();
        let result = self.next.add_address(ctx, customer_id, address).await;
        tracing::info!(
            request_id = %ctx.request_id(),
            method = "AddAddress",
            customer_id = %customer_id,
            address_id = %address_id,
            took = ?begin.elapsed(),
            err = ?outcome(&result),
            "service call"
        );
        result
    }

    async fn remove_address(
        &self,
        ctx: &Context,
        customer_id: &str,
        address_id: &str,
    ) -> Result<(), ServiceError> {
        let begin = Instant::now();
        let result = self.next.remove_address(ctx, customer_id, address_id).await;
        tracing::info!(
            request_id = %ctx.request_id(),
            method = "RemoveAddress",
            customer_id = %customer_id,
            address_id = %address_id,
            took = ?begin.elapsed(),
            err = ?outcome(&result),
            "service call"
        );
        result
    }
}

struct InstrumentingMiddleware {
    next: Arc<dyn Service>,
}

impl InstrumentingMiddleware {
    fn observe<T>(method: &'static str, begin: Instant, result: &Result<T, ServiceError>) {
        metrics::record_service_call(method, outcome(result), begin);
    }
}

#[async_trait]
impl Service for InstrumentingMiddleware {
    async fn create_customer(&self, ctx: &Context, customer: Customer) -> Result<(), ServiceError> {
        let begin = Instant::now();
        let result = self.next.create_customer(ctx, customer).await;
        Self::observe("CreateCustomer", begin, &result);
        result
    }

    async fn get_customer(&self, ctx: &Context, id: &str) -> Result<Customer, ServiceError> {
        let begin = Instant::now();
        let result = self.next.get_customer(ctx, id).await;
        Self::observe("GetCustomer", begin, &result);
        result
    }

    async fn replace_customer(
        &self,
        ctx: &Context,
        id: &str,
        customer: Customer,
    ) -> Result<(), ServiceError> {
        let begin = Instant::now();
        let result = self.next.replace_customer(ctx, id, customer).await;
        Self::observe("ReplaceCustomer", begin, &result);
        result
    }

    async fn update_customer(
        &self,
        ctx: &Context,
        id: &str,
        partial: Customer,
    ) -> Result<(), ServiceError> {
        let begin = Instant::now();
        let result = self.next.update_customer(ctx, id, partial).await;
        Self::observe("UpdateCustomer", begin, &result);
        result
    }

    async fn delete_customer(&self, ctx: &Context, id: &str) -> Result<(), ServiceError> {
        let begin = Instant::now();
        let result = self.next.delete_customer(ctx, id).await;
        Self::observe("DeleteCustomer", begin, &result);
        result
    }

    async fn list_addresses(
        &self,
        ctx: &Context,
        customer_id: &str,
    ) -> Result<Vec<Address>, ServiceError> {
        let begin = Instant::now();
        let result = self.next.list_addresses(ctx, customer_id).await;
        Self::observe("ListAddresses", begin, &result);
        result
    }

    async fn get_address(
        &self,
        ctx: &Context,
        customer_id: &str,
        address_id: &str,
    ) -> Result<Address, ServiceError> {
        let begin = Instant::now();
        let result = self.next.get_address(ctx, customer_id, address_id).await;
        Self::observe("GetAddress", begin, &result);
        result
    }

    async fn add_address(
        &self,
        ctx: &Context,
        customer_id: &str,
        address: Address,
    ) -> Result<(), ServiceError> {
        let begin = Instant::now();
        let result = self.next.add_address(ctx, customer_id, address).await;
        Self::observe("AddAddress", begin, &result);
        result
    }

    async fn remove_address(
        &self,
        ctx: &Context,
        customer_id: &str,
        address_id: &str,
    ) -> Result<(), ServiceError> {
        let begin = Instant::now();
        let result = self.next.remove_address(ctx, customer_id, address_id).await;
        Self::observe("RemoveAddress", begin, &result);
        result
    }
}
