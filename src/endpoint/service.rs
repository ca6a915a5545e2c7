//! [`Service`] implemented over [`Endpoints`], primarily for clients.

use async_trait::async_trait;

use crate::customer::{Address, Context, Customer, Service, ServiceError};
use crate::endpoint::types::*;
use crate::endpoint::{Endpoint, EndpointError, Endpoints};

fn transport(err: EndpointError) -> ServiceError {
    ServiceError::Transport(err.to_string())
}

/// Call `endpoint`, giving up once the context deadline has passed.
async fn invoke<Req, Resp>(
    ctx: &Context,
    endpoint: &Endpoint<Req, Resp>,
    req: Req,
) -> Result<Resp, ServiceError>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    let call = endpoint.call(req);
    let result = match ctx.deadline() {
        Some(deadline) => tokio::time::timeout_at(deadline.into(), call)
            .await
            .map_err(|_| ServiceError::DeadlineExceeded)?,
        None => call.await,
    };
    result.map_err(transport)
}

fn into_result<R: Failer>(resp: R) -> Result<R, ServiceError> {
    match resp.failed() {
        Some(err) => Err(err.clone()),
        None => Ok(resp),
    }
}

fn missing(field: &str) -> ServiceError {
    ServiceError::Transport(format!("response is missing `{field}`"))
}

#[async_trait]
impl Service for Endpoints {
    async fn create_customer(&self, ctx: &Context, customer: Customer) -> Result<(), ServiceError> {
        let req = CreateCustomerRequest { ctx: ctx.clone(), customer };
        let resp = invoke(ctx, &self.create_customer, req).await?;
        into_result(resp).map(|_| ())
    }

    async fn get_customer(&self, ctx: &Context, id: &str) -> Result<Customer, ServiceError> {
        let req = GetCustomerRequest { ctx: ctx.clone(), id: id.to_string() };
        let resp = invoke(ctx, &self.get_customer, req).await?;
        into_result(resp)?.customer.ok_or_else(|| missing("customer"))
    }

    async fn replace_customer(
        &self,
        ctx: &Context,
        id: &str,
        customer: Customer,
    ) -> Result<(), ServiceError> {
        let req = ReplaceCustomerRequest { ctx: ctx.clone(), id: id.to_string(), customer };
        let resp = invoke(ctx, &self.replace_customer, req).await?;
        into_result(resp).map(|_| ())
    }

    async fn update_customer(
        &self,
        ctx: &Context,
        id: &str,
        partial: Customer,
    ) -> Result<(), ServiceError> {
        let req = UpdateCustomerRequest { ctx: ctx.clone(), id: id.to_string(), customer: partial };
        let resp = invoke(ctx, &self.update_customer, req).await?;
        into_result(resp).map(|_| ())
    }

    async fn delete_customer(&self, ctx: &Context, id: &str) -> Result<(), ServiceError> {
        let req = DeleteCustomerRequest { ctx: ctx.clone(), id: id.to_string() };
        let resp = invoke(ctx, &self.delete_customer, req).await?;
        into_result(resp).map(|_| ())
    }

    async fn list_addresses(
        &self,
        ctx: &Context,
        customer_id: &str,
    ) -> Result<Vec<Address>, ServiceError> {
        let req = ListAddressesRequest { ctx: ctx.clone(), customer_id: customer_id.to_string() };
        let resp = invoke(ctx, &self.list_addresses, req).await?;
        into_result(resp).map(|r| r.addresses)
    }

    async fn get_address(
        &self,
        ctx: &Context,
        customer_id: &str,
        address_id: &str,
    ) -> Result<Address, ServiceError> {
        let req = GetAddressRequest {
            ctx: ctx.clone(),
            customer_id: customer_id.to_string(),
            address_id: address_id.to_string(),
        };
        let resp = invoke(ctx, &self.get_address, req).await?;
        into_result(resp)?.address.ok_or_else(|| missing("address"))
    }

    async fn add_address(
        &self,
        ctx: &Context,
        customer_id: &str,
        address: Address,
    ) -> Result<(), ServiceError> {
        let req = AddAddressRequest {
            ctx: ctx.clone(),
            customer_id: customer_id.to_string(),
            address,
        };
        let resp = invoke(ctx, &self.add_address, req).await?;
        into_result(resp).map(|_| ())
    }

    async fn remove_address(
        &self,
        ctx: &Context,
        customer_id: &str,
        address_id: &str,
    ) -> Result<(), ServiceError> {
        let req = RemoveAddressRequest {
            ctx: ctx.clone(),
            customer_id: customer_id.to_string(),
            address_id: address_id.to_string(),
        };
        let resp = invoke(ctx, &self.remove_address, req).await?;
        into_result(resp).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer::InmemService;
    use std::time::Duration;

    #[tokio::test]
    async fn test_endpoints_as_service() {
        let svc: &dyn Service = &Endpoints::server(InmemService::shared());
        let ctx = Context::new();

        svc.create_customer(&ctx, Customer::new("1", "A", "a@x.com")).await.unwrap();
        assert_eq!(svc.get_customer(&ctx, "1").await.unwrap().email, "a@x.com");
        assert_eq!(svc.delete_customer(&ctx, "2").await, Err(ServiceError::NotFound));
    }

    #[tokio::test]
    async fn test_endpoint_failure_becomes_transport_error() {
        let mut endpoints = Endpoints::server(InmemService::shared());
        endpoints.get_customer = Endpoint::new(|_: GetCustomerRequest| async {
            Err(EndpointError::NoEndpoints)
        });

        let err = endpoints.get_customer(&Context::new(), "1").await.unwrap_err();
        assert!(matches!(err, ServiceError::Transport(_)));
        assert!(!err.is_business());
    }

    #[tokio::test]
    async fn test_context_deadline_bounds_the_call() {
        let mut endpoints = Endpoints::server(InmemService::shared());
        endpoints.delete_customer = Endpoint::new(|_: DeleteCustomerRequest| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(DeleteCustomerResponse::default())
        });

        let ctx = Context::new().with_timeout(Duration::from_millis(20));
        assert_eq!(
            endpoints.delete_customer(&ctx, "1").await,
            Err(ServiceError::DeadlineExceeded)
        );
    }
}
