//! Server-side endpoints invoking a local [`Service`].

use std::sync::Arc;

use crate::customer::Service;
use crate::endpoint::{Endpoint, Endpoints};
use crate::endpoint::types::*;

impl Endpoints {
    /// Endpoints where each operation calls the matching method on `svc`.
    pub fn server(svc: Arc<dyn Service>) -> Self {
        Self {
            create_customer: make_create_customer_endpoint(svc.clone()),
            get_customer: make_get_customer_endpoint(svc.clone()),
            replace_customer: make_replace_customer_endpoint(svc.clone()),
            update_customer: make_update_customer_endpoint(svc.clone()),
            delete_customer: make_delete_customer_endpoint(svc.clone()),
            list_addresses: make_list_addresses_endpoint(svc.clone()),
            get_address: make_get_address_endpoint(svc.clone()),
            add_address: make_add_address_endpoint(svc.clone()),
            remove_address: make_remove_address_endpoint(svc),
        }
    }
}

pub fn make_create_customer_endpoint(
    svc: Arc<dyn Service>,
) -> Endpoint<CreateCustomerRequest, CreateCustomerResponse> {
    Endpoint::new(move |req: CreateCustomerRequest| {
        let svc = svc.clone();
        async move {
            let err = svc.create_customer(&req.ctx, req.customer).await.err();
            Ok(CreateCustomerResponse { err })
        }
    })
}

pub fn make_get_customer_endpoint(
    svc: Arc<dyn Service>,
) -> Endpoint<GetCustomerRequest, GetCustomerResponse> {
    Endpoint::new(move |req: GetCustomerRequest| {
        let svc = svc.clone();
        async move {
            Ok(match svc.get_customer(&req.ctx, &req.id).await {
                Ok(customer) => GetCustomerResponse { customer: Some(customer), err: None },
                Err(e) => GetCustomerResponse::from_failure(e),
            })
        }
    })
}

pub fn make_replace_customer_endpoint(
    svc: Arc<dyn Service>,
) -> Endpoint<ReplaceCustomerRequest, ReplaceCustomerResponse> {
    Endpoint::new(move |req: ReplaceCustomerRequest| {
        let svc = svc.clone();
        async move {
            let err = svc.replace_customer(&req.ctx, &req.id, req.customer).await.err();
            Ok(ReplaceCustomerResponse { err })
        }
    })
}

pub fn make_update_customer_endpoint(
    svc: Arc<dyn Service>,
) -> Endpoint<UpdateCustomerRequest, UpdateCustomerResponse> {
    Endpoint::new(move |req: UpdateCustomerRequest| {
        let svc = svc.clone();
        async move {
            let err = svc.update_customer(&req.ctx, &req.id, req.customer).await.err();
            Ok(UpdateCustomerResponse { err })
        }
    })
}

pub fn make_delete_customer_endpoint(
    svc: Arc<dyn Service>,
) -> Endpoint<DeleteCustomerRequest, DeleteCustomerResponse> {
    Endpoint::new(move |req: DeleteCustomerRequest| {
        let svc = svc.clone();
        async move {
            let err = svc.delete_customer(&req.ctx, &req.id).await.err();
            Ok(DeleteCustomerResponse { err })
        }
    })
}

pub fn make_list_addresses_endpoint(
    svc: Arc<dyn Service>,
) -> Endpoint<ListAddressesRequest, ListAddressesResponse> {
    Endpoint::new(move |req: ListAddressesRequest| {
        let svc = svc.clone();
        async move {
            Ok(match svc.list_addresses(&req.ctx, &req.customer_id).await {
                Ok(addresses) => ListAddressesResponse { addresses, err: None },
                Err(e) => ListAddressesResponse::from_failure(e),
            })
        }
    })
}

pub fn make_get_address_endpoint(
    svc: Arc<dyn Service>,
) -> Endpoint<GetAddressRequest, GetAddressResponse> {
    Endpoint::new(move |req: GetAddressRequest| {
        let svc = svc.clone();
        async move {
            Ok(
                match svc.get_address(&req.ctx, &req.customer_id, &req.address_id).await {
                    Ok(address) => GetAddressResponse { address: Some(address), err: None },
                    Err(e) => GetAddressResponse::from_failure(e),
                },
            )
        }
    })
}

pub fn make_add_address_endpoint(
    svc: Arc<dyn Service>,
) -> Endpoint<AddAddressRequest, AddAddressResponse> {
    Endpoint::new(move |req: AddAddressRequest| {
        let svc = svc.clone();
        async move {
            let err = svc.add_address(&req.ctx, &req.customer_id, req.address).await.err();
            Ok(AddAddressResponse { err })
        }
    })
}

pub fn make_remove_address_endpoint(
    svc: Arc<dyn Service>,
) -> Endpoint<RemoveAddressRequest, RemoveAddressResponse> {
    Endpoint::new(move |req: RemoveAddressRequest| {
        let svc = svc.clone();
        async move {
            let err = svc
                .remove_address(&req.ctx, &req.customer_id, &req.address_id)
                .await
                .err();
            Ok(RemoveAddressResponse { err })
        }
    })
}
