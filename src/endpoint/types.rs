//! Request and response values for each endpoint.
//!
//! Response types carry the business error in a field that is never
//! serialized; the HTTP transport turns it into a status code and an
//! `{"error": ...}` body instead.

use serde::{Deserialize, Serialize};

use crate::customer::{Address, Context, Customer, ServiceError};

/// Implemented by every response that may carry a business error.
pub trait Failer: Sized {
    fn failed(&self) -> Option<&ServiceError>;

    /// Response value carrying only `err`.
    fn from_failure(err: ServiceError) -> Self;
}

macro_rules! impl_failer {
    ($($resp:ty),+ $(,)?) => {$(
        impl Failer for $resp {
            fn failed(&self) -> Option<&ServiceError> {
                self.err.as_ref()
            }

            #[allow(clippy::needless_update)]
            fn from_failure(err: ServiceError) -> Self {
                Self { err: Some(err), ..Self::default() }
            }
        }
    )+};
}

impl_failer!(
    CreateCustomerResponse,
    GetCustomerResponse,
    ReplaceCustomerResponse,
    UpdateCustomerResponse,
    DeleteCustomerResponse,
    ListAddressesResponse,
    GetAddressResponse,
    AddAddressResponse,
    RemoveAddressResponse,
);

#[derive(Debug, Clone)]
pub struct CreateCustomerRequest {
    pub ctx: Context,
    pub customer: Customer,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateCustomerResponse {
    #[serde(skip)]
    pub err: Option<ServiceError>,
}

#[derive(Debug, Clone)]
pub struct GetCustomerRequest {
    pub ctx: Context,
    pub id: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GetCustomerResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,
    #[serde(skip)]
    pub err: Option<ServiceError>,
}

#[derive(Debug, Clone)]
pub struct ReplaceCustomerRequest {
    pub ctx: Context,
    pub id: String,
    pub customer: Customer,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ReplaceCustomerResponse {
    #[serde(skip)]
    pub err: Option<ServiceError>,
}

#[derive(Debug, Clone)]
pub struct UpdateCustomerRequest {
    pub ctx: Context,
    pub id: String,
    pub customer: Customer,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateCustomerResponse {
    #[serde(skip)]
    pub err: Option<ServiceError>,
}

#[derive(Debug, Clone)]
pub struct DeleteCustomerRequest {
    pub ctx: Context,
    pub id: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DeleteCustomerResponse {
    #[serde(skip)]
    pub err: Option<ServiceError>,
}

#[derive(Debug, Clone)]
pub struct ListAddressesRequest {
    pub ctx: Context,
    pub customer_id: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ListAddressesResponse {
    #[serde(default)]
    pub addresses: Vec<Address>,
    #[serde(skip)]
    pub err: Option<ServiceError>,
}

#[derive(Debug, Clone)]
pub struct GetAddressRequest {
    pub ctx: Context,
    pub customer_id: String,
    pub address_id: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GetAddressResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip)]
    pub err: Option<ServiceError>,
}

#[derive(Debug, Clone)]
pub struct AddAddressRequest {
    pub ctx: Context,
    pub customer_id: String,
    pub address: Address,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AddAddressResponse {
    #[serde(skip)]
    pub err: Option<ServiceError>,
}

#[derive(Debug, Clone)]
pub struct RemoveAddressRequest {
    pub ctx: Context,
    pub customer_id: String,
    pub address_id: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RemoveAddressResponse {
    #[serde(skip)]
    pub err: Option<ServiceError>,
}
