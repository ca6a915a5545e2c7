//! Customer and address records.

use serde::{Deserialize, Serialize};

/// A single customer.
///
/// `id` is caller-supplied and must be unique across the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Customer {
    pub id: String,

    pub name: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub phone: String,

    /// Insertion ordered.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<Address>,
}

impl Customer {
    /// Create a customer with the two fields every new record needs.
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            ..Self::default()
        }
    }

    /// Position of the address with the given id, if any.
    pub fn address_position(&self, address_id: &str) -> Option<usize> {
        self.addresses.iter().position(|a| a.id == address_id)
    }

    /// Merge the non-empty fields of `partial` into `self`.
    ///
    /// An empty string or empty list means "not specified", so a field can
    /// never be cleared this way. The id is never patched.
    pub fn merge(&mut self, partial: Customer) {
        if !partial.name.is_empty() {
            self.name = partial.name;
        }
        if !partial.email.is_empty() {
            self.email = partial.email;
        }
        if !partial.phone.is_empty() {
            self.phone = partial.phone;
        }
        if !partial.addresses.is_empty() {
            self.addresses = partial.addresses;
        }
    }
}

/// An address owned by exactly one customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Address {
    /// Unique within the owning customer only.
    pub id: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub location: String,
}

impl Address {
    pub fn new(id: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            location: location.into(),
        }
    }
}
