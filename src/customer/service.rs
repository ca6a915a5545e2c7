//! Customer service contract and its in-memory implementation.
//!
//! # Responsibilities
//! - Define the transport-agnostic CRUD contract
//! - Enforce required fields, id consistency and existence
//! - Keep customer and address ids unique

use async_trait::async_trait;
use std::sync::Arc;

use crate::customer::context::Context;
use crate::customer::error::ServiceError;
use crate::customer::model::{Address, Customer};
use crate::customer::store::CustomerStore;

/// CRUD contract over customers and their addresses.
#[async_trait]
pub trait Service: Send + Sync {
    /// Create a new customer. Never overwrites.
    async fn create_customer(&self, ctx: &Context, customer: Customer) -> Result<(), ServiceError>;

    async fn get_customer(&self, ctx: &Context, id: &str) -> Result<Customer, ServiceError>;

    /// Create or overwrite the customer at `id`.
    async fn replace_customer(
        &self,
        ctx: &Context,
        id: &str,
        customer: Customer,
    ) -> Result<(), ServiceError>;

    /// Merge the non-empty fields of `partial` into an existing customer.
    async fn update_customer(
        &self,
        ctx: &Context,
        id: &str,
        partial: Customer,
    ) -> Result<(), ServiceError>;

    async fn delete_customer(&self, ctx: &Context, id: &str) -> Result<(), ServiceError>;

    async fn list_addresses(&self, ctx: &Context, customer_id: &str)
        -> Result<Vec<Address>, ServiceError>;

    async fn get_address(
        &self,
        ctx: &Context,
        customer_id: &str,
        address_id: &str,
    ) -> Result<Address, ServiceError>;

    async fn add_address(
        &self,
        ctx: &Context,
        customer_id: &str,
        address: Address,
    ) -> Result<(), ServiceError>;

    async fn remove_address(
        &self,
        ctx: &Context,
        customer_id: &str,
        address_id: &str,
    ) -> Result<(), ServiceError>;
}

/// [`Service`] backed by a [`CustomerStore`].
#[derive(Debug, Default)]
pub struct InmemService {
    store: CustomerStore,
}

impl InmemService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience for wiring: the service as a shareable trait object.
    pub fn shared() -> Arc<dyn Service> {
        Arc::new(Self::new())
    }

    fn check_deadline(ctx: &Context) -> Result<(), ServiceError> {
        if ctx.is_expired() {
            return Err(ServiceError::DeadlineExceeded);
        }
        Ok(())
    }
}

#[async_trait]
impl Service for InmemService {
    async fn create_customer(&self, ctx: &Context, customer: Customer) -> Result<(), ServiceError> {
        if customer.name.is_empty() {
            return Err(ServiceError::MissingRequiredField("name".into()));
        }
        if customer.email.is_empty() {
            return Err(ServiceError::MissingRequiredField("email".into()));
        }
        Self::check_deadline(ctx)?;

        self.store.write(|m| {
            if m.contains_key(&customer.id) {
                return Err(ServiceError::AlreadyExists);
            }
            m.insert(customer.id.clone(), customer);
            Ok(())
        })
    }

    async fn get_customer(&self, ctx: &Context, id: &str) -> Result<Customer, ServiceError> {
        Self::check_deadline(ctx)?;
        self.store
            .read(|m| m.get(id).cloned())
            .ok_or(ServiceError::NotFound)
    }

    async fn replace_customer(
        &self,
        ctx: &Context,
        id: &str,
        customer: Customer,
    ) -> Result<(), ServiceError> {
        if customer.id != id {
            return Err(ServiceError::InconsistentIds);
        }
        Self::check_deadline(ctx)?;

        self.store.write(|m| {
            m.insert(customer.id.clone(), customer);
        });
        Ok(())
    }

    async fn update_customer(
        &self,
        ctx: &Context,
        id: &str,
        partial: Customer,
    ) -> Result<(), ServiceError> {
        if !partial.id.is_empty() && partial.id != id {
            return Err(ServiceError::InconsistentIds);
        }
        Self::check_deadline(ctx)?;

        self.store.write(|m| {
            let existing = m.get(id).ok_or(ServiceError::NotFound)?;
            let mut updated = existing.clone();
            updated.merge(partial);
            m.insert(id.to_string(), updated);
            Ok(())
        })
    }

    async fn delete_customer(&self, ctx: &Context, id: &str) -> Result<(), ServiceError> {
        Self::check_deadline(ctx)?;
        self.store
            .write(|m| m.remove(id))
            .map(|_| ())
            .ok_or(ServiceError::NotFound)
    }

    async fn list_addresses(
        &self,
        ctx: &Context,
        customer_id: &str,
    ) -> Result<Vec<Address>, ServiceError> {
        Self::check_deadline(ctx)?;
        self.store
            .read(|m| m.get(customer_id).map(|c| c.addresses.clone()))
            .ok_or(ServiceError::NotFound)
    }

    async fn get_address(
        &self,
        ctx: &Context,
        customer_id: &str,
        address_id: &str,
    ) -> Result<Address, ServiceError> {
        Self::check_deadline(ctx)?;
        self.store
            .read(|m| {
                m.get(customer_id)?
                    .addresses
                    .iter()
                    .find(|a| a.id == address_id)
                    .cloned()
            })
            .ok_or(ServiceError::NotFound)
    }

    async fn add_address(
        &self,
        ctx: &Context,
        customer_id: &str,
        address: Address,
    ) -> Result<(), ServiceError> {
        Self::check_deadline(ctx)?;
        self.store.write(|m| {
            let existing = m.get(customer_id).ok_or(ServiceError::NotFound)?;
            if existing.address_position(&address.id).is_some() {
                return Err(ServiceError::AlreadyExists);
            }
            let mut updated = existing.clone();
            updated.addresses.push(address);
            m.insert(customer_id.to_string(), updated);
            Ok(())
        })
    }

    async fn remove_address(
        &self,
        ctx: &Context,
        customer_id: &str,
        address_id: &str,
    ) -> Result<(), ServiceError> {
        Self::check_deadline(ctx)?;
        self.store.write(|m| {
            let existing = m.get(customer_id).ok_or(ServiceError::NotFound)?;
            let index = existing
                .address_position(address_id)
                .ok_or(ServiceError::NotFound)?;
            let mut updated = existing.clone();
            // Vec::remove shifts the tail, keeping relative order.
            updated.addresses.remove(index);
            m.insert(customer_id.to_string(), updated);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn alice() -> Customer {
        Customer::new("1", "Alice", "alice@example.com")
    }

    async fn seeded() -> InmemService {
        let svc = InmemService::new();
        svc.create_customer(&Context::new(), alice()).await.unwrap();
        svc
    }

    #[tokio::test]
    async fn test_create_then_get_returns_equal_value() {
        let svc = InmemService::new();
        let ctx = Context::new();
        let mut customer = alice();
        customer.phone = "555-0100".into();
        customer.addresses.push(Address::new("a1", "Home"));

        svc.create_customer(&ctx, customer.clone()).await.unwrap();
        assert_eq!(svc.get_customer(&ctx, "1").await.unwrap(), customer);
    }

    #[tokio::test]
    async fn test_create_duplicate_leaves_store_unchanged() {
        let svc = seeded().await;
        let ctx = Context::new();

        let err = svc
            .create_customer(&ctx, Customer::new("1", "Mallory", "m@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::AlreadyExists);
        assert_eq!(svc.get_customer(&ctx, "1").await.unwrap(), alice());
        assert_eq!(svc.store.len(), 1);
    }

    #[tokio::test]
    async fn test_create_requires_name_and_email() {
        let svc = InmemService::new();
        let ctx = Context::new();

        let err = svc
            .create_customer(&ctx, Customer::new("1", "", "a@x.com"))
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::MissingRequiredField("name".into()));

        let err = svc
            .create_customer(&ctx, Customer::new("1", "A", ""))
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::MissingRequiredField("email".into()));
        assert!(svc.store.is_empty());
    }

    #[tokio::test]
    async fn test_missing_customer_is_not_found_everywhere() {
        let svc = seeded().await;
        let ctx = Context::new();
        let nf = Err::<(), _>(ServiceError::NotFound);

        assert_eq!(svc.get_customer(&ctx, "x").await.map(|_| ()), nf);
        assert_eq!(svc.delete_customer(&ctx, "x").await, nf);
        assert_eq!(svc.update_customer(&ctx, "x", Customer::default()).await, nf);
        assert_eq!(svc.list_addresses(&ctx, "x").await.map(|_| ()), nf);
        assert_eq!(svc.get_address(&ctx, "x", "a1").await.map(|_| ()), nf);
        assert_eq!(svc.add_address(&ctx, "x", Address::new("a1", "")).await, nf);
        assert_eq!(svc.remove_address(&ctx, "x", "a1").await, nf);

        assert_eq!(svc.store.len(), 1);
        assert_eq!(svc.get_customer(&ctx, "1").await.unwrap(), alice());
    }

    #[tokio::test]
    async fn test_replace_with_inconsistent_ids() {
        let svc = seeded().await;
        let ctx = Context::new();

        // Existing id.
        let err = svc.replace_customer(&ctx, "1", Customer::new("2", "B", "")).await;
        assert_eq!(err, Err(ServiceError::InconsistentIds));
        // Missing id.
        let err = svc.replace_customer(&ctx, "9", Customer::new("2", "B", "")).await;
        assert_eq!(err, Err(ServiceError::InconsistentIds));
        assert_eq!(svc.store.len(), 1);
    }

    #[tokio::test]
    async fn test_replace_upserts() {
        let svc = seeded().await;
        let ctx = Context::new();

        let replacement = Customer::new("1", "Alicia", "");
        svc.replace_customer(&ctx, "1", replacement.clone()).await.unwrap();
        assert_eq!(svc.get_customer(&ctx, "1").await.unwrap(), replacement);

        let created = Customer::new("2", "Bob", "bob@example.com");
        svc.replace_customer(&ctx, "2", created.clone()).await.unwrap();
        assert_eq!(svc.get_customer(&ctx, "2").await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_update_merges_non_empty_fields() {
        let svc = seeded().await;
        let ctx = Context::new();

        svc.update_customer(&ctx, "1", Customer { name: String::new(), ..Customer::default() })
            .await
            .unwrap();
        assert_eq!(svc.get_customer(&ctx, "1").await.unwrap().name, "Alice");

        svc.update_customer(&ctx, "1", Customer { name: "Alicia".into(), ..Customer::default() })
            .await
            .unwrap();
        let updated = svc.get_customer(&ctx, "1").await.unwrap();
        assert_eq!(updated.name, "Alicia");
        assert_eq!(updated.email, "alice@example.com");
    }

    #[tokio::test]
    async fn test_update_with_inconsistent_ids() {
        let svc = seeded().await;
        let ctx = Context::new();

        let partial = Customer { id: "2".into(), name: "X".into(), ..Customer::default() };
        assert_eq!(
            svc.update_customer(&ctx, "1", partial).await,
            Err(ServiceError::InconsistentIds)
        );

        let partial = Customer { id: "1".into(), name: "X".into(), ..Customer::default() };
        svc.update_customer(&ctx, "1", partial).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let svc = seeded().await;
        let ctx = Context::new();
        svc.delete_customer(&ctx, "1").await.unwrap();
        assert_eq!(svc.get_customer(&ctx, "1").await, Err(ServiceError::NotFound));
    }

    #[tokio::test]
    async fn test_list_addresses_empty_is_not_an_error() {
        let svc = seeded().await;
        assert!(svc.list_addresses(&Context::new(), "1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_and_get_address() {
        let svc = seeded().await;
        let ctx = Context::new();
        let home = Address::new("a1", "Home");

        svc.add_address(&ctx, "1", home.clone()).await.unwrap();
        assert_eq!(svc.get_address(&ctx, "1", "a1").await.unwrap(), home);
        assert_eq!(svc.get_address(&ctx, "1", "a2").await, Err(ServiceError::NotFound));
    }

    #[tokio::test]
    async fn test_add_duplicate_address() {
        let svc = seeded().await;
        let ctx = Context::new();
        svc.add_address(&ctx, "1", Address::new("a1", "Home")).await.unwrap();

        let err = svc.add_address(&ctx, "1", Address::new("a1", "Work")).await;
        assert_eq!(err, Err(ServiceError::AlreadyExists));
        assert_eq!(
            svc.list_addresses(&ctx, "1").await.unwrap(),
            vec![Address::new("a1", "Home")]
        );
    }

    #[tokio::test]
    async fn test_remove_address_preserves_order() {
        let svc = seeded().await;
        let ctx = Context::new();
        for id in ["a1", "a2", "a3", "a4"] {
            svc.add_address(&ctx, "1", Address::new(id, "")).await.unwrap();
        }

        svc.remove_address(&ctx, "1", "a2").await.unwrap();
        let ids: Vec<_> = svc
            .list_addresses(&ctx, "1")
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, ["a1", "a3", "a4"]);

        assert_eq!(svc.remove_address(&ctx, "1", "a2").await, Err(ServiceError::NotFound));
        assert_eq!(svc.list_addresses(&ctx, "1").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_expired_context_is_rejected() {
        let svc = seeded().await;
        let ctx = Context::new().with_timeout(Duration::ZERO);
        assert_eq!(svc.get_customer(&ctx, "1").await, Err(ServiceError::DeadlineExceeded));
        assert_eq!(svc.delete_customer(&ctx, "1").await, Err(ServiceError::DeadlineExceeded));
        assert_eq!(svc.store.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_readers_and_writers() {
        let svc = Arc::new(InmemService::new());
        let mut handles = Vec::new();
        for i in 0..16 {
            let svc = svc.clone();
            handles.push(tokio::spawn(async move {
                let ctx = Context::new();
                let id = i.to_string();
                svc.create_customer(&ctx, Customer::new(id.clone(), "N", "n@x.com"))
                    .await
                    .unwrap();
                for j in 0..8 {
                    svc.add_address(&ctx, &id, Address::new(j.to_string(), ""))
                        .await
                        .unwrap();
                    svc.get_customer(&ctx, &id).await.unwrap();
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(svc.store.len(), 16);
        for i in 0..16 {
            let addrs = svc.list_addresses(&Context::new(), &i.to_string()).await.unwrap();
            assert_eq!(addrs.len(), 8);
        }
    }
}
