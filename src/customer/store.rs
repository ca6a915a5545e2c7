//! In-memory customer store.
//!
//! # Design Decisions
//! - One reader/writer lock over the whole map, no striping
//! - Each critical section is a single closure, so a record is always
//!   replaced whole and never observed half-written
//! - Nothing awaits or does I/O while the lock is held

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::customer::model::Customer;

/// Map of customer id to customer record.
pub type CustomerMap = HashMap<String, Customer>;

#[derive(Debug, Default)]
pub struct CustomerStore {
    customers: RwLock<CustomerMap>,
}

impl CustomerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` under the shared lock.
    pub fn read<T>(&self, f: impl FnOnce(&CustomerMap) -> T) -> T {
        // A panic inside a closure cannot leave a partially written record,
        // so a poisoned lock still guards a consistent map.
        let guard = self.customers.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Run `f` under the exclusive lock.
    pub fn write<T>(&self, f: impl FnOnce(&mut CustomerMap) -> T) -> T {
        let mut guard = self.customers.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub fn len(&self) -> usize {
        self.read(HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
