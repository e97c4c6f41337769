// Path: crates/api/src/services/access.rs

//! Lookup of the services a host dispatches to.

use crate::services::BlockchainService;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A read-only service locator, keyed by service id.
#[derive(Clone, Default)]
pub struct ServiceDirectory {
    by_id: BTreeMap<String, Arc<dyn BlockchainService>>,
}

impl fmt::Debug for ServiceDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDirectory")
            .field("services", &self.by_id.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ServiceDirectory {
    /// Creates a new directory from a list of services. A later service with
    /// a duplicate id replaces an earlier one.
    pub fn new(services: Vec<Arc<dyn BlockchainService>>) -> Self {
        let by_id = services
            .into_iter()
            .map(|s| (s.id().to_string(), s))
            .collect::<BTreeMap<_, _>>();
        for (id, svc) in &by_id {
            log::debug!("registered service '{}' (abi v{})", id, svc.abi_version());
        }
        Self { by_id }
    }

    /// Gets a service by its id.
    pub fn get_by_id(&self, id: &str) -> Option<&Arc<dyn BlockchainService>> {
        self.by_id.get(id)
    }

    /// Gets a service by its concrete type.
    pub fn get<T: BlockchainService>(&self) -> Option<&T> {
        self.by_id
            .values()
            .find_map(|svc| svc.as_any().downcast_ref::<T>())
    }

    /// Iterates over the services in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn BlockchainService>> {
        self.by_id.values()
    }
}
