use crate::di::capability::{CapabilityKey, CapabilityStore, StoredBinding};
use crate::error::KernelError;
use crate::service::Service;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Name-keyed table of live services, mirrored into the container under
/// each service's concrete type.
pub struct ServiceRegistry {
    services: RwLock<FxHashMap<String, Arc<dyn Service>>>,
    store: Arc<dyn CapabilityStore>,
}

impl ServiceRegistry {
    pub fn new(store: Arc<dyn CapabilityStore>) -> Self {
        Self { services: RwLock::new(FxHashMap::default()), store }
    }

    /// Stores `service` under `name`, replacing any earlier entry, and binds
    /// it in the container under its concrete type.
    ///
    /// # Errors
    /// Returns [`KernelError::Registration`] if the container rejects the
    /// mirror; the name table is left untouched in that case.
    pub fn register_service(&self, name: &str, service: Arc<dyn Service>) -> Result<(), KernelError> {
        self.insert(name, service).map(drop)
    }

    /// [`register_service`](Self::register_service), keeping what is needed to revert it.
    pub(crate) fn insert(&self, name: &str, service: Arc<dyn Service>) -> Result<Registration, KernelError> {
        let mirror = Arc::clone(&service).mirror();
        let mirror = match StoredBinding::write(self.store.as_ref(), mirror.key(), mirror) {
            Ok(mirror) => mirror,
            Err(e) => {
                error!(service = %name, error = %e, "Failed to register service");
                return Err(KernelError::registration(format!("service '{name}': {e}")));
            },
        };

        let replaced = self.services.write().insert(name.to_owned(), Arc::clone(&service));
        if replaced.is_some() {
            warn!(service = %name, "Service replaced an earlier registration");
        }
        debug!(service = %name, "Service registered");
        Ok(Registration { name: name.to_owned(), service, replaced, mirror })
    }

    /// Undoes `registration`: the entry it replaced and that entry's mirror
    /// come back. Does nothing to the name table if `name` was re-registered since.
    pub(crate) fn revert(&self, registration: Registration) {
        let Registration { name, service, replaced, mirror } = registration;
        let reverted = {
            let mut services = self.services.write();
            let ours = services.get(&name).is_some_and(|current| Arc::ptr_eq(current, &service));
            if ours {
                match replaced {
                    Some(previous) => services.insert(name.clone(), previous),
                    None => services.remove(&name),
                };
            }
            ours
        };
        mirror.undo(self.store.as_ref());
        if reverted {
            debug!(service = %name, "Service registration reverted");
        }
    }

    #[must_use]
    pub fn get_service(&self, name: &str) -> Option<Arc<dyn Service>> {
        self.services.read().get(name).cloned()
    }

    /// The service under `name` as its concrete type.
    #[must_use]
    pub fn get_service_as<T: Service>(&self, name: &str) -> Option<Arc<T>> {
        self.get_service(name).and_then(|service| service.downcast_arc::<T>().ok())
    }

    /// Snapshot of every entry.
    #[must_use]
    pub fn get_all_services(&self) -> FxHashMap<String, Arc<dyn Service>> {
        self.services.read().clone()
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn service_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.services.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn service_exists(&self, name: &str) -> bool {
        self.services.read().contains_key(name)
    }

    /// Drops the entry for `name` and its container mirror.
    pub fn unregister(&self, name: &str) -> Option<Arc<dyn Service>> {
        let removed = self.services.write().remove(name)?;
        let key: CapabilityKey = removed.concrete_key();
        self.store.remove(key);
        debug!(service = %name, "Service unregistered");
        Some(removed)
    }

    /// Drops every entry. Container mirrors are left to the container's own reset.
    pub fn clear(&self) {
        self.services.write().clear();
        debug!("Service registry cleared");
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.services.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.read().is_empty()
    }
}

/// One [`ServiceRegistry`] write: the stored entry, the entry it replaced and
/// its container mirror.
pub(crate) struct Registration {
    name: String,
    service: Arc<dyn Service>,
    replaced: Option<Arc<dyn Service>>,
    mirror: StoredBinding,
}

impl Registration {
    pub(crate) fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRegistry").field("services", &self.service_names()).finish()
    }
}
