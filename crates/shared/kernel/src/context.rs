//! The owned root of all process-wide wiring state.

use crate::di::{CapabilityStore, Container, ServiceRegistry, SingletonRegistry};
use crate::error::KernelError;
use crate::web::EndpointRegistry;
use automata_domain::constants::{CONTAINER_REGISTRY_NAME, SERVICE_REGISTRY_NAME, WEB_API_REGISTRY_NAME};
use std::sync::Arc;

/// Named singletons for the container, the service registry and the
/// endpoint registry, each lazily built and independently resettable.
///
/// Cloning is cheap; clones share the same singletons.
#[derive(Debug, Clone)]
pub struct AppContext {
    singletons: Arc<SingletonRegistry>,
}

impl AppContext {
    #[must_use]
    pub fn new() -> Self {
        let singletons = Arc::new(SingletonRegistry::new());
        singletons.register_factory(CONTAINER_REGISTRY_NAME, || Arc::new(Container::new()));

        let weak = Arc::downgrade(&singletons);
        singletons.register_factory(SERVICE_REGISTRY_NAME, move || {
            let container = weak
                .upgrade()
                .and_then(|registry| registry.get_instance::<Container>(CONTAINER_REGISTRY_NAME).ok())
                .unwrap_or_default();
            Arc::new(ServiceRegistry::new(container as Arc<dyn CapabilityStore>))
        });

        singletons.register_factory(WEB_API_REGISTRY_NAME, || Arc::new(EndpointRegistry::new()));
        Self { singletons }
    }

    /// The capability container.
    ///
    /// # Errors
    /// Fails only if the `container` slot was re-registered with another type.
    pub fn container(&self) -> Result<Arc<Container>, KernelError> {
        self.singletons.get_instance(CONTAINER_REGISTRY_NAME)
    }

    /// The service registry, mirroring into [`container`](Self::container).
    ///
    /// # Errors
    /// Fails only if the `service_registry` slot was re-registered with another type.
    pub fn services(&self) -> Result<Arc<ServiceRegistry>, KernelError> {
        self.singletons.get_instance(SERVICE_REGISTRY_NAME)
    }

    /// The endpoint exposure registry.
    ///
    /// # Errors
    /// Fails only if the `web_api` slot was re-registered with another type.
    pub fn endpoints(&self) -> Result<Arc<EndpointRegistry>, KernelError> {
        self.singletons.get_instance(WEB_API_REGISTRY_NAME)
    }

    /// The underlying registry, for additional named singletons.
    #[must_use]
    pub fn singletons(&self) -> &SingletonRegistry {
        &self.singletons
    }

    pub fn reset_container(&self) {
        self.singletons.reset_instance(CONTAINER_REGISTRY_NAME);
    }

    pub fn reset_services(&self) {
        self.singletons.reset_instance(SERVICE_REGISTRY_NAME);
    }

    pub fn reset_endpoints(&self) {
        self.singletons.reset_instance(WEB_API_REGISTRY_NAME);
    }

    /// Drops every cached singleton; the next access rebuilds from scratch.
    pub fn reset_all(&self) {
        self.singletons.reset_all();
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new()
    }
}
