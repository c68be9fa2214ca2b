//! Wiring one feature: detect, instantiate, initialize, register, bind.

use crate::di::capability::{CapabilityStore, StoredBinding};
use crate::di::container::Container;
use crate::di::detector::{DetectorKind, ServiceDetector};
use crate::di::interfaces::{InterfaceDetection, InterfaceManager};
use crate::di::module::{ModuleCatalog, ServiceDescriptor};
use crate::di::registry::{Registration, ServiceRegistry};
use crate::error::{KernelError, KernelErrorExt};
use crate::service::Service;
use crate::web::endpoints::{EndpointRegistry, Exposure};
use crate::web::routes::RouteBinder;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// What one successful discovery call registered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// Registry names, in registration order.
    pub services: Vec<String>,
    /// Capability bindings stored across all services.
    pub capabilities: usize,
    /// Operations exposed across all services.
    pub operations: usize,
}

/// A service committed by the current call, kept until the call succeeds.
struct Committed {
    registration: Registration,
    capabilities: Vec<StoredBinding>,
    operations: Vec<Exposure>,
}

/// Per-feature discovery pipeline.
///
/// Registration is all-or-nothing per call: if any service on the mandatory
/// path fails, the writes of services committed earlier in the same call are
/// undone. Registry entries and instance bindings they replaced come back;
/// constructor registrations are never touched. Operations they re-exposed under
/// an existing name are put back the same way.
pub struct ServiceDiscovery {
    catalog: Arc<ModuleCatalog>,
    container: Arc<Container>,
    registry: Arc<ServiceRegistry>,
    detector: Box<dyn ServiceDetector>,
    interfaces: InterfaceManager,
    routes: RouteBinder,
}

impl ServiceDiscovery {
    pub fn new(
        catalog: Arc<ModuleCatalog>,
        container: Arc<Container>,
        registry: Arc<ServiceRegistry>,
        endpoints: Arc<EndpointRegistry>,
    ) -> Self {
        let store: Arc<dyn CapabilityStore> = Arc::clone(&container) as Arc<dyn CapabilityStore>;
        Self {
            routes: RouteBinder::new(Arc::clone(&catalog), Arc::clone(&container), endpoints),
            interfaces: InterfaceManager::with_declared(store),
            detector: DetectorKind::default().build(),
            catalog,
            container,
            registry,
        }
    }

    /// Swaps the detection policy.
    #[must_use]
    pub fn with_detector(mut self, detector: Box<dyn ServiceDetector>) -> Self {
        self.detector = detector;
        self
    }

    /// Swaps the capability selection strategy.
    #[must_use]
    pub fn with_interfaces(mut self, strategy: impl InterfaceDetection + 'static) -> Self {
        let store: Arc<dyn CapabilityStore> = Arc::clone(&self.container) as Arc<dyn CapabilityStore>;
        self.interfaces = InterfaceManager::new(store, strategy);
        self
    }

    /// Registers every service declared under `path`.
    ///
    /// A feature without a service module succeeds with an empty report.
    ///
    /// # Errors
    /// * [`KernelError::Initialization`] if a service cannot be created or initialized.
    /// * [`KernelError::Registration`] if a service cannot be stored.
    ///
    /// Capability and route binding failures are logged and do not fail the call.
    pub fn discover_and_register_services(&self, path: &str) -> Result<DiscoveryReport, KernelError> {
        let Some(module) = self.catalog.service_module(path) else {
            warn!(feature = %path, "Service module not found");
            return Ok(DiscoveryReport::default());
        };

        let mut committed: Vec<Committed> = Vec::new();
        for descriptor in self.detector.service_descriptors(module) {
            match self.register_one(path, descriptor) {
                Ok(entry) => committed.push(entry),
                Err(e) => {
                    error!(
                        feature = %path,
                        service = descriptor.type_name(),
                        error = %e,
                        "Error registering service"
                    );
                    self.roll_back(committed);
                    return Err(e);
                },
            }
        }

        let report = DiscoveryReport {
            capabilities: committed.iter().map(|c| c.capabilities.len()).sum(),
            operations: committed.iter().map(|c| c.operations.len()).sum(),
            services: committed.iter().map(|c| c.registration.name().to_owned()).collect(),
        };
        debug!(feature = %path, ?report, "Discovery finished");
        Ok(report)
    }

    fn register_one(&self, path: &str, descriptor: &ServiceDescriptor) -> Result<Committed, KernelError> {
        let type_name = descriptor.type_name();

        let mut service = descriptor.instantiate().context(format!("creating {type_name}"))?;
        service.initialize().context(format!("initializing {type_name}"))?;
        let service: Arc<dyn Service> = Arc::from(service);

        let name = descriptor
            .marker()
            .ok_or_else(|| KernelError::registration(format!("{type_name} carries no service name")))?;
        let registration = self.registry.insert(name, Arc::clone(&service))?;

        let interfaces = self.interfaces.register_service_interfaces(descriptor, &service);
        if !interfaces.succeeded() {
            warn!(
                service = %name,
                "Only {}/{} capabilities registered",
                interfaces.registered.len(),
                interfaces.detected
            );
        }

        let operations = self.routes.setup_routes(path, name, &service).unwrap_or_else(|e| {
            warn!(feature = %path, service = %name, error = %e, "Error setting up routes");
            Vec::new()
        });

        Ok(Committed { registration, capabilities: interfaces.registered, operations })
    }

    fn roll_back(&self, committed: Vec<Committed>) {
        let store: &dyn CapabilityStore = &*self.container;
        for entry in committed.into_iter().rev() {
            self.routes.revert(entry.operations);
            for binding in entry.capabilities.into_iter().rev() {
                binding.undo(store);
            }
            let name = entry.registration.name().to_owned();
            self.registry.revert(entry.registration);
            warn!(service = %name, "Service registration rolled back");
        }
    }
}

impl fmt::Debug for ServiceDiscovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDiscovery")
            .field("registry", &self.registry)
            .field("interfaces", &self.interfaces)
            .field("routes", &self.routes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::di::module::{FeatureModule, ServiceItem, ServiceModule};

    fn discovery(catalog: ModuleCatalog) -> (ServiceDiscovery, Arc<ServiceRegistry>) {
        let container = Arc::new(Container::new());
        let registry = Arc::new(ServiceRegistry::new(Arc::clone(&container) as Arc<dyn CapabilityStore>));
        let discovery = ServiceDiscovery::new(
            Arc::new(catalog),
            container,
            Arc::clone(&registry),
            Arc::new(EndpointRegistry::new()),
        );
        (discovery, registry)
    }

    #[test]
    fn missing_namespace_is_an_empty_success() -> Result<(), KernelError> {
        let (discovery, registry) = discovery(ModuleCatalog::new());
        let report = discovery.discover_and_register_services("features.nothing")?;
        assert_eq!(report, DiscoveryReport::default());
        assert!(registry.is_empty());
        Ok(())
    }

    #[test]
    fn base_and_unmarked_items_are_skipped() -> Result<(), KernelError> {
        let services = ServiceModule::new("features.plain.service")
            .item(ServiceItem::Other("Helper"))
            .item(ServiceItem::Service(ServiceDescriptor::base()));
        let catalog = ModuleCatalog::new().with(FeatureModule::new("features.plain").with_services(services));
        let (discovery, registry) = discovery(catalog);

        assert!(discovery.discover_and_register_services("features.plain")?.services.is_empty());
        assert!(registry.is_empty());
        Ok(())
    }

    #[test]
    fn annotation_detector_still_skips_base() -> Result<(), KernelError> {
        let services =
            ServiceModule::new("features.base.service").item(ServiceItem::Service(ServiceDescriptor::base()));
        let catalog = ModuleCatalog::new().with(FeatureModule::new("features.base").with_services(services));
        let (discovery, registry) = discovery(catalog);
        let discovery = discovery.with_detector(DetectorKind::Annotation.build());

        assert!(discovery.discover_and_register_services("features.base")?.services.is_empty());
        assert!(!registry.service_exists("base"));
        Ok(())
    }
}
