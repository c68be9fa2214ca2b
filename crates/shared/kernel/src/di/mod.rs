//! Capability container, named singletons and the service discovery pipeline.

pub mod capability;
pub mod container;
pub mod detector;
pub mod discovery;
pub mod interfaces;
pub mod module;
pub mod registry;
pub mod singleton;

pub use capability::{
    CapabilityBinding, CapabilityKey, CapabilitySet, CapabilityStore, ErasedInstance, StoredBinding,
};
pub use container::Container;
pub use detector::{AnnotationServiceDetector, DetectorKind, MarkerServiceDetector, ServiceDetector};
pub use discovery::{DiscoveryReport, ServiceDiscovery};
pub use interfaces::{
    ConventionInterfaces, DeclaredInterfaces, InterfaceDetection, InterfaceManager, InterfaceReport,
};
pub use module::{
    EndpointDescriptor, FeatureModule, ModuleCatalog, RouteModule, ServiceDescriptor, ServiceItem,
    ServiceModule,
};
pub use registry::ServiceRegistry;
pub use singleton::SingletonRegistry;
