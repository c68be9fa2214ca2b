//! Everything a feature crate or composition root usually needs.

pub use crate::app::{Application, FeatureDeclaration, FeatureManager, NoopShell, ShellConfigurator};
pub use crate::context::AppContext;
pub use crate::di::{
    CapabilitySet, Container, EndpointDescriptor, FeatureModule, ModuleCatalog, RouteModule,
    ServiceDescriptor, ServiceItem, ServiceModule, ServiceRegistry,
};
pub use crate::error::{KernelError, KernelErrorExt, ServiceError};
pub use crate::service::{Service, ServiceDefinition, ServiceMarker, ServiceState};
pub use crate::web::{Endpoint, EndpointDefinition, EndpointRegistry, Injector, Operation, Reply};
pub use automata_derive::service;
pub use automata_domain::response::{ApiResponse, ErrorCode};
