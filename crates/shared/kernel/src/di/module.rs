//! Declared feature modules: what each feature namespace contains.
//!
//! Features list their service types and endpoint types explicitly; discovery
//! walks these declarations instead of scanning anything at runtime.

use crate::di::capability::{CapabilityBinding, CapabilityKey, CapabilitySet};
use crate::error::{KernelError, ServiceError};
use crate::service::{BaseService, Service, ServiceDefinition, ServiceMarker};
use crate::web::routes::{Endpoint, EndpointDefinition, Injector};
use automata_domain::constants::{ROUTES_MODULE_NAME, SERVICE_MODULE_NAME, service_scope_name};
use fxhash::FxHashMap;
use std::fmt;
use std::sync::Arc;

type Create = fn() -> Result<Box<dyn Service>, ServiceError>;
type Declare = fn() -> Vec<CapabilityBinding>;
type Construct = fn(&Injector<'_>) -> Result<Arc<dyn Endpoint>, KernelError>;

/// A service type as seen by detection and discovery.
#[derive(Clone, Copy)]
pub struct ServiceDescriptor {
    key: CapabilityKey,
    marker: Option<&'static str>,
    is_base: bool,
    create: Create,
    declare: Declare,
}

impl ServiceDescriptor {
    /// A service type carrying a `#[service]` marker.
    #[must_use]
    pub fn marked<T: ServiceDefinition + ServiceMarker>() -> Self {
        Self { marker: Some(T::SERVICE_NAME), ..Self::unmarked::<T>() }
    }

    /// A type satisfying the contract without a marker; never detected by default.
    #[must_use]
    pub fn unmarked<T: ServiceDefinition>() -> Self {
        Self {
            key: CapabilityKey::of::<T>(),
            marker: None,
            is_base: false,
            create: create_boxed::<T>,
            declare: declared_capabilities::<T>,
        }
    }

    /// The contract's default implementation.
    #[must_use]
    pub fn base() -> Self {
        Self { is_base: true, ..Self::marked::<BaseService>() }
    }

    #[must_use]
    pub const fn key(&self) -> CapabilityKey {
        self.key
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.key.name()
    }

    /// The `#[service]` name, if any.
    #[must_use]
    pub const fn marker(&self) -> Option<&'static str> {
        self.marker
    }

    #[must_use]
    pub const fn is_base(&self) -> bool {
        self.is_base
    }

    /// Builds an uninitialized instance.
    ///
    /// # Errors
    /// Propagates the type's `create` failure.
    pub fn instantiate(&self) -> Result<Box<dyn Service>, ServiceError> {
        (self.create)()
    }

    /// Capabilities the type declared, in declaration order.
    #[must_use]
    pub fn capabilities(&self) -> Vec<CapabilityBinding> {
        (self.declare)()
    }
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("type", &self.key.name())
            .field("marker", &self.marker)
            .field("is_base", &self.is_base)
            .finish()
    }
}

fn create_boxed<T: ServiceDefinition>() -> Result<Box<dyn Service>, ServiceError> {
    T::create().map(|service| Box::new(service) as Box<dyn Service>)
}

fn declared_capabilities<T: ServiceDefinition>() -> Vec<CapabilityBinding> {
    let mut set = CapabilitySet::<T>::new();
    T::capabilities(&mut set);
    set.into_bindings()
}

/// A member of a service module.
#[derive(Debug, Clone, Copy)]
pub enum ServiceItem {
    Service(ServiceDescriptor),
    /// Any other declared type (helpers, DTOs); never a service.
    Other(&'static str),
}

impl ServiceItem {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Service(descriptor) => descriptor.type_name(),
            Self::Other(name) => name,
        }
    }
}

/// The `service` namespace of a feature.
#[derive(Debug, Clone)]
pub struct ServiceModule {
    path: String,
    items: Vec<ServiceItem>,
}

impl ServiceModule {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), items: Vec::new() }
    }

    #[must_use]
    pub fn service<T: ServiceDefinition + ServiceMarker>(self) -> Self {
        self.item(ServiceItem::Service(ServiceDescriptor::marked::<T>()))
    }

    #[must_use]
    pub fn item(mut self, item: ServiceItem) -> Self {
        self.items.push(item);
        self
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Items in declaration order.
    #[must_use]
    pub fn items(&self) -> &[ServiceItem] {
        &self.items
    }
}

/// An endpoint type declared in a routes module.
#[derive(Clone, Copy)]
pub struct EndpointDescriptor {
    type_name: &'static str,
    module: &'static str,
    is_base: bool,
    construct: Construct,
}

impl EndpointDescriptor {
    /// An endpoint type declared in the module at `module`.
    #[must_use]
    pub fn of<E: EndpointDefinition>(module: &'static str) -> Self {
        Self {
            type_name: std::any::type_name::<E>(),
            module,
            is_base: false,
            construct: construct_shared::<E>,
        }
    }

    /// Marks the descriptor as the endpoint base contract itself.
    #[must_use]
    pub const fn as_base(mut self) -> Self {
        self.is_base = true;
        self
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Path of the module the type was declared in.
    #[must_use]
    pub const fn module(&self) -> &'static str {
        self.module
    }

    #[must_use]
    pub const fn is_base(&self) -> bool {
        self.is_base
    }

    /// Builds the endpoint through its constructor injection.
    ///
    /// # Errors
    /// Propagates injection failures from the endpoint constructor.
    pub fn construct(&self, injector: &Injector<'_>) -> Result<Arc<dyn Endpoint>, KernelError> {
        (self.construct)(injector)
    }
}

impl fmt::Debug for EndpointDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointDescriptor")
            .field("type", &self.type_name)
            .field("module", &self.module)
            .field("is_base", &self.is_base)
            .finish()
    }
}

fn construct_shared<E: EndpointDefinition>(
    injector: &Injector<'_>,
) -> Result<Arc<dyn Endpoint>, KernelError> {
    E::construct(injector).map(|endpoint| Arc::new(endpoint) as Arc<dyn Endpoint>)
}

/// The `routes` namespace of a feature.
///
/// Items may include endpoint types re-exported from other modules; only those
/// whose declaring module equals [`path`](Self::path) are instantiated.
#[derive(Debug, Clone)]
pub struct RouteModule {
    path: String,
    items: Vec<EndpointDescriptor>,
}

impl RouteModule {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), items: Vec::new() }
    }

    #[must_use]
    pub fn item(mut self, item: EndpointDescriptor) -> Self {
        self.items.push(item);
        self
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn items(&self) -> &[EndpointDescriptor] {
        &self.items
    }

    /// Scope variable the service is injected under for `service_name`.
    #[must_use]
    pub fn scope_name(service_name: &str) -> String {
        service_scope_name(service_name)
    }
}

/// Everything one feature namespace declares.
#[derive(Debug, Clone)]
pub struct FeatureModule {
    path: String,
    services: Option<ServiceModule>,
    routes: Option<RouteModule>,
}

impl FeatureModule {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), services: None, routes: None }
    }

    /// Path of the service submodule: `{path}.service`.
    #[must_use]
    pub fn service_path(&self) -> String {
        format!("{}.{SERVICE_MODULE_NAME}", self.path)
    }

    /// Path of the routes submodule: `{path}.routes`.
    #[must_use]
    pub fn routes_path(&self) -> String {
        format!("{}.{ROUTES_MODULE_NAME}", self.path)
    }

    #[must_use]
    pub fn with_services(mut self, services: ServiceModule) -> Self {
        self.services = Some(services);
        self
    }

    #[must_use]
    pub fn with_routes(mut self, routes: RouteModule) -> Self {
        self.routes = Some(routes);
        self
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub const fn services(&self) -> Option<&ServiceModule> {
        self.services.as_ref()
    }

    #[must_use]
    pub const fn routes(&self) -> Option<&RouteModule> {
        self.routes.as_ref()
    }
}

/// Feature namespaces known to the process, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct ModuleCatalog {
    features: FxHashMap<String, FeatureModule>,
}

impl ModuleCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the feature at `module.path()`.
    #[must_use]
    pub fn with(mut self, module: FeatureModule) -> Self {
        self.insert(module);
        self
    }

    pub fn insert(&mut self, module: FeatureModule) {
        self.features.insert(module.path.clone(), module);
    }

    #[must_use]
    pub fn feature(&self, path: &str) -> Option<&FeatureModule> {
        self.features.get(path)
    }

    /// The service module of the feature at `path`; `None` when either is absent.
    #[must_use]
    pub fn service_module(&self, path: &str) -> Option<&ServiceModule> {
        self.feature(path).and_then(FeatureModule::services)
    }

    #[must_use]
    pub fn route_module(&self, path: &str) -> Option<&RouteModule> {
        self.feature(path).and_then(FeatureModule::routes)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
