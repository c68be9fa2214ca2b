//! Endpoint construction for a feature's routes module.

use crate::di::capability::CapabilityKey;
use crate::di::container::Container;
use crate::di::module::{ModuleCatalog, RouteModule};
use crate::error::KernelError;
use crate::service::Service;
use crate::web::endpoints::{EndpointRegistry, Exposure};
use crate::web::operation::Operation;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, trace};

/// A type whose instances contribute externally callable operations.
pub trait Endpoint: Send + Sync {
    /// Operations to expose, built once right after construction.
    fn operations(self: Arc<Self>) -> Vec<Operation>;
}

/// Constructor injection for an endpoint type.
pub trait EndpointDefinition: Endpoint + Sized + 'static {
    /// Builds the endpoint from resolved collaborators.
    ///
    /// # Errors
    /// Returns [`KernelError::Injection`] when a required collaborator is missing.
    fn construct(injector: &Injector<'_>) -> Result<Self, KernelError>;
}

/// Collaborators available to an endpoint constructor.
pub struct Injector<'a> {
    container: &'a Container,
    scope: String,
    service: &'a Arc<dyn Service>,
}

impl<'a> Injector<'a> {
    pub fn new(container: &'a Container, scope: impl Into<String>, service: &'a Arc<dyn Service>) -> Self {
        Self { container, scope: scope.into(), service }
    }

    /// Resolves capability `C` from the container.
    ///
    /// # Errors
    /// Returns [`KernelError::Injection`] if `C` is not registered.
    pub fn capability<C>(&self) -> Result<Arc<C>, KernelError>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let resolved = self.container.resolve::<C>().map_err(|e| {
            KernelError::injection(format!(
                "Failed to inject required service '{}': {e}",
                CapabilityKey::of::<C>().short_name()
            ))
        })?;
        debug!(capability = CapabilityKey::of::<C>().name(), "Injected capability");
        Ok(resolved)
    }

    /// The service injected under scope variable `name`.
    ///
    /// # Errors
    /// Returns [`KernelError::Injection`] if nothing was injected under `name`.
    pub fn scoped(&self, name: &str) -> Result<Arc<dyn Service>, KernelError> {
        if name == self.scope {
            Ok(Arc::clone(self.service))
        } else {
            Err(KernelError::injection(format!("No service injected as '{name}' (scope is '{}')", self.scope)))
        }
    }

    /// Name of the scope variable for this binding.
    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Fails unless `service` has been initialized.
    ///
    /// # Errors
    /// Returns [`KernelError::Injection`] for an uninitialized service.
    pub fn require_initialized(&self, service: &dyn Service) -> Result<(), KernelError> {
        if service.is_initialized() {
            Ok(())
        } else {
            Err(KernelError::injection(format!(
                "Service '{}' is not properly initialized",
                service.feature_name()
            )))
        }
    }
}

impl fmt::Debug for Injector<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injector").field("scope", &self.scope).finish_non_exhaustive()
    }
}

/// Instantiates a feature's endpoints and exposes their operations.
pub struct RouteBinder {
    catalog: Arc<ModuleCatalog>,
    container: Arc<Container>,
    endpoints: Arc<EndpointRegistry>,
}

impl RouteBinder {
    pub const fn new(
        catalog: Arc<ModuleCatalog>,
        container: Arc<Container>,
        endpoints: Arc<EndpointRegistry>,
    ) -> Self {
        Self { catalog, container, endpoints }
    }

    /// Binds `service` into the routes module of the feature at `path` and
    /// exposes every endpoint declared there. A missing routes module is a no-op.
    ///
    /// Returns the exposures made, in order.
    ///
    /// # Errors
    /// Propagates the first endpoint construction failure. Exposures this
    /// call had already made are reverted first.
    pub fn setup_routes(
        &self,
        path: &str,
        service_name: &str,
        service: &Arc<dyn Service>,
    ) -> Result<Vec<Exposure>, KernelError> {
        let Some(module) = self.catalog.route_module(path) else {
            trace!(feature = %path, "No routes module");
            return Ok(Vec::new());
        };

        let injector = Injector::new(&self.container, RouteModule::scope_name(service_name), service);
        let mut exposed = Vec::new();

        for descriptor in module.items().iter().filter(|d| d.module() == module.path() && !d.is_base()) {
            let endpoint = match descriptor.construct(&injector) {
                Ok(endpoint) => endpoint,
                Err(e) => {
                    self.revert(exposed);
                    return Err(e);
                },
            };
            info!(endpoint = descriptor.type_name(), "Instantiated route class");

            for operation in endpoint.operations() {
                exposed.push(self.endpoints.expose(operation));
            }
        }
        Ok(exposed)
    }

    /// Reverts `exposures`, latest first.
    pub fn revert(&self, exposures: Vec<Exposure>) {
        for exposure in exposures.into_iter().rev() {
            self.endpoints.revert(exposure);
        }
    }
}

impl fmt::Debug for RouteBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteBinder").field("features", &self.catalog.len()).finish_non_exhaustive()
    }
}
