//! Registering a live service under each capability it implements.

use crate::di::capability::{CapabilityBinding, CapabilityKey, CapabilityStore, StoredBinding};
use crate::di::module::ServiceDescriptor;
use crate::error::KernelError;
use crate::service::Service;
use automata_domain::constants::INTERFACE_PREFIX;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Decides which declared capabilities of a service are registered.
pub trait InterfaceDetection: Send + Sync {
    fn interfaces(&self, descriptor: &ServiceDescriptor) -> Vec<CapabilityBinding>;
}

/// The service's declared capability list: trait objects only, never
/// `dyn Service` itself, each key once.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclaredInterfaces;

impl InterfaceDetection for DeclaredInterfaces {
    fn interfaces(&self, descriptor: &ServiceDescriptor) -> Vec<CapabilityBinding> {
        let base = CapabilityKey::of::<dyn Service>();
        let mut seen: Vec<CapabilityKey> = Vec::new();
        descriptor
            .capabilities()
            .into_iter()
            .filter(|binding| {
                let key = binding.key();
                if !key.is_trait_object() || key == base || seen.contains(&key) {
                    return false;
                }
                seen.push(key);
                true
            })
            .collect()
    }
}

/// [`DeclaredInterfaces`] narrowed to traits whose name starts with `prefix`.
#[derive(Debug, Clone)]
pub struct ConventionInterfaces {
    prefix: String,
}

impl ConventionInterfaces {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }
}

impl Default for ConventionInterfaces {
    fn default() -> Self {
        Self::new(INTERFACE_PREFIX)
    }
}

impl InterfaceDetection for ConventionInterfaces {
    fn interfaces(&self, descriptor: &ServiceDescriptor) -> Vec<CapabilityBinding> {
        DeclaredInterfaces
            .interfaces(descriptor)
            .into_iter()
            .filter(|binding| binding.key().short_name().starts_with(self.prefix.as_str()))
            .collect()
    }
}

/// Outcome of one [`InterfaceManager::register_service_interfaces`] call.
#[derive(Debug, Clone, Default)]
pub struct InterfaceReport {
    /// Bindings that were stored, in declaration order.
    pub registered: Vec<StoredBinding>,
    /// Number of capabilities the strategy selected.
    pub detected: usize,
}

impl InterfaceReport {
    /// `true` iff every detected capability was stored.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.registered.len() == self.detected
    }

    /// Keys of the stored bindings.
    #[must_use]
    pub fn keys(&self) -> Vec<CapabilityKey> {
        self.registered.iter().map(StoredBinding::key).collect()
    }
}

/// Binds live services to their capabilities in a [`CapabilityStore`].
pub struct InterfaceManager {
    store: Arc<dyn CapabilityStore>,
    strategy: Box<dyn InterfaceDetection>,
}

impl InterfaceManager {
    pub fn new(store: Arc<dyn CapabilityStore>, strategy: impl InterfaceDetection + 'static) -> Self {
        Self { store, strategy: Box::new(strategy) }
    }

    /// Default manager using [`DeclaredInterfaces`].
    pub fn with_declared(store: Arc<dyn CapabilityStore>) -> Self {
        Self::new(store, DeclaredInterfaces)
    }

    /// Stores `service` under every capability the strategy selects.
    ///
    /// Best effort: a capability that fails is logged and skipped, the rest
    /// are still attempted.
    pub fn register_service_interfaces(
        &self,
        descriptor: &ServiceDescriptor,
        service: &Arc<dyn Service>,
    ) -> InterfaceReport {
        let bindings = self.strategy.interfaces(descriptor);
        let mut report = InterfaceReport { registered: Vec::new(), detected: bindings.len() };

        for binding in bindings {
            let key = binding.key();
            match self.bind(&binding, service) {
                Ok(stored) => {
                    debug!(capability = key.name(), service = descriptor.type_name(), "Capability registered");
                    report.registered.push(stored);
                },
                Err(e) => {
                    warn!(
                        capability = key.name(),
                        service = descriptor.type_name(),
                        error = %e,
                        "Capability registration failed"
                    );
                },
            }
        }

        if report.detected > 0 {
            info!(
                service = descriptor.type_name(),
                "Registered {}/{} interfaces",
                report.registered.len(),
                report.detected
            );
        }
        report
    }

    fn bind(&self, binding: &CapabilityBinding, service: &Arc<dyn Service>) -> Result<StoredBinding, KernelError> {
        let instance = binding.bind(Arc::clone(service))?;
        StoredBinding::write(self.store.as_ref(), binding.key(), instance)
    }
}

impl std::fmt::Debug for InterfaceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterfaceManager").finish_non_exhaustive()
    }
}
