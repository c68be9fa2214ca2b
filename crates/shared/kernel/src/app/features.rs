use crate::context::AppContext;
use crate::di::{ModuleCatalog, ServiceDiscovery, ServiceRegistry};
use crate::error::{KernelError, KernelErrorExt};
use automata_domain::status::{FeatureRecord, FeatureStatus, FeaturesStatus};
use chrono::Local;
use parking_lot::RwLock;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info};

/// A feature name paired with the namespace its modules are declared under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeatureDeclaration {
    name: Cow<'static, str>,
    namespace: Cow<'static, str>,
}

impl FeatureDeclaration {
    #[must_use]
    pub const fn new(name: &'static str, namespace: &'static str) -> Self {
        Self { name: Cow::Borrowed(name), namespace: Cow::Borrowed(namespace) }
    }

    pub fn owned(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self { name: Cow::Owned(name.into()), namespace: Cow::Owned(namespace.into()) }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

/// Registers declared features in order and keeps their status.
pub struct FeatureManager {
    discovery: ServiceDiscovery,
    registry: Arc<ServiceRegistry>,
    features: RwLock<BTreeMap<String, FeatureRecord>>,
}

impl FeatureManager {
    pub fn new(discovery: ServiceDiscovery, registry: Arc<ServiceRegistry>) -> Self {
        Self { discovery, registry, features: RwLock::new(BTreeMap::new()) }
    }

    /// Builds a manager over the singletons of `context`.
    ///
    /// # Errors
    /// Propagates failures to obtain the context singletons.
    pub fn from_context(context: &AppContext, catalog: Arc<ModuleCatalog>) -> Result<Self, KernelError> {
        let registry = context.services()?;
        let discovery =
            ServiceDiscovery::new(catalog, context.container()?, Arc::clone(&registry), context.endpoints()?);
        Ok(Self::new(discovery, registry))
    }

    /// Runs discovery for each feature in order and stops at the first failure.
    ///
    /// Features registered before the failing one stay registered; the failing
    /// feature is not recorded.
    ///
    /// # Errors
    /// Returns the failing feature's discovery error.
    pub fn register_features(&self, features: &[FeatureDeclaration]) -> Result<(), KernelError> {
        for feature in features {
            let name = feature.name();
            info!(feature = %name, "Registering feature: {name}");

            match self.discovery.discover_and_register_services(feature.namespace()) {
                Ok(report) => {
                    let record = FeatureRecord {
                        namespace: feature.namespace().to_owned(),
                        status: FeatureStatus::Active,
                        registered_at: Local::now(),
                    };
                    self.features.write().insert(name.to_owned(), record);
                    info!(
                        feature = %name,
                        services = report.services.len(),
                        operations = report.operations,
                        "Feature {name} registered successfully"
                    );
                },
                Err(e) => {
                    error!(feature = %name, error = %e, "Failed to register feature: {name}");
                    return Err(e).context(format!("feature '{name}'"));
                },
            }
        }

        info!(features = ?self.feature_names(), "All features registered");
        Ok(())
    }

    /// Feature count, per-feature records and registered service names.
    #[must_use]
    pub fn get_features_status(&self) -> FeaturesStatus {
        let features = self.features.read().clone();
        FeaturesStatus {
            total_features: features.len(),
            features,
            services: self.registry.service_names(),
        }
    }

    /// Registered feature names, sorted.
    #[must_use]
    pub fn feature_names(&self) -> Vec<String> {
        self.features.read().keys().cloned().collect()
    }

    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.features.read().contains_key(name)
    }

    /// Forgets every feature record.
    pub fn clear(&self) {
        self.features.write().clear();
    }
}

impl fmt::Debug for FeatureManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureManager")
            .field("features", &self.feature_names())
            .field("discovery", &self.discovery)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declarations_are_const_constructible() {
        const FEATURES: &[FeatureDeclaration] = &[FeatureDeclaration::new("health", "features.health")];
        assert_eq!(FEATURES[0].name(), "health");
        assert_eq!(FEATURES[0], FeatureDeclaration::owned("health", "features.health"));
    }

    #[test]
    fn features_without_modules_are_recorded_active() -> Result<(), KernelError> {
        let manager = FeatureManager::from_context(&AppContext::new(), Arc::new(ModuleCatalog::new()))?;
        manager.register_features(&[
            FeatureDeclaration::new("alpha", "features.alpha"),
            FeatureDeclaration::new("beta", "features.beta"),
        ])?;

        let status = manager.get_features_status();
        assert_eq!(status.total_features, 2);
        assert_eq!(status.features["alpha"].status, FeatureStatus::Active);
        assert_eq!(status.features["beta"].namespace, "features.beta");
        assert!(status.services.is_empty());

        manager.clear();
        assert!(!manager.is_registered("alpha"));
        Ok(())
    }
}
