//! Which declared types count as services.

use crate::di::module::{ServiceDescriptor, ServiceItem, ServiceModule};
use tracing::trace;

/// Detection policy used by discovery.
pub trait ServiceDetector: Send + Sync {
    /// Whether `item` should be instantiated and registered.
    fn is_service(&self, item: &ServiceItem) -> bool;

    /// Service descriptors of `module`, in declaration order.
    fn service_descriptors<'m>(&self, module: &'m ServiceModule) -> Vec<&'m ServiceDescriptor> {
        module
            .items()
            .iter()
            .filter(|item| {
                let keep = self.is_service(item);
                trace!(module = module.path(), item = item.name(), keep, "Service candidate");
                keep
            })
            .filter_map(|item| match item {
                ServiceItem::Service(descriptor) => Some(descriptor),
                ServiceItem::Other(_) => None,
            })
            .collect()
    }
}

/// Default policy: implements the service contract, is not the base
/// implementation, and carries a `#[service]` marker.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerServiceDetector;

impl ServiceDetector for MarkerServiceDetector {
    fn is_service(&self, item: &ServiceItem) -> bool {
        match item {
            ServiceItem::Service(descriptor) => !descriptor.is_base() && descriptor.marker().is_some(),
            ServiceItem::Other(_) => false,
        }
    }
}

/// Marker-driven policy that can be narrowed to an allow-list of service names.
///
/// With no allow-list it accepts every marked type except the base implementation.
#[derive(Debug, Clone, Default)]
pub struct AnnotationServiceDetector {
    allowed: Option<Vec<&'static str>>,
}

impl AnnotationServiceDetector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Only types whose marker is in `names` are services.
    #[must_use]
    pub fn only(names: impl IntoIterator<Item = &'static str>) -> Self {
        Self { allowed: Some(names.into_iter().collect()) }
    }
}

impl ServiceDetector for AnnotationServiceDetector {
    fn is_service(&self, item: &ServiceItem) -> bool {
        let ServiceItem::Service(descriptor) = item else { return false };
        match (descriptor.marker(), &self.allowed) {
            _ if descriptor.is_base() => false,
            (Some(marker), Some(allowed)) => allowed.contains(&marker),
            (Some(_), None) => true,
            (None, _) => false,
        }
    }
}

/// Selects a detection policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DetectorKind {
    #[default]
    Default,
    Annotation,
}

impl DetectorKind {
    #[must_use]
    pub fn build(self) -> Box<dyn ServiceDetector> {
        match self {
            Self::Default => Box::new(MarkerServiceDetector),
            Self::Annotation => Box::new(AnnotationServiceDetector::new()),
        }
    }
}
