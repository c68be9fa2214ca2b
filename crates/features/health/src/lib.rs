//! # Health
//!
//! Application and host health checks. [`HealthService`] provides
//! [`HealthCapability`] and [`DiagnosticsCapability`]; [`HealthRoutes`] exposes
//! them as `get_health_status`, `get_quick_health`, `get_system_info` and `ping`.
//!
//! Register the feature by adding [`module()`] to the application's catalog and
//! declaring `(NAME, NAMESPACE)`.

mod error;
mod report;

pub mod capability;
pub mod routes;
pub mod service;

pub use capability::{DiagnosticsCapability, HealthCapability};
pub use error::{HealthError, HealthErrorExt};
pub use report::{
    CheckKind, CheckOutcome, CheckSummary, CpuUsage, DiskUsage, HealthReport, MemoryUsage,
    OverallStatus, QuickStatus, SystemInfo, Uptime,
};
pub use routes::HealthRoutes;
pub use service::HealthService;

use automata_kernel::prelude::*;

pub const NAME: &str = "health";
pub const NAMESPACE: &str = "features.health";

const ROUTES_PATH: &str = "features.health.routes";

/// The feature declaration for [`automata_kernel::app::Application::start`].
pub const FEATURE: FeatureDeclaration = FeatureDeclaration::new(NAME, NAMESPACE);

/// Service and routes modules declared under [`NAMESPACE`].
#[must_use]
pub fn module() -> FeatureModule {
    let feature = FeatureModule::new(NAMESPACE);
    let services = ServiceModule::new(feature.service_path())
        .item(ServiceItem::Other("HealthReport"))
        .service::<HealthService>();
    let routes = RouteModule::new(feature.routes_path()).item(EndpointDescriptor::of::<HealthRoutes>(ROUTES_PATH));

    feature.with_services(services).with_routes(routes)
}
