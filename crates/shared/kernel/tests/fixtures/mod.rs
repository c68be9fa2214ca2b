#![allow(dead_code, unreachable_pub)]

use automata_kernel::domain::constants::service_scope_name;
use automata_kernel::prelude::*;
use serde_json::{Value, json};
use std::sync::Arc;

pub const HEALTH: &str = "features.health";
pub const BROKEN: &str = "features.broken";
pub const MIXED: &str = "features.mixed";
pub const ORPHAN: &str = "features.orphan";
/// Re-registers `health`, then fails on [`BrokenService`].
pub const SHADOW: &str = "features.shadow";

pub trait IHealthCapability: Send + Sync {
    fn get_quick_status(&self) -> Value;
}

pub trait IDiagnosticsCapability: Send + Sync {
    fn get_system_info(&self) -> Value;
}

#[service("health")]
pub struct ProbeService {
    state: ServiceState,
}

impl IHealthCapability for ProbeService {
    fn get_quick_status(&self) -> Value {
        json!({ "status": "healthy" })
    }
}

impl IDiagnosticsCapability for ProbeService {
    fn get_system_info(&self) -> Value {
        json!({ "platform": "test" })
    }
}

impl Service for ProbeService {
    fn feature_name(&self) -> &str {
        self.state.feature_name()
    }

    fn is_initialized(&self) -> bool {
        self.state.is_initialized()
    }

    fn initialize(&mut self) -> Result<(), ServiceError> {
        self.state.initialize_with(|| Ok(()))
    }
}

impl ServiceDefinition for ProbeService {
    fn create() -> Result<Self, ServiceError> {
        Ok(Self { state: ServiceState::new("health") })
    }

    fn capabilities(set: &mut CapabilitySet<Self>) {
        set.provide::<dyn IHealthCapability>(|s| s).provide::<dyn IDiagnosticsCapability>(|s| s);
    }
}

#[service("broken")]
pub struct BrokenService {
    state: ServiceState,
}

impl Service for BrokenService {
    fn feature_name(&self) -> &str {
        self.state.feature_name()
    }

    fn is_initialized(&self) -> bool {
        self.state.is_initialized()
    }

    fn initialize(&mut self) -> Result<(), ServiceError> {
        self.state.initialize_with(|| Err(ServiceError::unavailable("broken", "sensor")))
    }
}

impl ServiceDefinition for BrokenService {
    fn create() -> Result<Self, ServiceError> {
        Ok(Self { state: ServiceState::for_type::<Self>() })
    }
}

#[service]
pub struct AuditService {
    state: ServiceState,
}

impl Service for AuditService {
    fn feature_name(&self) -> &str {
        self.state.feature_name()
    }

    fn is_initialized(&self) -> bool {
        self.state.is_initialized()
    }

    fn initialize(&mut self) -> Result<(), ServiceError> {
        self.state.initialize_with(|| Ok(()))
    }
}

impl ServiceDefinition for AuditService {
    fn create() -> Result<Self, ServiceError> {
        Ok(Self { state: ServiceState::for_type::<Self>() })
    }
}

pub struct ProbeRoutes {
    health: Arc<dyn IHealthCapability>,
    service: Arc<dyn Service>,
}

impl Endpoint for ProbeRoutes {
    fn operations(self: Arc<Self>) -> Vec<Operation> {
        let this = Arc::clone(&self);
        vec![
            Operation::expose("get_quick_status", move |_| {
                Ok(ApiResponse::success(Some(this.health.get_quick_status())))
            })
            .guarded_by(Arc::clone(&self.service)),
        ]
    }
}

impl EndpointDefinition for ProbeRoutes {
    fn construct(injector: &Injector<'_>) -> Result<Self, KernelError> {
        let service = injector.scoped(&service_scope_name("health"))?;
        injector.require_initialized(service.as_ref())?;
        Ok(Self { health: injector.capability::<dyn IHealthCapability>()?, service })
    }
}

/// Declared in another module and merely re-exported by the health routes.
pub struct ForeignRoutes;

impl Endpoint for ForeignRoutes {
    fn operations(self: Arc<Self>) -> Vec<Operation> {
        vec![Operation::expose("foreign", |_| Ok(ApiResponse::success(None)))]
    }
}

impl EndpointDefinition for ForeignRoutes {
    fn construct(_injector: &Injector<'_>) -> Result<Self, KernelError> {
        Ok(Self)
    }
}

fn feature(path: &str, services: impl FnOnce(ServiceModule) -> ServiceModule) -> FeatureModule {
    let module = FeatureModule::new(path);
    let services = services(ServiceModule::new(module.service_path()));
    module.with_services(services)
}

pub fn catalog() -> ModuleCatalog {
    let health = feature(HEALTH, |m| {
        m.item(ServiceItem::Other("HealthCheckResult"))
            .item(ServiceItem::Service(ServiceDescriptor::base()))
            .service::<ProbeService>()
    })
    .with_routes(
        RouteModule::new("features.health.routes")
            .item(EndpointDescriptor::of::<ProbeRoutes>("features.health.routes"))
            .item(EndpointDescriptor::of::<ForeignRoutes>("features.other.routes")),
    );

    let orphan = feature(ORPHAN, ServiceModule::service::<AuditService>).with_routes(
        RouteModule::new("features.orphan.routes")
            .item(EndpointDescriptor::of::<ProbeRoutes>("features.orphan.routes")),
    );

    let shadow = feature(SHADOW, |m| m.service::<ProbeService>().service::<BrokenService>()).with_routes(
        RouteModule::new("features.shadow.routes")
            .item(EndpointDescriptor::of::<ProbeRoutes>("features.shadow.routes")),
    );

    ModuleCatalog::new()
        .with(health)
        .with(feature(BROKEN, ServiceModule::service::<BrokenService>))
        .with(feature(MIXED, |m| m.service::<AuditService>().service::<BrokenService>()))
        .with(orphan)
        .with(shadow)
}
