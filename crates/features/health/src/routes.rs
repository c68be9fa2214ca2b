use crate::capability::{DiagnosticsCapability, HealthCapability};
use crate::error::HealthError;
use automata_kernel::prelude::*;
use chrono::Local;
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::error;

/// Operations exposed by the health feature.
pub struct HealthRoutes {
    health: Arc<dyn HealthCapability>,
    diagnostics: Arc<dyn DiagnosticsCapability>,
    service: Arc<dyn Service>,
}

impl HealthRoutes {
    fn health_status(&self) -> ApiResponse<Value> {
        respond("health status", self.health.get_health_status())
    }

    fn quick_health(&self) -> ApiResponse<Value> {
        respond("quick status", self.health.get_quick_status())
    }

    fn system_info(&self) -> ApiResponse<Value> {
        respond("system info", self.diagnostics.get_system_info())
    }
}

/// Connectivity check; answers even when the service is down.
fn ping() -> ApiResponse<Value> {
    ApiResponse::success(Some(json!({
        "message": "pong",
        "timestamp": Local::now(),
        "service": crate::NAME,
    })))
}

fn respond<T: Serialize>(what: &str, result: Result<T, HealthError>) -> ApiResponse<Value> {
    let outcome = result.and_then(|data| Ok(serde_json::to_value(data)?));
    match outcome {
        Ok(data) => ApiResponse::success(Some(data)),
        Err(e) => {
            let message = format!("Error getting {what}: {e}");
            error!("{message}");
            ApiResponse::unexpected_error(message)
        },
    }
}

impl Endpoint for HealthRoutes {
    fn operations(self: Arc<Self>) -> Vec<Operation> {
        let guarded = |name: &str, handler: fn(&Self) -> ApiResponse<Value>| {
            let this = Arc::clone(&self);
            Operation::expose(name, move |_: &Value| Ok(handler(&this))).guarded_by(Arc::clone(&self.service))
        };

        vec![
            guarded("get_health_status", Self::health_status),
            guarded("get_quick_health", Self::quick_health),
            guarded("get_system_info", Self::system_info),
            Operation::expose("ping", |_| Ok(ping())),
        ]
    }
}

impl EndpointDefinition for HealthRoutes {
    fn construct(injector: &Injector<'_>) -> Result<Self, KernelError> {
        let service = injector.scoped(&RouteModule::scope_name(crate::NAME))?;
        injector.require_initialized(service.as_ref())?;

        Ok(Self {
            health: injector.capability::<dyn HealthCapability>()?,
            diagnostics: injector.capability::<dyn DiagnosticsCapability>()?,
            service,
        })
    }
}
