mod fixtures;

use automata_kernel::domain::constants::FEATURES_STATUS_OPERATION;
use automata_kernel::domain::status::FeatureStatus;
use automata_kernel::di::ServiceDiscovery;
use automata_kernel::prelude::*;
use fixtures::{AuditService, IDiagnosticsCapability, IHealthCapability, ProbeService};
use serde_json::{Value, json};
use std::sync::Arc;

fn app(context: &AppContext) -> Application {
    Application::builder().context(context.clone()).catalog(fixtures::catalog()).build().unwrap()
}

#[test]
fn health_feature_end_to_end() {
    let context = AppContext::new();
    let app = app(&context);

    assert!(app.start(&[FeatureDeclaration::new("health", fixtures::HEALTH)]));
    assert!(app.is_initialized());

    let status = app.get_status();
    assert_eq!(status.features.total_features, 1);
    assert_eq!(status.features.features["health"].status, FeatureStatus::Active);
    assert_eq!(status.features.features["health"].namespace, fixtures::HEALTH);
    assert_eq!(status.features.services, vec!["health"]);
    assert!(status.application.initialized);

    let container = context.container().unwrap();
    assert_eq!(container.resolve::<dyn IHealthCapability>().unwrap().get_quick_status()["status"], "healthy");
    assert!(container.resolve::<dyn IDiagnosticsCapability>().is_ok());
    assert!(container.resolve::<ProbeService>().is_ok());

    let endpoints = context.endpoints().unwrap();
    assert_eq!(endpoints.operation_names(), vec![FEATURES_STATUS_OPERATION, "get_quick_status"]);

    let reply = endpoints.invoke("get_quick_status", &Value::Null);
    assert!(reply.is_success());
    assert_eq!(reply.data, Some(json!({ "status": "healthy" })));

    let status = endpoints.invoke(FEATURES_STATUS_OPERATION, &Value::Null);
    let data = status.data.unwrap();
    assert_eq!(data["total_features"], 1);
    assert_eq!(data["features"]["health"]["status"], "active");
    assert_eq!(data["services"], json!(["health"]));
}

#[test]
fn failing_initialization_fails_start() {
    let context = AppContext::new();
    let app = app(&context);

    assert!(!app.start(&[FeatureDeclaration::new("broken", fixtures::BROKEN)]));
    assert!(!app.is_initialized());
    assert_eq!(app.get_status().features.total_features, 0);
    assert!(context.services().unwrap().is_empty());

    let reply = context.endpoints().unwrap().invoke(FEATURES_STATUS_OPERATION, &Value::Null);
    assert_eq!(reply.code, Some(ErrorCode::ControllerNotInitialized));
}

#[test]
fn registration_stops_at_first_failing_feature() {
    let context = AppContext::new();
    let manager = FeatureManager::from_context(&context, Arc::new(fixtures::catalog())).unwrap();

    let result = manager.register_features(&[
        FeatureDeclaration::new("health", fixtures::HEALTH),
        FeatureDeclaration::new("broken", fixtures::BROKEN),
        FeatureDeclaration::new("orphan", fixtures::ORPHAN),
    ]);

    assert!(matches!(result, Err(KernelError::Initialization { .. })));
    assert_eq!(manager.feature_names(), vec!["health"]);
    assert!(!manager.is_registered("orphan"));
    assert_eq!(context.services().unwrap().service_names(), vec!["health"]);
}

#[test]
fn failing_feature_rolls_back_its_earlier_services() {
    let context = AppContext::new();
    let manager = FeatureManager::from_context(&context, Arc::new(fixtures::catalog())).unwrap();

    let result = manager.register_features(&[FeatureDeclaration::new("mixed", fixtures::MIXED)]);

    assert!(result.is_err());
    assert_eq!(manager.get_features_status().total_features, 0);
    assert!(!context.services().unwrap().service_exists("audit_service"));
    assert!(!context.container().unwrap().is_registered::<AuditService>());
}

#[test]
fn failing_feature_restores_what_it_replaced() {
    let context = AppContext::new();
    let manager = FeatureManager::from_context(&context, Arc::new(fixtures::catalog())).unwrap();
    manager.register_features(&[FeatureDeclaration::new("health", fixtures::HEALTH)]).unwrap();

    let services = context.services().unwrap();
    let container = context.container().unwrap();
    let original = services.get_service("health").unwrap();
    let capability = container.resolve::<dyn IHealthCapability>().unwrap();

    let result = manager.register_features(&[FeatureDeclaration::new("shadow", fixtures::SHADOW)]);

    assert!(matches!(result, Err(KernelError::Initialization { .. })));
    assert_eq!(manager.get_features_status().services, vec!["health"]);
    assert!(Arc::ptr_eq(&services.get_service("health").unwrap(), &original));

    let mirrored = container.resolve::<ProbeService>().unwrap();
    assert!(std::ptr::addr_eq(Arc::as_ptr(&mirrored), Arc::as_ptr(&original)));
    let resolved = container.resolve::<dyn IHealthCapability>().unwrap();
    assert!(std::ptr::addr_eq(Arc::as_ptr(&resolved), Arc::as_ptr(&capability)));
    assert!(container.resolve::<dyn IDiagnosticsCapability>().is_ok());

    let reply = context.endpoints().unwrap().invoke("get_quick_status", &Value::Null);
    assert_eq!(reply.data, Some(json!({ "status": "healthy" })));
}

#[test]
fn rollback_keeps_constructor_registrations() {
    let context = AppContext::new();
    let container = context.container().unwrap();
    container.register_factory::<dyn IHealthCapability, _>(|| {
        let fallback: Arc<dyn IHealthCapability> = Arc::new(ProbeService::create().unwrap());
        fallback
    });
    let manager = FeatureManager::from_context(&context, Arc::new(fixtures::catalog())).unwrap();

    let result = manager.register_features(&[FeatureDeclaration::new("shadow", fixtures::SHADOW)]);

    assert!(result.is_err());
    assert!(context.services().unwrap().is_empty());
    assert!(container.resolve::<dyn IHealthCapability>().is_ok());
    assert!(!container.is_registered::<dyn IDiagnosticsCapability>());
    assert!(!container.is_registered::<ProbeService>());
    assert!(!context.endpoints().unwrap().contains("get_quick_status"));
}

#[test]
fn route_binding_failure_does_not_fail_the_feature() {
    let context = AppContext::new();
    let manager = FeatureManager::from_context(&context, Arc::new(fixtures::catalog())).unwrap();

    manager.register_features(&[FeatureDeclaration::new("orphan", fixtures::ORPHAN)]).unwrap();

    let status = manager.get_features_status();
    assert_eq!(status.features["orphan"].status, FeatureStatus::Active);
    assert_eq!(status.services, vec!["audit_service"]);
    assert!(!context.endpoints().unwrap().contains("get_quick_status"));
}

#[test]
fn discovery_reports_what_it_registered() {
    let context = AppContext::new();
    let discovery = ServiceDiscovery::new(
        Arc::new(fixtures::catalog()),
        context.container().unwrap(),
        context.services().unwrap(),
        context.endpoints().unwrap(),
    );

    let report = discovery.discover_and_register_services(fixtures::HEALTH).unwrap();
    assert_eq!(report.services, vec!["health"]);
    assert_eq!(report.capabilities, 2);
    assert_eq!(report.operations, 1);
    assert!(!context.endpoints().unwrap().contains("foreign"));
}

#[test]
fn reset_isolates_runs() {
    let context = AppContext::new();
    assert!(app(&context).start(&[FeatureDeclaration::new("health", fixtures::HEALTH)]));

    context.reset_all();
    assert!(context.services().unwrap().is_empty());
    assert!(!context.container().unwrap().is_registered::<dyn IHealthCapability>());
    assert_eq!(context.endpoints().unwrap().len(), 0);
}
