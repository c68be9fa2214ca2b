use automata_domain::constants::{invalid_type_error, service_scope_name};
use automata_domain::routing::RouteGuards;
use automata_domain::status::{
    ApplicationStatus, FeatureRecord, FeatureStatus, FeaturesStatus, StatusReport,
};
use chrono::Local;
use serde_json::json;

#[test]
fn status_report_flattens_feature_section() {
    let mut features = FeaturesStatus::default();
    features.features.insert(
        "health".to_owned(),
        FeatureRecord {
            namespace: "features.health".to_owned(),
            status: FeatureStatus::Active,
            registered_at: Local::now(),
        },
    );
    features.total_features = 1;
    features.services = vec!["health".to_owned()];

    let report = StatusReport {
        features,
        application: ApplicationStatus { initialized: true, settings_loaded: true },
    };
    let value = serde_json::to_value(&report).expect("serialize");

    assert_eq!(value["total_features"], json!(1));
    assert_eq!(value["features"]["health"]["status"], json!("active"));
    assert_eq!(value["features"]["health"]["namespace"], json!("features.health"));
    assert_eq!(value["services"], json!(["health"]));
    assert_eq!(value["application"], json!({ "initialized": true, "settings_loaded": true }));
}

#[test]
fn naming_helpers() {
    assert_eq!(service_scope_name("health"), "_health_service");
    assert_eq!(invalid_type_error("string"), "Invalid input type: expected string");
}

#[test]
fn default_guards_log_and_catch() {
    let guards = RouteGuards::default();
    assert!(guards.contains(RouteGuards::LOG | RouteGuards::CATCH));
    assert!(!guards.contains(RouteGuards::REQUIRE_INIT));
    assert_eq!(RouteGuards::ALL, guards | RouteGuards::REQUIRE_INIT);
}
