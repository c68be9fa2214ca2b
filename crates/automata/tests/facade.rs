use automata::domain::constants::FEATURES_STATUS_OPERATION;
use automata::kernel::prelude::*;
use serde_json::Value;

#[test]
fn declared_features_match_the_catalog() {
    let catalog = automata::catalog();
    assert_eq!(catalog.len(), automata::FEATURES.len());
    for feature in automata::FEATURES {
        assert!(automata::features::is_enabled(feature.name()));
        assert!(catalog.service_module(feature.namespace()).is_some(), "{} has no services", feature.name());
    }
    assert!(!automata::features::is_enabled("billing"));
}

#[test]
fn application_starts_with_every_feature() {
    let app = Application::builder().catalog(automata::catalog()).build().unwrap();
    assert!(app.start(automata::FEATURES));

    let reply = app.context().endpoints().unwrap().invoke(FEATURES_STATUS_OPERATION, &Value::Null);
    let data = reply.data.unwrap();
    assert_eq!(data["total_features"], automata::FEATURES.len());
    assert_eq!(data["application"]["initialized"], true);
    for feature in automata::FEATURES {
        assert_eq!(data["features"][feature.name()]["status"], "active");
    }
}
