//! Fixed names used across the wiring core.

/// Singleton registry slot holding the capability container.
pub const CONTAINER_REGISTRY_NAME: &str = "container";
/// Singleton registry slot holding the service registry.
pub const SERVICE_REGISTRY_NAME: &str = "service_registry";
/// Singleton registry slot holding the endpoint exposure registry.
pub const WEB_API_REGISTRY_NAME: &str = "web_api";

pub const SERVICE_SUFFIX: &str = "Service";
/// Default short-name prefix marking a trait as a capability interface.
pub const INTERFACE_PREFIX: &str = "I";

pub const SERVICE_MODULE_NAME: &str = "service";
pub const ROUTES_MODULE_NAME: &str = "routes";

/// Name of the application-level status operation.
pub const FEATURES_STATUS_OPERATION: &str = "get_features_status";

pub const EMPTY_INPUT_ERROR: &str = "Input cannot be empty";

/// Scope variable a route module receives its service under: `_{name}_service`.
#[must_use]
pub fn service_scope_name(service_name: &str) -> String {
    format!("_{service_name}_service")
}

/// Message for a value that failed a type check.
#[must_use]
pub fn invalid_type_error(expected: &str) -> String {
    format!("Invalid input type: expected {expected}")
}
