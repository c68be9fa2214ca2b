use crate::web::operation::{Callable, Operation};
use automata_domain::response::ApiResponse;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// The sink exposed operations are registered on; stands in for the
/// web-view bridge.
#[derive(Default)]
pub struct EndpointRegistry {
    operations: RwLock<BTreeMap<String, Callable>>,
}

impl EndpointRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Composes `operation` and makes it callable by name. A later exposure
    /// under the same name replaces the earlier one.
    pub fn expose(&self, operation: Operation) -> Exposure {
        let (name, callable) = operation.compose();
        let replaced = self.operations.write().insert(name.clone(), Arc::clone(&callable));
        if replaced.is_some() {
            warn!(operation = %name, "Operation re-exposed");
        }
        debug!(operation = %name, "Operation exposed");
        Exposure { name, callable, replaced }
    }

    /// Undoes `exposure` unless its name was exposed again since: the
    /// callable it replaced comes back, otherwise the name is withdrawn.
    pub fn revert(&self, exposure: Exposure) -> bool {
        let Exposure { name, callable, replaced } = exposure;
        let mut operations = self.operations.write();
        if !operations.get(&name).is_some_and(|current| Arc::ptr_eq(current, &callable)) {
            return false;
        }
        match replaced {
            Some(previous) => {
                operations.insert(name.clone(), previous);
                debug!(operation = %name, "Operation restored");
            },
            None => {
                operations.remove(&name);
                debug!(operation = %name, "Operation withdrawn");
            },
        }
        true
    }

    /// Removes `name`. Returns whether it was exposed.
    pub fn withdraw(&self, name: &str) -> bool {
        let removed = self.operations.write().remove(name).is_some();
        if removed {
            debug!(operation = %name, "Operation withdrawn");
        }
        removed
    }

    /// Calls `name` with `args`. Unknown names answer an `INVALID_INPUT` envelope.
    pub fn invoke(&self, name: &str, args: &Value) -> ApiResponse<Value> {
        let callable = self.operations.read().get(name).cloned();
        match callable {
            Some(callable) => callable(args),
            None => ApiResponse::invalid_input(format!("Unknown operation: {name}")),
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.operations.read().contains_key(name)
    }

    /// Exposed names, sorted.
    #[must_use]
    pub fn operation_names(&self) -> Vec<String> {
        self.operations.read().keys().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.read().len()
    }

    pub fn clear(&self) {
        self.operations.write().clear();
        debug!("Endpoint registry cleared");
    }
}

/// One [`EndpointRegistry::expose`] call: the composed callable and the one it replaced.
pub struct Exposure {
    name: String,
    callable: Callable,
    replaced: Option<Callable>,
}

impl Exposure {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the exposure replaced an operation of the same name.
    #[must_use]
    pub const fn replaced(&self) -> bool {
        self.replaced.is_some()
    }
}

impl fmt::Debug for Exposure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exposure")
            .field("name", &self.name)
            .field("replaced", &self.replaced())
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for EndpointRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointRegistry").field("operations", &self.operation_names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use automata_domain::response::ErrorCode;
    use serde_json::json;

    #[test]
    fn expose_invoke_withdraw() {
        let registry = EndpointRegistry::new();
        registry.expose(Operation::expose("ping", |_| Ok(ApiResponse::success(Some(json!("pong"))))));
        assert!(registry.contains("ping"));

        let response = registry.invoke("ping", &Value::Null);
        assert!(response.is_success());
        assert_eq!(response.data, Some(json!("pong")));

        assert!(registry.withdraw("ping"));
        assert!(!registry.withdraw("ping"));
        assert_eq!(registry.invoke("ping", &Value::Null).code, Some(ErrorCode::InvalidInput));
    }

    #[test]
    fn names_are_sorted_and_replacement_wins() {
        let registry = EndpointRegistry::new();
        registry.expose(Operation::expose("b", |_| Ok(ApiResponse::success(Some(json!(1))))));
        registry.expose(Operation::expose("a", |_| Ok(ApiResponse::success(None))));
        registry.expose(Operation::expose("b", |_| Ok(ApiResponse::success(Some(json!(2))))));

        assert_eq!(registry.operation_names(), vec!["a", "b"]);
        assert_eq!(registry.invoke("b", &Value::Null).data, Some(json!(2)));

        registry.clear();
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn panicking_handler_answers_an_envelope_and_stays_callable() {
        let registry = EndpointRegistry::new();
        registry.expose(Operation::expose("boom", |args| {
            assert!(args.is_null(), "unexpected args");
            Ok(ApiResponse::success(None))
        }));

        let reply = registry.invoke("boom", &json!({ "force": true }));
        assert_eq!(reply.code, Some(ErrorCode::UnexpectedError));
        assert_eq!(reply.error.as_deref(), Some("Unexpected error in boom: handler panicked"));
        assert!(registry.invoke("boom", &Value::Null).is_success());
    }

    #[test]
    fn revert_restores_the_replaced_operation() {
        let registry = EndpointRegistry::new();
        registry.expose(Operation::expose("b", |_| Ok(ApiResponse::success(Some(json!(1))))));
        let second = registry.expose(Operation::expose("b", |_| Ok(ApiResponse::success(Some(json!(2))))));
        assert!(second.replaced());

        assert!(registry.revert(second));
        assert_eq!(registry.invoke("b", &Value::Null).data, Some(json!(1)));
    }

    #[test]
    fn revert_skips_a_name_exposed_again() {
        let registry = EndpointRegistry::new();
        let first = registry.expose(Operation::expose("a", |_| Ok(ApiResponse::success(Some(json!(1))))));
        registry.expose(Operation::expose("a", |_| Ok(ApiResponse::success(Some(json!(2))))));

        assert!(!registry.revert(first));
        assert_eq!(registry.invoke("a", &Value::Null).data, Some(json!(2)));

        let fresh = registry.expose(Operation::expose("c", |_| Ok(ApiResponse::success(None))));
        assert_eq!(fresh.name(), "c");
        assert!(registry.revert(fresh));
        assert!(!registry.contains("c"));
    }
}
