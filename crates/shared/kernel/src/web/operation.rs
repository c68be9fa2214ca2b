//! Externally callable operations and the guards wrapped around them.

use crate::error::KernelError;
use crate::service::Service;
use automata_domain::response::ApiResponse;
use automata_domain::routing::RouteGuards;
use serde_json::Value;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use tracing::{debug, error};

/// What a handler produces: an envelope, or an error the guards turn into one.
pub type Reply = Result<ApiResponse<Value>, KernelError>;

type Handler = Arc<dyn Fn(&Value) -> Reply + Send + Sync>;

/// A composed operation, ready to be invoked.
pub(crate) type Callable = Arc<dyn Fn(&Value) -> ApiResponse<Value> + Send + Sync>;

/// A named handler plus the guards to compose around it.
///
/// ```rust
/// use automata_kernel::web::Operation;
/// use automata_kernel::domain::response::ApiResponse;
/// use serde_json::json;
///
/// let ping = Operation::expose("ping", |_| Ok(ApiResponse::success(Some(json!("pong")))));
/// assert_eq!(ping.name(), "ping");
/// ```
#[derive(Clone)]
pub struct Operation {
    name: String,
    guards: RouteGuards,
    service: Option<Arc<dyn Service>>,
    handler: Handler,
}

impl Operation {
    /// Exposes `handler` under `name` with [`RouteGuards::STANDARD`].
    pub fn expose<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Value) -> Reply + Send + Sync + 'static,
    {
        Self { name: name.into(), guards: RouteGuards::STANDARD, service: None, handler: Arc::new(handler) }
    }

    /// Answers `SERVICE_NOT_INITIALIZED` while `service` is not initialized.
    #[must_use]
    pub fn guarded_by(mut self, service: Arc<dyn Service>) -> Self {
        self.service = Some(service);
        self.guards |= RouteGuards::REQUIRE_INIT;
        self
    }

    /// Replaces the guard set.
    #[must_use]
    pub const fn with_guards(mut self, guards: RouteGuards) -> Self {
        self.guards = guards;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn guards(&self) -> RouteGuards {
        self.guards
    }

    /// Wraps the handler: log, then initialization guard, then catch.
    pub(crate) fn compose(self) -> (String, Callable) {
        let Self { name, guards, service, handler } = self;
        let mut inner = handler;

        if guards.contains(RouteGuards::LOG) {
            inner = log_calls(name.clone(), inner);
        }
        if guards.contains(RouteGuards::REQUIRE_INIT) {
            inner = require_initialized(service, inner);
        }

        let callable: Callable = if guards.contains(RouteGuards::CATCH) {
            catch_errors(name.clone(), inner)
        } else {
            Arc::new(move |args: &Value| {
                inner(args).unwrap_or_else(|e| ApiResponse::unexpected_error(e.to_string()))
            })
        };
        (name, callable)
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("guards", &self.guards)
            .field("service", &self.service.as_ref().map(|s| s.feature_name().to_owned()))
            .finish_non_exhaustive()
    }
}

fn log_calls(name: String, inner: Handler) -> Handler {
    Arc::new(move |args: &Value| {
        debug!(operation = %name, %args, "Route called");
        let reply = inner(args);
        debug!(operation = %name, ok = reply.is_ok(), "Route completed");
        reply
    })
}

fn require_initialized(service: Option<Arc<dyn Service>>, inner: Handler) -> Handler {
    Arc::new(move |args: &Value| match &service {
        None => Ok(ApiResponse::service_not_found("Unknown")),
        Some(service) if !service.is_initialized() => {
            Ok(ApiResponse::service_not_initialized(service.feature_name()))
        },
        Some(_) => inner(args),
    })
}

// `RouteGuards::CATCH` turns handler panics into envelopes, which needs unwinding.
#[cfg(panic = "abort")]
compile_error!("operation guards require `panic = \"unwind\"`");

fn catch_errors(name: String, inner: Handler) -> Callable {
    Arc::new(move |args: &Value| match catch_unwind(AssertUnwindSafe(|| inner(args))) {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            let message = format!("Unexpected error in {name}: {e}");
            error!(operation = %name, error = %e, "Route failed");
            ApiResponse::unexpected_error(message)
        },
        Err(_) => {
            error!(operation = %name, "Route panicked");
            ApiResponse::unexpected_error(format!("Unexpected error in {name}: handler panicked"))
        },
    })
}
