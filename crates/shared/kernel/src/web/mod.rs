//! Exposure side of the core: endpoints, operations and their registry.

pub mod endpoints;
pub mod operation;
pub mod routes;

pub use endpoints::{EndpointRegistry, Exposure};
pub use operation::{Operation, Reply};
pub use routes::{Endpoint, EndpointDefinition, Injector, RouteBinder};
