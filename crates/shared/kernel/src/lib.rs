//! # Kernel
//!
//! The dependency-injection and service-lifecycle core.
//!
//! * [`di`]: capability [`Container`](di::Container), named [`SingletonRegistry`](di::SingletonRegistry),
//!   service detection, capability registration, the [`ServiceRegistry`](di::ServiceRegistry) and
//!   per-feature [`ServiceDiscovery`](di::ServiceDiscovery).
//! * [`web`]: endpoint construction ([`RouteBinder`](web::RouteBinder)), guarded
//!   [`Operation`](web::Operation)s and the [`EndpointRegistry`](web::EndpointRegistry) they are exposed on.
//! * [`app`]: [`FeatureManager`](app::FeatureManager) and the top-level [`Application`](app::Application).
//! * [`context`]: the owned [`AppContext`](context::AppContext) every component receives instead of
//!   reaching for process globals.
//!
//! ## Wiring a feature
//! ```rust
//! use automata_kernel::prelude::*;
//!
//! # fn main() -> Result<(), KernelError> {
//! let context = AppContext::new();
//! let catalog = ModuleCatalog::new();
//! let app = Application::builder().context(context).catalog(catalog).build()?;
//!
//! // Nothing declared under "features.empty": absence is a successful no-op.
//! assert!(app.start(&[FeatureDeclaration::new("empty", "features.empty")]));
//! assert!(app.is_initialized());
//! # Ok(())
//! # }
//! ```

extern crate self as automata_kernel;

pub mod app;
#[cfg(not(target_arch = "wasm32"))]
pub mod config;
pub mod context;
pub mod di;
pub mod error;
pub mod prelude;
pub mod service;
pub mod web;

pub use automata_domain as domain;
