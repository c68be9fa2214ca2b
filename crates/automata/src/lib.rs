//! Facade crate for Automata features and shared modules.
//! Re-exports domain/kernel primitives and aggregates the feature slices.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! - Build an [`Application`](kernel::app::Application) over [`catalog()`].
//! - Start it with [`FEATURES`]; extend both as new slices appear.

pub use automata_domain as domain;
pub use automata_kernel as kernel;

use automata_kernel::app::FeatureDeclaration;
use automata_kernel::di::ModuleCatalog;

/// Feature registry for runtime introspection.
pub mod features {
    #[cfg(feature = "health")]
    pub use automata_health as health;

    /// Build-time enabled features (by Cargo feature).
    pub const ENABLED: &[&str] = &[
        #[cfg(feature = "health")]
        "health",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Features the application starts with, in registration order.
pub const FEATURES: &[FeatureDeclaration] = &[
    #[cfg(feature = "health")]
    automata_health::FEATURE,
];

/// Modules of every enabled feature.
#[must_use]
pub fn catalog() -> ModuleCatalog {
    let mut catalog = ModuleCatalog::new();
    #[cfg(feature = "health")]
    catalog.insert(automata_health::module());
    catalog
}
