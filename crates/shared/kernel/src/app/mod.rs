//! Feature orchestration and the top-level application.

pub mod application;
pub mod features;
pub mod shell;

pub use application::{Application, ApplicationBuilder};
pub use features::{FeatureDeclaration, FeatureManager};
pub use shell::{NoopShell, ShellConfigurator};
