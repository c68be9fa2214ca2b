use crate::error::KernelError;
use automata_domain::config::AppSettings;

/// Prepares the host shell (window, web-view) once features are registered.
pub trait ShellConfigurator: Send + Sync {
    /// # Errors
    /// Any error fails application start.
    fn configure(&self, settings: &AppSettings) -> Result<(), KernelError>;
}

/// Shell that configures nothing; used headless and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopShell;

impl ShellConfigurator for NoopShell {
    fn configure(&self, _settings: &AppSettings) -> Result<(), KernelError> {
        Ok(())
    }
}
