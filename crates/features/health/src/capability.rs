use crate::error::HealthError;
use crate::report::{HealthReport, QuickStatus, SystemInfo};

/// Application health as seen by other features.
pub trait HealthCapability: Send + Sync {
    /// Runs every check and aggregates the outcome.
    ///
    /// # Errors
    /// Returns [`HealthError::NotInitialized`] before the service is started.
    fn get_health_status(&self) -> Result<HealthReport, HealthError>;

    /// Memory, CPU and uptime only.
    ///
    /// # Errors
    /// Returns [`HealthError::NotInitialized`] before the service is started.
    fn get_quick_status(&self) -> Result<QuickStatus, HealthError>;
}

/// Static host description.
pub trait DiagnosticsCapability: Send + Sync {
    /// # Errors
    /// Returns [`HealthError::NotInitialized`] before the service is started.
    fn get_system_info(&self) -> Result<SystemInfo, HealthError>;
}
