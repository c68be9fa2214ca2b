use crate::app::features::{FeatureDeclaration, FeatureManager};
use crate::app::shell::{NoopShell, ShellConfigurator};
use crate::context::AppContext;
use crate::di::ModuleCatalog;
use crate::error::KernelError;
use crate::web::Operation;
use automata_domain::config::AppSettings;
use automata_domain::constants::FEATURES_STATUS_OPERATION;
use automata_domain::response::{ApiResponse, ErrorCode};
use automata_domain::status::{ApplicationStatus, StatusReport};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info};

/// Top-level orchestrator: registers features, configures the shell, reports status.
pub struct Application {
    context: AppContext,
    features: Arc<FeatureManager>,
    shell: Box<dyn ShellConfigurator>,
    settings: AppSettings,
    settings_loaded: bool,
    initialized: Arc<AtomicBool>,
}

impl Application {
    #[must_use]
    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::default()
    }

    /// Registers `features`, then configures the shell, then marks the
    /// application initialized.
    ///
    /// Any failure is logged and reported as `false`; the caller decides
    /// whether to abort.
    pub fn start(&self, features: &[FeatureDeclaration]) -> bool {
        info!("Initializing application...");
        match self.try_start(features) {
            Ok(()) => {
                self.initialized.store(true, Ordering::Release);
                info!("Application initialized successfully");
                true
            },
            Err(e) => {
                error!(error = %e, "Failed to initialize application: {e}");
                false
            },
        }
    }

    fn try_start(&self, features: &[FeatureDeclaration]) -> Result<(), KernelError> {
        if !features.is_empty() {
            self.features.register_features(features)?;
        }
        self.shell.configure(&self.settings)
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Feature status plus the application section.
    #[must_use]
    pub fn get_status(&self) -> StatusReport {
        status_report(&self.features, self.is_initialized(), self.settings_loaded)
    }

    #[must_use]
    pub const fn context(&self) -> &AppContext {
        &self.context
    }

    #[must_use]
    pub fn features(&self) -> &FeatureManager {
        &self.features
    }

    #[must_use]
    pub const fn settings(&self) -> &AppSettings {
        &self.settings
    }
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("initialized", &self.is_initialized())
            .field("settings_loaded", &self.settings_loaded)
            .field("features", &self.features)
            .finish_non_exhaustive()
    }
}

fn status_report(features: &FeatureManager, initialized: bool, settings_loaded: bool) -> StatusReport {
    StatusReport {
        features: features.get_features_status(),
        application: ApplicationStatus { initialized, settings_loaded },
    }
}

/// Builder for [`Application`]. Every part has a headless default.
#[derive(Default)]
pub struct ApplicationBuilder {
    context: Option<AppContext>,
    catalog: Option<ModuleCatalog>,
    settings: Option<AppSettings>,
    shell: Option<Box<dyn ShellConfigurator>>,
}

impl ApplicationBuilder {
    #[must_use]
    pub fn context(mut self, context: AppContext) -> Self {
        self.context = Some(context);
        self
    }

    #[must_use]
    pub fn catalog(mut self, catalog: ModuleCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    #[must_use]
    pub fn settings(mut self, settings: AppSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    #[must_use]
    pub fn shell(mut self, shell: impl ShellConfigurator + 'static) -> Self {
        self.shell = Some(Box::new(shell));
        self
    }

    /// Wires the feature manager to the context and exposes the
    /// `get_features_status` operation.
    ///
    /// # Errors
    /// Propagates failures to obtain the context singletons.
    pub fn build(self) -> Result<Application, KernelError> {
        let context = self.context.unwrap_or_default();
        let catalog = Arc::new(self.catalog.unwrap_or_default());
        let features = Arc::new(FeatureManager::from_context(&context, catalog)?);
        let settings_loaded = self.settings.is_some();
        let initialized = Arc::new(AtomicBool::new(false));

        context.endpoints()?.expose(features_status_operation(
            Arc::clone(&features),
            Arc::clone(&initialized),
            settings_loaded,
        ));

        Ok(Application {
            context,
            features,
            shell: self.shell.unwrap_or_else(|| Box::new(NoopShell)),
            settings: self.settings.unwrap_or_default(),
            settings_loaded,
            initialized,
        })
    }
}

impl fmt::Debug for ApplicationBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationBuilder")
            .field("catalog", &self.catalog)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

fn features_status_operation(
    features: Arc<FeatureManager>,
    initialized: Arc<AtomicBool>,
    settings_loaded: bool,
) -> Operation {
    Operation::expose(FEATURES_STATUS_OPERATION, move |_| {
        if !initialized.load(Ordering::Acquire) {
            return Ok(ApiResponse::error(
                "Application not initialized",
                ErrorCode::ControllerNotInitialized,
                None,
            ));
        }
        let report = status_report(&features, true, settings_loaded);
        let data = serde_json::to_value(report).map_err(|e| KernelError::from(e.to_string()))?;
        info!("Application status retrieved");
        Ok(ApiResponse::success(Some(data)))
    })
}
