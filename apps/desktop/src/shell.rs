use automata::domain::config::AppSettings;
use automata::kernel::app::ShellConfigurator;
use automata::kernel::error::KernelError;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Window parameters resolved from settings.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowPlan {
    pub title: String,
    pub width: f64,
    pub height: f64,
    pub x: f64,
    pub y: f64,
    /// Throwaway web-view data directory when caching is disabled.
    pub data_dir: Option<PathBuf>,
    pub devtools: bool,
}

impl WindowPlan {
    /// # Errors
    /// Returns an error for a zero-sized window.
    pub fn from_settings(settings: &AppSettings) -> Result<Self, KernelError> {
        let (width, height) = settings.window.size;
        if width == 0 || height == 0 {
            return Err(format!("invalid window size {width}x{height}").into());
        }
        let (x, y) = settings.window.position;

        let data_dir = settings
            .disable_cache
            .then(|| std::env::temp_dir().join(format!("{}-webview", settings.app.name.to_lowercase())));

        Ok(Self {
            title: settings.app.name.clone(),
            width: f64::from(width),
            height: f64::from(height),
            x: f64::from(x),
            y: f64::from(y),
            data_dir,
            devtools: settings.is_development(),
        })
    }
}

/// Shell configurator for the desktop web-view.
///
/// `configure` only resolves the window plan; the window itself opens when
/// the binary launches the UI. Clones share the plan.
#[derive(Debug, Clone, Default)]
pub struct DesktopShell {
    plan: Arc<Mutex<Option<WindowPlan>>>,
}

impl DesktopShell {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The plan stored by the last successful `configure`.
    #[must_use]
    pub fn plan(&self) -> Option<WindowPlan> {
        self.plan.lock().clone()
    }
}

impl ShellConfigurator for DesktopShell {
    fn configure(&self, settings: &AppSettings) -> Result<(), KernelError> {
        let plan = WindowPlan::from_settings(settings)?;
        info!(
            title = %plan.title,
            width = plan.width,
            height = plan.height,
            url = %settings.server_url(),
            "Desktop shell configured"
        );
        *self.plan.lock() = Some(plan);
        Ok(())
    }
}
