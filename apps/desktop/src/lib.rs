//! Desktop composition root: the shell configurator and, with the `desktop`
//! feature, the dioxus web-view.

mod shell;
#[cfg(feature = "desktop")]
mod window;

pub use shell::{DesktopShell, WindowPlan};
#[cfg(feature = "desktop")]
pub use window::DesktopApp;

use automata::domain::config::AppSettings;
use automata_logger::{Logger, LoggerError};

/// Installs the global subscriber from `settings.log`; `debug` selects `DEBUG`.
///
/// # Errors
/// Propagates [`LoggerError`] for a bad level or an unusable log directory.
pub fn init_logging(settings: &AppSettings) -> Result<Logger, LoggerError> {
    let builder = Logger::builder().name(env!("CARGO_PKG_NAME")).debug(settings.debug);
    let builder = match settings.log.level.as_deref() {
        Some(level) => builder.level_name(level)?,
        None => builder,
    };

    match &settings.log.directory {
        Some(directory) if settings.log.json => builder.directory(directory).json().init(),
        Some(directory) => builder.directory(directory).init(),
        None => builder.init(),
    }
}
