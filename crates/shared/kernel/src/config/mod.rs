use crate::error::{KernelError, KernelErrorExt};
use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::info;

/// Prefix for environment overrides (`AUTOMATA__SERVER__PORT=9000`).
pub const ENV_PREFIX: &str = "AUTOMATA";
/// Base name of the optional settings file looked up in the working directory.
pub const DEFAULT_CONFIG_NAME: &str = "automata";

/// Loads settings from an optional file overlaid with `AUTOMATA__*` environment variables.
///
/// Without `path`, `automata.{toml,json,yaml,...}` in the working directory is used
/// when present and silently skipped otherwise. An explicit `path` must exist.
/// Nested keys use a double underscore: `AUTOMATA__WINDOW__SIZE`.
///
/// # Errors
/// Returns [`KernelError::Config`] when an explicit file is missing, a source is
/// malformed, or the merged values do not deserialize into `T`.
///
/// # Example
/// ```rust
/// use automata_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct Settings {
///     #[serde(default)]
///     debug: bool,
/// }
///
/// let settings: Settings = load_config(None::<&str>).unwrap_or_default();
/// # let _ = settings.debug;
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, KernelError>
where
    T: DeserializeOwned,
{
    let file = match path.as_ref() {
        Some(path) => {
            info!(path = %path.as_ref().display(), "Loading settings");
            File::from(path.as_ref()).required(true)
        },
        None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
    };

    Config::builder()
        .add_source(file)
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build settings")?
        .try_deserialize::<T>()
        .context("Failed to deserialize settings")
}
