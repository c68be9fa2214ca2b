//! # Logger
//!
//! Installs the process-wide `tracing` subscriber for the desktop shell and its
//! feature services. Console output, a rolling file sink, and `RUST_LOG`-style
//! filtering are combined into one registry.
//!
//! * [`LoggerBuilder::debug`] switches the default level to `DEBUG` and adds
//!   source locations to console lines, mirroring the application `debug` flag.
//! * [`LoggerBuilder::level_name`] accepts a textual level coming from settings
//!   (`"info"`, `"warn"`, ...).
//! * File output is opt-in through [`LoggerBuilder::directory`].
//!
//! ## Example
//!
//! ```rust
//! # use automata_logger::{Logger, LevelFilter};
//!
//! let _logger = Logger::builder()
//!     .name("automata")
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use private::Sealed;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_RETAINED_FILES: usize = 7;
const LOG_FILE_SUFFIX: &str = "log";

#[derive(Debug)]
struct LoggerOptions {
    console: bool,
    debug: bool,
    level: LevelFilter,
    directives: Option<String>,
    directory: Option<PathBuf>,
    rotation: Rotation,
    retained_files: usize,
    json: bool,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            console: true,
            debug: false,
            level: LevelFilter::INFO,
            directives: None,
            directory: None,
            rotation: Rotation::DAILY,
            retained_files: DEFAULT_RETAINED_FILES,
            json: false,
        }
    }
}

#[derive(Debug)]
pub struct Unnamed;
#[derive(Debug)]
pub struct Named(String);
#[derive(Debug)]
pub struct ConsoleOnly;
#[derive(Debug)]
pub struct WithFiles;

mod private {
    pub trait Sealed {}
}
impl Sealed for Unnamed {}
impl Sealed for Named {}
impl Sealed for ConsoleOnly {}
impl Sealed for WithFiles {}

/// Typestate builder for the global subscriber.
///
/// A name is mandatory before [`LoggerBuilder::init`] becomes available; file
/// tuning knobs only exist once a directory was supplied.
#[derive(Debug)]
pub struct LoggerBuilder<N: Sealed = Unnamed, F: Sealed = ConsoleOnly> {
    options: LoggerOptions,
    name: N,
    sink: PhantomData<F>,
}

impl<F: Sealed> LoggerBuilder<Unnamed, F> {
    /// Names the subscriber; used as the log file prefix.
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<Named, F> {
        LoggerBuilder { options: self.options, name: Named(name.into()), sink: PhantomData }
    }
}

impl<F: Sealed> LoggerBuilder<Named, F> {
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.options.level = level;
        self
    }

    /// Parses a textual level such as `"warn"` or `"trace"`.
    ///
    /// # Errors
    /// Returns [`LoggerError::InvalidConfiguration`] for unknown level names.
    pub fn level_name(mut self, level: &str) -> Result<Self, LoggerError> {
        self.options.level = parse_level(level)?;
        Ok(self)
    }

    /// Enables debug mode: `DEBUG` default level plus file/line info on console output.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn debug(mut self, enabled: bool) -> Self {
        self.options.debug = enabled;
        if enabled {
            self.options.level = LevelFilter::DEBUG;
        }
        self
    }

    /// Programmatic filter directives (e.g. `automata_kernel=debug`); `RUST_LOG` is ignored when set.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn directives(mut self, directives: impl Into<String>) -> Self {
        self.options.directives = Some(directives.into());
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.options.console = enabled;
        self
    }

    /// Writes rolling log files into `directory`.
    pub fn directory(self, directory: impl Into<PathBuf>) -> LoggerBuilder<Named, WithFiles> {
        let mut options = self.options;
        options.directory = Some(directory.into());
        LoggerBuilder { options, name: self.name, sink: PhantomData }
    }

    /// Installs the subscriber.
    ///
    /// Keep the returned [`Logger`] alive until shutdown; dropping it stops the
    /// background file writer.
    ///
    /// # Errors
    /// * [`LoggerError::InvalidConfiguration`] for an empty name, zero retained files,
    ///   bad directives, or when no output is enabled.
    /// * [`LoggerError::Directory`] / [`LoggerError::Appender`] when the log directory is unusable.
    /// * [`LoggerError::Subscriber`] if a global subscriber already exists.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let LoggerBuilder { options, name: Named(name), .. } = self;
        check_options(&options, &name)?;

        let filter = env_filter(&options)?;
        let mut layers = Vec::new();

        if options.console {
            let console = layer()
                .compact()
                .with_ansi(true)
                .with_file(options.debug)
                .with_line_number(options.debug);
            layers.push(console.boxed());
        }

        let guard = match options.directory {
            Some(directory) => {
                std::fs::create_dir_all(&directory)
                    .context(format!("creating {}", directory.display()))?;

                let appender = RollingFileAppender::builder()
                    .rotation(options.rotation)
                    .filename_prefix(&name)
                    .filename_suffix(LOG_FILE_SUFFIX)
                    .max_log_files(options.retained_files)
                    .build(&directory)
                    .context(format!("opening log files in {}", directory.display()))?;

                let (writer, guard) = tracing_appender::non_blocking(appender);
                let file = layer().with_writer(writer).with_ansi(false).with_target(true);
                layers.push(if options.json { file.json().boxed() } else { file.boxed() });
                Some(guard)
            },
            None => None,
        };

        if layers.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "no log output enabled; enable the console or set a log directory".into(),
                context: None,
            });
        }

        tracing_subscriber::registry()
            .with(filter)
            .with(layers)
            .try_init()
            .context(format!("installing subscriber '{name}'"))?;

        tracing::debug!(logger = %name, "Logging initialized");
        Ok(Logger { guard })
    }
}

impl LoggerBuilder<Named, WithFiles> {
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn rotation(mut self, rotation: Rotation) -> Self {
        self.options.rotation = rotation;
        self
    }

    /// Number of rotated files kept on disk.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn retained_files(mut self, count: usize) -> Self {
        self.options.retained_files = count;
        self
    }

    /// Emits JSON lines in the file sink.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn json(mut self) -> Self {
        self.options.json = true;
        self
    }
}

/// Handle to the installed subscriber. Holds the file writer guard, if any.
#[must_use = "Dropping this handle will stop background logging threads."]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder { options: LoggerOptions::default(), name: Unnamed, sink: PhantomData }
    }

    /// Whether a file sink is attached.
    #[must_use]
    pub const fn writes_files(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Logging shutting down, flushing file sink");
        }
    }
}

fn parse_level(level: &str) -> Result<LevelFilter, LoggerError> {
    LevelFilter::from_str(level.trim()).map_err(|e| LoggerError::InvalidConfiguration {
        message: format!("unknown log level '{level}': {e}").into(),
        context: None,
    })
}

fn check_options(options: &LoggerOptions, name: &str) -> Result<(), LoggerError> {
    if name.trim().is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "logger name cannot be empty".into(),
            context: None,
        });
    }
    if options.retained_files == 0 {
        return Err(LoggerError::InvalidConfiguration {
            message: "retained_files must be greater than zero".into(),
            context: None,
        });
    }
    Ok(())
}

fn env_filter(options: &LoggerOptions) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(options.level.into());
    match options.directives.as_deref() {
        Some(directives) => builder.parse(directives).map_err(|e| {
            LoggerError::InvalidConfiguration {
                message: format!("invalid filter directives '{directives}': {e}").into(),
                context: None,
            }
        }),
        None => Ok(builder.from_env_lossy()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_to_console_info() {
        let builder = Logger::builder().name("automata");
        assert!(builder.options.console);
        assert!(!builder.options.debug);
        assert_eq!(builder.options.level, LevelFilter::INFO);
        assert!(builder.options.directory.is_none());
    }

    #[test]
    fn debug_mode_raises_level() {
        let builder = Logger::builder().name("automata").debug(true);
        assert!(builder.options.debug);
        assert_eq!(builder.options.level, LevelFilter::DEBUG);
    }

    #[test]
    fn level_name_parses_case_insensitively() -> Result<(), LoggerError> {
        let builder = Logger::builder().name("automata").level_name("WARN")?;
        assert_eq!(builder.options.level, LevelFilter::WARN);
        Ok(())
    }

    #[test]
    fn level_name_rejects_garbage() {
        let err = Logger::builder().name("automata").level_name("loud").unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn file_options_only_after_directory() {
        let builder = Logger::builder()
            .name("automata")
            .directory("logs")
            .retained_files(3)
            .rotation(Rotation::HOURLY)
            .json();
        assert_eq!(builder.options.retained_files, 3);
        assert!(builder.options.json);
        assert_eq!(builder.options.directory.as_deref(), Some(std::path::Path::new("logs")));
    }

    #[test]
    fn empty_name_is_rejected_before_install() {
        let err = Logger::builder().name("  ").init().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn no_outputs_is_rejected_before_install() {
        let err = Logger::builder().name("automata").console(false).init().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn bad_directives_are_rejected_before_install() {
        let err = Logger::builder().name("automata").directives("automata=verbose").init().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }
}
