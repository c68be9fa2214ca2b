use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Application settings consumed by the composition root and the desktop shell.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    #[serde(deserialize_with = "flag")]
    pub debug: bool,
    #[serde(deserialize_with = "flag")]
    pub disable_cache: bool,
    pub window: WindowSettings,
    pub server: ServerSettings,
    pub app: AppMetadata,
    pub log: LogSettings,
    pub frontend_dir: PathBuf,
}

/// Initial web-view geometry in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub size: (u32, u32),
    pub position: (i32, i32),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub mode: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppMetadata {
    pub name: String,
    pub version: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Overrides the level implied by `debug` (e.g. `"warn"`).
    pub level: Option<String>,
    /// Enables rolling log files in this directory.
    pub directory: Option<PathBuf>,
    #[serde(deserialize_with = "flag")]
    pub json: bool,
}

impl AppSettings {
    #[must_use]
    pub const fn is_development(&self) -> bool {
        self.debug
    }

    #[must_use]
    pub fn frontend_path(&self) -> &Path {
        &self.frontend_dir
    }

    /// `http://host:port`, the address the web-view points at.
    #[must_use]
    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server.host, self.server.port)
    }
}

// --- Default ---

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            debug: true,
            disable_cache: true,
            window: WindowSettings::default(),
            server: ServerSettings::default(),
            app: AppMetadata::default(),
            log: LogSettings::default(),
            frontend_dir: PathBuf::from("frontend"),
        }
    }
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self { size: (1200, 800), position: (100, 100) }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { host: "localhost".to_owned(), port: 8000, mode: "chrome-app".to_owned() }
    }
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "Automata".to_owned(),
            version: "1.0.0".to_owned(),
            description: "A modern desktop application".to_owned(),
        }
    }
}

// --- Lenient boolean flags ---

/// Accepts real booleans, integers, and the strings `true`/`1`/`yes`/`on`
/// (case-insensitive). Any other string is `false`.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    struct FlagVisitor;

    impl Visitor<'_> for FlagVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a boolean flag")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
            Ok(v != 0)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
            Ok(v != 0)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
            Ok(matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on"))
        }
    }

    deserializer.deserialize_any(FlagVisitor)
}
