//! Runtime configuration from environment variables.
//!
//! | Variable                      | Default           |
//! |-------------------------------|-------------------|
//! | `HEARTCHECK_MODEL_PATH`       | `models`          |
//! | `HEARTCHECK_LOG_MODE`         | `auto`            |
//! | `HEARTCHECK_LOG_FILE`         | `heartcheck.log`  |
//! | `HEARTCHECK_REQUIRE_MANIFEST` | `false`           |
//!
//! `HEARTCHECK_SANITIZE_MAX_BYTES` (default 16384) caps the bytes of each log
//! line passed through the sanitizer; it is read once by
//! [`crate::adapters::sanitize`].

use std::path::PathBuf;

use crate::HeartcheckError;

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    /// File when stdout is a terminal (the TUI owns it), stdout otherwise
    Auto,
    File,
    Stdout,
}

impl std::str::FromStr for LogMode {
    type Err = HeartcheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "auto" => Ok(Self::Auto),
            "file" => Ok(Self::File),
            "stdout" => Ok(Self::Stdout),
            other => Err(HeartcheckError::Config(format!(
                "unknown log mode '{other}' (expected auto, file or stdout)"
            ))),
        }
    }
}

impl LogMode {
    /// Resolve `Auto` against whether stdout is interactive.
    #[must_use]
    pub fn use_file(self, interactive: bool) -> bool {
        match self {
            Self::Auto => interactive,
            Self::File => true,
            Self::Stdout => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub model_dir: PathBuf,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
    pub require_manifest: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            log_mode: LogMode::Auto,
            log_file: PathBuf::from("heartcheck.log"),
            require_manifest: false,
        }
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "yes" | "YES")
}

impl AppConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    /// Returns `HeartcheckError::Config` for an unknown log mode.
    pub fn from_env() -> Result<Self, HeartcheckError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns `HeartcheckError::Config` for an unknown log mode.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, HeartcheckError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let log_mode = match lookup("HEARTCHECK_LOG_MODE") {
            Some(v) => v.parse()?,
            None => defaults.log_mode,
        };

        Ok(Self {
            model_dir: lookup("HEARTCHECK_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_dir),
            log_mode,
            log_file: lookup("HEARTCHECK_LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_file),
            require_manifest: lookup("HEARTCHECK_REQUIRE_MANIFEST")
                .map(|v| parse_bool(&v))
                .unwrap_or(defaults.require_manifest),
        })
    }
}
