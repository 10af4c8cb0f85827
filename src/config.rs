//! # Listener configuration.
//!
//! [`Config`] holds the paths, thresholds and programs used by the cleanup
//! path, plus the destination of the informational console lines.
//!
//! Defaults reproduce the deployment the listener was written for:
//! - `tmp_dir = "/tmp"`, `tmp_max_age = "1h"`
//! - `log_dir = "./myfolder"`
//! - `preserve_pattern = '^/root/Jts/ibgateway\(/.*\)?'` (quotes included)
//! - `reaper_program = "tmpreaper"`, `find_program = "find"`
//! - `console = ConsoleTarget::Stdout`
//! - `bus_capacity = 1024`
//!
//! ## Environment
//! [`Config::from_env`] overrides any field from `FATALVISOR_*` variables:
//!
//! | Variable                      | Field              |
//! |-------------------------------|--------------------|
//! | `FATALVISOR_TMP_DIR`          | `tmp_dir`          |
//! | `FATALVISOR_TMP_MAX_AGE`      | `tmp_max_age`      |
//! | `FATALVISOR_LOG_DIR`          | `log_dir`          |
//! | `FATALVISOR_PRESERVE_PATTERN` | `preserve_pattern` |
//! | `FATALVISOR_REAPER_PROGRAM`   | `reaper_program`   |
//! | `FATALVISOR_FIND_PROGRAM`     | `find_program`     |
//! | `FATALVISOR_CONSOLE`          | `console`          |
//! | `FATALVISOR_BUS_CAPACITY`     | `bus_capacity`     |
//!
//! # Example
//! ```
//! use fatalvisor::{Config, ConsoleTarget};
//!
//! let mut cfg = Config::default();
//! cfg.console = ConsoleTarget::Stderr;
//! assert_eq!(cfg.tmp_max_age, "1h");
//! ```

use std::path::PathBuf;

use crate::error::ListenerError;

/// Prefix shared by every environment variable read by [`Config::from_env`].
pub const ENV_PREFIX: &str = "FATALVISOR_";

/// Where the informational lines of the cleanup path are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleTarget {
    /// Standard output, shared with the protocol channel.
    #[default]
    Stdout,
    /// Standard error, keeping the protocol channel free of extra lines.
    Stderr,
}

impl ConsoleTarget {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "stdout" => Some(ConsoleTarget::Stdout),
            "stderr" => Some(ConsoleTarget::Stderr),
            _ => None,
        }
    }
}

/// Runtime configuration for the listener.
#[derive(Clone, Debug)]
pub struct Config {
    /// Directory swept by the temp reaper.
    pub tmp_dir: PathBuf,
    /// Age threshold handed to the temp reaper, in its own syntax (`1h`, `30m`).
    pub tmp_max_age: String,
    /// Directory whose contents are removed by `find -delete`.
    pub log_dir: PathBuf,
    /// Argument passed to `find ! -regex`, verbatim.
    pub preserve_pattern: String,
    /// Temp reaper executable, resolved through `PATH`.
    pub reaper_program: String,
    /// Tree search executable, resolved through `PATH`.
    pub find_program: String,
    /// Destination of the three informational lines.
    pub console: ConsoleTarget,
    /// Capacity of the diagnostic event bus (min 1; clamped by Bus).
    pub bus_capacity: usize,
}

impl Config {
    /// Builds a configuration from `FATALVISOR_*` environment variables.
    ///
    /// Unset variables keep their default; set but unusable values are an error.
    pub fn from_env() -> Result<Self, ListenerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    ///
    /// `lookup` receives full variable names (prefix included).
    ///
    /// # Example
    /// ```
    /// use fatalvisor::Config;
    ///
    /// let cfg = Config::from_lookup(|key| match key {
    ///     "FATALVISOR_LOG_DIR" => Some("/var/log/app".to_string()),
    ///     _ => None,
    /// })
    /// .unwrap();
    /// assert_eq!(cfg.log_dir.to_str(), Some("/var/log/app"));
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ListenerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &'static str| -> Result<Option<String>, ListenerError> {
            match lookup(&format!("{ENV_PREFIX}{key}")) {
                None => Ok(None),
                Some(v) if v.trim().is_empty() => Err(ListenerError::Config {
                    key,
                    reason: "empty value".to_string(),
                }),
                Some(v) => Ok(Some(v)),
            }
        };

        let mut cfg = Config::default();
        if let Some(v) = get("TMP_DIR")? {
            cfg.tmp_dir = PathBuf::from(v);
        }
        if let Some(v) = get("TMP_MAX_AGE")? {
            cfg.tmp_max_age = v;
        }
        if let Some(v) = get("LOG_DIR")? {
            cfg.log_dir = PathBuf::from(v);
        }
        if let Some(v) = get("PRESERVE_PATTERN")? {
            cfg.preserve_pattern = v;
        }
        if let Some(v) = get("REAPER_PROGRAM")? {
            cfg.reaper_program = v;
        }
        if let Some(v) = get("FIND_PROGRAM")? {
            cfg.find_program = v;
        }
        if let Some(v) = get("CONSOLE")? {
            cfg.console = ConsoleTarget::parse(&v).ok_or_else(|| ListenerError::Config {
                key: "CONSOLE",
                reason: format!("expected `stdout` or `stderr`, got {v:?}"),
            })?;
        }
        if let Some(v) = get("BUS_CAPACITY")? {
            cfg.bus_capacity = v.trim().parse().map_err(|e| ListenerError::Config {
                key: "BUS_CAPACITY",
                reason: format!("{v:?}: {e}"),
            })?;
        }
        Ok(cfg)
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tmp_dir: PathBuf::from("/tmp"),
            tmp_max_age: "1h".to_string(),
            log_dir: PathBuf::from("./myfolder"),
            preserve_pattern: r"'^/root/Jts/ibgateway\(/.*\)?'".to_string(),
            reaper_program: "tmpreaper".to_string(),
            find_program: "find".to_string(),
            console: ConsoleTarget::Stdout,
            bus_capacity: 1024,
        }
    }
}
