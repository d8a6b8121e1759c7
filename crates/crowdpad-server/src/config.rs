//! Configuration for the crowdpad server.
//!
//! Loaded from TOML. Every key is optional; the defaults double as the
//! schema, so unknown keys can be reported:
//!
//! ```toml
//! [app]
//! socket_address = "127.0.0.1"
//! socket_port = 5001
//! tick_rate = 120
//! run_forever = true
//! max_connect_attempts = 10
//! retry_delay_ms = 1000
//! connect_timeout_ms = 3000
//! max_queue_len = 4096
//!
//! [http]
//! bind_address = "0.0.0.0"
//! port = 5000
//!
//! [logging]
//! level = "info"
//! ```
//!
//! When a loaded file is missing keys, the defaults for those keys are
//! written back into it so the file always shows every setting. Keys the
//! schema does not know are kept as they are.
//!
//! A few values can also be overridden via environment variables:
//!
//! - `CROWDPAD_SOCKET_ADDRESS`
//! - `CROWDPAD_SOCKET_PORT`
//! - `CROWDPAD_TICK_RATE`
//! - `CROWDPAD_HTTP_PORT`

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crowdpad_core::DEFAULT_QUEUE_LIMIT;

use crate::sender::{RetryPolicy, SenderConfig};

/// File name looked up in each candidate directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid value for {key}: {value:?}")]
    BadOverride { key: String, value: String },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Emulator link and sender behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub socket_address: String,
    pub socket_port: u16,
    /// Sends per second.
    pub tick_rate: u32,
    /// `false` stops the sender after `max_connect_attempts` failed connects.
    pub run_forever: bool,
    pub max_connect_attempts: u32,
    pub retry_delay_ms: u64,
    pub connect_timeout_ms: u64,
    /// 0 = unbounded.
    pub max_queue_len: usize,
}

impl Default for AppSection {
    fn default() -> Self {
        AppSection {
            socket_address: "127.0.0.1".to_string(),
            socket_port: 5001,
            tick_rate: 120,
            run_forever: true,
            max_connect_attempts: 10,
            retry_delay_ms: 1000,
            connect_timeout_ms: 3000,
            max_queue_len: DEFAULT_QUEUE_LIMIT,
        }
    }
}

/// Where the web front-end talks to us.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    pub bind_address: String,
    pub port: u16,
}

impl Default for HttpSection {
    fn default() -> Self {
        HttpSection {
            bind_address: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        LoggingSection {
            level: "info".to_string(),
        }
    }
}

/// Full server configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub app: AppSection,
    pub http: HttpSection,
    pub logging: LoggingSection,
}

impl Config {
    /// Parse TOML text, filling gaps with defaults.
    ///
    /// Returns the config plus the dotted paths of any keys the schema does
    /// not know about (e.g. `"app.colour"`). Unknown keys are not an error.
    pub fn from_toml_str(text: &str) -> Result<(Config, Vec<String>), ConfigError> {
        let raw: toml::Table = toml::from_str(text)?;
        let schema = schema_table()?;

        let mut unknown = Vec::new();
        collect_unknown_keys(&schema, &raw, "", &mut unknown);

        let config: Config = toml::Value::Table(raw).try_into()?;
        Ok((config, unknown))
    }

    /// Locate, load, override from the environment, and validate.
    ///
    /// With `explicit` set only that file is read. Otherwise the first
    /// existing candidate from [`candidate_paths`] wins; if none exists the
    /// defaults are written to the first candidate and used.
    pub fn load(explicit: Option<&Path>, instance_dir: &Path) -> Result<(Config, PathBuf), ConfigError> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => find_or_create(instance_dir)?,
        };

        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let (mut config, unknown) = Config::from_toml_str(&text)?;
        for key in unknown {
            warn!(%key, path = %path.display(), "config key not in schema, ignoring");
        }
        fill_missing_keys(&path, &text)?;

        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;

        info!(path = %path.display(), "configuration loaded");
        Ok((config, path))
    }

    /// Apply `CROWDPAD_*` overrides using `lookup` to read variables.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("CROWDPAD_SOCKET_ADDRESS") {
            self.app.socket_address = addr;
        }
        read_override(&lookup, "CROWDPAD_SOCKET_PORT", &mut self.app.socket_port)?;
        read_override(&lookup, "CROWDPAD_TICK_RATE", &mut self.app.tick_rate)?;
        read_override(&lookup, "CROWDPAD_HTTP_PORT", &mut self.http.port)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let app = &self.app;
        if app.socket_address.trim().is_empty() {
            return Err(ConfigError::Invalid("app.socket_address is empty".into()));
        }
        if app.socket_port == 0 {
            return Err(ConfigError::Invalid("app.socket_port must be non-zero".into()));
        }
        if app.tick_rate == 0 {
            return Err(ConfigError::Invalid("app.tick_rate must be greater than zero".into()));
        }
        if app.retry_delay_ms == 0 {
            return Err(ConfigError::Invalid("app.retry_delay_ms must be greater than zero".into()));
        }
        if !app.run_forever && app.max_connect_attempts == 0 {
            return Err(ConfigError::Invalid(
                "app.max_connect_attempts must be greater than zero when run_forever = false".into(),
            ));
        }
        Ok(())
    }

    /// Emulator `host:port`.
    pub fn socket_addr_string(&self) -> String {
        format!("{}:{}", self.app.socket_address, self.app.socket_port)
    }

    /// HTTP listener `host:port`.
    pub fn http_addr_string(&self) -> String {
        format!("{}:{}", self.http.bind_address, self.http.port)
    }

    /// Retry policy derived from `run_forever` / `max_connect_attempts`.
    pub fn retry_policy(&self) -> RetryPolicy {
        let delay = Duration::from_millis(self.app.retry_delay_ms);
        if self.app.run_forever {
            RetryPolicy::forever(delay)
        } else {
            RetryPolicy::bounded(self.app.max_connect_attempts, delay)
        }
    }

    pub fn sender_config(&self) -> SenderConfig {
        SenderConfig {
            addr: self.socket_addr_string(),
            tick_rate: self.app.tick_rate,
            retry: self.retry_policy(),
            connect_timeout: Duration::from_millis(self.app.connect_timeout_ms),
        }
    }

    /// Serialize as TOML (used to seed a missing config file).
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Candidate config files, in priority order.
pub fn candidate_paths(instance_dir: &Path) -> Vec<PathBuf> {
    let mut paths = vec![instance_dir.join(CONFIG_FILE_NAME)];
    if let Some(home) = env::var_os("HOME") {
        paths.push(
            PathBuf::from(home)
                .join(".config")
                .join("crowdpad")
                .join(CONFIG_FILE_NAME),
        );
    }
    paths.push(PathBuf::from("/etc/crowdpad").join(CONFIG_FILE_NAME));
    paths
}

fn find_or_create(instance_dir: &Path) -> Result<PathBuf, ConfigError> {
    let candidates = candidate_paths(instance_dir);

    let mut found = None;
    for path in &candidates {
        if path.is_file() {
            info!(path = %path.display(), "found config file");
            if found.is_none() {
                found = Some(path.clone());
            }
        } else {
            info!(path = %path.display(), "no config file");
        }
    }
    if let Some(path) = found {
        return Ok(path);
    }

    let path = candidates[0].clone();
    warn!(path = %path.display(), "no configuration file found, writing defaults");
    write_default(&path)?;
    Ok(path)
}

/// Write the default config to `path`, creating parent directories.
pub fn write_default(path: &Path) -> Result<(), ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, Config::default().to_toml_string()?).map_err(io_err)
}

fn schema_table() -> Result<toml::Table, ConfigError> {
    match toml::Value::try_from(Config::default())? {
        toml::Value::Table(table) => Ok(table),
        _ => Ok(toml::Table::new()),
    }
}

/// Rewrite the file at `path` with any default keys it lacks.
///
/// A failed write is logged and otherwise ignored; the in-memory config
/// already carries the defaults.
fn fill_missing_keys(path: &Path, text: &str) -> Result<(), ConfigError> {
    let mut raw: toml::Table = toml::from_str(text)?;
    if !merge_defaults(&schema_table()?, &mut raw) {
        return Ok(());
    }

    let filled = toml::to_string_pretty(&raw)?;
    match fs::write(path, filled) {
        Ok(()) => info!(path = %path.display(), "added missing default keys to config file"),
        Err(err) => warn!(path = %path.display(), error = %err, "could not update config file"),
    }
    Ok(())
}

/// Copy every key of `schema` missing from `raw` into it. Returns whether
/// anything was added.
fn merge_defaults(schema: &toml::Table, raw: &mut toml::Table) -> bool {
    let mut added = false;
    for (key, default) in schema {
        match (raw.get_mut(key), default) {
            (None, _) => {
                raw.insert(key.clone(), default.clone());
                added = true;
            }
            (Some(toml::Value::Table(inner_raw)), toml::Value::Table(inner_schema)) => {
                added |= merge_defaults(inner_schema, inner_raw);
            }
            _ => {}
        }
    }
    added
}

fn collect_unknown_keys(schema: &toml::Table, raw: &toml::Table, prefix: &str, out: &mut Vec<String>) {
    for (key, value) in raw {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match (schema.get(key), value) {
            (None, _) => out.push(path),
            (Some(toml::Value::Table(inner_schema)), toml::Value::Table(inner_raw)) => {
                collect_unknown_keys(inner_schema, inner_raw, &path, out);
            }
            _ => {}
        }
    }
}

fn read_override<T, F>(lookup: &F, key: &str, slot: &mut T) -> Result<(), ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(val) => {
            *slot = val.parse::<T>().map_err(|_| ConfigError::BadOverride {
                key: key.to_string(),
                value: val,
            })?;
            Ok(())
        }
        None => Ok(()),
    }
}
