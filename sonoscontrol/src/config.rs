//! # Controller configuration
//!
//! Every endpoint, timeout and vendor marker used by the controller lives in
//! [`ControllerConfig`]. The defaults describe a stock Sonos installation, so
//! most programs only need `ControllerConfig::default()`.
//!
//! A YAML file may override any subset of fields:
//!
//! ```yaml
//! http_timeout_secs: 2
//! discovery_window_secs: 5
//! log_level: debug
//! ```
//!
//! Environment variables named `SONOSCONTROL_CONFIG__<FIELD>` (field name in
//! upper case) are applied on top of the file, e.g.
//! `SONOSCONTROL_CONFIG__HTTP_TIMEOUT_SECS=2`.

use std::ffi::OsString;
use std::fmt::Display;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use sonosupnp::ssdp::{DEFAULT_MX, ZONE_PLAYER_ST};
use tracing::{debug, info, warn};

pub const ENV_PREFIX: &str = "SONOSCONTROL_CONFIG__";

const DEFAULT_DEVICE_PORT: u16 = 1400;
const DEFAULT_DESCRIPTION_PATH: &str = "/xml/device_description.xml";
const DEFAULT_AVTRANSPORT_PATH: &str = "/MediaRenderer/AVTransport/Control";
const DEFAULT_RENDERING_CONTROL_PATH: &str = "/MediaRenderer/RenderingControl/Control";
const DEFAULT_DISCOVERY_WINDOW_SECS: u64 = 3;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 5;
const DEFAULT_VENDOR_MARKER: &str = "Sonos";
const DEFAULT_VENDOR_LABEL: &str = "Sonos";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// HTTP port of the speakers' UPnP server.
    pub device_port: u16,
    pub description_path: String,
    pub avtransport_path: String,
    pub rendering_control_path: String,
    /// SSDP search target.
    pub search_target: String,
    pub mx: u32,
    pub discovery_window_secs: u64,
    pub http_timeout_secs: u64,
    /// Substring a search reply must contain to be kept.
    pub vendor_marker: String,
    /// Used to build fallback names: `"<label> Speaker (<address>)"`.
    pub vendor_label: String,
    pub log_level: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            device_port: DEFAULT_DEVICE_PORT,
            description_path: DEFAULT_DESCRIPTION_PATH.to_string(),
            avtransport_path: DEFAULT_AVTRANSPORT_PATH.to_string(),
            rendering_control_path: DEFAULT_RENDERING_CONTROL_PATH.to_string(),
            search_target: ZONE_PLAYER_ST.to_string(),
            mx: DEFAULT_MX,
            discovery_window_secs: DEFAULT_DISCOVERY_WINDOW_SECS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            vendor_marker: DEFAULT_VENDOR_MARKER.to_string(),
            vendor_label: DEFAULT_VENDOR_LABEL.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ControllerConfig {
    /// Loads `path` (defaults when the file does not exist) and applies the
    /// process environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_overrides(path, utf8_vars(std::env::vars_os()))
    }

    /// Same as [`ControllerConfig::load`] with an explicit set of variables.
    pub fn load_with_overrides<I, K, V>(path: impl AsRef<Path>, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let path = path.as_ref();

        let mut config = if path.exists() {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            if text.trim().is_empty() {
                Self::default()
            } else {
                serde_yaml::from_str(&text)
                    .with_context(|| format!("Invalid config file {}", path.display()))?
            }
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };

        for (key, value) in vars {
            if let Some(field) = key.as_ref().strip_prefix(ENV_PREFIX) {
                config.apply_override(&field.to_ascii_lowercase(), value.as_ref())?;
            }
        }

        info!("Controller configuration loaded from {}", path.display());
        Ok(config)
    }

    fn apply_override(&mut self, field: &str, value: &str) -> Result<()> {
        match field {
            "device_port" => self.device_port = parse_override(field, value)?,
            "description_path" => self.description_path = value.to_string(),
            "avtransport_path" => self.avtransport_path = value.to_string(),
            "rendering_control_path" => self.rendering_control_path = value.to_string(),
            "search_target" => self.search_target = value.to_string(),
            "mx" => self.mx = parse_override(field, value)?,
            "discovery_window_secs" => self.discovery_window_secs = parse_override(field, value)?,
            "http_timeout_secs" => self.http_timeout_secs = parse_override(field, value)?,
            "vendor_marker" => self.vendor_marker = value.to_string(),
            "vendor_label" => self.vendor_label = value.to_string(),
            "log_level" => self.log_level = value.to_string(),
            _ => {
                warn!(
                    "Ignoring unknown override {}{}",
                    ENV_PREFIX,
                    field.to_ascii_uppercase()
                );
                return Ok(());
            }
        }
        debug!("Config override applied: {} = {}", field, value);
        Ok(())
    }

    pub fn discovery_window(&self) -> Duration {
        Duration::from_secs(self.discovery_window_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn description_url(&self, address: &str) -> String {
        self.device_url(address, &self.description_path)
    }

    pub fn avtransport_url(&self, address: &str) -> String {
        self.device_url(address, &self.avtransport_path)
    }

    pub fn rendering_control_url(&self, address: &str) -> String {
        self.device_url(address, &self.rendering_control_path)
    }

    /// `"<label> Speaker (<address>)"`, used when a speaker cannot be named.
    pub fn fallback_name(&self, address: &str) -> String {
        format!("{} Speaker ({})", self.vendor_label, address)
    }

    fn device_url(&self, address: &str, path: &str) -> String {
        format!("http://{}:{}{}", address, self.device_port, path)
    }
}

fn parse_override<T>(field: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| {
            anyhow!(
                "Invalid value '{}' for {}{}: {}",
                value,
                ENV_PREFIX,
                field.to_ascii_uppercase(),
                e
            )
        })
}

/// Keeps the variables whose name and value are both valid UTF-8.
///
/// Unrelated variables may hold arbitrary bytes; a non-UTF-8 value under
/// [`ENV_PREFIX`] is reported and skipped.
fn utf8_vars(vars: impl IntoIterator<Item = (OsString, OsString)>) -> Vec<(String, String)> {
    vars.into_iter()
        .filter_map(|(key, value)| {
            let key = key.into_string().ok()?;
            match value.into_string() {
                Ok(value) => Some((key, value)),
                Err(raw) => {
                    if key.starts_with(ENV_PREFIX) {
                        warn!("Ignoring {}: value {:?} is not valid UTF-8", key, raw);
                    }
                    None
                }
            }
        })
        .collect()
}
