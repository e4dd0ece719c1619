//! Configuration: YAML file, then environment, then command line.
//!
//! Broker credentials and every scheduling/retention knob must be given
//! explicitly; only file naming and tuning values have defaults.

use crate::core::rotation::RetentionPolicy;
use crate::errors::{AppError, AppResult};
use crate::utils::expand_tilde;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub mod template;

const DEFAULT_FILE_STEM: &str = "mqtt_log";
const DEFAULT_KEEP_ALIVE: u64 = 60;
const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Raw configuration as read from file and environment. Every field is
/// optional here; `settings()` decides what is missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_alive_secs: Option<u64>,

    pub timezone: Option<String>,
    pub alignment_minute: Option<u32>,
    pub safety_margin_secs: Option<u64>,
    pub retention_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_policy: Option<RetentionPolicy>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_stem: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_capacity: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct BrokerSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub topic: String,
    pub client_id: String,
    pub keep_alive_secs: u64,
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub broker: BrokerSettings,
    pub timezone: Tz,
    pub alignment_minute: u32,
    pub safety_margin_secs: u64,
    pub retention_days: u32,
    pub retention_policy: RetentionPolicy,
    pub log_dir: PathBuf,
    pub file_stem: String,
    pub channel_capacity: usize,
}

impl Config {
    /// Platform configuration directory for statelog.
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("statelog")
    }

    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.yml")
    }

    /// Load from `path`, or from the default location. A missing default file
    /// is not an error (the environment may carry everything); a missing
    /// explicit file is.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::config_file(), false),
        };

        if !path.exists() {
            if explicit {
                return Err(AppError::Config(format!(
                    "configuration file not found: {}",
                    path.display()
                )));
            }
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> AppResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Overlay environment variables. `lookup` is `std::env::var` in
    /// production; blank values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("MQTT_HOST") {
            self.host = Some(v);
        }
        if let Some(v) = get("MQTT_PORT") {
            let port = v
                .trim()
                .parse()
                .map_err(|_| AppError::Config(format!("MQTT_PORT is not a port number: '{v}'")))?;
            self.port = Some(port);
        }
        if let Some(v) = get("MQTT_USER") {
            self.username = Some(v);
        }
        if let Some(v) = get("MQTT_PASS") {
            self.password = Some(v);
        }
        if let Some(v) = get("MQTT_TOPIC") {
            self.topic = Some(v);
        }
        if let Some(v) = get("STATELOG_TZ") {
            self.timezone = Some(v);
        }
        Ok(())
    }

    pub fn apply_env_vars(&mut self) -> AppResult<()> {
        self.apply_env(|k| std::env::var(k).ok())
    }

    /// Copy suitable for printing.
    pub fn masked(&self) -> Self {
        let mut out = self.clone();
        if out.password.is_some() {
            out.password = Some("********".to_string());
        }
        out
    }

    pub fn to_yaml(&self) -> AppResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Validate and resolve. All missing required keys are reported at once.
    pub fn settings(&self) -> AppResult<Settings> {
        let mut missing = Vec::new();

        fn need<T: Clone>(v: &Option<T>, key: &str, missing: &mut Vec<String>) -> Option<T> {
            if v.is_none() {
                missing.push(key.to_string());
            }
            v.clone()
        }

        let host = need(&self.host, "host", &mut missing);
        let port = need(&self.port, "port", &mut missing);
        let username = need(&self.username, "username", &mut missing);
        let password = need(&self.password, "password", &mut missing);
        let topic = need(&self.topic, "topic", &mut missing);
        let timezone = need(&self.timezone, "timezone", &mut missing);
        let alignment_minute = need(&self.alignment_minute, "alignment_minute", &mut missing);
        let safety_margin_secs = need(&self.safety_margin_secs, "safety_margin_secs", &mut missing);
        let retention_days = need(&self.retention_days, "retention_days", &mut missing);

        let (
            Some(host),
            Some(port),
            Some(username),
            Some(password),
            Some(topic),
            Some(timezone),
            Some(alignment_minute),
            Some(safety_margin_secs),
            Some(retention_days),
        ) = (
            host,
            port,
            username,
            password,
            topic,
            timezone,
            alignment_minute,
            safety_margin_secs,
            retention_days,
        )
        else {
            return Err(AppError::MissingConfig(missing));
        };

        if host.trim().is_empty() {
            return Err(AppError::Config("host must not be empty".into()));
        }
        if topic.trim().is_empty() {
            return Err(AppError::Config("topic must not be empty".into()));
        }
        if alignment_minute > 59 {
            return Err(AppError::Config(format!(
                "alignment_minute must be 0-59, got {alignment_minute}"
            )));
        }
        if retention_days == 0 {
            return Err(AppError::Config("retention_days must be at least 1".into()));
        }

        let tz: Tz = timezone
            .parse()
            .map_err(|_| AppError::InvalidTimeZone(timezone.clone()))?;

        let channel_capacity = self.channel_capacity.unwrap_or(DEFAULT_CHANNEL_CAPACITY);
        if channel_capacity == 0 {
            return Err(AppError::Config("channel_capacity must be at least 1".into()));
        }

        Ok(Settings {
            broker: BrokerSettings {
                host,
                port,
                username,
                password,
                topic,
                client_id: self
                    .client_id
                    .clone()
                    .unwrap_or_else(|| format!("statelog-{}", std::process::id())),
                keep_alive_secs: self.keep_alive_secs.unwrap_or(DEFAULT_KEEP_ALIVE),
            },
            timezone: tz,
            alignment_minute,
            safety_margin_secs,
            retention_days,
            retention_policy: self.retention_policy.unwrap_or_default(),
            log_dir: expand_tilde(self.log_dir.as_deref().unwrap_or(".")),
            file_stem: self
                .file_stem
                .clone()
                .unwrap_or_else(|| DEFAULT_FILE_STEM.to_string()),
            channel_capacity,
        })
    }
}
