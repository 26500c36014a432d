//! Global configuration types.
//!
//! The config file is plain YAML. Field presence is checked against the
//! [`REQUIRED_FIELDS`] / [`OPTIONAL_FIELDS`] tables before the document is
//! deserialized into the typed [`Config`].

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Fields that must be present and non-null.
pub const REQUIRED_FIELDS: &[&str] = &[
    "instance_id",
    "state_manager",
    "task_manager",
    "log_file",
    "lock_file",
    "output_dir",
    "tmp_dir",
    "sleep_time",
    "single_run",
    "mount_dir_prefix",
    "shared_filesystem",
    "debug_tasks",
    "dependencies",
    "docker_enabled",
    "disabled_jobs",
];

/// Fields that may be absent; absent fields read as `None`.
///
/// Some become mandatory for particular backends (cloud settings when the
/// task manager is PSQ, for instance) but that is not enforced here.
pub const OPTIONAL_FIELDS: &[&str] = &[
    // Cloud
    "cloud_project",
    "cloud_zone",
    "cloud_region",
    "bucket_name",
    "psq_topic",
    "pubsub_topic",
    "gcs_output_path",
    "recipe_file_dir",
    "stackdriver_logging",
    "stackdriver_traceback",
    // Redis
    "redis_host",
    "redis_port",
    "redis_db",
    // Celery / Kombu
    "celery_broker",
    "celery_backend",
    "kombu_broker",
    "kombu_channel",
    "kombu_durable",
    // Email
    "email_notifications",
    "email_host_address",
    "email_port",
    "email_address",
    "email_password",
];

/// Process-wide configuration for a sift deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path the config was loaded from.
    #[serde(skip)]
    source: PathBuf,

    pub instance_id: String,
    pub state_manager: String,
    pub task_manager: String,
    pub log_file: PathBuf,
    pub lock_file: PathBuf,
    pub output_dir: PathBuf,
    pub tmp_dir: PathBuf,
    /// Seconds between polling rounds.
    pub sleep_time: u64,
    pub single_run: bool,
    pub mount_dir_prefix: PathBuf,
    pub shared_filesystem: bool,
    pub debug_tasks: bool,
    /// Raw dependency table; see [`Config::parse_dependencies`].
    pub dependencies: Vec<Value>,
    pub docker_enabled: bool,
    pub disabled_jobs: Vec<String>,

    #[serde(default)]
    pub cloud_project: Option<String>,
    #[serde(default)]
    pub cloud_zone: Option<String>,
    #[serde(default)]
    pub cloud_region: Option<String>,
    #[serde(default)]
    pub bucket_name: Option<String>,
    #[serde(default)]
    pub psq_topic: Option<String>,
    #[serde(default)]
    pub pubsub_topic: Option<String>,
    #[serde(default)]
    pub gcs_output_path: Option<String>,
    #[serde(default)]
    pub recipe_file_dir: Option<PathBuf>,
    #[serde(default)]
    pub stackdriver_logging: Option<bool>,
    #[serde(default)]
    pub stackdriver_traceback: Option<bool>,

    #[serde(default)]
    pub redis_host: Option<String>,
    #[serde(default)]
    pub redis_port: Option<u16>,
    #[serde(default)]
    pub redis_db: Option<i64>,

    #[serde(default)]
    pub celery_broker: Option<String>,
    #[serde(default)]
    pub celery_backend: Option<String>,
    #[serde(default)]
    pub kombu_broker: Option<String>,
    #[serde(default)]
    pub kombu_channel: Option<String>,
    #[serde(default)]
    pub kombu_durable: Option<bool>,

    #[serde(default)]
    pub email_notifications: Option<bool>,
    #[serde(default)]
    pub email_host_address: Option<String>,
    #[serde(default)]
    pub email_port: Option<u16>,
    #[serde(default)]
    pub email_address: Option<String>,
    /// Never serialized, so `config` output does not leak it.
    #[serde(default, skip_serializing)]
    pub email_password: Option<String>,
}

/// A single config value as returned by [`Config::get`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Str(String),
    List(Vec<Value>),
    Bool(bool),
    Int(i64),
    None,
}

impl ConfigValue {
    fn from_json(value: Value) -> Self {
        match value {
            Value::String(s) => ConfigValue::Str(s),
            Value::Array(items) => ConfigValue::List(items),
            Value::Bool(b) => ConfigValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ConfigValue::Int(i),
                None => ConfigValue::Str(n.to_string()),
            },
            Value::Null => ConfigValue::None,
            Value::Object(_) => ConfigValue::Str(value.to_string()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(i) => Some(*i),
            _ => None,
        }
    }
}

/// Programs and container image a job needs on the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDependency {
    pub job: String,
    pub programs: Vec<String>,
    #[serde(default)]
    pub docker_image: Option<String>,
}

impl Config {
    /// Parse a config document.
    ///
    /// `path` is only used for error messages and [`Config::source`].
    pub fn from_yaml_str(content: &str, path: &Path) -> ConfigResult<Self> {
        let value: Value =
            serde_yaml::from_str(content).map_err(|source| ConfigError::Syntax {
                path: path.to_path_buf(),
                source,
            })?;
        let Value::Object(map) = value else {
            return Err(ConfigError::NotAMapping {
                path: path.to_path_buf(),
            });
        };

        check_fields(&map, path)?;

        let mut config: Config =
            serde_json::from_value(Value::Object(map)).map_err(|source| ConfigError::Invalid {
                path: path.to_path_buf(),
                source,
            })?;
        config.source = path.to_path_buf();
        Ok(config)
    }

    /// Path the config was loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Look up a field by name.
    ///
    /// Names are matched case-insensitively, so `INSTANCE_ID` and
    /// `instance_id` are the same field. Returns `None` for names that are
    /// not config fields; optional fields that are unset return
    /// `Some(ConfigValue::None)`.
    pub fn get(&self, name: &str) -> Option<ConfigValue> {
        let key = name.to_ascii_lowercase();
        if !REQUIRED_FIELDS.contains(&key.as_str()) && !OPTIONAL_FIELDS.contains(&key.as_str()) {
            return None;
        }
        if key == "email_password" {
            return Some(
                self.email_password
                    .clone()
                    .map_or(ConfigValue::None, ConfigValue::Str),
            );
        }
        let Ok(Value::Object(mut map)) = serde_json::to_value(self) else {
            return None;
        };
        Some(ConfigValue::from_json(map.remove(&key).unwrap_or(Value::Null)))
    }

    /// Parse the `dependencies` table, keyed by lower-cased job name.
    pub fn parse_dependencies(&self) -> ConfigResult<HashMap<String, JobDependency>> {
        let mut dependencies = HashMap::new();
        for value in &self.dependencies {
            let dependency: JobDependency = serde_json::from_value(value.clone())
                .map_err(|e| ConfigError::Dependencies(e.to_string()))?;
            dependencies.insert(dependency.job.to_lowercase(), dependency);
        }
        Ok(dependencies)
    }
}

/// Check presence and nullability of every declared field.
fn check_fields(map: &Map<String, Value>, path: &Path) -> ConfigResult<()> {
    for field in REQUIRED_FIELDS {
        match map.get(*field) {
            None => {
                return Err(ConfigError::MissingRequired {
                    path: path.to_path_buf(),
                    field: field.to_string(),
                });
            }
            Some(Value::Null) => {
                return Err(ConfigError::Unset {
                    path: path.to_path_buf(),
                    field: field.to_string(),
                });
            }
            Some(_) => {}
        }
    }

    for field in OPTIONAL_FIELDS {
        if !map.contains_key(*field) {
            debug!(field = %field, "Optional config field not set, using None");
        }
    }

    for key in map.keys() {
        if !REQUIRED_FIELDS.contains(&key.as_str()) && !OPTIONAL_FIELDS.contains(&key.as_str()) {
            warn!(key = %key, path = %path.display(), "Ignoring unknown config field");
        }
    }

    Ok(())
}
