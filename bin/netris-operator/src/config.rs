//! Operator configuration: YAML file plus environment overrides

use ::config::{Environment, File, FileFormat, Map};
use netris_client::ClientConfig;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

const MAX_ASN: u32 = 4_294_967_294;
const DEFAULT_ASN_RANGE: (u32, u32) = (4_200_070_000, 4_200_079_999);

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Only .yml or .yaml config files are supported: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Netris controller host is not set")]
    MissingHost,

    #[error("Invalid ASN range: {0}")]
    InvalidAsnRange(String),
}

/// Netris controller connection settings
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub host: String,
    pub login: String,
    pub password: String,
    pub insecure: bool,
}

/// Settings read from the YAML file, then `CONTROLLER_*` and `NOPERATOR_*`
/// environment variables
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OperatorConfig {
    pub controller: ControllerConfig,

    /// Human-readable debug logging
    #[serde(alias = "dev_mode")]
    pub log_dev_mode: bool,

    /// Seconds between periodic reconciles
    #[serde(alias = "requeue_interval")]
    pub requeue_interval: u64,

    /// ASN pool for Kubernetes nodes, "first-last". Empty means the default pool.
    #[serde(alias = "calico_asn_range")]
    pub calico_asn_range: String,

    /// Tenant used for L4LBs that do not name one
    #[serde(rename = "l4lbTenant", alias = "l4lb_tenant")]
    pub l4lb_tenant: String,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            controller: ControllerConfig::default(),
            log_dev_mode: false,
            requeue_interval: 15,
            calico_asn_range: format!("{}-{}", DEFAULT_ASN_RANGE.0, DEFAULT_ASN_RANGE.1),
            l4lb_tenant: String::new(),
        }
    }
}

impl OperatorConfig {
    /// Load the YAML file at `path` and layer the process environment on top.
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with_env(path, None)
    }

    /// Same as [`OperatorConfig::load`], reading variables from `env` instead
    /// of the process environment when given
    pub fn load_with_env(
        path: &Path,
        env: Option<Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yml") | Some("yaml") => {}
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }

        let settings = ::config::Config::builder()
            .add_source(File::from(path).format(FileFormat::Yaml).required(false))
            .add_source(
                Environment::with_prefix("CONTROLLER")
                    .keep_prefix(true)
                    .separator("_")
                    .try_parsing(true)
                    .source(env.clone()),
            )
            .add_source(
                Environment::with_prefix("NOPERATOR")
                    .prefix_separator("_")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.controller.host.is_empty() {
            return Err(ConfigError::MissingHost);
        }
        if self.requeue_interval == 0 {
            return Err(ConfigError::InvalidValue {
                key: "requeueInterval",
                value: "0".to_string(),
            });
        }
        self.asn_range()?;
        Ok(())
    }

    pub fn requeue_interval(&self) -> Duration {
        Duration::from_secs(self.requeue_interval)
    }

    /// Parsed ASN range; valid when 0 < first < last <= 4294967294
    pub fn asn_range(&self) -> Result<(u32, u32), ConfigError> {
        if self.calico_asn_range.trim().is_empty() {
            return Ok(DEFAULT_ASN_RANGE);
        }
        let invalid = || ConfigError::InvalidAsnRange(self.calico_asn_range.clone());
        let (first, last) = self.calico_asn_range.split_once('-').ok_or_else(invalid)?;
        let first: u32 = first.trim().parse().map_err(|_| invalid())?;
        let last: u32 = last.trim().parse().map_err(|_| invalid())?;
        if first == 0 || last > MAX_ASN || first >= last {
            return Err(invalid());
        }
        Ok((first, last))
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            host: self.controller.host.clone(),
            login: self.controller.login.clone(),
            password: self.controller.password.clone(),
            insecure: self.controller.insecure,
            timeout: Duration::from_secs(10),
        }
    }
}
