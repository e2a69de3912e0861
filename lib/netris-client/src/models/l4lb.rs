use super::IdName;
use serde::{Deserialize, Serialize};

/// Layer 4 load balancer
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct L4lb {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub tenant: IdName,
    #[serde(default)]
    pub site: IdName,
    #[serde(default)]
    pub automatic: bool,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub port: u16,
    /// TCP or UDP
    #[serde(default)]
    pub protocol: String,
    /// enable or disable
    #[serde(default)]
    pub status: String,
    /// TCP, HTTP or None
    #[serde(default)]
    pub health_check: String,
    #[serde(default)]
    pub timeout: String,
    #[serde(default)]
    pub request_path: String,
    #[serde(default)]
    pub backend: Vec<L4lbBackend>,
    /// Provisioning state, e.g. OK
    #[serde(default)]
    pub state: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct L4lbBackend {
    pub ip: String,
    pub port: u16,
}

impl L4lbBackend {
    /// Parse an `ip:port` backend
    pub fn parse(value: &str) -> Option<Self> {
        let (ip, port) = value.rsplit_once(':')?;
        Some(Self {
            ip: ip.to_string(),
            port: port.parse().ok()?,
        })
    }
}

impl std::fmt::Display for L4lbBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}
