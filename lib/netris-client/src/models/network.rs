use super::IdName;
use serde::{Deserialize, Serialize};

/// Physical switch port
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Port {
    pub id: i64,
    /// Port name on the switch, e.g. swp5
    pub name: String,
    #[serde(default)]
    pub switch: IdName,
    #[serde(default)]
    pub tenant: IdName,
    #[serde(default)]
    pub site: IdName,
}

impl Port {
    /// Operator-facing port identifier, `swp5@leaf1`
    pub fn key(&self) -> String {
        format!("{}@{}", self.name, self.switch.name)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VNet {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub tenant: IdName,
    #[serde(default)]
    pub guest_tenants: Vec<IdName>,
    #[serde(default)]
    pub sites: Vec<IdName>,
    /// active or disabled
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub gateways: Vec<VNetGateway>,
    #[serde(default)]
    pub ports: Vec<VNetPort>,
    #[serde(default)]
    pub vpc: Option<IdName>,
    /// Provisioning state, e.g. Active or Provisioning
    #[serde(default)]
    pub provisioning: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VNetGateway {
    /// Gateway address in CIDR form, e.g. 10.0.0.1/24
    pub prefix: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VNetPort {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub vlan: Option<u16>,
    #[serde(default)]
    pub state: String,
}

/// Cable between two ports
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: i64,
    pub local: IdName,
    pub remote: IdName,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vpc {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub admin_tenant: IdName,
    #[serde(default)]
    pub guest_tenant: Vec<IdName>,
    #[serde(default)]
    pub tags: Vec<String>,
}
