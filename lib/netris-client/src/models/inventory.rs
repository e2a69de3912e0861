use super::IdName;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HardwareType {
    #[default]
    Switch,
    Softgate,
    Server,
    Controller,
}

/// Inventory device of any type
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hardware {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: HardwareType,
    #[serde(default)]
    pub tenant: IdName,
    #[serde(default)]
    pub site: IdName,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub nos: String,
    #[serde(default)]
    pub asn: u32,
    #[serde(default)]
    pub profile: Option<IdName>,
    #[serde(default)]
    pub main_ip: String,
    #[serde(default)]
    pub mgmt_ip: String,
    #[serde(default)]
    pub ports_count: u32,
    #[serde(default)]
    pub mac_address: String,
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub custom_data: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub srv_role: String,
    /// Fabric role of a switch: spine or leaf
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryProfile {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub timezone: String,
    #[serde(default, rename = "ipv4SshList")]
    pub allow_ssh_from_ipv4: Vec<String>,
    #[serde(default, rename = "ipv6SshList")]
    pub allow_ssh_from_ipv6: Vec<String>,
    #[serde(default, rename = "NTPServers")]
    pub ntp_servers: Vec<String>,
    #[serde(default, rename = "DNSServers")]
    pub dns_servers: Vec<String>,
    #[serde(default)]
    pub custom_rules: Vec<CustomRule>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomRule {
    pub src_subnet: String,
    #[serde(default)]
    pub src_port: String,
    #[serde(default)]
    pub dst_port: String,
    pub protocol: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerCluster {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub admin: IdName,
    #[serde(default)]
    pub site: IdName,
    #[serde(default)]
    pub vpc: IdName,
    #[serde(default, rename = "srvClusterTemplate")]
    pub template: IdName,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerClusterTemplate {
    pub id: i64,
    pub name: String,
    /// VNet templates, kept as Netris returns them
    #[serde(default)]
    pub vnets: Vec<Value>,
}
