use super::IdName;
use serde::{Deserialize, Serialize};

/// External BGP session
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bgp {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub site: IdName,
    /// Softgate terminating the session
    #[serde(default)]
    pub hardware: IdName,
    #[serde(default)]
    pub neighbor_as: u32,
    #[serde(default)]
    pub transport: BgpTransport,
    #[serde(default)]
    pub local_ip: String,
    #[serde(default)]
    pub remote_ip: String,
    #[serde(default)]
    pub terminate_on_switch: BgpTerminateOnSwitch,
    #[serde(default)]
    pub multihop: BgpMultihop,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub allow_as_in: u32,
    #[serde(default)]
    pub default_originate: bool,
    #[serde(default)]
    pub prefix_inbound_max: u32,
    #[serde(default)]
    pub inbound_route_map: String,
    #[serde(default)]
    pub outbound_route_map: String,
    #[serde(default)]
    pub local_preference: u32,
    #[serde(default)]
    pub weight: u32,
    #[serde(default)]
    pub prepend_inbound: u32,
    #[serde(default)]
    pub prepend_outbound: u32,
    #[serde(default)]
    pub prefix_list_inbound: String,
    #[serde(default)]
    pub prefix_list_outbound: String,
    #[serde(default)]
    pub community: String,
    #[serde(default)]
    pub description: String,
    /// enabled or disabled
    #[serde(default)]
    pub state: String,
    /// Session state, e.g. Established
    #[serde(default)]
    pub bgp_state: String,
    #[serde(default)]
    pub bgp_prefixes: u32,
    #[serde(default)]
    pub bgp_uptime: String,
    #[serde(default)]
    pub provisioning: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BgpTransport {
    /// port or vnet
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Port or VNet id
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub vlan: Option<u16>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BgpTerminateOnSwitch {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub switch_id: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BgpMultihop {
    #[serde(default)]
    pub neighbor_address: String,
    #[serde(default)]
    pub update_source: String,
    #[serde(default)]
    pub hops: u32,
}
