use super::common::MetaHeader;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// BGP describes an external BGP session terminated on a softgate or switch
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8s.netris.ai",
    version = "v1alpha1",
    kind = "BGP",
    plural = "bgps",
    namespaced,
    derive = "Default",
    derive = "PartialEq",
    status = "BGPStatus",
    printcolumn = r#"{"name":"State","type":"string","jsonPath":".status.bgpStatus"}"#,
    printcolumn = r#"{"name":"Prefixes","type":"integer","jsonPath":".status.bgpPrefixes"}"#,
    printcolumn = r#"{"name":"Local Address","type":"string","jsonPath":".spec.localIP"}"#,
    printcolumn = r#"{"name":"Remote Address","type":"string","jsonPath":".spec.remoteIP"}"#,
    printcolumn = r#"{"name":"Status","type":"string","jsonPath":".status.status"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct BGPSpec {
    /// Site the session belongs to
    pub site: String,

    /// Softgate terminating the session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub softgate: Option<String>,

    /// Remote AS number
    #[serde(rename = "neighborAs")]
    pub neighbor_as: u32,

    /// How the neighbor is reached
    pub transport: BGPTransport,

    /// Local address in CIDR notation
    #[serde(rename = "localIP")]
    pub local_ip: String,

    /// Remote address in CIDR notation
    #[serde(rename = "remoteIP")]
    pub remote_ip: String,

    /// Terminate the session on a switch instead of a softgate
    #[serde(default)]
    pub terminate_on_switch: BGPTerminateOnSwitch,

    /// Multihop peering settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multihop: Option<BGPMultihop>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub bgp_password: String,

    #[serde(default)]
    pub allow_as_in: u32,

    #[serde(default)]
    pub default_originate: bool,

    #[serde(default)]
    pub prefix_inbound_max: u32,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub inbound_route_map: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub outbound_route_map: String,

    #[serde(default = "default_local_preference")]
    pub local_preference: u32,

    #[serde(default)]
    pub weight: u32,

    #[serde(default)]
    pub prepend_inbound: u32,

    #[serde(default)]
    pub prepend_outbound: u32,

    /// Inbound prefix list entries, e.g. "permit 10.0.0.0/8 le 24"
    #[serde(default)]
    pub prefix_list_inbound: Vec<String>,

    /// Outbound prefix list entries
    #[serde(default)]
    pub prefix_list_outbound: Vec<String>,

    /// Communities sent to the neighbor
    #[serde(default, rename = "sendBGPCommunity")]
    pub send_bgp_community: Vec<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// enabled or disabled
    #[serde(default = "default_state")]
    pub state: String,
}

/// Transport used to reach the neighbor
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BGPTransport {
    /// port or vnet
    #[serde(rename = "type", default = "default_transport_type")]
    pub kind: String,

    /// Port (swpN@switch) or VNet name
    pub name: String,

    /// VLAN tag for port transport
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vlan_id: Option<u16>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BGPTerminateOnSwitch {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub switch_name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BGPMultihop {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub neighbor_address: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub update_source: String,

    #[serde(default)]
    pub hops: u32,
}

/// Status of a BGP session
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BGPStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Provisioning state reported by Netris
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,

    /// Session state, e.g. Established
    #[serde(default, rename = "bgpStatus")]
    pub bgp_status: String,

    /// Number of prefixes received
    #[serde(default, rename = "bgpPrefixes")]
    pub bgp_prefixes: u32,

    #[serde(default, rename = "bgpUptime")]
    pub bgp_uptime: String,
}

fn default_local_preference() -> u32 {
    100
}

fn default_state() -> String {
    "enabled".to_string()
}

fn default_transport_type() -> String {
    "port".to_string()
}

/// EBGP is the legacy name of the BGP kind; it shares BGP's schema and behaviour
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8s.netris.ai",
    version = "v1alpha1",
    kind = "EBGP",
    plural = "ebgps",
    namespaced,
    derive = "Default",
    derive = "PartialEq",
    status = "BGPStatus",
    printcolumn = r#"{"name":"State","type":"string","jsonPath":".status.bgpStatus"}"#,
    printcolumn = r#"{"name":"Status","type":"string","jsonPath":".status.status"}"#
)]
pub struct EBGPSpec {
    #[serde(flatten)]
    pub bgp: BGPSpec,
}

/// Resolved BGP session as sent to Netris
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BGPMetaFields {
    pub name: String,
    pub site_id: i64,
    /// Softgate id, 0 when terminated on a switch
    #[serde(default)]
    pub hw_id: i64,
    pub neighbor_as: u32,
    pub transport: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vnet_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vlan: Option<u16>,
    pub local_ip: String,
    pub remote_ip: String,
    #[serde(default)]
    pub terminate_on_switch: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_switch_id: Option<i64>,
    #[serde(default)]
    pub neighbor_address: String,
    #[serde(default)]
    pub update_source: String,
    #[serde(default)]
    pub multihop: u32,
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
    pub state: String,
}

/// BGPMeta holds the resolved representation of a BGP session
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8s.netris.ai",
    version = "v1alpha1",
    kind = "BGPMeta",
    plural = "bgpmeta",
    namespaced,
    derive = "Default",
    printcolumn = r#"{"name":"ID","type":"integer","jsonPath":".spec.id"}"#
)]
pub struct BGPMetaSpec {
    #[serde(flatten)]
    pub header: MetaHeader,

    #[serde(flatten)]
    pub bgp: BGPMetaFields,
}

/// EBGPMeta holds the resolved representation of an EBGP session
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8s.netris.ai",
    version = "v1alpha1",
    kind = "EBGPMeta",
    plural = "ebgpmeta",
    namespaced,
    derive = "Default",
    printcolumn = r#"{"name":"ID","type":"integer","jsonPath":".spec.id"}"#
)]
pub struct EBGPMetaSpec {
    #[serde(flatten)]
    pub header: MetaHeader,

    #[serde(flatten)]
    pub bgp: BGPMetaFields,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_defaults() {
        let spec: BGPSpec = serde_json::from_value(serde_json::json!({
            "site": "santa-clara",
            "neighborAs": 23456,
            "transport": {"name": "swp5@rlab-leaf1"},
            "localIP": "172.16.0.1/30",
            "remoteIP": "172.16.0.2/30"
        }))
        .unwrap();
        assert_eq!(spec.local_preference, 100);
        assert_eq!(spec.state, "enabled");
        assert_eq!(spec.transport.kind, "port");
        assert!(!spec.terminate_on_switch.enabled);
    }

    #[test]
    fn test_ebgp_flattens_bgp_fields() {
        let spec: EBGPSpec = serde_json::from_value(serde_json::json!({
            "site": "santa-clara",
            "neighborAs": 65000,
            "transport": {"type": "vnet", "name": "vnet-customer"},
            "localIP": "10.0.0.1/24",
            "remoteIP": "10.0.0.2/24"
        }))
        .unwrap();
        assert_eq!(spec.bgp.transport.kind, "vnet");
        assert_eq!(spec.bgp.neighbor_as, 65000);
    }
}
