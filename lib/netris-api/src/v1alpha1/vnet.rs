use super::common::{MetaHeader, ResourceStatus};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// VNet is a virtual network stretched over one or more Netris sites
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8s.netris.ai",
    version = "v1alpha1",
    kind = "VNet",
    plural = "vnets",
    namespaced,
    derive = "Default",
    derive = "PartialEq",
    status = "ResourceStatus",
    printcolumn = r#"{"name":"State","type":"string","jsonPath":".spec.state"}"#,
    printcolumn = r#"{"name":"Gateways","type":"string","jsonPath":".spec.sites[*].gateways[*]"}"#,
    printcolumn = r#"{"name":"Status","type":"string","jsonPath":".status.status"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct VNetSpec {
    /// Tenant owning the VNet
    pub owner_tenant: String,

    /// active or disabled
    #[serde(default = "default_state")]
    pub state: String,

    /// Additional tenants allowed to manage the VNet
    #[serde(default)]
    pub guest_tenants: Vec<String>,

    /// VPC the VNet belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc: Option<String>,

    /// Per-site gateways and member ports
    pub sites: Vec<VNetSite>,
}

/// Site membership of a VNet
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VNetSite {
    /// Site name
    pub name: String,

    /// Anycast gateways in CIDR notation, e.g. 10.0.0.1/24
    #[serde(default)]
    pub gateways: Vec<String>,

    /// Switch ports attached to the VNet
    #[serde(default)]
    pub switch_ports: Vec<VNetSwitchPort>,
}

/// Switch port attached to a VNet
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VNetSwitchPort {
    /// Port in swpN@switch form
    pub name: String,

    /// VLAN tag, untagged when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vlan_id: Option<u16>,

    /// active or disabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

fn default_state() -> String {
    "active".to_string()
}

/// VNetMeta holds the resolved representation of a VNet
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8s.netris.ai",
    version = "v1alpha1",
    kind = "VNetMeta",
    plural = "vnetmeta",
    namespaced,
    derive = "Default",
    printcolumn = r#"{"name":"ID","type":"integer","jsonPath":".spec.id"}"#,
    printcolumn = r#"{"name":"Owner","type":"string","jsonPath":".spec.crName"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct VNetMetaSpec {
    #[serde(flatten)]
    pub header: MetaHeader,

    pub name: String,
    pub tenant_id: i64,
    #[serde(default)]
    pub guest_tenant_ids: Vec<i64>,
    #[serde(default)]
    pub site_ids: Vec<i64>,
    pub state: String,
    #[serde(default)]
    pub gateways: Vec<String>,
    #[serde(default)]
    pub ports: Vec<VNetMetaPort>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_id: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VNetMetaPort {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vlan: Option<u16>,
    pub state: String,
}
