use super::common::{MetaHeader, ResourceStatus};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// InventoryProfile bundles host-level settings applied to inventory devices
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8s.netris.ai",
    version = "v1alpha1",
    kind = "InventoryProfile",
    plural = "inventoryprofiles",
    namespaced,
    derive = "Default",
    status = "ResourceStatus",
    printcolumn = r#"{"name":"Timezone","type":"string","jsonPath":".spec.timezone"}"#,
    printcolumn = r#"{"name":"Status","type":"string","jsonPath":".status.status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct InventoryProfileSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// IANA timezone, e.g. America/Los_Angeles
    pub timezone: String,

    /// IPv4 networks allowed to SSH into devices
    #[serde(default, rename = "allowSshFromIpv4")]
    pub allow_ssh_from_ipv4: Vec<String>,

    /// IPv6 networks allowed to SSH into devices
    #[serde(default, rename = "allowSshFromIpv6")]
    pub allow_ssh_from_ipv6: Vec<String>,

    #[serde(default)]
    pub ntp_servers: Vec<String>,

    #[serde(default)]
    pub dns_servers: Vec<String>,

    #[serde(default)]
    pub custom_rules: Vec<InventoryProfileCustomRule>,
}

/// Extra firewall rule opened on devices using the profile
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryProfileCustomRule {
    pub src_subnet: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub src_port: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub dst_port: String,

    /// tcp, udp, icmp or all
    pub protocol: String,
}

/// InventoryProfileMeta holds the resolved representation of an InventoryProfile
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8s.netris.ai",
    version = "v1alpha1",
    kind = "InventoryProfileMeta",
    plural = "inventoryprofilemeta",
    namespaced,
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct InventoryProfileMetaSpec {
    #[serde(flatten)]
    pub header: MetaHeader,

    pub name: String,
    #[serde(default)]
    pub description: String,
    pub timezone: String,
    #[serde(default, rename = "allowSshFromIpv4")]
    pub allow_ssh_from_ipv4: Vec<String>,
    #[serde(default, rename = "allowSshFromIpv6")]
    pub allow_ssh_from_ipv6: Vec<String>,
    #[serde(default)]
    pub ntp_servers: Vec<String>,
    #[serde(default)]
    pub dns_servers: Vec<String>,
    #[serde(default)]
    pub custom_rules: Vec<InventoryProfileCustomRule>,
}
