use super::common::{MetaHeader, ResourceStatus};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Switch is a physical switch registered in the Netris inventory
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8s.netris.ai",
    version = "v1alpha1",
    kind = "Switch",
    plural = "switches",
    namespaced,
    derive = "Default",
    status = "ResourceStatus",
    printcolumn = r#"{"name":"Site","type":"string","jsonPath":".spec.site"}"#,
    printcolumn = r#"{"name":"Main IP","type":"string","jsonPath":".spec.mainIp"}"#,
    printcolumn = r#"{"name":"Status","type":"string","jsonPath":".status.status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct SwitchSpec {
    pub tenant: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Network operating system, e.g. cumulus_linux
    pub nos: String,

    pub site: String,

    #[serde(default)]
    pub asn: u32,

    /// Inventory profile name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// Loopback address, "auto" lets Netris allocate one
    #[serde(default = "default_auto")]
    pub main_ip: String,

    /// Management address, "auto" lets Netris allocate one
    #[serde(default = "default_auto")]
    pub mgmt_ip: String,

    #[serde(default = "default_ports_count")]
    pub ports_count: u32,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mac_address: String,
}

pub(crate) fn default_auto() -> String {
    "auto".to_string()
}

fn default_ports_count() -> u32 {
    54
}

/// SwitchMeta holds the resolved representation of a Switch
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8s.netris.ai",
    version = "v1alpha1",
    kind = "SwitchMeta",
    plural = "switchmeta",
    namespaced,
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct SwitchMetaSpec {
    #[serde(flatten)]
    pub header: MetaHeader,

    pub name: String,
    pub tenant_id: i64,
    #[serde(default)]
    pub description: String,
    pub nos: String,
    pub site_id: i64,
    #[serde(default)]
    pub asn: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<i64>,
    pub main_ip: String,
    pub mgmt_ip: String,
    pub ports_count: u32,
    #[serde(default)]
    pub mac_address: String,
}
