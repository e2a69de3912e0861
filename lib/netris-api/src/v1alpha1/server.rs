use super::common::{MetaHeader, ResourceStatus};
use super::switch::default_auto;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Server is a host registered in the Netris inventory
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8s.netris.ai",
    version = "v1alpha1",
    kind = "Server",
    plural = "servers",
    namespaced,
    derive = "Default",
    status = "ResourceStatus",
    printcolumn = r#"{"name":"Site","type":"string","jsonPath":".spec.site"}"#,
    printcolumn = r#"{"name":"Status","type":"string","jsonPath":".status.status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ServerSpec {
    pub tenant: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    pub site: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    #[serde(default = "default_auto")]
    pub main_ip: String,

    #[serde(default = "default_auto")]
    pub mgmt_ip: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uuid: String,

    #[serde(default)]
    pub asn: u32,

    #[serde(default = "default_ports_count")]
    pub ports_count: u32,

    /// Free-form data passed through to Netris
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub custom_data: String,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Server role, e.g. "gpu" or "storage"
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub srv_role: String,
}

fn default_ports_count() -> u32 {
    2
}

/// ServerMeta holds the resolved representation of a Server
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8s.netris.ai",
    version = "v1alpha1",
    kind = "ServerMeta",
    plural = "servermeta",
    namespaced,
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct ServerMetaSpec {
    #[serde(flatten)]
    pub header: MetaHeader,

    pub name: String,
    pub tenant_id: i64,
    #[serde(default)]
    pub description: String,
    pub site_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<i64>,
    pub main_ip: String,
    pub mgmt_ip: String,
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub asn: u32,
    pub ports_count: u32,
    #[serde(default)]
    pub custom_data: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub srv_role: String,
}
