use super::common::{MetaHeader, ResourceStatus};
use super::switch::default_auto;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Softgate is a software gateway node in the Netris inventory
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8s.netris.ai",
    version = "v1alpha1",
    kind = "Softgate",
    plural = "softgates",
    namespaced,
    derive = "Default",
    status = "ResourceStatus",
    printcolumn = r#"{"name":"Site","type":"string","jsonPath":".spec.site"}"#,
    printcolumn = r#"{"name":"Status","type":"string","jsonPath":".status.status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct SoftgateSpec {
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
}

/// SoftgateMeta holds the resolved representation of a Softgate
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8s.netris.ai",
    version = "v1alpha1",
    kind = "SoftgateMeta",
    plural = "softgatemeta",
    namespaced,
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct SoftgateMetaSpec {
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
}
