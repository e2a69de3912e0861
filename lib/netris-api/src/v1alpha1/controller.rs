use super::common::{MetaHeader, ResourceStatus};
use super::switch::default_auto;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Controller is a Netris controller node in the inventory
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8s.netris.ai",
    version = "v1alpha1",
    kind = "Controller",
    plural = "controllers",
    namespaced,
    derive = "Default",
    status = "ResourceStatus",
    printcolumn = r#"{"name":"Main IP","type":"string","jsonPath":".spec.mainIp"}"#,
    printcolumn = r#"{"name":"Status","type":"string","jsonPath":".status.status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ControllerSpec {
    pub tenant: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    pub site: String,

    #[serde(default = "default_auto")]
    pub main_ip: String,
}

/// ControllerMeta holds the resolved representation of a Controller
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8s.netris.ai",
    version = "v1alpha1",
    kind = "ControllerMeta",
    plural = "controllermeta",
    namespaced,
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct ControllerMetaSpec {
    #[serde(flatten)]
    pub header: MetaHeader,

    pub name: String,
    pub tenant_id: i64,
    #[serde(default)]
    pub description: String,
    pub site_id: i64,
    pub main_ip: String,
}
