use super::common::{MetaHeader, ResourceStatus};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Link is a cable between two switch ports
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8s.netris.ai",
    version = "v1alpha1",
    kind = "Link",
    plural = "links",
    namespaced,
    derive = "Default",
    status = "ResourceStatus",
    printcolumn = r#"{"name":"Ports","type":"string","jsonPath":".spec.ports"}"#,
    printcolumn = r#"{"name":"Status","type":"string","jsonPath":".status.status"}"#
)]
pub struct LinkSpec {
    /// Both ends of the link in swpN@switch form
    pub ports: Vec<String>,
}

/// LinkMeta holds the resolved representation of a Link
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8s.netris.ai",
    version = "v1alpha1",
    kind = "LinkMeta",
    plural = "linkmeta",
    namespaced,
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct LinkMetaSpec {
    #[serde(flatten)]
    pub header: MetaHeader,

    pub local_port_id: i64,
    pub remote_port_id: i64,
}
