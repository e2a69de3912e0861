use super::common::{MetaHeader, ResourceStatus};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// ServerCluster groups servers of a site into a VPC using a cluster template
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8s.netris.ai",
    version = "v1alpha1",
    kind = "ServerCluster",
    plural = "serverclusters",
    namespaced,
    derive = "Default",
    status = "ResourceStatus",
    printcolumn = r#"{"name":"Site","type":"string","jsonPath":".spec.site"}"#,
    printcolumn = r#"{"name":"VPC","type":"string","jsonPath":".spec.vpc"}"#,
    printcolumn = r#"{"name":"Status","type":"string","jsonPath":".status.status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ServerClusterSpec {
    /// Admin tenant
    pub admin: String,

    pub site: String,

    pub vpc: String,

    /// Server cluster template name
    pub template: String,

    #[serde(default)]
    pub tags: Vec<String>,
}

/// ServerClusterMeta holds the resolved representation of a ServerCluster
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8s.netris.ai",
    version = "v1alpha1",
    kind = "ServerClusterMeta",
    plural = "serverclustermeta",
    namespaced,
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct ServerClusterMetaSpec {
    #[serde(flatten)]
    pub header: MetaHeader,

    pub name: String,
    pub admin_tenant_id: i64,
    pub site_id: i64,
    pub vpc_id: i64,
    pub template_id: i64,
    #[serde(default)]
    pub tags: Vec<String>,
}
