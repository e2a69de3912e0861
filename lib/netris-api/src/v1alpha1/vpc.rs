use super::common::{MetaHeader, ResourceStatus};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// VPC is an isolated routing domain in Netris
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8s.netris.ai",
    version = "v1alpha1",
    kind = "VPC",
    plural = "vpcs",
    namespaced,
    derive = "Default",
    status = "ResourceStatus",
    printcolumn = r#"{"name":"Admin Tenant","type":"string","jsonPath":".spec.adminTenant"}"#,
    printcolumn = r#"{"name":"Status","type":"string","jsonPath":".status.status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct VPCSpec {
    pub admin_tenant: String,

    #[serde(default)]
    pub guest_tenants: Vec<String>,

    #[serde(default)]
    pub tags: Vec<String>,
}

/// VPCMeta holds the resolved representation of a VPC
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8s.netris.ai",
    version = "v1alpha1",
    kind = "VPCMeta",
    plural = "vpcmeta",
    namespaced,
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct VPCMetaSpec {
    #[serde(flatten)]
    pub header: MetaHeader,

    pub name: String,
    pub admin_tenant_id: i64,
    #[serde(default)]
    pub guest_tenant_ids: Vec<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
}
