use super::common::{MetaHeader, ResourceStatus};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Allocation is a top-level IPAM block assigned to a tenant
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8s.netris.ai",
    version = "v1alpha1",
    kind = "Allocation",
    plural = "allocations",
    namespaced,
    derive = "Default",
    status = "ResourceStatus",
    printcolumn = r#"{"name":"Prefix","type":"string","jsonPath":".spec.prefix"}"#,
    printcolumn = r#"{"name":"Tenant","type":"string","jsonPath":".spec.tenant"}"#,
    printcolumn = r#"{"name":"Status","type":"string","jsonPath":".status.status"}"#
)]
pub struct AllocationSpec {
    /// Network in CIDR notation
    pub prefix: String,

    pub tenant: String,
}

/// AllocationMeta holds the resolved representation of an Allocation
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8s.netris.ai",
    version = "v1alpha1",
    kind = "AllocationMeta",
    plural = "allocationmeta",
    namespaced,
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct AllocationMetaSpec {
    #[serde(flatten)]
    pub header: MetaHeader,

    pub name: String,
    pub prefix: String,
    pub tenant_id: i64,
}
