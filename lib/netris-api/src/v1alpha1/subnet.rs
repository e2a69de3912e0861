use super::common::{MetaHeader, ResourceStatus};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Subnet is an IPAM subnet carved out of an allocation
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8s.netris.ai",
    version = "v1alpha1",
    kind = "Subnet",
    plural = "subnets",
    namespaced,
    derive = "Default",
    status = "ResourceStatus",
    printcolumn = r#"{"name":"Prefix","type":"string","jsonPath":".spec.prefix"}"#,
    printcolumn = r#"{"name":"Purpose","type":"string","jsonPath":".spec.purpose"}"#,
    printcolumn = r#"{"name":"Status","type":"string","jsonPath":".status.status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct SubnetSpec {
    /// Network in CIDR notation
    pub prefix: String,

    pub tenant: String,

    /// common, loopback, management, load-balancer, nat or inactive
    #[serde(default = "default_purpose")]
    pub purpose: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_gateway: Option<String>,

    /// Sites the subnet is available in
    #[serde(default)]
    pub sites: Vec<String>,
}

fn default_purpose() -> String {
    "common".to_string()
}

/// SubnetMeta holds the resolved representation of a Subnet
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8s.netris.ai",
    version = "v1alpha1",
    kind = "SubnetMeta",
    plural = "subnetmeta",
    namespaced,
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct SubnetMetaSpec {
    #[serde(flatten)]
    pub header: MetaHeader,

    pub name: String,
    pub prefix: String,
    pub tenant_id: i64,
    pub purpose: String,
    #[serde(default)]
    pub default_gateway: String,
    #[serde(default)]
    pub site_ids: Vec<i64>,
}
