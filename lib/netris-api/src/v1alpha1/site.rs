use super::common::{MetaHeader, ResourceStatus};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Site is a Netris site (a data center or a pod)
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8s.netris.ai",
    version = "v1alpha1",
    kind = "Site",
    plural = "sites",
    namespaced,
    derive = "Default",
    status = "ResourceStatus",
    printcolumn = r#"{"name":"Public ASN","type":"integer","jsonPath":".spec.publicAsn"}"#,
    printcolumn = r#"{"name":"Site Mesh","type":"string","jsonPath":".spec.siteMesh"}"#,
    printcolumn = r#"{"name":"Status","type":"string","jsonPath":".status.status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct SiteSpec {
    pub public_asn: u32,

    /// ASN for routing on the host
    pub roh_asn: u32,

    /// ASN for VM routing
    pub vm_asn: u32,

    /// default, default_agg or full
    #[serde(default = "default_routing_profile")]
    pub roh_routing_profile: String,

    /// disabled, hub, spoke or dspoke
    #[serde(default = "default_site_mesh")]
    pub site_mesh: String,

    /// permit or deny
    #[serde(default = "default_acl_policy")]
    pub acl_default_policy: String,
}

fn default_routing_profile() -> String {
    "default".to_string()
}

fn default_site_mesh() -> String {
    "disabled".to_string()
}

fn default_acl_policy() -> String {
    "permit".to_string()
}

/// SiteMeta holds the resolved representation of a Site
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8s.netris.ai",
    version = "v1alpha1",
    kind = "SiteMeta",
    plural = "sitemeta",
    namespaced,
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct SiteMetaSpec {
    #[serde(flatten)]
    pub header: MetaHeader,

    pub name: String,
    pub public_asn: u32,
    pub roh_asn: u32,
    pub vm_asn: u32,
    pub roh_routing_profile_id: i64,
    pub site_mesh: String,
    pub acl_default_policy: String,
}
