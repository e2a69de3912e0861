use super::common::{MetaHeader, ResourceStatus};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Nat is a source or destination NAT rule on a site's border
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8s.netris.ai",
    version = "v1alpha1",
    kind = "Nat",
    plural = "nats",
    namespaced,
    derive = "Default",
    status = "ResourceStatus",
    printcolumn = r#"{"name":"Action","type":"string","jsonPath":".spec.action"}"#,
    printcolumn = r#"{"name":"Site","type":"string","jsonPath":".spec.site"}"#,
    printcolumn = r#"{"name":"Status","type":"string","jsonPath":".status.status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct NatSpec {
    #[serde(default)]
    pub comment: String,

    /// enabled or disabled, enabled when empty
    #[serde(default)]
    pub state: String,

    pub site: String,

    /// dnat, snat, accept_snat or masquerade, in any case
    pub action: String,

    /// all, tcp, udp or icmp
    pub protocol: String,

    #[serde(default)]
    pub src_address: String,

    #[serde(default)]
    pub src_port: String,

    #[serde(default)]
    pub dst_address: String,

    #[serde(default)]
    pub dst_port: String,

    #[serde(default, rename = "snatToIP")]
    pub snat_to_ip: String,

    #[serde(default)]
    pub snat_to_pool: String,

    #[serde(default, rename = "dnatToIP")]
    pub dnat_to_ip: String,

    #[serde(default)]
    pub dnat_to_port: u16,
}

/// NatMeta holds the resolved representation of a Nat
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8s.netris.ai",
    version = "v1alpha1",
    kind = "NatMeta",
    plural = "natmeta",
    namespaced,
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct NatMetaSpec {
    #[serde(flatten)]
    pub header: MetaHeader,

    pub name: String,
    #[serde(default)]
    pub comment: String,
    pub state: String,
    pub site_id: i64,
    /// Upper case action name
    pub action: String,
    pub protocol: String,
    #[serde(default)]
    pub src_address: String,
    #[serde(default)]
    pub src_port: String,
    #[serde(default)]
    pub dst_address: String,
    #[serde(default)]
    pub dst_port: String,
    #[serde(default, rename = "snatToIP")]
    pub snat_to_ip: String,
    #[serde(default)]
    pub snat_to_pool: String,
    #[serde(default, rename = "dnatToIP")]
    pub dnat_to_ip: String,
    #[serde(default)]
    pub dnat_to_port: u16,
}
