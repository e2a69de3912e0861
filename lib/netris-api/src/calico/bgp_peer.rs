use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// BGPPeer from Calico - a BGP neighbor of the cluster nodes
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "crd.projectcalico.org",
    version = "v1",
    kind = "BGPPeer",
    plural = "bgppeers",
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct BGPPeerSpec {
    /// Peer address
    #[serde(rename = "peerIP")]
    pub peer_ip: String,

    /// Peer AS number
    pub as_number: u32,

    /// Restrict the peering to a single node
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<String>,
}
