use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// BGPConfiguration from Calico - cluster-wide BGP settings
#[derive(CustomResource, Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "crd.projectcalico.org",
    version = "v1",
    kind = "BGPConfiguration",
    plural = "bgpconfigurations",
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct BGPConfigurationSpec {
    /// Full node-to-node BGP mesh, on when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_to_node_mesh_enabled: Option<bool>,

    /// Default AS number for nodes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_number: Option<u32>,

    /// Service CIDRs advertised over BGP
    #[serde(default, rename = "serviceClusterIPs")]
    pub service_cluster_ips: Vec<ServiceClusterIPBlock>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_severity_screen: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct ServiceClusterIPBlock {
    pub cidr: String,
}

impl BGPConfiguration {
    pub fn mesh_enabled(&self) -> bool {
        self.spec.node_to_node_mesh_enabled.unwrap_or(true)
    }

    /// True when the configuration asks Netris to manage BGP peering
    pub fn is_managed(&self) -> bool {
        self.metadata
            .annotations
            .as_ref()
            .and_then(|a| a.get(super::MANAGE_ANNOTATION))
            .map(|v| v == "true")
            .unwrap_or(false)
    }
}
