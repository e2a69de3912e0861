use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// IPPool from Calico - the pod address pool
#[derive(CustomResource, Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "crd.projectcalico.org",
    version = "v1",
    kind = "IPPool",
    plural = "ippools",
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct IPPoolSpec {
    /// Pool network in CIDR notation
    pub cidr: String,

    /// Prefix length of the per-node blocks
    #[serde(default = "default_block_size")]
    pub block_size: u8,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipip_mode: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vxlan_mode: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nat_outgoing: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}

fn default_block_size() -> u8 {
    26
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_size_default() {
        let spec: IPPoolSpec =
            serde_json::from_value(serde_json::json!({"cidr": "192.168.0.0/16"})).unwrap();
        assert_eq!(spec.block_size, 26);
        assert!(spec.ipip_mode.is_none());
    }
}
