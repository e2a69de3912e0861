use super::IdName;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpamKind {
    #[default]
    Allocation,
    Subnet,
}

/// Node of the IPAM tree: allocations contain subnets, subnets may nest
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpamEntry {
    pub id: i64,
    pub name: String,
    pub prefix: String,
    #[serde(rename = "type", default)]
    pub kind: IpamKind,
    #[serde(default)]
    pub tenant: IdName,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub default_gateway: String,
    #[serde(default)]
    pub sites: Vec<IdName>,
    #[serde(default)]
    pub children: Vec<IpamEntry>,
}

impl IpamEntry {
    /// Depth-first walk over this entry and its descendants
    pub fn flatten(&self) -> Vec<&IpamEntry> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.flatten());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_decodes_and_flattens() {
        let tree: IpamEntry = serde_json::from_value(serde_json::json!({
            "id": 1,
            "name": "lab",
            "prefix": "10.0.0.0/8",
            "type": "allocation",
            "children": [
                {"id": 2, "name": "nodes", "prefix": "10.1.0.0/16", "type": "subnet",
                 "children": [{"id": 3, "name": "rack1", "prefix": "10.1.1.0/24", "type": "subnet"}]}
            ]
        }))
        .unwrap();
        let ids: Vec<i64> = tree.flatten().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(tree.children[0].kind, IpamKind::Subnet);
    }
}
