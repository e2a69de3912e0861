use super::IdName;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub public_asn: u32,
    #[serde(default)]
    pub roh_asn: u32,
    #[serde(default)]
    pub vm_asn: u32,
    #[serde(default)]
    pub roh_routing_profile: IdName,
    #[serde(default)]
    pub site_mesh: String,
    #[serde(default)]
    pub acl_default_policy: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
}
