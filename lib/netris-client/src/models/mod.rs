//! Wire models of the objects returned by Netris list calls

pub mod bgp;
pub mod inventory;
pub mod ipam;
pub mod l4lb;
pub mod nat;
pub mod network;
pub mod site;

pub use bgp::Bgp;
pub use inventory::{
    CustomRule, Hardware, HardwareType, InventoryProfile, ServerCluster, ServerClusterTemplate,
};
pub use ipam::{IpamEntry, IpamKind};
pub use l4lb::{L4lb, L4lbBackend};
pub use nat::{Choice, Nat};
pub use network::{Link, Port, VNet, VNetGateway, VNetPort, Vpc};
pub use site::{Site, Tenant};

use serde::{Deserialize, Serialize};

/// Reference to another Netris object
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdName {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

impl IdName {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
