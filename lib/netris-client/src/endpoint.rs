//! REST collections exposed by the Netris controller

use std::fmt;

/// A Netris REST collection. Reads use `GET path`, writes use
/// `POST path`, `PUT path/{id}` and `DELETE path/{id}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Sites,
    Tenants,
    Ports,
    VNets,
    Bgps,
    L4lbs,
    /// Whole IPAM tree, read only
    Ipam,
    Subnets,
    Allocations,
    /// All inventory hardware, read only
    Inventory,
    Switches,
    Softgates,
    Servers,
    Controllers,
    InventoryProfiles,
    Links,
    Vpcs,
    ServerClusters,
    ServerClusterTemplates,
    Nats,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Sites => "/api/v2/sites",
            Endpoint::Tenants => "/api/v2/tenants",
            Endpoint::Ports => "/api/v2/ports",
            Endpoint::VNets => "/api/v2/vnet",
            Endpoint::Bgps => "/api/v2/bgp",
            Endpoint::L4lbs => "/api/v2/l4lb",
            Endpoint::Ipam => "/api/v2/ipam",
            Endpoint::Subnets => "/api/v2/ipam/subnet",
            Endpoint::Allocations => "/api/v2/ipam/allocation",
            Endpoint::Inventory => "/api/v2/inventory",
            Endpoint::Switches => "/api/v2/inventory/switch",
            Endpoint::Softgates => "/api/v2/inventory/softgate",
            Endpoint::Servers => "/api/v2/inventory/server",
            Endpoint::Controllers => "/api/v2/inventory/controller",
            Endpoint::InventoryProfiles => "/api/v2/inventory-profile",
            Endpoint::Links => "/api/v2/links",
            Endpoint::Vpcs => "/api/v2/vpc",
            Endpoint::ServerClusters => "/api/v2/servercluster",
            Endpoint::ServerClusterTemplates => "/api/v2/servercluster-template",
            Endpoint::Nats => "/api/v2/nat",
        }
    }

    pub fn item_path(&self, id: i64) -> String {
        format!("{}/{}", self.path(), id)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_path() {
        assert_eq!(Endpoint::VNets.item_path(12), "/api/v2/vnet/12");
        assert_eq!(
            Endpoint::Switches.item_path(3),
            "/api/v2/inventory/switch/3"
        );
        assert_eq!(Endpoint::Nats.item_path(8), "/api/v2/nat/8");
    }
}
