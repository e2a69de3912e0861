//! Immutable copy of the Netris inventory

use crate::{Result, StorageError};
use ipnetwork::IpNetwork;
use netris_client::models::{
    Bgp, Hardware, HardwareType, InventoryProfile, IpamEntry, IpamKind, L4lb, Link, Nat, Port,
    ServerCluster, ServerClusterTemplate, Site, Tenant, VNet, Vpc,
};
use netris_client::{list_typed, Endpoint, NetrisApi};
use serde::de::DeserializeOwned;
use std::net::IpAddr;
use tracing::debug;

/// Every Netris collection the operator reads, fetched at one point in time
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    pub sites: Vec<Site>,
    pub tenants: Vec<Tenant>,
    pub ports: Vec<Port>,
    pub vnets: Vec<VNet>,
    pub bgps: Vec<Bgp>,
    pub l4lbs: Vec<L4lb>,
    /// IPAM tree flattened depth-first
    pub ipam: Vec<IpamEntry>,
    pub hardware: Vec<Hardware>,
    pub inventory_profiles: Vec<InventoryProfile>,
    pub links: Vec<Link>,
    pub vpcs: Vec<Vpc>,
    pub server_clusters: Vec<ServerCluster>,
    pub server_cluster_templates: Vec<ServerClusterTemplate>,
    pub nats: Vec<Nat>,
}

async fn fetch<T: DeserializeOwned>(api: &dyn NetrisApi, endpoint: Endpoint) -> Result<Vec<T>> {
    let items = list_typed(api, endpoint)
        .await
        .map_err(|source| StorageError::Fetch { endpoint, source })?;
    debug!("Fetched {} objects from {}", items.len(), endpoint);
    Ok(items)
}

impl Snapshot {
    /// Download every collection
    pub async fn fetch(api: &dyn NetrisApi) -> Result<Self> {
        let tree: Vec<IpamEntry> = fetch(api, Endpoint::Ipam).await?;
        let ipam = tree
            .iter()
            .flat_map(|root| root.flatten())
            .map(|entry| IpamEntry {
                children: Vec::new(),
                ..entry.clone()
            })
            .collect();

        Ok(Self {
            sites: fetch(api, Endpoint::Sites).await?,
            tenants: fetch(api, Endpoint::Tenants).await?,
            ports: fetch(api, Endpoint::Ports).await?,
            vnets: fetch(api, Endpoint::VNets).await?,
            bgps: fetch(api, Endpoint::Bgps).await?,
            l4lbs: fetch(api, Endpoint::L4lbs).await?,
            ipam,
            hardware: fetch(api, Endpoint::Inventory).await?,
            inventory_profiles: fetch(api, Endpoint::InventoryProfiles).await?,
            links: fetch(api, Endpoint::Links).await?,
            vpcs: fetch(api, Endpoint::Vpcs).await?,
            server_clusters: fetch(api, Endpoint::ServerClusters).await?,
            server_cluster_templates: fetch(api, Endpoint::ServerClusterTemplates).await?,
            nats: fetch(api, Endpoint::Nats).await?,
        })
    }

    pub fn find_site_by_name(&self, name: &str) -> Option<&Site> {
        self.sites.iter().find(|s| s.name == name)
    }

    pub fn find_site_by_id(&self, id: i64) -> Option<&Site> {
        self.sites.iter().find(|s| s.id == id)
    }

    pub fn find_tenant_by_name(&self, name: &str) -> Option<&Tenant> {
        self.tenants.iter().find(|t| t.name == name)
    }

    pub fn find_tenant_by_id(&self, id: i64) -> Option<&Tenant> {
        self.tenants.iter().find(|t| t.id == id)
    }

    /// Find a port by its `swpN@switch` key
    pub fn find_port(&self, key: &str) -> Option<&Port> {
        self.ports.iter().find(|p| p.key() == key)
    }

    pub fn find_vnet_by_name(&self, name: &str) -> Option<&VNet> {
        self.vnets.iter().find(|v| v.name == name)
    }

    pub fn find_vnet_by_id(&self, id: i64) -> Option<&VNet> {
        self.vnets.iter().find(|v| v.id == id)
    }

    /// Find the VNet with a gateway inside `network`
    pub fn find_vnet_by_gateway(&self, network: &IpNetwork) -> Option<&VNet> {
        self.vnets.iter().find(|vnet| {
            vnet.gateways.iter().any(|gw| {
                gw.prefix
                    .parse::<IpNetwork>()
                    .map(|gw| gw.prefix() == network.prefix() && network.contains(gw.ip()))
                    .unwrap_or(false)
            })
        })
    }

    pub fn find_bgp_by_name(&self, name: &str) -> Option<&Bgp> {
        self.bgps.iter().find(|b| b.name == name)
    }

    pub fn find_bgp_by_id(&self, id: i64) -> Option<&Bgp> {
        self.bgps.iter().find(|b| b.id == id)
    }

    pub fn find_l4lb_by_name(&self, name: &str) -> Option<&L4lb> {
        self.l4lbs.iter().find(|l| l.name == name)
    }

    pub fn find_l4lb_by_id(&self, id: i64) -> Option<&L4lb> {
        self.l4lbs.iter().find(|l| l.id == id)
    }

    fn find_ipam(&self, kind: IpamKind, pred: impl Fn(&IpamEntry) -> bool) -> Option<&IpamEntry> {
        self.ipam.iter().find(|e| e.kind == kind && pred(e))
    }

    pub fn find_subnet_by_name(&self, name: &str) -> Option<&IpamEntry> {
        self.find_ipam(IpamKind::Subnet, |e| e.name == name)
    }

    pub fn find_subnet_by_id(&self, id: i64) -> Option<&IpamEntry> {
        self.find_ipam(IpamKind::Subnet, |e| e.id == id)
    }

    pub fn find_allocation_by_name(&self, name: &str) -> Option<&IpamEntry> {
        self.find_ipam(IpamKind::Allocation, |e| e.name == name)
    }

    pub fn find_allocation_by_id(&self, id: i64) -> Option<&IpamEntry> {
        self.find_ipam(IpamKind::Allocation, |e| e.id == id)
    }

    /// Most specific subnet containing `ip`
    pub fn find_subnet_by_ip(&self, ip: IpAddr) -> Option<&IpamEntry> {
        self.ipam
            .iter()
            .filter(|e| e.kind == IpamKind::Subnet)
            .filter_map(|e| e.prefix.parse::<IpNetwork>().ok().map(|net| (net, e)))
            .filter(|(net, _)| net.contains(ip))
            .max_by_key(|(net, _)| net.prefix())
            .map(|(_, e)| e)
    }

    pub fn find_hardware_by_name(&self, kind: HardwareType, name: &str) -> Option<&Hardware> {
        self.hardware
            .iter()
            .find(|h| h.kind == kind && h.name == name)
    }

    pub fn find_hardware_by_id(&self, kind: HardwareType, id: i64) -> Option<&Hardware> {
        self.hardware.iter().find(|h| h.kind == kind && h.id == id)
    }

    /// First spine switch of a site
    pub fn find_spine_by_site(&self, site_id: i64) -> Option<&Hardware> {
        self.hardware.iter().find(|h| {
            h.kind == HardwareType::Switch && h.role == "spine" && h.site.id == site_id
        })
    }

    pub fn find_inventory_profile_by_name(&self, name: &str) -> Option<&InventoryProfile> {
        self.inventory_profiles.iter().find(|p| p.name == name)
    }

    pub fn find_inventory_profile_by_id(&self, id: i64) -> Option<&InventoryProfile> {
        self.inventory_profiles.iter().find(|p| p.id == id)
    }

    pub fn find_link_by_id(&self, id: i64) -> Option<&Link> {
        self.links.iter().find(|l| l.id == id)
    }

    /// Link between two ports, in either direction
    pub fn find_link_by_ports(&self, a: i64, b: i64) -> Option<&Link> {
        self.links.iter().find(|l| {
            (l.local.id == a && l.remote.id == b) || (l.local.id == b && l.remote.id == a)
        })
    }

    pub fn find_vpc_by_name(&self, name: &str) -> Option<&Vpc> {
        self.vpcs.iter().find(|v| v.name == name)
    }

    pub fn find_vpc_by_id(&self, id: i64) -> Option<&Vpc> {
        self.vpcs.iter().find(|v| v.id == id)
    }

    pub fn find_server_cluster_by_name(&self, name: &str) -> Option<&ServerCluster> {
        self.server_clusters.iter().find(|c| c.name == name)
    }

    pub fn find_server_cluster_by_id(&self, id: i64) -> Option<&ServerCluster> {
        self.server_clusters.iter().find(|c| c.id == id)
    }

    pub fn find_server_cluster_template_by_name(&self, name: &str) -> Option<&ServerClusterTemplate> {
        self.server_cluster_templates.iter().find(|t| t.name == name)
    }

    pub fn find_server_cluster_template_by_id(&self, id: i64) -> Option<&ServerClusterTemplate> {
        self.server_cluster_templates.iter().find(|t| t.id == id)
    }

    pub fn find_nat_by_name(&self, name: &str) -> Option<&Nat> {
        self.nats.iter().find(|n| n.name == name)
    }

    pub fn find_nat_by_id(&self, id: i64) -> Option<&Nat> {
        self.nats.iter().find(|n| n.id == id)
    }
}
