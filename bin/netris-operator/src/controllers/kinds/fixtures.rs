//! Inventory shared by the translation tests

use netris_client::models::{
    Hardware, HardwareType, IdName, InventoryProfile, IpamEntry, IpamKind, Port,
    ServerClusterTemplate, Site, Tenant, VNet, VNetGateway, Vpc,
};
use netris_storage::Snapshot;

pub fn snapshot() -> Snapshot {
    Snapshot {
        sites: vec![Site {
            id: 1,
            name: "santa-clara".into(),
            public_asn: 65001,
            roh_asn: 65502,
            vm_asn: 65503,
            roh_routing_profile: IdName::new(1, "default"),
            site_mesh: "disabled".into(),
            acl_default_policy: "permit".into(),
        }],
        tenants: vec![
            Tenant {
                id: 1,
                name: "Admin".into(),
                ..Default::default()
            },
            Tenant {
                id: 2,
                name: "k8s".into(),
                ..Default::default()
            },
        ],
        ports: vec![
            Port {
                id: 11,
                name: "swp5".into(),
                switch: IdName::new(21, "leaf1"),
                site: IdName::new(1, "santa-clara"),
                ..Default::default()
            },
            Port {
                id: 12,
                name: "swp6".into(),
                switch: IdName::new(21, "leaf1"),
                site: IdName::new(1, "santa-clara"),
                ..Default::default()
            },
            Port {
                id: 13,
                name: "swp1".into(),
                switch: IdName::new(22, "spine1"),
                site: IdName::new(1, "santa-clara"),
                ..Default::default()
            },
        ],
        vnets: vec![VNet {
            id: 31,
            name: "k8s-vnet".into(),
            tenant: IdName::new(1, "Admin"),
            sites: vec![IdName::new(1, "santa-clara")],
            state: "active".into(),
            gateways: vec![VNetGateway {
                prefix: "10.1.0.1/24".into(),
            }],
            provisioning: "Active".into(),
            ..Default::default()
        }],
        ipam: vec![
            IpamEntry {
                id: 40,
                name: "lab".into(),
                prefix: "10.0.0.0/8".into(),
                kind: IpamKind::Allocation,
                tenant: IdName::new(1, "Admin"),
                ..Default::default()
            },
            IpamEntry {
                id: 41,
                name: "k8s-nodes".into(),
                prefix: "10.1.0.0/24".into(),
                kind: IpamKind::Subnet,
                tenant: IdName::new(2, "k8s"),
                purpose: "common".into(),
                sites: vec![IdName::new(1, "santa-clara")],
                ..Default::default()
            },
            IpamEntry {
                id: 42,
                name: "k8s-lb".into(),
                prefix: "192.168.50.0/24".into(),
                kind: IpamKind::Subnet,
                tenant: IdName::new(2, "k8s"),
                purpose: "load-balancer".into(),
                sites: vec![IdName::new(1, "santa-clara")],
                ..Default::default()
            },
        ],
        hardware: vec![
            Hardware {
                id: 21,
                name: "leaf1".into(),
                kind: HardwareType::Switch,
                role: "leaf".into(),
                site: IdName::new(1, "santa-clara"),
                ..Default::default()
            },
            Hardware {
                id: 22,
                name: "spine1".into(),
                kind: HardwareType::Switch,
                role: "spine".into(),
                site: IdName::new(1, "santa-clara"),
                ..Default::default()
            },
            Hardware {
                id: 23,
                name: "softgate1".into(),
                kind: HardwareType::Softgate,
                site: IdName::new(1, "santa-clara"),
                ..Default::default()
            },
        ],
        inventory_profiles: vec![InventoryProfile {
            id: 51,
            name: "default-profile".into(),
            ..Default::default()
        }],
        vpcs: vec![Vpc {
            id: 61,
            name: "vpc-default".into(),
            admin_tenant: IdName::new(1, "Admin"),
            ..Default::default()
        }],
        server_cluster_templates: vec![ServerClusterTemplate {
            id: 71,
            name: "gpu-template".into(),
            vnets: vec![serde_json::json!({"postfix": "east-west", "type": "l3vpn", "serverNics": ["eth1"]})],
        }],
        ..Default::default()
    }
}
