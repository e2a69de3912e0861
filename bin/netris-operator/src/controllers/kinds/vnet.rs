use crate::config::OperatorConfig;
use crate::controllers::resolve;
use crate::controllers::resource::{meta_accessors, MetaKind, SpecKind};
use crate::controllers::{Error, Result};
use kube::ResourceExt;
use netris_api::v1alpha1::{VNet, VNetMeta, VNetMetaPort, VNetMetaSpec};
use netris_client::models::VNet as RemoteVNet;
use netris_client::Endpoint;
use netris_storage::Snapshot;
use serde_json::{json, Value};
use std::collections::BTreeSet;

fn validate_state(state: &str) -> Result<String> {
    match state {
        "" | "active" => Ok("active".to_string()),
        "disabled" => Ok("disabled".to_string()),
        other => Err(Error::translate(format!(
            "invalid state '{}', expected active or disabled",
            other
        ))),
    }
}

impl SpecKind for VNet {
    type Meta = VNetMeta;
    const KIND: &'static str = "vnet";

    fn translate(&self, snapshot: &Snapshot, _config: &OperatorConfig) -> Result<VNetMetaSpec> {
        let mut site_ids = Vec::new();
        let mut gateways = Vec::new();
        let mut ports = Vec::new();
        let mut seen = BTreeSet::new();

        for site in &self.spec.sites {
            site_ids.push(resolve::site_id(snapshot, &site.name)?);

            for gateway in &site.gateways {
                let net = resolve::host_cidr(gateway)?;
                if !seen.insert(net.to_string()) {
                    return Err(Error::translate(format!("duplicate gateway '{}'", gateway)));
                }
                gateways.push(net.to_string());
            }

            for switch_port in &site.switch_ports {
                let port = resolve::port(snapshot, &switch_port.name)?;
                let vlan = switch_port.vlan_id.map(resolve::vlan).transpose()?;
                ports.push(VNetMetaPort {
                    id: port.id,
                    name: switch_port.name.clone(),
                    vlan,
                    state: validate_state(switch_port.state.as_deref().unwrap_or(""))?,
                });
            }
        }

        Ok(VNetMetaSpec {
            header: Default::default(),
            name: self.name_any(),
            tenant_id: resolve::tenant_id(snapshot, &self.spec.owner_tenant)?,
            guest_tenant_ids: resolve::tenant_ids(snapshot, &self.spec.guest_tenants)?,
            site_ids,
            state: validate_state(&self.spec.state)?,
            gateways,
            ports,
            vpc_id: self
                .spec
                .vpc
                .as_deref()
                .map(|vpc| resolve::vpc_id(snapshot, vpc))
                .transpose()?,
        })
    }
}

impl MetaKind for VNetMeta {
    type Owner = VNet;
    type Spec = VNetMetaSpec;
    type Remote = RemoteVNet;

    const KIND: &'static str = "vnetmeta";
    const ENDPOINT: Endpoint = Endpoint::VNets;

    meta_accessors!();

    fn find_by_id(snapshot: &Snapshot, id: i64) -> Option<RemoteVNet> {
        snapshot.find_vnet_by_id(id).cloned()
    }

    fn find_for_import(snapshot: &Snapshot, spec: &VNetMetaSpec) -> Option<RemoteVNet> {
        snapshot.find_vnet_by_name(&spec.name).cloned()
    }

    fn remote_id(remote: &RemoteVNet) -> i64 {
        remote.id
    }

    fn payload(spec: &VNetMetaSpec) -> Value {
        let mut payload = json!({
            "name": spec.name,
            "tenant": {"id": spec.tenant_id},
            "guestTenants": spec.guest_tenant_ids.iter().map(|id| json!({"id": id})).collect::<Vec<_>>(),
            "sites": spec.site_ids.iter().map(|id| json!({"id": id})).collect::<Vec<_>>(),
            "state": spec.state,
            "gateways": spec.gateways.iter().map(|gw| json!({"prefix": gw})).collect::<Vec<_>>(),
            "ports": spec.ports.iter().map(|p| json!({
                "id": p.id,
                "name": p.name,
                "vlan": p.vlan,
                "state": p.state,
            })).collect::<Vec<_>>(),
            "nativeVlan": 1,
        });
        if let Some(vpc_id) = spec.vpc_id {
            payload["vpc"] = json!({ "id": vpc_id });
        }
        payload
    }

    fn differs(spec: &VNetMetaSpec, remote: &RemoteVNet) -> bool {
        let remote_guests: Vec<i64> = remote.guest_tenants.iter().map(|t| t.id).collect();
        let remote_sites: Vec<i64> = remote.sites.iter().map(|s| s.id).collect();
        let remote_gateways: Vec<String> = remote.gateways.iter().map(|g| g.prefix.clone()).collect();
        let ports: Vec<(i64, Option<u16>, String)> = spec
            .ports
            .iter()
            .map(|p| (p.id, p.vlan, p.state.clone()))
            .collect();
        let remote_ports: Vec<(i64, Option<u16>, String)> = remote
            .ports
            .iter()
            .map(|p| (p.id, p.vlan, p.state.clone()))
            .collect();

        spec.name != remote.name
            || spec.tenant_id != remote.tenant.id
            || spec.state != remote.state
            || spec.vpc_id.is_some_and(|id| remote.vpc.as_ref().map(|v| v.id) != Some(id))
            || !resolve::same_set(&spec.guest_tenant_ids, &remote_guests)
            || !resolve::same_set(&spec.site_ids, &remote_sites)
            || !resolve::same_set(&spec.gateways, &remote_gateways)
            || !resolve::same_set(&ports, &remote_ports)
    }

    fn remote_state(remote: &RemoteVNet) -> String {
        remote.provisioning.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::kinds::fixtures;
    use kube::api::ObjectMeta;
    use netris_api::v1alpha1::{VNetSite, VNetSpec, VNetSwitchPort};

    fn vnet(sites: Vec<VNetSite>) -> VNet {
        VNet {
            metadata: ObjectMeta {
                name: Some("vnet-customer".into()),
                namespace: Some("default".into()),
                ..Default::default()
            },
            spec: VNetSpec {
                owner_tenant: "Admin".into(),
                state: "active".into(),
                guest_tenants: vec!["k8s".into()],
                vpc: None,
                sites,
            },
            status: None,
        }
    }

    fn site(gateways: &[&str], ports: &[(&str, Option<u16>)]) -> VNetSite {
        VNetSite {
            name: "santa-clara".into(),
            gateways: gateways.iter().map(|g| g.to_string()).collect(),
            switch_ports: ports
                .iter()
                .map(|(name, vlan)| VNetSwitchPort {
                    name: name.to_string(),
                    vlan_id: *vlan,
                    state: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_translate_resolves_ids() {
        let snapshot = fixtures::snapshot();
        let vnet = vnet(vec![site(&["10.2.0.1/24"], &[("swp5@leaf1", Some(100)), ("swp6@leaf1", None)])]);

        let meta = vnet.translate(&snapshot, &OperatorConfig::default()).unwrap();
        assert_eq!(meta.name, "vnet-customer");
        assert_eq!(meta.tenant_id, 1);
        assert_eq!(meta.guest_tenant_ids, vec![2]);
        assert_eq!(meta.site_ids, vec![1]);
        assert_eq!(meta.gateways, vec!["10.2.0.1/24"]);
        assert_eq!(meta.ports.len(), 2);
        assert_eq!(meta.ports[0].id, 11);
        assert_eq!(meta.ports[0].vlan, Some(100));
        assert_eq!(meta.ports[1].state, "active");
    }

    #[test]
    fn test_translate_rejects_bad_input() {
        let snapshot = fixtures::snapshot();
        let config = OperatorConfig::default();

        let bad_gateway = vnet(vec![site(&["10.2.0.1"], &[])]);
        assert!(bad_gateway.translate(&snapshot, &config).is_err());

        let duplicate = vnet(vec![site(&["10.2.0.1/24", "10.2.0.1/24"], &[])]);
        assert!(duplicate.translate(&snapshot, &config).is_err());

        let bad_vlan = vnet(vec![site(&[], &[("swp5@leaf1", Some(4095))])]);
        assert!(bad_vlan.translate(&snapshot, &config).is_err());

        let unknown_port = vnet(vec![site(&[], &[("swp9@leaf1", None)])]);
        let err = unknown_port.translate(&snapshot, &config).unwrap_err();
        assert_eq!(err.to_string(), "port 'swp9@leaf1' not found");

        let mut bad_state = vnet(vec![]);
        bad_state.spec.state = "paused".into();
        assert!(bad_state.translate(&snapshot, &config).is_err());
    }

    #[test]
    fn test_differs_compares_sets() {
        let snapshot = fixtures::snapshot();
        let vnet = vnet(vec![site(&["10.2.0.1/24", "10.3.0.1/24"], &[])]);
        let meta = vnet.translate(&snapshot, &OperatorConfig::default()).unwrap();

        let remote: RemoteVNet = serde_json::from_value(json!({
            "id": 5,
            "name": "vnet-customer",
            "tenant": {"id": 1, "name": "Admin"},
            "guestTenants": [{"id": 2, "name": "k8s"}],
            "sites": [{"id": 1, "name": "santa-clara"}],
            "state": "active",
            "gateways": [{"prefix": "10.3.0.1/24"}, {"prefix": "10.2.0.1/24"}]
        }))
        .unwrap();
        assert!(!VNetMeta::differs(&meta, &remote));

        let mut disabled = remote.clone();
        disabled.state = "disabled".into();
        assert!(VNetMeta::differs(&meta, &disabled));
    }

    #[test]
    fn test_payload_shape() {
        let spec = VNetMetaSpec {
            name: "vnet-customer".into(),
            tenant_id: 1,
            site_ids: vec![1],
            state: "active".into(),
            gateways: vec!["10.2.0.1/24".into()],
            vpc_id: Some(61),
            ..Default::default()
        };
        let payload = VNetMeta::payload(&spec);
        assert_eq!(payload["tenant"]["id"], 1);
        assert_eq!(payload["sites"][0]["id"], 1);
        assert_eq!(payload["gateways"][0]["prefix"], "10.2.0.1/24");
        assert_eq!(payload["vpc"]["id"], 61);
    }
}
