use crate::config::OperatorConfig;
use crate::controllers::resolve;
use crate::controllers::resource::{meta_accessors, MetaKind, SpecKind};
use crate::controllers::{Error, Result};
use kube::ResourceExt;
use netris_api::v1alpha1::{Nat, NatMeta, NatMetaSpec};
use netris_client::models::Nat as RemoteNat;
use netris_client::Endpoint;
use netris_storage::Snapshot;
use serde_json::{json, Value};

const ACTIONS: [&str; 4] = ["DNAT", "SNAT", "ACCEPT_SNAT", "MASQUERADE"];
const PROTOCOLS: [&str; 4] = ["all", "tcp", "udp", "icmp"];

fn one_of(field: &str, value: String, allowed: &[&str]) -> Result<String> {
    if allowed.contains(&value.as_str()) {
        Ok(value)
    } else {
        Err(Error::translate(format!(
            "invalid {} '{}', expected one of {}",
            field,
            value,
            allowed.join(", ")
        )))
    }
}

fn optional_cidr(value: &str) -> Result<String> {
    if value.is_empty() {
        return Ok(String::new());
    }
    resolve::host_cidr(value).map(|net| net.to_string())
}

impl SpecKind for Nat {
    type Meta = NatMeta;
    const KIND: &'static str = "nat";

    fn translate(&self, snapshot: &Snapshot, _config: &OperatorConfig) -> Result<NatMetaSpec> {
        let spec = &self.spec;
        let state = match spec.state.as_str() {
            "" => "enabled".to_string(),
            state => one_of("state", state.to_string(), &["enabled", "disabled"])?,
        };

        Ok(NatMetaSpec {
            header: Default::default(),
            name: self.name_any(),
            comment: spec.comment.clone(),
            state,
            site_id: resolve::site_id(snapshot, &spec.site)?,
            action: one_of("action", spec.action.to_uppercase(), &ACTIONS)?,
            protocol: one_of("protocol", spec.protocol.to_lowercase(), &PROTOCOLS)?,
            src_address: optional_cidr(&spec.src_address)?,
            src_port: spec.src_port.clone(),
            dst_address: optional_cidr(&spec.dst_address)?,
            dst_port: spec.dst_port.clone(),
            snat_to_ip: spec.snat_to_ip.clone(),
            snat_to_pool: spec.snat_to_pool.clone(),
            dnat_to_ip: spec.dnat_to_ip.clone(),
            dnat_to_port: spec.dnat_to_port,
        })
    }
}

impl MetaKind for NatMeta {
    type Owner = Nat;
    type Spec = NatMetaSpec;
    type Remote = RemoteNat;

    const KIND: &'static str = "natmeta";
    const ENDPOINT: Endpoint = Endpoint::Nats;

    meta_accessors!();

    fn find_by_id(snapshot: &Snapshot, id: i64) -> Option<RemoteNat> {
        snapshot.find_nat_by_id(id).cloned()
    }

    fn find_for_import(snapshot: &Snapshot, spec: &NatMetaSpec) -> Option<RemoteNat> {
        snapshot.find_nat_by_name(&spec.name).cloned()
    }

    fn remote_id(remote: &RemoteNat) -> i64 {
        remote.id
    }

    fn payload(spec: &NatMetaSpec) -> Value {
        json!({
            "name": spec.name,
            "comment": spec.comment,
            "state": spec.state,
            "site": {"id": spec.site_id},
            "action": spec.action,
            "protocol": spec.protocol,
            "sourceAddress": spec.src_address,
            "sourcePort": spec.src_port,
            "destinationAddress": spec.dst_address,
            "destinationPort": spec.dst_port,
            "snatToIp": spec.snat_to_ip,
            "snatToPool": spec.snat_to_pool,
            "dnatToIp": spec.dnat_to_ip,
            "dnatToPort": spec.dnat_to_port.to_string(),
        })
    }

    fn differs(spec: &NatMetaSpec, remote: &RemoteNat) -> bool {
        // Netris drops the prefix length of single host destinations
        let dst_host = spec.dst_address.split('/').next().unwrap_or_default();
        let dst_differs =
            remote.destination_address != spec.dst_address && remote.destination_address != dst_host;
        let ports_differ = remote.has_ports()
            && (remote.source_port != spec.src_port || remote.destination_port != spec.dst_port);

        spec.name != remote.name
            || spec.comment != remote.comment
            || spec.state != remote.state.value
            || spec.site_id != remote.site.id
            || spec.action != remote.action_name()
            || spec.protocol != remote.protocol.value
            || spec.src_address != remote.source_address
            || dst_differs
            || ports_differ
            || spec.snat_to_ip != remote.snat_to_ip
            || spec.snat_to_pool != remote.snat_to_pool
            || spec.dnat_to_ip != remote.dnat_to_ip
            || spec.dnat_to_port != remote.dnat_to_port
    }

    fn remote_state(_remote: &RemoteNat) -> String {
        "OK".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::kinds::fixtures;
    use netris_api::v1alpha1::NatSpec;

    fn dnat() -> Nat {
        Nat::new(
            "web-dnat",
            NatSpec {
                site: "santa-clara".into(),
                action: "dnat".into(),
                protocol: "TCP".into(),
                src_address: "0.0.0.0/0".into(),
                src_port: "1-65535".into(),
                dst_address: "203.0.113.10/32".into(),
                dst_port: "443".into(),
                dnat_to_ip: "10.1.0.20/32".into(),
                dnat_to_port: 8443,
                ..Default::default()
            },
        )
    }

    fn remote(meta: &NatMetaSpec) -> RemoteNat {
        serde_json::from_value(json!({
            "id": 8,
            "name": meta.name,
            "state": {"value": "enabled", "label": "Enabled"},
            "site": {"id": 1, "name": "santa-clara"},
            "action": {"value": "dnat", "label": "DNAT"},
            "protocol": {"value": "tcp", "label": "TCP"},
            "sourceAddress": "0.0.0.0/0",
            "sourcePort": "1-65535",
            "destinationAddress": "203.0.113.10",
            "destinationPort": "443",
            "dnatToIp": "10.1.0.20/32",
            "dnatToPort": 8443
        }))
        .unwrap()
    }

    #[test]
    fn test_translate_normalizes_fields() {
        let meta = dnat()
            .translate(&fixtures::snapshot(), &OperatorConfig::default())
            .unwrap();
        assert_eq!(meta.site_id, 1);
        assert_eq!(meta.state, "enabled");
        assert_eq!(meta.action, "DNAT");
        assert_eq!(meta.protocol, "tcp");

        let payload = NatMeta::payload(&meta);
        assert_eq!(payload["site"]["id"], 1);
        assert_eq!(payload["destinationPort"], "443");
        assert_eq!(payload["dnatToPort"], "8443");
    }

    #[test]
    fn test_translate_rejects_bad_input() {
        let snapshot = fixtures::snapshot();
        let config = OperatorConfig::default();

        let mut unknown_site = dnat();
        unknown_site.spec.site = "boston".into();
        assert_eq!(
            unknown_site.translate(&snapshot, &config).unwrap_err().to_string(),
            "site 'boston' not found"
        );

        let mut bad_action = dnat();
        bad_action.spec.action = "forward".into();
        assert!(bad_action.translate(&snapshot, &config).is_err());

        let mut bad_address = dnat();
        bad_address.spec.src_address = "any".into();
        assert!(bad_address.translate(&snapshot, &config).is_err());
    }

    #[test]
    fn test_differs_tolerates_host_destination() {
        let meta = dnat()
            .translate(&fixtures::snapshot(), &OperatorConfig::default())
            .unwrap();
        let mut remote = remote(&meta);
        assert!(!NatMeta::differs(&meta, &remote));

        remote.destination_port = "8080".into();
        assert!(NatMeta::differs(&meta, &remote));

        remote.destination_port = "443".into();
        remote.dnat_to_port = 80;
        assert!(NatMeta::differs(&meta, &remote));
    }

    #[test]
    fn test_ports_ignored_without_tcp_or_udp() {
        let mut nat = dnat();
        nat.spec.protocol = "icmp".into();
        let meta = nat
            .translate(&fixtures::snapshot(), &OperatorConfig::default())
            .unwrap();

        let mut remote = remote(&meta);
        remote.protocol.value = "icmp".into();
        remote.source_port = String::new();
        remote.destination_port = String::new();
        assert!(!NatMeta::differs(&meta, &remote));
    }

    #[test]
    fn test_accept_matches_accept_snat() {
        let mut nat = dnat();
        nat.spec.action = "accept_snat".into();
        let meta = nat
            .translate(&fixtures::snapshot(), &OperatorConfig::default())
            .unwrap();

        let mut remote = remote(&meta);
        remote.action.label = "ACCEPT".into();
        assert!(!NatMeta::differs(&meta, &remote));
    }
}
