use crate::config::OperatorConfig;
use crate::controllers::resolve;
use crate::controllers::resource::{meta_accessors, MetaKind, SpecKind};
use crate::controllers::{Error, Result};
use ipnetwork::IpNetwork;
use kube::ResourceExt;
use netris_api::v1alpha1::{
    InventoryProfile, InventoryProfileCustomRule, InventoryProfileMeta, InventoryProfileMetaSpec,
};
use netris_client::models::{CustomRule, InventoryProfile as RemoteProfile};
use netris_client::Endpoint;
use netris_storage::Snapshot;
use serde_json::{json, Value};

const PROTOCOLS: &[&str] = &["tcp", "udp", "icmp", "all"];

fn cidrs(values: &[String], v4: bool) -> Result<Vec<String>> {
    values
        .iter()
        .map(|value| {
            let net = resolve::host_cidr(value)?;
            if matches!(net, IpNetwork::V4(_)) != v4 {
                return Err(Error::translate(format!(
                    "'{}' is not an {} network",
                    value,
                    if v4 { "IPv4" } else { "IPv6" }
                )));
            }
            Ok(net.to_string())
        })
        .collect()
}

fn rule(rule: &InventoryProfileCustomRule) -> Result<InventoryProfileCustomRule> {
    let protocol = rule.protocol.to_lowercase();
    if !PROTOCOLS.contains(&protocol.as_str()) {
        return Err(Error::translate(format!(
            "invalid rule protocol '{}', expected tcp, udp, icmp or all",
            rule.protocol
        )));
    }
    Ok(InventoryProfileCustomRule {
        src_subnet: resolve::host_cidr(&rule.src_subnet)?.to_string(),
        src_port: rule.src_port.clone(),
        dst_port: rule.dst_port.clone(),
        protocol,
    })
}

fn rule_key(src_subnet: &str, src_port: &str, dst_port: &str, protocol: &str) -> (String, String, String, String) {
    (
        src_subnet.to_string(),
        src_port.to_string(),
        dst_port.to_string(),
        protocol.to_string(),
    )
}

impl SpecKind for InventoryProfile {
    type Meta = InventoryProfileMeta;
    const KIND: &'static str = "inventoryprofile";

    fn translate(
        &self,
        _snapshot: &Snapshot,
        _config: &OperatorConfig,
    ) -> Result<InventoryProfileMetaSpec> {
        let spec = &self.spec;
        if spec.timezone.is_empty() {
            return Err(Error::translate("timezone is required"));
        }

        Ok(InventoryProfileMetaSpec {
            header: Default::default(),
            name: self.name_any(),
            description: spec.description.clone(),
            timezone: spec.timezone.clone(),
            allow_ssh_from_ipv4: cidrs(&spec.allow_ssh_from_ipv4, true)?,
            allow_ssh_from_ipv6: cidrs(&spec.allow_ssh_from_ipv6, false)?,
            ntp_servers: spec.ntp_servers.clone(),
            dns_servers: spec
                .dns_servers
                .iter()
                .map(|s| resolve::ip(s).map(|ip| ip.to_string()))
                .collect::<Result<_>>()?,
            custom_rules: spec.custom_rules.iter().map(rule).collect::<Result<_>>()?,
        })
    }
}

impl MetaKind for InventoryProfileMeta {
    type Owner = InventoryProfile;
    type Spec = InventoryProfileMetaSpec;
    type Remote = RemoteProfile;

    const KIND: &'static str = "inventoryprofilemeta";
    const ENDPOINT: Endpoint = Endpoint::InventoryProfiles;

    meta_accessors!();

    fn find_by_id(snapshot: &Snapshot, id: i64) -> Option<RemoteProfile> {
        snapshot.find_inventory_profile_by_id(id).cloned()
    }

    fn find_for_import(snapshot: &Snapshot, spec: &InventoryProfileMetaSpec) -> Option<RemoteProfile> {
        snapshot.find_inventory_profile_by_name(&spec.name).cloned()
    }

    fn remote_id(remote: &RemoteProfile) -> i64 {
        remote.id
    }

    fn payload(spec: &InventoryProfileMetaSpec) -> Value {
        let rules: Vec<CustomRule> = spec
            .custom_rules
            .iter()
            .map(|r| CustomRule {
                src_subnet: r.src_subnet.clone(),
                src_port: r.src_port.clone(),
                dst_port: r.dst_port.clone(),
                protocol: r.protocol.clone(),
            })
            .collect();

        json!({
            "name": spec.name,
            "description": spec.description,
            "timezone": spec.timezone,
            "ipv4SshList": spec.allow_ssh_from_ipv4,
            "ipv6SshList": spec.allow_ssh_from_ipv6,
            "NTPServers": spec.ntp_servers,
            "DNSServers": spec.dns_servers,
            "customRules": rules,
        })
    }

    fn differs(spec: &InventoryProfileMetaSpec, remote: &RemoteProfile) -> bool {
        let rules: Vec<_> = spec
            .custom_rules
            .iter()
            .map(|r| rule_key(&r.src_subnet, &r.src_port, &r.dst_port, &r.protocol))
            .collect();
        let remote_rules: Vec<_> = remote
            .custom_rules
            .iter()
            .map(|r| rule_key(&r.src_subnet, &r.src_port, &r.dst_port, &r.protocol))
            .collect();

        spec.name != remote.name
            || spec.description != remote.description
            || spec.timezone != remote.timezone
            || !resolve::same_set(&spec.allow_ssh_from_ipv4, &remote.allow_ssh_from_ipv4)
            || !resolve::same_set(&spec.allow_ssh_from_ipv6, &remote.allow_ssh_from_ipv6)
            || !resolve::same_set(&spec.ntp_servers, &remote.ntp_servers)
            || !resolve::same_set(&spec.dns_servers, &remote.dns_servers)
            || !resolve::same_set(&rules, &remote_rules)
    }

    fn remote_state(_remote: &RemoteProfile) -> String {
        "Active".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::kinds::fixtures;
    use netris_api::v1alpha1::InventoryProfileSpec;

    fn profile() -> InventoryProfile {
        InventoryProfile::new(
            "default-profile",
            InventoryProfileSpec {
                description: "lab devices".into(),
                timezone: "America/Los_Angeles".into(),
                allow_ssh_from_ipv4: vec!["10.0.0.0/8".into()],
                allow_ssh_from_ipv6: vec!["2001:db8::/32".into()],
                ntp_servers: vec!["0.pool.ntp.org".into()],
                dns_servers: vec!["1.1.1.1".into()],
                custom_rules: vec![InventoryProfileCustomRule {
                    src_subnet: "10.0.0.0/8".into(),
                    src_port: "".into(),
                    dst_port: "8443".into(),
                    protocol: "TCP".into(),
                }],
            },
        )
    }

    #[test]
    fn test_translate_normalizes_rules() {
        let meta = profile()
            .translate(&fixtures::snapshot(), &OperatorConfig::default())
            .unwrap();
        assert_eq!(meta.custom_rules[0].protocol, "tcp");

        let payload = InventoryProfileMeta::payload(&meta);
        assert_eq!(payload["ipv4SshList"][0], "10.0.0.0/8");
        assert_eq!(payload["NTPServers"][0], "0.pool.ntp.org");
        assert_eq!(payload["customRules"][0]["dstPort"], "8443");
    }

    #[test]
    fn test_validation() {
        let snapshot = fixtures::snapshot();
        let config = OperatorConfig::default();

        let mut wrong_family = profile();
        wrong_family.spec.allow_ssh_from_ipv4 = vec!["2001:db8::/32".into()];
        assert!(wrong_family.translate(&snapshot, &config).is_err());

        let mut bad_protocol = profile();
        bad_protocol.spec.custom_rules[0].protocol = "sctp".into();
        assert!(bad_protocol.translate(&snapshot, &config).is_err());

        let mut bad_dns = profile();
        bad_dns.spec.dns_servers = vec!["dns.local".into()];
        assert!(bad_dns.translate(&snapshot, &config).is_err());
    }

    #[test]
    fn test_payload_matches_remote_after_roundtrip() {
        let meta = profile()
            .translate(&fixtures::snapshot(), &OperatorConfig::default())
            .unwrap();
        let mut payload = InventoryProfileMeta::payload(&meta);
        payload["id"] = json!(51);
        let remote: RemoteProfile = serde_json::from_value(payload).unwrap();
        assert!(!InventoryProfileMeta::differs(&meta, &remote));

        let mut changed = remote.clone();
        changed.timezone = "UTC".into();
        assert!(InventoryProfileMeta::differs(&meta, &changed));
    }
}
