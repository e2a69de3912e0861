use crate::config::OperatorConfig;
use crate::controllers::resolve;
use crate::controllers::resource::{meta_accessors, MetaKind, SpecKind};
use crate::controllers::{Error, Result};
use kube::ResourceExt;
use netris_api::v1alpha1::{Subnet, SubnetMeta, SubnetMetaSpec};
use netris_client::models::IpamEntry;
use netris_client::Endpoint;
use netris_storage::Snapshot;
use serde_json::{json, Value};

const PURPOSES: &[&str] = &["common", "loopback", "management", "load-balancer", "nat", "inactive"];

impl SpecKind for Subnet {
    type Meta = SubnetMeta;
    const KIND: &'static str = "subnet";

    fn translate(&self, snapshot: &Snapshot, _config: &OperatorConfig) -> Result<SubnetMetaSpec> {
        let spec = &self.spec;
        let prefix = resolve::network_cidr(&spec.prefix)?;

        if !PURPOSES.contains(&spec.purpose.as_str()) {
            return Err(Error::translate(format!(
                "invalid purpose '{}', expected one of {}",
                spec.purpose,
                PURPOSES.join(", ")
            )));
        }

        let default_gateway = match spec.default_gateway.as_deref() {
            None | Some("") => String::new(),
            Some(gateway) => {
                let ip = resolve::ip(gateway)?;
                if !prefix.contains(ip) {
                    return Err(Error::translate(format!(
                        "default gateway {} is outside {}",
                        gateway, prefix
                    )));
                }
                ip.to_string()
            }
        };

        Ok(SubnetMetaSpec {
            header: Default::default(),
            name: self.name_any(),
            prefix: prefix.to_string(),
            tenant_id: resolve::tenant_id(snapshot, &spec.tenant)?,
            purpose: spec.purpose.clone(),
            default_gateway,
            site_ids: resolve::site_ids(snapshot, &spec.sites)?,
        })
    }
}

impl MetaKind for SubnetMeta {
    type Owner = Subnet;
    type Spec = SubnetMetaSpec;
    type Remote = IpamEntry;

    const KIND: &'static str = "subnetmeta";
    const ENDPOINT: Endpoint = Endpoint::Subnets;

    meta_accessors!();

    fn find_by_id(snapshot: &Snapshot, id: i64) -> Option<IpamEntry> {
        snapshot.find_subnet_by_id(id).cloned()
    }

    fn find_for_import(snapshot: &Snapshot, spec: &SubnetMetaSpec) -> Option<IpamEntry> {
        snapshot.find_subnet_by_name(&spec.name).cloned()
    }

    fn remote_id(remote: &IpamEntry) -> i64 {
        remote.id
    }

    fn payload(spec: &SubnetMetaSpec) -> Value {
        json!({
            "name": spec.name,
            "prefix": spec.prefix,
            "tenant": {"id": spec.tenant_id},
            "purpose": spec.purpose,
            "defaultGateway": spec.default_gateway,
            "sites": spec.site_ids.iter().map(|id| json!({"id": id})).collect::<Vec<_>>(),
        })
    }

    fn differs(spec: &SubnetMetaSpec, remote: &IpamEntry) -> bool {
        let remote_sites: Vec<i64> = remote.sites.iter().map(|s| s.id).collect();

        spec.name != remote.name
            || spec.prefix != remote.prefix
            || spec.tenant_id != remote.tenant.id
            || spec.purpose != remote.purpose
            || spec.default_gateway != remote.default_gateway
            || !resolve::same_set(&spec.site_ids, &remote_sites)
    }

    fn remote_state(_remote: &IpamEntry) -> String {
        "Active".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::kinds::fixtures;
    use netris_api::v1alpha1::SubnetSpec;

    fn subnet(name: &str, prefix: &str, gateway: Option<&str>) -> Subnet {
        Subnet::new(
            name,
            SubnetSpec {
                prefix: prefix.into(),
                tenant: "k8s".into(),
                purpose: "common".into(),
                default_gateway: gateway.map(String::from),
                sites: vec!["santa-clara".into()],
            },
        )
    }

    #[test]
    fn test_translate_and_import_match() {
        let snapshot = fixtures::snapshot();
        let meta = subnet("k8s-nodes", "10.1.0.0/24", None)
            .translate(&snapshot, &OperatorConfig::default())
            .unwrap();
        assert_eq!(meta.tenant_id, 2);
        assert_eq!(meta.site_ids, vec![1]);

        let remote = SubnetMeta::find_for_import(&snapshot, &meta).unwrap();
        assert_eq!(remote.id, 41);
        assert!(!SubnetMeta::differs(&meta, &remote));
    }

    #[test]
    fn test_prefix_and_gateway_validation() {
        let snapshot = fixtures::snapshot();
        let config = OperatorConfig::default();
        assert!(subnet("a", "10.9.0.1/24", None).translate(&snapshot, &config).is_err());
        assert!(subnet("b", "10.9.0.0", None).translate(&snapshot, &config).is_err());
        assert!(subnet("c", "10.9.0.0/24", Some("10.8.0.1")).translate(&snapshot, &config).is_err());

        let meta = subnet("d", "10.9.0.0/24", Some("10.9.0.1"))
            .translate(&snapshot, &config)
            .unwrap();
        assert_eq!(meta.default_gateway, "10.9.0.1");
    }

    #[test]
    fn test_rejects_unknown_purpose() {
        let mut s = subnet("k8s-nodes", "10.1.0.0/24", None);
        s.spec.purpose = "storage".into();
        assert!(s
            .translate(&fixtures::snapshot(), &OperatorConfig::default())
            .is_err());
    }
}
