use crate::config::OperatorConfig;
use crate::controllers::resolve;
use crate::controllers::resource::{meta_accessors, MetaKind, SpecKind};
use crate::controllers::Result;
use kube::ResourceExt;
use netris_api::v1alpha1::{Allocation, AllocationMeta, AllocationMetaSpec};
use netris_client::models::IpamEntry;
use netris_client::Endpoint;
use netris_storage::Snapshot;
use serde_json::{json, Value};

impl SpecKind for Allocation {
    type Meta = AllocationMeta;
    const KIND: &'static str = "allocation";

    fn translate(&self, snapshot: &Snapshot, _config: &OperatorConfig) -> Result<AllocationMetaSpec> {
        Ok(AllocationMetaSpec {
            header: Default::default(),
            name: self.name_any(),
            prefix: resolve::network_cidr(&self.spec.prefix)?.to_string(),
            tenant_id: resolve::tenant_id(snapshot, &self.spec.tenant)?,
        })
    }
}

impl MetaKind for AllocationMeta {
    type Owner = Allocation;
    type Spec = AllocationMetaSpec;
    type Remote = IpamEntry;

    const KIND: &'static str = "allocationmeta";
    const ENDPOINT: Endpoint = Endpoint::Allocations;

    meta_accessors!();

    fn find_by_id(snapshot: &Snapshot, id: i64) -> Option<IpamEntry> {
        snapshot.find_allocation_by_id(id).cloned()
    }

    fn find_for_import(snapshot: &Snapshot, spec: &AllocationMetaSpec) -> Option<IpamEntry> {
        snapshot.find_allocation_by_name(&spec.name).cloned()
    }

    fn remote_id(remote: &IpamEntry) -> i64 {
        remote.id
    }

    fn payload(spec: &AllocationMetaSpec) -> Value {
        json!({
            "name": spec.name,
            "prefix": spec.prefix,
            "tenant": {"id": spec.tenant_id},
        })
    }

    fn differs(spec: &AllocationMetaSpec, remote: &IpamEntry) -> bool {
        spec.name != remote.name || spec.prefix != remote.prefix || spec.tenant_id != remote.tenant.id
    }

    fn remote_state(_remote: &IpamEntry) -> String {
        "Active".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::kinds::fixtures;
    use netris_api::v1alpha1::AllocationSpec;

    #[test]
    fn test_translate_and_drift() {
        let snapshot = fixtures::snapshot();
        let allocation = Allocation::new(
            "lab",
            AllocationSpec {
                prefix: "10.0.0.0/8".into(),
                tenant: "Admin".into(),
            },
        );
        let meta = allocation
            .translate(&snapshot, &OperatorConfig::default())
            .unwrap();
        let remote = AllocationMeta::find_for_import(&snapshot, &meta).unwrap();
        assert_eq!(remote.id, 40);
        assert!(!AllocationMeta::differs(&meta, &remote));

        let mut moved = meta.clone();
        moved.tenant_id = 2;
        assert!(AllocationMeta::differs(&moved, &remote));
    }

    #[test]
    fn test_subnet_lookups_skip_allocations() {
        let snapshot = fixtures::snapshot();
        assert!(AllocationMeta::find_by_id(&snapshot, 41).is_none());
        assert!(AllocationMeta::find_by_id(&snapshot, 40).is_some());
    }

    #[test]
    fn test_rejects_host_prefix() {
        let allocation = Allocation::new(
            "bad",
            AllocationSpec {
                prefix: "10.0.0.1/8".into(),
                tenant: "Admin".into(),
            },
        );
        assert!(allocation
            .translate(&fixtures::snapshot(), &OperatorConfig::default())
            .is_err());
    }
}
