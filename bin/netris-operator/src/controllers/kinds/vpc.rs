use crate::config::OperatorConfig;
use crate::controllers::resolve;
use crate::controllers::resource::{meta_accessors, MetaKind, SpecKind};
use crate::controllers::Result;
use kube::ResourceExt;
use netris_api::v1alpha1::{VPCMeta, VPCMetaSpec, VPC};
use netris_client::models::Vpc;
use netris_client::Endpoint;
use netris_storage::Snapshot;
use serde_json::{json, Value};

impl SpecKind for VPC {
    type Meta = VPCMeta;
    const KIND: &'static str = "vpc";

    fn translate(&self, snapshot: &Snapshot, _config: &OperatorConfig) -> Result<VPCMetaSpec> {
        Ok(VPCMetaSpec {
            header: Default::default(),
            name: self.name_any(),
            admin_tenant_id: resolve::tenant_id(snapshot, &self.spec.admin_tenant)?,
            guest_tenant_ids: resolve::tenant_ids(snapshot, &self.spec.guest_tenants)?,
            tags: self.spec.tags.clone(),
        })
    }
}

impl MetaKind for VPCMeta {
    type Owner = VPC;
    type Spec = VPCMetaSpec;
    type Remote = Vpc;

    const KIND: &'static str = "vpcmeta";
    const ENDPOINT: Endpoint = Endpoint::Vpcs;

    meta_accessors!();

    fn find_by_id(snapshot: &Snapshot, id: i64) -> Option<Vpc> {
        snapshot.find_vpc_by_id(id).cloned()
    }

    fn find_for_import(snapshot: &Snapshot, spec: &VPCMetaSpec) -> Option<Vpc> {
        snapshot.find_vpc_by_name(&spec.name).cloned()
    }

    fn remote_id(remote: &Vpc) -> i64 {
        remote.id
    }

    fn payload(spec: &VPCMetaSpec) -> Value {
        json!({
            "name": spec.name,
            "adminTenant": {"id": spec.admin_tenant_id},
            "guestTenant": spec.guest_tenant_ids.iter().map(|id| json!({"id": id})).collect::<Vec<_>>(),
            "tags": spec.tags,
        })
    }

    fn differs(spec: &VPCMetaSpec, remote: &Vpc) -> bool {
        let remote_guests: Vec<i64> = remote.guest_tenant.iter().map(|t| t.id).collect();

        spec.name != remote.name
            || spec.admin_tenant_id != remote.admin_tenant.id
            || !resolve::same_set(&spec.guest_tenant_ids, &remote_guests)
            || !resolve::same_set(&spec.tags, &remote.tags)
    }

    fn remote_state(_remote: &Vpc) -> String {
        "Active".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::kinds::fixtures;
    use netris_api::v1alpha1::VPCSpec;

    #[test]
    fn test_guest_tenants_drift() {
        let snapshot = fixtures::snapshot();
        let vpc = VPC::new(
            "vpc-default",
            VPCSpec {
                admin_tenant: "Admin".into(),
                guest_tenants: vec!["k8s".into()],
                tags: vec![],
            },
        );
        let meta = vpc.translate(&snapshot, &OperatorConfig::default()).unwrap();
        assert_eq!(meta.guest_tenant_ids, vec![2]);
        assert_eq!(VPCMeta::payload(&meta)["guestTenant"][0]["id"], 2);

        let remote = VPCMeta::find_for_import(&snapshot, &meta).unwrap();
        assert_eq!(remote.id, 61);
        assert!(VPCMeta::differs(&meta, &remote));
    }

    #[test]
    fn test_unknown_guest_tenant() {
        let vpc = VPC::new(
            "vpc-blue",
            VPCSpec {
                admin_tenant: "Admin".into(),
                guest_tenants: vec!["blue".into()],
                tags: vec![],
            },
        );
        let err = vpc
            .translate(&fixtures::snapshot(), &OperatorConfig::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "tenant 'blue' not found");
    }
}
