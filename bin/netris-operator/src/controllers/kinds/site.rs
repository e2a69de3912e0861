use crate::config::OperatorConfig;
use crate::controllers::resource::{meta_accessors, MetaKind, SpecKind};
use crate::controllers::{Error, Result};
use kube::ResourceExt;
use netris_api::v1alpha1::{Site, SiteMeta, SiteMetaSpec};
use netris_client::models::Site as RemoteSite;
use netris_client::Endpoint;
use netris_storage::Snapshot;
use serde_json::{json, Value};

/// Routing profile ids are fixed by Netris
fn routing_profile_id(name: &str) -> Result<i64> {
    match name {
        "" | "default" => Ok(1),
        "default_agg" => Ok(2),
        "full" => Ok(3),
        other => Err(Error::translate(format!(
            "invalid rohRoutingProfile '{}', expected default, default_agg or full",
            other
        ))),
    }
}

fn one_of(field: &str, value: &str, allowed: &[&str]) -> Result<String> {
    if allowed.contains(&value) {
        Ok(value.to_string())
    } else {
        Err(Error::translate(format!(
            "invalid {} '{}', expected one of {}",
            field,
            value,
            allowed.join(", ")
        )))
    }
}

impl SpecKind for Site {
    type Meta = SiteMeta;
    const KIND: &'static str = "site";

    fn translate(&self, _snapshot: &Snapshot, _config: &OperatorConfig) -> Result<SiteMetaSpec> {
        let spec = &self.spec;
        Ok(SiteMetaSpec {
            header: Default::default(),
            name: self.name_any(),
            public_asn: spec.public_asn,
            roh_asn: spec.roh_asn,
            vm_asn: spec.vm_asn,
            roh_routing_profile_id: routing_profile_id(&spec.roh_routing_profile)?,
            site_mesh: one_of(
                "siteMesh",
                &spec.site_mesh,
                &["disabled", "hub", "spoke", "dspoke"],
            )?,
            acl_default_policy: one_of("aclDefaultPolicy", &spec.acl_default_policy, &["permit", "deny"])?,
        })
    }
}

impl MetaKind for SiteMeta {
    type Owner = Site;
    type Spec = SiteMetaSpec;
    type Remote = RemoteSite;

    const KIND: &'static str = "sitemeta";
    const ENDPOINT: Endpoint = Endpoint::Sites;

    meta_accessors!();

    fn find_by_id(snapshot: &Snapshot, id: i64) -> Option<RemoteSite> {
        snapshot.find_site_by_id(id).cloned()
    }

    fn find_for_import(snapshot: &Snapshot, spec: &SiteMetaSpec) -> Option<RemoteSite> {
        snapshot.find_site_by_name(&spec.name).cloned()
    }

    fn remote_id(remote: &RemoteSite) -> i64 {
        remote.id
    }

    fn payload(spec: &SiteMetaSpec) -> Value {
        json!({
            "name": spec.name,
            "publicAsn": spec.public_asn,
            "rohAsn": spec.roh_asn,
            "vmAsn": spec.vm_asn,
            "rohRoutingProfile": {"id": spec.roh_routing_profile_id},
            "siteMesh": spec.site_mesh,
            "aclDefaultPolicy": spec.acl_default_policy,
        })
    }

    fn differs(spec: &SiteMetaSpec, remote: &RemoteSite) -> bool {
        spec.name != remote.name
            || spec.public_asn != remote.public_asn
            || spec.roh_asn != remote.roh_asn
            || spec.vm_asn != remote.vm_asn
            || spec.roh_routing_profile_id != remote.roh_routing_profile.id
            || spec.site_mesh != remote.site_mesh
            || spec.acl_default_policy != remote.acl_default_policy
    }

    fn remote_state(_remote: &RemoteSite) -> String {
        "Active".to_string()
    }
}
