use crate::config::OperatorConfig;
use crate::controllers::resolve;
use crate::controllers::resource::{meta_accessors, MetaKind, SpecKind};
use crate::controllers::{Error, Result};
use kube::ResourceExt;
use netris_api::v1alpha1::{ServerCluster, ServerClusterMeta, ServerClusterMetaSpec};
use netris_client::models::ServerCluster as RemoteCluster;
use netris_client::Endpoint;
use netris_storage::Snapshot;
use serde_json::{json, Value};

impl SpecKind for ServerCluster {
    type Meta = ServerClusterMeta;
    const KIND: &'static str = "servercluster";

    fn translate(&self, snapshot: &Snapshot, _config: &OperatorConfig) -> Result<ServerClusterMetaSpec> {
        let spec = &self.spec;
        let template = snapshot
            .find_server_cluster_template_by_name(&spec.template)
            .ok_or_else(|| {
                Error::translate(format!("server cluster template '{}' not found", spec.template))
            })?;

        Ok(ServerClusterMetaSpec {
            header: Default::default(),
            name: self.name_any(),
            admin_tenant_id: resolve::tenant_id(snapshot, &spec.admin)?,
            site_id: resolve::site_id(snapshot, &spec.site)?,
            vpc_id: resolve::vpc_id(snapshot, &spec.vpc)?,
            template_id: template.id,
            tags: spec.tags.clone(),
        })
    }
}

impl MetaKind for ServerClusterMeta {
    type Owner = ServerCluster;
    type Spec = ServerClusterMetaSpec;
    type Remote = RemoteCluster;

    const KIND: &'static str = "serverclustermeta";
    const ENDPOINT: Endpoint = Endpoint::ServerClusters;

    meta_accessors!();

    fn find_by_id(snapshot: &Snapshot, id: i64) -> Option<RemoteCluster> {
        snapshot.find_server_cluster_by_id(id).cloned()
    }

    fn find_for_import(snapshot: &Snapshot, spec: &ServerClusterMetaSpec) -> Option<RemoteCluster> {
        snapshot.find_server_cluster_by_name(&spec.name).cloned()
    }

    fn remote_id(remote: &RemoteCluster) -> i64 {
        remote.id
    }

    fn payload(spec: &ServerClusterMetaSpec) -> Value {
        json!({
            "name": spec.name,
            "admin": {"id": spec.admin_tenant_id},
            "site": {"id": spec.site_id},
            "vpc": {"id": spec.vpc_id},
            "srvClusterTemplate": {"id": spec.template_id},
            "tags": spec.tags,
        })
    }

    fn differs(spec: &ServerClusterMetaSpec, remote: &RemoteCluster) -> bool {
        spec.name != remote.name
            || spec.admin_tenant_id != remote.admin.id
            || spec.site_id != remote.site.id
            || spec.vpc_id != remote.vpc.id
            || spec.template_id != remote.template.id
            || !resolve::same_set(&spec.tags, &remote.tags)
    }

    fn remote_state(remote: &RemoteCluster) -> String {
        remote.status.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::kinds::fixtures;
    use netris_api::v1alpha1::ServerClusterSpec;
    use netris_client::models::IdName;

    fn cluster(template: &str) -> ServerCluster {
        ServerCluster::new(
            "gpu-cluster",
            ServerClusterSpec {
                admin: "Admin".into(),
                site: "santa-clara".into(),
                vpc: "vpc-default".into(),
                template: template.into(),
                tags: vec!["gpu".into()],
            },
        )
    }

    #[test]
    fn test_translate_resolves_references() {
        let meta = cluster("gpu-template")
            .translate(&fixtures::snapshot(), &OperatorConfig::default())
            .unwrap();
        assert_eq!(
            (meta.admin_tenant_id, meta.site_id, meta.vpc_id, meta.template_id),
            (1, 1, 61, 71)
        );
        assert_eq!(ServerClusterMeta::payload(&meta)["srvClusterTemplate"]["id"], 71);
    }

    #[test]
    fn test_unknown_template() {
        let err = cluster("cpu-template")
            .translate(&fixtures::snapshot(), &OperatorConfig::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "server cluster template 'cpu-template' not found");
    }

    #[test]
    fn test_status_comes_from_remote() {
        let meta = cluster("gpu-template")
            .translate(&fixtures::snapshot(), &OperatorConfig::default())
            .unwrap();
        let remote = RemoteCluster {
            id: 90,
            name: "gpu-cluster".into(),
            admin: IdName::new(1, "Admin"),
            site: IdName::new(1, "santa-clara"),
            vpc: IdName::new(61, "vpc-default"),
            template: IdName::new(71, "gpu-template"),
            tags: vec!["gpu".into()],
            status: "provisioned".into(),
        };
        assert!(!ServerClusterMeta::differs(&meta, &remote));
        assert_eq!(ServerClusterMeta::remote_state(&remote), "provisioned");
    }
}
