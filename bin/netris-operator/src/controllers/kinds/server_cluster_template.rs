use crate::config::OperatorConfig;
use crate::controllers::resource::{meta_accessors, MetaKind, SpecKind};
use crate::controllers::{Error, Result};
use kube::ResourceExt;
use netris_api::v1alpha1::{
    ServerClusterTemplate, ServerClusterTemplateMeta, ServerClusterTemplateMetaSpec,
};
use netris_client::models::ServerClusterTemplate as RemoteTemplate;
use netris_client::Endpoint;
use netris_storage::Snapshot;
use serde_json::{json, Value};

impl SpecKind for ServerClusterTemplate {
    type Meta = ServerClusterTemplateMeta;
    const KIND: &'static str = "serverclustertemplate";

    fn translate(
        &self,
        _snapshot: &Snapshot,
        _config: &OperatorConfig,
    ) -> Result<ServerClusterTemplateMetaSpec> {
        if let Some(index) = self.spec.vnets.iter().position(|v| !v.is_object()) {
            return Err(Error::translate(format!(
                "vnet template {} must be an object",
                index
            )));
        }

        Ok(ServerClusterTemplateMetaSpec {
            header: Default::default(),
            name: self.name_any(),
            vnets: self.spec.vnets.clone(),
        })
    }
}

impl MetaKind for ServerClusterTemplateMeta {
    type Owner = ServerClusterTemplate;
    type Spec = ServerClusterTemplateMetaSpec;
    type Remote = RemoteTemplate;

    const KIND: &'static str = "serverclustertemplatemeta";
    const ENDPOINT: Endpoint = Endpoint::ServerClusterTemplates;

    meta_accessors!();

    fn find_by_id(snapshot: &Snapshot, id: i64) -> Option<RemoteTemplate> {
        snapshot.find_server_cluster_template_by_id(id).cloned()
    }

    fn find_for_import(
        snapshot: &Snapshot,
        spec: &ServerClusterTemplateMetaSpec,
    ) -> Option<RemoteTemplate> {
        snapshot.find_server_cluster_template_by_name(&spec.name).cloned()
    }

    fn remote_id(remote: &RemoteTemplate) -> i64 {
        remote.id
    }

    fn payload(spec: &ServerClusterTemplateMetaSpec) -> Value {
        json!({
            "name": spec.name,
            "vnets": spec.vnets,
        })
    }

    /// Templates are compared as plain JSON, key order does not matter
    fn differs(spec: &ServerClusterTemplateMetaSpec, remote: &RemoteTemplate) -> bool {
        spec.name != remote.name || spec.vnets != remote.vnets
    }

    fn remote_state(_remote: &RemoteTemplate) -> String {
        "Active".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::kinds::fixtures;
    use netris_api::v1alpha1::ServerClusterTemplateSpec;

    fn template(vnets: Vec<Value>) -> ServerClusterTemplate {
        ServerClusterTemplate::new("gpu-template", ServerClusterTemplateSpec { vnets })
    }

    #[test]
    fn test_import_matches_by_name() {
        let snapshot = fixtures::snapshot();
        let meta = template(vec![
            json!({"type": "l3vpn", "serverNics": ["eth1"], "postfix": "east-west"}),
        ])
        .translate(&snapshot, &OperatorConfig::default())
        .unwrap();

        let remote = ServerClusterTemplateMeta::find_for_import(&snapshot, &meta).unwrap();
        assert_eq!(remote.id, 71);
        assert!(!ServerClusterTemplateMeta::differs(&meta, &remote));
        assert_eq!(
            ServerClusterTemplateMeta::payload(&meta)["vnets"][0]["postfix"],
            "east-west"
        );
    }

    #[test]
    fn test_vnet_change_is_drift() {
        let snapshot = fixtures::snapshot();
        let meta = template(vec![
            json!({"postfix": "east-west", "type": "l2vpn", "serverNics": ["eth1"]}),
        ])
        .translate(&snapshot, &OperatorConfig::default())
        .unwrap();

        let remote = ServerClusterTemplateMeta::find_by_id(&snapshot, 71).unwrap();
        assert!(ServerClusterTemplateMeta::differs(&meta, &remote));
    }

    #[test]
    fn test_rejects_non_object_vnet() {
        let err = template(vec![json!({"postfix": "a"}), json!("b")])
            .translate(&fixtures::snapshot(), &OperatorConfig::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "vnet template 1 must be an object");
    }
}
