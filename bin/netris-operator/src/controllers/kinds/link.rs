use crate::config::OperatorConfig;
use crate::controllers::resolve;
use crate::controllers::resource::{meta_accessors, MetaKind, SpecKind};
use crate::controllers::{Error, Result};
use netris_api::v1alpha1::{Link, LinkMeta, LinkMetaSpec};
use netris_client::models::Link as RemoteLink;
use netris_client::Endpoint;
use netris_storage::Snapshot;
use serde_json::{json, Value};

impl SpecKind for Link {
    type Meta = LinkMeta;
    const KIND: &'static str = "link";

    fn translate(&self, snapshot: &Snapshot, _config: &OperatorConfig) -> Result<LinkMetaSpec> {
        let [local, remote] = self.spec.ports.as_slice() else {
            return Err(Error::translate(format!(
                "a link needs exactly two ports, got {}",
                self.spec.ports.len()
            )));
        };
        if local == remote {
            return Err(Error::translate(format!("cannot link port '{}' to itself", local)));
        }

        Ok(LinkMetaSpec {
            header: Default::default(),
            local_port_id: resolve::port(snapshot, local)?.id,
            remote_port_id: resolve::port(snapshot, remote)?.id,
        })
    }
}

impl MetaKind for LinkMeta {
    type Owner = Link;
    type Spec = LinkMetaSpec;
    type Remote = RemoteLink;

    const KIND: &'static str = "linkmeta";
    const ENDPOINT: Endpoint = Endpoint::Links;

    meta_accessors!();

    fn find_by_id(snapshot: &Snapshot, id: i64) -> Option<RemoteLink> {
        snapshot.find_link_by_id(id).cloned()
    }

    fn find_for_import(snapshot: &Snapshot, spec: &LinkMetaSpec) -> Option<RemoteLink> {
        snapshot
            .find_link_by_ports(spec.local_port_id, spec.remote_port_id)
            .cloned()
    }

    fn remote_id(remote: &RemoteLink) -> i64 {
        remote.id
    }

    fn payload(spec: &LinkMetaSpec) -> Value {
        json!({
            "local": {"id": spec.local_port_id},
            "remote": {"id": spec.remote_port_id},
        })
    }

    fn differs(spec: &LinkMetaSpec, remote: &RemoteLink) -> bool {
        !resolve::same_set(
            &[spec.local_port_id, spec.remote_port_id],
            &[remote.local.id, remote.remote.id],
        )
    }

    fn remote_state(_remote: &RemoteLink) -> String {
        "Active".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::kinds::fixtures;
    use netris_api::v1alpha1::LinkSpec;
    use netris_client::models::IdName;

    fn link(ports: &[&str]) -> Link {
        Link::new(
            "leaf1-spine1",
            LinkSpec {
                ports: ports.iter().map(|p| p.to_string()).collect(),
            },
        )
    }

    #[test]
    fn test_translate_resolves_both_ends() {
        let meta = link(&["swp5@leaf1", "swp1@spine1"])
            .translate(&fixtures::snapshot(), &OperatorConfig::default())
            .unwrap();
        assert_eq!(meta.local_port_id, 11);
        assert_eq!(meta.remote_port_id, 13);
        assert_eq!(LinkMeta::payload(&meta)["remote"]["id"], 13);
    }

    #[test]
    fn test_requires_two_existing_ports() {
        let snapshot = fixtures::snapshot();
        let config = OperatorConfig::default();
        assert!(link(&["swp5@leaf1"]).translate(&snapshot, &config).is_err());
        assert!(link(&["swp5@leaf1", "swp5@leaf1"]).translate(&snapshot, &config).is_err());
        let err = link(&["swp5@leaf1", "swp9@spine1"])
            .translate(&snapshot, &config)
            .unwrap_err();
        assert_eq!(err.to_string(), "port 'swp9@spine1' not found");
    }

    #[test]
    fn test_reversed_link_is_in_sync() {
        let meta = link(&["swp5@leaf1", "swp1@spine1"])
            .translate(&fixtures::snapshot(), &OperatorConfig::default())
            .unwrap();
        let remote = RemoteLink {
            id: 5,
            local: IdName::new(13, "swp1@spine1"),
            remote: IdName::new(11, "swp5@leaf1"),
        };
        assert!(!LinkMeta::differs(&meta, &remote));
    }
}
