//! Generic reconciler for spec resources
//!
//! Translates the user's spec into the meta resource; the meta reconciler
//! talks to Netris. Deletion goes through a finalizer so the remote object
//! is removed before the spec resource disappears.

use super::resource::{MetaKind, MetaSpec, SpecKind};
use super::{status, Context, Error, Result, STORAGE_RETRY};
use crate::config::OperatorConfig;
use kube::api::{Api, DeleteParams, Patch, PatchParams, PostParams};
use kube::{Resource, ResourceExt};
use kube_runtime::controller::Action;
use kube_runtime::finalizer::{finalizer, Event as Finalizer};
use netris_api::{
    defaulted_annotations, finalizer_name, is_imported, reclaim_policy, MetaHeader, ReclaimPolicy,
};
use netris_client::{ClientError, Endpoint, NetrisApi};
use netris_storage::Storage;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[instrument(skip(obj, ctx), fields(kind = K::KIND, name = %obj.name_any()))]
pub async fn reconcile<K: SpecKind>(obj: Arc<K>, ctx: Arc<Context>) -> Result<Action> {
    let _timer = ctx.metrics.reconcile(K::KIND);
    let ns = obj
        .namespace()
        .ok_or(Error::MissingObjectKey(".metadata.namespace"))?;
    let api: Api<K> = Api::namespaced(ctx.client.clone(), &ns);

    if obj.meta().deletion_timestamp.is_none() {
        if let Some(annotations) = defaulted_annotations(obj.annotations()) {
            debug!("Defaulting import and reclaim annotations");
            let patch = json!({ "metadata": { "annotations": annotations } });
            api.patch(&obj.name_any(), &PatchParams::default(), &Patch::Merge(&patch))
                .await?;
            return Ok(Action::await_change());
        }
    }

    finalizer(&api, &finalizer_name(K::KIND), obj, |event| async {
        match event {
            Finalizer::Apply(obj) => apply(obj, ctx.clone()).await,
            Finalizer::Cleanup(obj) => cleanup(obj, ctx.clone()).await,
        }
    })
    .await
    .map_err(|e| Error::Finalizer(Box::new(e)))
}

/// Header of the meta resource as the spec resource currently dictates
fn desired_header<K: SpecKind>(obj: &K) -> MetaHeader {
    MetaHeader {
        imported: is_imported(obj.annotations()),
        reclaim_policy: reclaim_policy(obj.annotations()) == ReclaimPolicy::Retain,
        cr_generation: obj.meta().generation.unwrap_or_default(),
        id: 0,
        cr_name: obj.name_any(),
    }
}

/// The meta spec is only rewritten when the user changed something
pub(crate) fn needs_update(current: &MetaHeader, desired: &MetaHeader) -> bool {
    current.cr_generation != desired.cr_generation
        || current.imported != desired.imported
        || current.reclaim_policy != desired.reclaim_policy
}

/// Spec to write over an existing meta resource, keeping the Netris id the
/// meta reconciler recorded. None when nothing changed.
fn replacement<S: MetaSpec>(current: &MetaHeader, mut desired: S) -> Option<S> {
    if !needs_update(current, desired.header()) {
        return None;
    }
    desired.header_mut().id = current.id;
    Some(desired)
}

#[derive(Debug)]
enum Translation<S> {
    /// Storage has not been loaded from Netris yet
    Pending,
    Failed(String),
    Ready(S),
}

async fn translation<K: SpecKind>(
    obj: &K,
    storage: &Storage,
    config: &OperatorConfig,
) -> Result<Translation<<K::Meta as MetaKind>::Spec>> {
    if !storage.is_ready() {
        return Ok(Translation::Pending);
    }
    let snapshot = storage.snapshot().await;
    match obj.translate(&snapshot, config) {
        Ok(mut spec) => {
            *spec.header_mut() = desired_header(obj);
            Ok(Translation::Ready(spec))
        }
        Err(Error::Translate(message)) => Ok(Translation::Failed(message)),
        Err(e) => Err(e),
    }
}

#[derive(Debug, PartialEq, Eq)]
enum RemoteCleanup {
    NeverCreated,
    Retained,
    Deleted,
    AlreadyGone,
}

/// Remove the remote object unless the reclaim policy keeps it
async fn delete_remote(
    netris: &dyn NetrisApi,
    endpoint: Endpoint,
    header: &MetaHeader,
) -> std::result::Result<RemoteCleanup, ClientError> {
    if header.reclaim_policy {
        return Ok(RemoteCleanup::Retained);
    }
    if header.id <= 0 {
        return Ok(RemoteCleanup::NeverCreated);
    }
    match netris.delete(endpoint, header.id).await {
        Ok(()) => Ok(RemoteCleanup::Deleted),
        Err(ClientError::Api { status: 404, .. }) => Ok(RemoteCleanup::AlreadyGone),
        Err(e) => Err(e),
    }
}

async fn apply<K: SpecKind>(obj: Arc<K>, ctx: Arc<Context>) -> Result<Action> {
    let name = obj.name_any();
    let ns = obj
        .namespace()
        .ok_or(Error::MissingObjectKey(".metadata.namespace"))?;
    let meta_name = obj.uid().ok_or(Error::MissingObjectKey(".metadata.uid"))?;
    let api: Api<K> = Api::namespaced(ctx.client.clone(), &ns);

    let desired = match translation(obj.as_ref(), &ctx.storage, &ctx.config).await? {
        Translation::Ready(spec) => spec,
        Translation::Pending => {
            debug!("Netris storage not loaded yet, retrying {}", name);
            return Ok(Action::requeue(STORAGE_RETRY));
        }
        Translation::Failed(message) => {
            warn!("Failed to translate {}: {}", name, message);
            status::patch(&api, &name, status::failure(&message)).await?;
            return Ok(Action::requeue(ctx.config.requeue_interval()));
        }
    };

    let metas: Api<K::Meta> = Api::namespaced(ctx.client.clone(), &ns);
    match metas.get_opt(&meta_name).await? {
        None => {
            let mut meta = K::Meta::build(&meta_name, desired);
            meta.meta_mut().owner_references = obj.controller_owner_ref(&()).map(|r| vec![r]);
            metas.create(&PostParams::default(), &meta).await?;
            info!("Created {} {}/{}", K::Meta::KIND, ns, meta_name);
        }
        Some(mut meta) => {
            if let Some(spec) = replacement(meta.meta_spec().header(), desired) {
                *meta.meta_spec_mut() = spec;
                metas
                    .replace(&meta_name, &PostParams::default(), &meta)
                    .await?;
                info!("Updated {} {}/{}", K::Meta::KIND, ns, meta_name);
            }
        }
    }

    Ok(Action::requeue(ctx.config.requeue_interval()))
}

async fn cleanup<K: SpecKind>(obj: Arc<K>, ctx: Arc<Context>) -> Result<Action> {
    let name = obj.name_any();
    let ns = obj
        .namespace()
        .ok_or(Error::MissingObjectKey(".metadata.namespace"))?;
    let meta_name = obj.uid().ok_or(Error::MissingObjectKey(".metadata.uid"))?;
    let metas: Api<K::Meta> = Api::namespaced(ctx.client.clone(), &ns);

    let Some(meta) = metas.get_opt(&meta_name).await? else {
        debug!("No {} left for {}", K::Meta::KIND, name);
        return Ok(Action::await_change());
    };

    let header = meta.meta_spec().header();
    match delete_remote(ctx.netris.as_ref(), K::Meta::ENDPOINT, header).await {
        Ok(RemoteCleanup::Deleted) => {
            info!("Deleted {} {} (id {}) from Netris", K::KIND, name, header.id)
        }
        Ok(RemoteCleanup::AlreadyGone) => {
            debug!("{} {} already gone from Netris", K::KIND, name)
        }
        Ok(RemoteCleanup::Retained) => {
            info!("Retaining {} {} (id {}) in Netris", K::KIND, name, header.id)
        }
        Ok(RemoteCleanup::NeverCreated) => {}
        Err(e) => {
            let api: Api<K> = Api::namespaced(ctx.client.clone(), &ns);
            status::patch(&api, &name, status::failure(&e.to_string())).await?;
            return Err(e.into());
        }
    }

    match metas.delete(&meta_name, &DeleteParams::default()).await {
        Ok(_) => {}
        Err(kube::Error::Api(err)) if err.code == 404 => {}
        Err(e) => return Err(e.into()),
    }

    Ok(Action::await_change())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::kinds::fixtures;
    use crate::fake::{Call, FakeNetris};
    use kube::api::ObjectMeta;
    use netris_api::v1alpha1::{VNetMetaSpec, VNetSpec};
    use netris_api::{VNet, IMPORT_ANNOTATION, RECLAIM_ANNOTATION};
    use netris_storage::Snapshot;

    fn header(generation: i64, imported: bool, retain: bool) -> MetaHeader {
        MetaHeader {
            imported,
            reclaim_policy: retain,
            cr_generation: generation,
            id: 12,
            cr_name: "vnet-customer".into(),
        }
    }

    #[test]
    fn test_needs_update() {
        let current = header(1, false, false);
        assert!(!needs_update(&current, &header(1, false, false)));
        assert!(needs_update(&current, &header(2, false, false)));
        assert!(needs_update(&current, &header(1, true, false)));
        assert!(needs_update(&current, &header(1, false, true)));
    }

    #[test]
    fn test_desired_header_reads_annotations() {
        let vnet = VNet {
            metadata: ObjectMeta {
                name: Some("vnet-customer".into()),
                generation: Some(3),
                annotations: Some(
                    [
                        (IMPORT_ANNOTATION.to_string(), "true".to_string()),
                        (RECLAIM_ANNOTATION.to_string(), "retain".to_string()),
                    ]
                    .into_iter()
                    .collect(),
                ),
                ..Default::default()
            },
            ..Default::default()
        };

        let header = desired_header(&vnet);
        assert!(header.imported);
        assert!(header.reclaim_policy);
        assert_eq!(header.cr_generation, 3);
        assert_eq!(header.id, 0);
        assert_eq!(header.cr_name, "vnet-customer");
    }

    fn vnet() -> VNet {
        VNet {
            metadata: ObjectMeta {
                name: Some("vnet-customer".into()),
                namespace: Some("default".into()),
                generation: Some(2),
                ..Default::default()
            },
            spec: VNetSpec {
                owner_tenant: "Admin".into(),
                state: "active".into(),
                ..Default::default()
            },
            status: None,
        }
    }

    #[tokio::test]
    async fn test_unloaded_storage_defers_translation() {
        let storage = Storage::new();

        let outcome = translation(&vnet(), &storage, &OperatorConfig::default())
            .await
            .unwrap();
        assert!(matches!(outcome, Translation::Pending));
    }

    #[tokio::test]
    async fn test_loaded_storage_reports_missing_names() {
        let storage = Storage::with_snapshot(Snapshot::default());

        let outcome = translation(&vnet(), &storage, &OperatorConfig::default())
            .await
            .unwrap();
        assert!(matches!(outcome, Translation::Failed(message) if message.contains("Admin")));
    }

    #[tokio::test]
    async fn test_translation_fills_header() {
        let storage = Storage::with_snapshot(fixtures::snapshot());

        let outcome = translation(&vnet(), &storage, &OperatorConfig::default())
            .await
            .unwrap();
        let spec = match outcome {
            Translation::Ready(spec) => spec,
            other => panic!("expected a translated spec, got {:?}", other),
        };
        assert_eq!(spec.tenant_id, 1);
        assert_eq!(spec.header.cr_generation, 2);
        assert_eq!(spec.header.cr_name, "vnet-customer");
    }

    #[test]
    fn test_replacement_keeps_recorded_id() {
        let desired = VNetMetaSpec {
            header: MetaHeader {
                id: 0,
                ..header(2, false, false)
            },
            name: "vnet-customer".into(),
            ..Default::default()
        };

        assert!(replacement(&header(2, false, false), desired.clone()).is_none());

        let replaced = replacement(&header(1, false, false), desired).unwrap();
        assert_eq!(replaced.header.id, 12);
        assert_eq!(replaced.header.cr_generation, 2);
    }

    #[tokio::test]
    async fn test_delete_remote_follows_reclaim_policy() {
        let netris = FakeNetris::new().with(Endpoint::VNets, vec![json!({"id": 12})]);

        let retained = delete_remote(&netris, Endpoint::VNets, &header(1, false, true))
            .await
            .unwrap();
        assert_eq!(retained, RemoteCleanup::Retained);
        assert!(netris.calls().is_empty());

        let deleted = delete_remote(&netris, Endpoint::VNets, &header(1, false, false))
            .await
            .unwrap();
        assert_eq!(deleted, RemoteCleanup::Deleted);
        assert!(matches!(netris.calls().as_slice(), [Call::Delete(Endpoint::VNets, 12)]));
    }

    #[tokio::test]
    async fn test_delete_remote_tolerates_missing_object() {
        let netris = FakeNetris::new();

        let gone = delete_remote(&netris, Endpoint::VNets, &header(1, false, false))
            .await
            .unwrap();
        assert_eq!(gone, RemoteCleanup::AlreadyGone);
    }

    #[tokio::test]
    async fn test_delete_remote_skips_uncreated_object() {
        let netris = FakeNetris::new();
        let never = MetaHeader {
            id: 0,
            ..header(1, false, false)
        };

        let outcome = delete_remote(&netris, Endpoint::VNets, &never).await.unwrap();
        assert_eq!(outcome, RemoteCleanup::NeverCreated);
        assert!(netris.calls().is_empty());
    }
}
