//! Generic reconciler for meta resources
//!
//! Pushes the resolved spec to Netris and reports the outcome on the
//! owning spec resource.

use super::resource::{MetaKind, MetaSpec};
use super::{status, Context, Error, Result, STORAGE_RETRY};
use kube::api::{Api, Patch, PatchParams};
use kube::{Resource, ResourceExt};
use kube_runtime::controller::Action;
use netris_client::NetrisApi;
use netris_storage::{Snapshot, Storage};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// What a sync did to the remote object
#[derive(Debug)]
pub enum SyncOutcome<R> {
    /// An existing object was adopted
    Imported(R),
    Created(i64),
    /// The recorded id vanished from Netris and the object was created again
    Recreated(i64),
    Updated(R),
    InSync(R),
}

impl<R> SyncOutcome<R> {
    /// Id to record in the meta resource, when it changed
    fn new_id(&self, remote_id: impl Fn(&R) -> i64) -> Option<i64> {
        match self {
            SyncOutcome::Imported(remote) => Some(remote_id(remote)),
            SyncOutcome::Created(id) | SyncOutcome::Recreated(id) => Some(*id),
            SyncOutcome::Updated(_) | SyncOutcome::InSync(_) => None,
        }
    }
}

fn outcome_status<M: MetaKind>(outcome: &SyncOutcome<M::Remote>) -> Value {
    match outcome {
        SyncOutcome::Imported(remote) => {
            status::success("Imported", &M::remote_state(remote), M::status_extras(remote))
        }
        SyncOutcome::Created(_) | SyncOutcome::Recreated(_) => {
            status::provisioning("Created in Netris")
        }
        SyncOutcome::Updated(remote) | SyncOutcome::InSync(remote) => status::success(
            "Successfully reconciled",
            &M::remote_state(remote),
            M::status_extras(remote),
        ),
    }
}

/// Look up in the current snapshot, refreshing once on a miss
async fn lookup<R>(
    storage: &Storage,
    netris: &dyn NetrisApi,
    find: impl Fn(&Snapshot) -> Option<R>,
) -> Result<Option<R>> {
    let seen = storage.snapshot().await;
    if let Some(found) = find(&*seen) {
        return Ok(Some(found));
    }
    storage.refresh_stale(netris, &seen).await?;
    Ok(find(&*storage.snapshot().await))
}

/// Bring the remote object in line with the meta spec
pub async fn sync<M: MetaKind>(
    spec: &M::Spec,
    netris: &dyn NetrisApi,
    storage: &Storage,
) -> Result<SyncOutcome<M::Remote>> {
    let header = spec.header();

    if header.id == 0 {
        if header.imported {
            if let Some(remote) =
                lookup(storage, netris, |s| M::find_for_import(s, spec)).await?
            {
                info!("Imported {} {} (id {})", M::KIND, header.cr_name, M::remote_id(&remote));
                return Ok(SyncOutcome::Imported(remote));
            }
            warn!(
                "{} {} not found in Netris, creating it instead",
                M::KIND,
                header.cr_name
            );
        }
        let id = netris.create(M::ENDPOINT, &M::payload(spec)).await?;
        info!("Created {} {} in Netris (id {})", M::KIND, header.cr_name, id);
        return Ok(SyncOutcome::Created(id));
    }

    match lookup(storage, netris, |s| M::find_by_id(s, header.id)).await? {
        None => {
            let id = netris.create(M::ENDPOINT, &M::payload(spec)).await?;
            warn!(
                "{} {} (id {}) disappeared from Netris, recreated as id {}",
                M::KIND,
                header.cr_name,
                header.id,
                id
            );
            Ok(SyncOutcome::Recreated(id))
        }
        Some(remote) if M::differs(spec, &remote) => {
            netris
                .update(M::ENDPOINT, header.id, &M::payload(spec))
                .await?;
            info!("Updated {} {} in Netris", M::KIND, header.cr_name);
            Ok(SyncOutcome::Updated(remote))
        }
        Some(remote) => {
            debug!("{} {} is in sync", M::KIND, header.cr_name);
            Ok(SyncOutcome::InSync(remote))
        }
    }
}

#[instrument(skip(meta, ctx), fields(kind = M::KIND, name = %meta.name_any()))]
pub async fn reconcile<M: MetaKind>(meta: Arc<M>, ctx: Arc<Context>) -> Result<Action> {
    let _timer = ctx.metrics.reconcile(M::KIND);
    if meta.meta().deletion_timestamp.is_some() {
        return Ok(Action::await_change());
    }
    if !ctx.storage.is_ready() {
        debug!("Netris storage not loaded yet");
        return Ok(Action::requeue(STORAGE_RETRY));
    }

    let ns = meta
        .namespace()
        .ok_or(Error::MissingObjectKey(".metadata.namespace"))?;
    let spec = meta.meta_spec();
    let owner_name = spec.header().cr_name.clone();
    let owners: Api<M::Owner> = Api::namespaced(ctx.client.clone(), &ns);

    let Some(owner) = owners.get_opt(&owner_name).await? else {
        debug!("Owner {}/{} is gone", ns, owner_name);
        return Ok(Action::await_change());
    };
    if owner.meta().deletion_timestamp.is_some() {
        return Ok(Action::await_change());
    }

    match sync::<M>(spec, ctx.netris.as_ref(), &ctx.storage).await {
        Ok(outcome) => {
            if let Some(id) = outcome.new_id(M::remote_id) {
                let metas: Api<M> = Api::namespaced(ctx.client.clone(), &ns);
                let patch = json!({ "spec": { "id": id } });
                metas
                    .patch(&meta.name_any(), &PatchParams::default(), &Patch::Merge(&patch))
                    .await?;
            }
            status::patch(&owners, &owner_name, outcome_status::<M>(&outcome)).await?;
        }
        Err(e) => {
            warn!("Failed to sync {} {}: {}", M::KIND, owner_name, e);
            status::patch(&owners, &owner_name, status::failure(&e.to_string())).await?;
            return Err(e);
        }
    }

    Ok(Action::requeue(ctx.config.requeue_interval()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{Call, FakeNetris};
    use netris_api::v1alpha1::{MetaHeader, VNetMeta, VNetMetaSpec};
    use netris_client::Endpoint;

    fn vnet_spec(id: i64, imported: bool) -> VNetMetaSpec {
        VNetMetaSpec {
            header: MetaHeader {
                imported,
                id,
                cr_name: "vnet-customer".into(),
                ..Default::default()
            },
            name: "vnet-customer".into(),
            tenant_id: 1,
            site_ids: vec![1],
            state: "active".into(),
            gateways: vec!["10.0.0.1/24".into()],
            ..Default::default()
        }
    }

    fn remote_vnet(id: i64, state: &str) -> Value {
        json!({
            "id": id,
            "name": "vnet-customer",
            "tenant": {"id": 1, "name": "Admin"},
            "sites": [{"id": 1, "name": "santa-clara"}],
            "state": state,
            "gateways": [{"prefix": "10.0.0.1/24"}],
            "provisioning": "Active"
        })
    }

    #[tokio::test]
    async fn test_creates_when_no_id() {
        let netris = FakeNetris::new();
        let storage = Storage::new();

        let outcome = sync::<VNetMeta>(&vnet_spec(0, false), &netris, &storage)
            .await
            .unwrap();
        assert!(matches!(outcome, SyncOutcome::Created(100)));
        assert!(matches!(netris.calls()[0], Call::Create(Endpoint::VNets, _)));
    }

    #[tokio::test]
    async fn test_import_adopts_existing_object() {
        let netris = FakeNetris::new().with(Endpoint::VNets, vec![remote_vnet(7, "active")]);
        let storage = Storage::new();

        let outcome = sync::<VNetMeta>(&vnet_spec(0, true), &netris, &storage)
            .await
            .unwrap();
        assert_eq!(outcome.new_id(|v| v.id), Some(7));
        assert!(netris.calls().is_empty());
    }

    #[tokio::test]
    async fn test_import_without_match_creates() {
        let netris = FakeNetris::new();
        let storage = Storage::new();

        let outcome = sync::<VNetMeta>(&vnet_spec(0, true), &netris, &storage)
            .await
            .unwrap();
        assert!(matches!(outcome, SyncOutcome::Created(_)));
    }

    #[tokio::test]
    async fn test_updates_on_drift() {
        let netris = FakeNetris::new().with(Endpoint::VNets, vec![remote_vnet(7, "disabled")]);
        let storage = Storage::new();

        let outcome = sync::<VNetMeta>(&vnet_spec(7, false), &netris, &storage)
            .await
            .unwrap();
        assert!(matches!(outcome, SyncOutcome::Updated(_)));
        assert!(matches!(netris.calls()[0], Call::Update(Endpoint::VNets, 7, _)));
    }

    #[tokio::test]
    async fn test_in_sync_makes_no_calls() {
        let netris = FakeNetris::new().with(Endpoint::VNets, vec![remote_vnet(7, "active")]);
        let storage = Storage::new();

        let outcome = sync::<VNetMeta>(&vnet_spec(7, false), &netris, &storage)
            .await
            .unwrap();
        assert!(matches!(outcome, SyncOutcome::InSync(_)));
        assert!(netris.calls().is_empty());

        let status = outcome_status::<VNetMeta>(&outcome);
        assert_eq!(status["status"], "Success");
        assert_eq!(status["state"], "Active");
    }

    #[tokio::test]
    async fn test_recreates_vanished_object() {
        let netris = FakeNetris::new();
        let storage = Storage::new();

        let outcome = sync::<VNetMeta>(&vnet_spec(7, false), &netris, &storage)
            .await
            .unwrap();
        assert_eq!(outcome.new_id(|v| v.id), Some(100));
        assert!(matches!(outcome, SyncOutcome::Recreated(100)));
    }
}
