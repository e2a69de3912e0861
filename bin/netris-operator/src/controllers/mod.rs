//! Reconcilers for every Netris kind
//!
//! Each kind runs two controllers: one for the spec resource and one for
//! its meta resource. Both are generic over the traits in [`resource`].

pub mod error;
pub mod kinds;
pub mod meta;
pub mod resolve;
pub mod resource;
pub mod spec;
pub mod status;

pub use error::{Error, Result};
pub use resource::{MetaKind, MetaSpec, SpecKind};

use crate::config::OperatorConfig;
use crate::metrics::Metrics;
use futures::future::{join_all, BoxFuture};
use futures::{FutureExt, StreamExt};
use kube::{Api, Client, ResourceExt};
use kube_runtime::controller::{Action, Controller};
use kube_runtime::watcher::Config as WatcherConfig;
use netris_api::v1alpha1::{
    Allocation, Controller as NetrisController, InventoryProfile, Link, Nat, Server,
    ServerCluster, ServerClusterTemplate, Site, Softgate, Subnet, Switch, VNet, BGP, EBGP, L4LB,
    VPC,
};
use netris_client::NetrisApi;
use netris_storage::Storage;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Requeue delay while the Netris storage has not been loaded yet
pub(crate) const STORAGE_RETRY: Duration = Duration::from_secs(5);

/// State shared by every reconciler and watcher
pub struct Context {
    pub client: Client,
    pub netris: Arc<dyn NetrisApi>,
    pub storage: Arc<Storage>,
    pub config: Arc<OperatorConfig>,
    pub metrics: Arc<Metrics>,
}

fn error_policy<K: ResourceExt>(kind: &'static str, obj: &K, err: &Error, ctx: &Context) -> Action {
    warn!("Reconcile of {} {} failed: {}", kind, obj.name_any(), err);
    ctx.metrics.reconcile_failure(kind, err.metric_label());
    Action::requeue(ctx.config.requeue_interval())
}

async fn run_spec<K: SpecKind>(ctx: Arc<Context>) {
    info!("Starting {} controller", K::KIND);
    let specs: Api<K> = Api::all(ctx.client.clone());
    let metas: Api<K::Meta> = Api::all(ctx.client.clone());

    let mut stream = Controller::new(specs, WatcherConfig::default().any_semantic())
        .owns(metas, WatcherConfig::default().any_semantic())
        .shutdown_on_signal()
        .run(
            spec::reconcile::<K>,
            |obj, err, ctx| error_policy(K::KIND, obj.as_ref(), err, &ctx),
            ctx,
        )
        .boxed();

    while let Some(item) = stream.next().await {
        match item {
            Ok((obj, _)) => debug!("Reconciled {} {}", K::KIND, obj.name),
            Err(e) => debug!("{} controller: {}", K::KIND, e),
        }
    }
}

async fn run_meta<M: MetaKind>(ctx: Arc<Context>) {
    info!("Starting {} controller", M::KIND);
    let metas: Api<M> = Api::all(ctx.client.clone());

    let mut stream = Controller::new(metas, WatcherConfig::default().any_semantic())
        .shutdown_on_signal()
        .run(
            meta::reconcile::<M>,
            |obj, err, ctx| error_policy(M::KIND, obj.as_ref(), err, &ctx),
            ctx,
        )
        .boxed();

    while let Some(item) = stream.next().await {
        match item {
            Ok((obj, _)) => debug!("Reconciled {} {}", M::KIND, obj.name),
            Err(e) => debug!("{} controller: {}", M::KIND, e),
        }
    }
}

fn pair<K: SpecKind>(ctx: &Arc<Context>) -> Vec<BoxFuture<'static, ()>> {
    vec![
        run_spec::<K>(ctx.clone()).boxed(),
        run_meta::<K::Meta>(ctx.clone()).boxed(),
    ]
}

/// Run the spec and meta controllers of every kind until shutdown
pub async fn run(ctx: Arc<Context>) {
    let controllers: Vec<BoxFuture<'static, ()>> = [
        pair::<VNet>(&ctx),
        pair::<BGP>(&ctx),
        pair::<EBGP>(&ctx),
        pair::<Switch>(&ctx),
        pair::<Server>(&ctx),
        pair::<Softgate>(&ctx),
        pair::<NetrisController>(&ctx),
        pair::<Site>(&ctx),
        pair::<Link>(&ctx),
        pair::<L4LB>(&ctx),
        pair::<Subnet>(&ctx),
        pair::<Allocation>(&ctx),
        pair::<VPC>(&ctx),
        pair::<InventoryProfile>(&ctx),
        pair::<ServerClusterTemplate>(&ctx),
        pair::<ServerCluster>(&ctx),
        pair::<Nat>(&ctx),
    ]
    .into_iter()
    .flatten()
    .collect();

    join_all(controllers).await;
    info!("All controllers stopped");
}
