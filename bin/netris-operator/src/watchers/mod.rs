//! Periodic watchers deriving Netris resources from cluster state
//!
//! - `lbwatcher` turns `LoadBalancer` Services into L4LB resources
//! - `calicowatcher` peers Calico nodes with the fabric through BGP resources

pub mod calicowatcher;
pub mod lbwatcher;

use crate::controllers::Context;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error};

/// Seconds between watcher iterations
pub const WATCH_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum WatcherError {
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// Required Netris inventory is missing from storage
    #[error("{0}")]
    Inventory(String),

    /// Calico resources are missing or inconsistent
    #[error("{0}")]
    Calico(String),

    /// Some operations of a pass failed; each was logged on its own
    #[error("{0} operation(s) failed")]
    Partial(usize),
}

pub type Result<T, E = WatcherError> = std::result::Result<T, E>;

/// Run `step` every [`WATCH_INTERVAL`] until the task is dropped. Errors are
/// logged and counted, the next tick runs regardless.
pub async fn run_periodic<F, Fut>(name: &'static str, ctx: Arc<Context>, step: F)
where
    F: Fn(Arc<Context>) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let mut ticker = interval(WATCH_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if !ctx.storage.is_ready() {
            debug!("{}: waiting for Netris storage", name);
            continue;
        }

        match step(ctx.clone()).await {
            Ok(()) => ctx.metrics.watcher_run(name, true),
            Err(e) => {
                error!("{}: {}", name, e);
                ctx.metrics.watcher_run(name, false);
            }
        }
    }
}

/// Log every error collected during one pass. The pass counts as failed
/// when there was any.
pub(crate) fn log_errors(name: &str, errors: &[WatcherError]) -> Result<()> {
    for e in errors {
        error!("{}: {}", name, e);
    }
    match errors.len() {
        0 => Ok(()),
        n => Err(WatcherError::Partial(n)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_errors_fails_the_pass() {
        assert!(log_errors("lbwatcher", &[]).is_ok());

        let errors = vec![
            WatcherError::Inventory("default site not found".into()),
            WatcherError::Calico("Nodes are missing".into()),
        ];
        let err = log_errors("lbwatcher", &errors).unwrap_err();
        assert!(matches!(err, WatcherError::Partial(2)));
        assert_eq!(err.to_string(), "2 operation(s) failed");
    }
}
