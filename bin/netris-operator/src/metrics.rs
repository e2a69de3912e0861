//! Prometheus metrics and the metrics/health HTTP endpoint

use anyhow::Result;
use http_body_util::Full;
use hyper::{
    body::{Bytes, Incoming},
    server::conn::http1,
    service::service_fn,
    Request, Response, StatusCode,
};
use hyper_util::rt::tokio::TokioIo;
use netris_storage::Storage;
use prometheus::{
    CounterVec, Encoder, HistogramOpts, HistogramTimer, HistogramVec, Opts, Registry, TextEncoder,
};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info};

/// Operator metrics
#[derive(Clone)]
pub struct Metrics {
    pub reconciles: CounterVec,
    pub reconcile_errors: CounterVec,
    pub reconcile_duration: HistogramVec,
    pub watcher_runs: CounterVec,
    pub storage_refreshes: CounterVec,
    registry: Arc<Registry>,
}

impl Metrics {
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());

        let reconciles = CounterVec::new(
            Opts::new("netris_reconcile_total", "Reconciliations by kind"),
            &["kind"],
        )?;
        let reconcile_errors = CounterVec::new(
            Opts::new("netris_reconcile_errors_total", "Failed reconciliations by kind and error"),
            &["kind", "error"],
        )?;
        let reconcile_duration = HistogramVec::new(
            HistogramOpts::new("netris_reconcile_duration_seconds", "Reconcile duration in seconds")
                .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
            &["kind"],
        )?;
        let watcher_runs = CounterVec::new(
            Opts::new("netris_watcher_runs_total", "Watcher iterations by result"),
            &["watcher", "result"],
        )?;
        let storage_refreshes = CounterVec::new(
            Opts::new("netris_storage_refresh_total", "Netris storage refreshes by result"),
            &["result"],
        )?;

        registry.register(Box::new(reconciles.clone()))?;
        registry.register(Box::new(reconcile_errors.clone()))?;
        registry.register(Box::new(reconcile_duration.clone()))?;
        registry.register(Box::new(watcher_runs.clone()))?;
        registry.register(Box::new(storage_refreshes.clone()))?;

        Ok(Self {
            reconciles,
            reconcile_errors,
            reconcile_duration,
            watcher_runs,
            storage_refreshes,
            registry,
        })
    }

    /// Count a reconcile and time it until the returned timer drops
    pub fn reconcile(&self, kind: &str) -> HistogramTimer {
        self.reconciles.with_label_values(&[kind]).inc();
        self.reconcile_duration.with_label_values(&[kind]).start_timer()
    }

    pub fn reconcile_failure(&self, kind: &str, error: &str) {
        self.reconcile_errors.with_label_values(&[kind, error]).inc();
    }

    pub fn watcher_run(&self, watcher: &str, ok: bool) {
        let result = if ok { "success" } else { "failure" };
        self.watcher_runs.with_label_values(&[watcher, result]).inc();
    }

    pub fn storage_refresh(&self, ok: bool) {
        let result = if ok { "success" } else { "failure" };
        self.storage_refreshes.with_label_values(&[result]).inc();
    }

    /// Gather all metrics in Prometheus text format
    pub fn gather(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = vec![];
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

fn respond(status: StatusCode, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response
}

fn route(path: &str, metrics: &Metrics, storage: &Storage) -> Response<Full<Bytes>> {
    match path {
        "/metrics" => match metrics.gather() {
            Ok(body) => respond(StatusCode::OK, body),
            Err(e) => respond(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        },
        "/healthz" => respond(StatusCode::OK, "ok"),
        "/readyz" if storage.is_ready() => respond(StatusCode::OK, "ok"),
        "/readyz" => respond(StatusCode::SERVICE_UNAVAILABLE, "storage not ready"),
        _ => respond(StatusCode::NOT_FOUND, "not found"),
    }
}

async fn handle(
    req: Request<Incoming>,
    metrics: Arc<Metrics>,
    storage: Arc<Storage>,
) -> std::result::Result<Response<Full<Bytes>>, Infallible> {
    Ok(route(req.uri().path(), &metrics, &storage))
}

/// Serve /metrics, /healthz and /readyz until the process exits
pub async fn serve(addr: SocketAddr, metrics: Arc<Metrics>, storage: Arc<Storage>) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Metrics server listening on {}", addr);

    loop {
        let (stream, peer_addr) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let metrics = metrics.clone();
        let storage = storage.clone();

        tokio::task::spawn(async move {
            let service = service_fn(move |req| handle(req, metrics.clone(), storage.clone()));
            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                debug!("Error serving metrics connection from {}: {}", peer_addr, e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netris_storage::Snapshot;

    #[test]
    fn test_counters_show_up_in_output() {
        let metrics = Metrics::new().unwrap();
        drop(metrics.reconcile("vnet"));
        metrics.reconcile_failure("vnet", "netris");
        metrics.watcher_run("lbwatcher", true);
        metrics.storage_refresh(false);

        let output = metrics.gather().unwrap();
        assert!(output.contains("netris_reconcile_total{kind=\"vnet\"} 1"));
        assert!(output.contains("netris_reconcile_errors_total{error=\"netris\",kind=\"vnet\"} 1"));
        assert!(output.contains("netris_watcher_runs_total{result=\"success\",watcher=\"lbwatcher\"} 1"));
        assert!(output.contains("netris_storage_refresh_total{result=\"failure\"} 1"));
        assert!(output.contains("netris_reconcile_duration_seconds_count{kind=\"vnet\"} 1"));
    }

    #[test]
    fn test_readiness_follows_storage() {
        let metrics = Metrics::new().unwrap();
        let pending = Storage::new();
        assert_eq!(route("/readyz", &metrics, &pending).status(), StatusCode::SERVICE_UNAVAILABLE);

        let ready = Storage::with_snapshot(Snapshot::default());
        assert_eq!(route("/readyz", &metrics, &ready).status(), StatusCode::OK);
        assert_eq!(route("/healthz", &metrics, &pending).status(), StatusCode::OK);
        assert_eq!(route("/nope", &metrics, &ready).status(), StatusCode::NOT_FOUND);
        assert_eq!(route("/metrics", &metrics, &ready).status(), StatusCode::OK);
    }
}
