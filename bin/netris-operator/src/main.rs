//! Netris operator: syncs k8s.netris.ai resources with a Netris controller
//! and derives load balancers and Calico peering from cluster state.

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use kube::Client;
use netris_client::NetrisClient;
use netris_storage::Storage;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

mod config;
mod controllers;
#[cfg(test)]
mod fake;
mod metrics;
mod telemetry;
mod watchers;

use crate::config::OperatorConfig;
use controllers::Context;
use metrics::Metrics;

/// Netris operator for Kubernetes
#[derive(Parser, Debug)]
#[command(name = "netris-operator", version, about, long_about = None)]
struct Cli {
    /// Path of the YAML config file
    #[arg(long, env = "NOPERATOR_CONFIG", default_value = "/netris-operator/config.yml")]
    config: PathBuf,

    /// Listen address of the metrics and health endpoint
    #[arg(long, env = "NOPERATOR_METRICS_ADDR", default_value = "0.0.0.0:8080")]
    metrics_addr: SocketAddr,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the controllers and watchers (default)
    Run,
    /// Print every CRD as a multi-document YAML stream and exit
    Crd,
}

fn render_crds() -> Result<String> {
    let mut out = String::new();
    for crd in netris_api::all_crds() {
        out.push_str("---\n");
        out.push_str(&serde_yaml::to_string(&crd).context("Failed to serialize CRD")?);
    }
    Ok(out)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Crd) = cli.command {
        print!("{}", render_crds()?);
        return Ok(());
    }

    let config = OperatorConfig::load(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    config.validate().context("Invalid configuration")?;

    telemetry::init(config.log_dev_mode);
    info!("Starting netris-operator...");

    let netris = Arc::new(
        NetrisClient::new(config.client_config()).context("Failed to create Netris client")?,
    );
    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;
    let metrics = Arc::new(Metrics::new().context("Failed to register metrics")?);
    let storage = Arc::new(Storage::new());

    let ctx = Arc::new(Context {
        client,
        netris: netris.clone(),
        storage: storage.clone(),
        config: Arc::new(config),
        metrics: metrics.clone(),
    });

    {
        let metrics = metrics.clone();
        let storage = storage.clone();
        let addr = cli.metrics_addr;
        tokio::spawn(async move {
            if let Err(e) = metrics::serve(addr, metrics, storage).await {
                error!("Metrics server error: {}", e);
            }
        });
    }

    info!("Loading Netris storage...");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, exiting...");
            return Ok(());
        }
        _ = storage.load(netris.as_ref(), watchers::WATCH_INTERVAL, |ok| metrics.storage_refresh(ok)) => {}
    }

    {
        let storage = storage.clone();
        let metrics = metrics.clone();
        tokio::spawn(async move {
            storage
                .run(netris.as_ref(), watchers::WATCH_INTERVAL, |ok| metrics.storage_refresh(ok))
                .await
        });
    }

    tokio::spawn(watchers::lbwatcher::run(ctx.clone()));
    tokio::spawn(watchers::calicowatcher::run(ctx.clone()));
    let controllers = tokio::spawn(controllers::run(ctx));

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("Shutdown signal received, exiting..."),
        _ = controllers => info!("Controllers stopped, exiting..."),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["netris-operator"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.metrics_addr.port(), 8080);
    }

    #[test]
    fn test_crd_subcommand() {
        let cli = Cli::parse_from(["netris-operator", "--config", "/tmp/operator.yaml", "crd"]);
        assert!(matches!(cli.command, Some(Commands::Crd)));
        assert_eq!(cli.config, PathBuf::from("/tmp/operator.yaml"));
    }

    #[test]
    fn test_render_crds() {
        let rendered = render_crds().unwrap();
        assert_eq!(rendered.matches("---\n").count(), netris_api::all_crds().len());
        assert!(rendered.contains("name: bgps.k8s.netris.ai"));
    }
}
