//! wafd — the WAF manager daemon.
//!
//! Serves the deploy/delete API and drives the lifecycle manager against
//! the selected resource store:
//! - `in-cluster`: Kubernetes API via the pod's service account
//! - `out-of-cluster`: Kubernetes API via a kubeconfig file
//! - `embedded`: local redb database, no cluster
//!
//! # Usage
//!
//! ```text
//! wafd serve --image tsuru/nginx-modsecurity:1.0 --mode out-of-cluster --port 8000
//! ```

mod settings;

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use waf_core::WafConfig;
use waf_core::config::StoreKind;
use waf_manager::LifecycleManager;

use crate::settings::Settings;

#[derive(Parser)]
#[command(name = "wafd", about = "WAF-protected proxy deployment manager")]
struct Cli {
    /// Log output format.
    #[arg(long, value_enum, default_value = "text", global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the deploy/delete API.
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Path to a wafd.toml config file.
    #[arg(long, env = "WAFD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Port to listen on.
    #[arg(long)]
    pub port: Option<u16>,

    /// Container image used for every managed proxy.
    #[arg(long, env = "WAF_IMAGE")]
    pub image: Option<String>,

    /// Resource store backend.
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Legacy switch: true selects out-of-cluster, false in-cluster.
    #[arg(
        long,
        env = "WAF_OUTSIDE_CLUSTER",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub outside_cluster: Option<bool>,

    /// Kubeconfig for out-of-cluster mode (default: $KUBECONFIG or ~/.kube/config).
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,

    /// Data directory for embedded mode.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

/// `--mode` values. Spelled like `StoreKind` in `wafd.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    InCluster,
    OutOfCluster,
    Embedded,
}

impl From<ModeArg> for StoreKind {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::InCluster => StoreKind::InCluster,
            ModeArg::OutOfCluster => StoreKind::OutOfCluster,
            ModeArg::Embedded => StoreKind::Embedded,
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,wafd=debug,waf_manager=debug,waf_store=debug"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match cli.command {
        Command::Serve(args) => run_serve(args).await,
    }
}

async fn run_serve(args: ServeArgs) -> anyhow::Result<()> {
    let file = match &args.config {
        Some(path) => {
            info!(path = ?path, "loading config file");
            WafConfig::from_file(path)?
        }
        None => WafConfig::default(),
    };
    let settings = Settings::resolve(&args, &file)?;
    info!(mode = %settings.store, image = %settings.manager.image, "WAF manager starting");

    // ── Resource store + manager ───────────────────────────────

    let store = waf_store::connect(&settings.store).await?;
    let manager = LifecycleManager::new(store, settings.manager);

    // ── API server ─────────────────────────────────────────────

    let router = waf_api::build_router(manager);
    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));

    info!(%addr, "API server starting");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("WAF manager stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
