//! `blobd`: the per-node inspection daemon binary.
//!
//! Loads its catalogs from disk, then serves the `/bundles/{node_id}` and
//! `/layers/{node_id}` scoring endpoints until it receives a shutdown signal.

use std::path::PathBuf;
use std::sync::Arc;

use bloblocality::daemon::bundles::EmptyBundleManager;
use bloblocality::daemon::AppState;
use clap::Parser;

/// Command-line configuration for the node inspection daemon.
#[derive(Debug, Parser)]
#[command(name = "blobd", about = "Per-node artifact-locality inspection daemon")]
struct Args {
    /// Directory holding `apps.json` and the filesize catalog.
    #[arg(long, default_value = "/var/lib/taskc")]
    work_dir: PathBuf,

    /// Path to the image-manifest payload JSON consulted in layer mode.
    #[arg(long, default_value = "./payload.json")]
    payload_path: PathBuf,

    /// TCP port to listen on.
    #[arg(long, default_value_t = bloblocality::plugin::DEFAULT_DAEMON_PORT)]
    listen_port: u16,

    /// Container runtime CLI used for pulled-image enumeration.
    #[arg(long, default_value = "crictl")]
    runtime_cli: String,

    /// Fallback JSON snapshot consulted if the runtime CLI exec fails.
    #[arg(long, default_value = "./crictl_images.json")]
    crictl_fallback: PathBuf,

    /// Base URL of the upstream file-size service queried in live bundle mode.
    #[arg(long, default_value = "http://localhost:9000")]
    upstream_base_url: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let state = Arc::new(AppState::new(
        args.work_dir,
        args.payload_path,
        args.runtime_cli,
        args.crictl_fallback,
        args.upstream_base_url,
        Box::new(EmptyBundleManager),
    ));

    let listener = match tokio::net::TcpListener::bind(("0.0.0.0", args.listen_port)).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(port = args.listen_port, error = %err, "failed to bind listen port");
            std::process::exit(1);
        }
    };

    tracing::info!(port = args.listen_port, "blobd listening");

    let router = bloblocality::daemon::router(state);

    if let Err(err) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %err, "server exited with error");
    }
}

/// Resolve once either Ctrl+C or a SIGTERM is received, so the daemon can
/// drain in-flight requests before exiting.
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        let Ok(mut signal) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        else {
            return;
        };
        signal.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
