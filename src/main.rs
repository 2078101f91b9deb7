//! Local development proxy.
//!
//! Point a browser's HTTP proxy at this process and selected remote
//! resources are answered from files on disk.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────┐
//!                     │                    DEV PROXY                     │
//!                     │                                                  │
//!   Browser request   │  ┌─────────┐    ┌──────────┐    ┌────────────┐   │
//!   ──────────────────┼─▶│  proxy  │───▶│ dispatch │───▶│  routing   │   │
//!                     │  │listener │    │          │◀───│  (remap)   │   │
//!                     │  └─────────┘    └────┬─────┘    └────────────┘   │
//!                     │                      │                           │
//!                     │          local file? │ no                        │
//!                     │            ┌─────────┴──────────┐                │
//!                     │            ▼                    ▼                │
//!                     │  ┌──────────────────┐   original host ───────────┼──▶ Upstream
//!                     │  │ file server      │                            │
//!                     │  │ (remap → disk)   │                            │
//!                     │  └──────────────────┘                            │
//!                     │                                                  │
//!                     │  config (TOML, hot reload) · logging · lifecycle │
//!                     └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use dev_proxy::config::validation::validate_config;
use dev_proxy::config::watcher::ConfigWatcher;
use dev_proxy::config::{load_config, ProxyConfig};
use dev_proxy::http::HttpServer;
use dev_proxy::lifecycle::{shutdown_on_signal, Shutdown};
use dev_proxy::observability::init_tracing;

#[derive(Parser, Debug)]
#[command(name = "dev-proxy", version, about = "Serve selected remote URLs from local files")]
struct Cli {
    /// Path to the TOML configuration file (watched for changes)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.proxy_address
    #[arg(long)]
    proxy_address: Option<String>,

    /// Override listener.file_server_address
    #[arg(long)]
    file_server_address: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing("dev_proxy=info,tower_http=info");

    let cli = Cli::parse();
    tracing::info!("dev-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    let mut config = match &cli.config {
        Some(path) => load_config(path).map_err(|e| {
            tracing::error!(path = ?path, error = %e, "Failed to load configuration");
            e
        })?,
        None => ProxyConfig::default(),
    };
    if let Some(address) = cli.proxy_address {
        config.listener.proxy_address = address;
    }
    if let Some(address) = cli.file_server_address {
        config.listener.file_server_address = address;
    }
    if let Err(issues) = validate_config(&config) {
        for issue in &issues {
            tracing::error!("{}", issue);
        }
        return Err("invalid configuration".into());
    }

    tracing::info!(
        proxy_address = %config.listener.proxy_address,
        file_server_address = %config.listener.file_server_address,
        routes = config.routes.len(),
        "Configuration loaded"
    );

    let proxy_listener = bind(&config.listener.proxy_address).await?;
    let file_listener = bind(&config.listener.file_server_address).await?;

    // The watcher stops when `_watcher` is dropped at the end of main.
    let (config_updates, _watcher) = match &cli.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            match watcher.run() {
                Ok(handle) => (updates, Some(handle)),
                Err(e) => {
                    tracing::warn!(error = %e, "Config hot reload unavailable");
                    (updates, None)
                }
            }
        }
        None => (mpsc::unbounded_channel().1, None),
    };

    let shutdown = Shutdown::new();
    tokio::spawn(shutdown_on_signal(shutdown.clone()));

    let server = HttpServer::new(config);
    server
        .run(proxy_listener, file_listener, config_updates, shutdown.subscribe())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Server failed");
            e
        })?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn bind(address: &str) -> std::io::Result<TcpListener> {
    TcpListener::bind(address).await.map_err(|e| {
        tracing::error!(address = %address, error = %e, "Failed to bind listener");
        e
    })
}
