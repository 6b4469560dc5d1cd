//! Protein Structure Viewer
//!
//! Serves a browser-based 3D viewer and a small JSON API that resolves
//! UniProt accessions, PDB IDs and protein names to AlphaFold DB or RCSB PDB
//! model files, proxying those files to the browser.

mod api;
mod conversion;
mod core;
mod models;

use crate::api::endpoints::{AppState, create_router};
use crate::core::config::Config;
use crate::core::logging::init_logging;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Check for --help flag
    if std::env::args().any(|arg| arg == "--help") {
        print_help();
        return;
    }

    // A missing .env file is fine
    dotenv::dotenv().ok();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            eprintln!("Configuration Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(config.effective_log_level());

    print_startup_banner(&config);

    let app_state = match AppState::new(config.clone()) {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize upstream clients: {}", e);
            std::process::exit(1);
        }
    };

    let app = create_router(app_state);

    // Bind to address
    let addr = format!("{}:{}", config.host, config.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    info!("Server listening on http://{}{}", addr, config.base_path);

    // Run server
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    info!("Server shut down gracefully");
}

/// Resolve when the process receives Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

/// Print startup banner with configuration
fn print_startup_banner(config: &Config) {
    println!("🧬 Protein Structure Viewer v{}", env!("CARGO_PKG_VERSION"));
    println!("✅ Configuration loaded successfully");
    println!("   Environment: {:?}", config.environment);
    println!("   Debug: {}", config.debug);
    println!("   Server: {}:{}", config.host, config.port);
    if !config.base_path.is_empty() {
        println!("   Base Path: {}", config.base_path);
    }
    println!("   AlphaFold API: {}", config.alphafold_api_url);
    println!("   UniProt API: {}", config.uniprot_api_url);
    println!("   RCSB Data API: {}", config.rcsb_data_url);
    println!("   Proxy Hosts: {}", config.proxy_allowed_hosts.join(", "));
    println!(
        "   Cache: {} entries, {}s TTL",
        config.cache_capacity, config.cache_ttl_secs
    );
    println!("   Request Timeout: {}s", config.request_timeout);
    println!(
        "   Model Verification: {}",
        if config.verify_models {
            "Enabled"
        } else {
            "Disabled"
        }
    );
    println!();
}

/// Print help message
fn print_help() {
    println!("Protein Structure Viewer v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: protein-viewer [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --help    Display this help message");
    println!();
    println!("Configuration is read from config.toml (or CONFIG_PATH) when present.");
    println!();
    println!("Environment variables:");
    println!("  CONFIG_PATH - Path to the TOML configuration file");
    println!("  HOST - Server host (default: 0.0.0.0)");
    println!("  PORT - Server port (default: 5000)");
    println!("  APP_ENV / FLASK_ENV - development (debug logging) or production (default: production)");
    println!("  APP_DEBUG / FLASK_DEBUG - Enable debug logging (1/true)");
    println!("  LOG_LEVEL - Logging level (default: info)");
    println!("  BASE_PATH - Mount all routes under this prefix, e.g. /viewer");
    println!("  RUST_LOG - Full tracing filter, overrides LOG_LEVEL");
    println!();
    println!("Endpoints:");
    println!("  GET  /                     Viewer page");
    println!("  POST /search               Resolve a query to a structure");
    println!("  GET  /api/structure/<id>   Structure location and metadata");
    println!("  GET  /api/metadata?id=     Structure metadata");
    println!("  GET  /api/export?id=&format=pdb|cif|json");
    println!("  GET  /proxy?url=           Stream a structure file from an allowed host");
    println!("  GET  /api/health           Health check");
}
