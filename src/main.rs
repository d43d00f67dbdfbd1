//! odatalite server - OData-style query service over in-memory collections

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use odatalite::catalog::Catalog;
use odatalite::config::{FilterStage, QueryConfig, RemoteProfile};
use odatalite::network::{Router, Server};
use odatalite::service::QueryService;
use odatalite::storage::seed::demo_store;
use odatalite::storage::{EntityStore, SimulatedRemoteStore};
use std::sync::Arc;
use std::time::Duration;

/// odatalite - $filter/$select/$expand over the Products/Brands demo service
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Host to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Maximum concurrent connections
    #[arg(short = 'c', long, default_value = "100")]
    max_connections: usize,

    /// Evaluate $filter after-shaping (on the returned view) or before-shaping
    #[arg(long, default_value_t = FilterStage::AfterShaping)]
    filter_stage: FilterStage,

    /// Simulated latency per store call, in milliseconds
    #[arg(long, default_value = "0")]
    remote_latency_ms: u64,

    /// Probability that a simulated store call fails
    #[arg(long, default_value = "0.0")]
    remote_failure_rate: f64,

    /// Collections served through the simulated remote link
    #[arg(long, value_delimiter = ',', default_value = "Brands")]
    remote_collections: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    println!("odatalite v{}", env!("CARGO_PKG_VERSION"));

    let catalog = Arc::new(Catalog::demo());
    let memory = demo_store().context("Failed to load demo data")?;

    let profile = RemoteProfile::new(
        Duration::from_millis(args.remote_latency_ms),
        args.remote_failure_rate,
    );
    let store: Arc<dyn EntityStore> = if profile.is_transparent() {
        Arc::new(memory)
    } else {
        log::info!(
            "Simulating remote {:?}: latency={:?}, failure_rate={}",
            args.remote_collections,
            profile.latency(),
            profile.failure_rate()
        );
        Arc::new(
            SimulatedRemoteStore::new(memory, profile).scoped_to(args.remote_collections.clone()),
        )
    };

    let service = QueryService::new(catalog, store, QueryConfig::new(args.filter_stage));
    let server = Server::new(Arc::new(Router::new(service)), args.max_connections);

    let addr = std::net::SocketAddr::from((
        args.host
            .parse::<std::net::IpAddr>()
            .context("Invalid host address")?,
        args.port,
    ));

    println!("Server configuration:");
    println!("   - Address: {}", addr);
    println!("   - Max connections: {}", args.max_connections);
    println!("   - Filter stage: {}", args.filter_stage);
    println!();
    println!("Try: curl 'http://{}/odata/Products?$filter=Price%20gt%20100&$expand=Brand'", addr);
    println!();

    // Handle shutdown gracefully
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server.run(Some(addr)).await {
            log::error!("Server error: {}", e);
        }
    });

    // Wait for Ctrl+C
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    println!("\nShutting down server...");
    server_handle.abort();

    Ok(())
}
