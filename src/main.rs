use anyhow::Context;
use clap::Parser;
use counter_cluster::config::NodeConfig;
use counter_cluster::membership::discovery::DiscoveryService;
use counter_cluster::node::ClusterNode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = NodeConfig::parse();
    let local_id = config.node_id();
    let seeds = config.initial_peers(&local_id);

    tracing::info!("Node ID: {}", local_id);

    let node = ClusterNode::new(local_id, Default::default());

    // 1. HTTP listener first: failing to bind is fatal.
    let http_addr = config.http_addr();
    let listener = tokio::net::TcpListener::bind(http_addr)
        .await
        .with_context(|| format!("failed to bind HTTP listener on {}", http_addr))?;

    // 2. UDP discovery:
    if config.disable_discovery {
        tracing::info!("Service discovery is disabled");
    } else {
        let discovery = DiscoveryService::bind(
            config.discovery_addr(),
            config.broadcast_target(),
            node.timings.broadcast_interval,
            node.registry.clone(),
            node.exchange.clone(),
        )
        .await?;
        discovery.start().await;
    }

    // 3. Register with the configured peers:
    if !seeds.is_empty() {
        let launched = node.exchange.bootstrap(seeds);
        tracing::info!("Registering with {} initial peer(s)", launched);
    }

    // 4. Health checks:
    node.health.clone().start().await;

    // 5. Spawn stats reporter:
    let registry = node.registry.clone();
    let counter = node.counter.clone();
    let report_interval = node.timings.report_interval;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(report_interval);

        loop {
            interval.tick().await;
            let peers = registry.snapshot();
            tracing::info!("Cluster stats: count={} peers={}", counter.read(), peers.len());
            for peer in peers {
                tracing::debug!("  - {}", peer);
            }
        }
    });

    // 6. Start HTTP server:
    tracing::info!("HTTP server listening on {}", http_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    axum::serve(listener, node.router())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
