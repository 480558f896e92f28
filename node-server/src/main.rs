//! Node HTTP transport binary.
//!
//! Exposes the endpoint surface over `axum` and wires up a
//! [`chain::NodeScheduler`]: periodic mining, periodic peer-sync, and the
//! inbound HTTP operations that translate into ledger operations.

mod error;
mod routes;
mod state;

use std::sync::Arc;

use axum::routing::{get, put};
use axum::Router;
use tokio::signal;

use chain::{NodeConfig, NodeScheduler, TcpPeerScanner};
use routes::{amount, chain as chain_routes, consensus, mining, transactions};
use state::SharedState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "node_server=info,chain=info".to_string()),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let config = NodeConfig::default();
    let listen_addr = config.listen_addr;

    // The miner's own address. In a full deployment this would come from
    // a wallet-generated keypair; the wallet itself is an external
    // collaborator (see the crate's non-goals).
    let miner_address = format!("node-{listen_addr}");

    let scheduler: SharedState = Arc::new(NodeScheduler::new(
        config,
        miner_address,
        Box::new(TcpPeerScanner),
    ));

    scheduler.clone().spawn_peer_sync_timer();

    let app = Router::new()
        .route("/chain", get(chain_routes::get_chain))
        .route(
            "/transactions",
            get(transactions::get_transactions)
                .post(transactions::post_transaction)
                .put(transactions::put_transaction)
                .delete(transactions::delete_transactions),
        )
        .route("/mine", get(mining::mine_once))
        .route("/mine/start", get(mining::start_mining))
        .route("/amount", get(amount::get_amount))
        .route("/consensus", put(consensus::run_consensus))
        .with_state(scheduler);

    tracing::info!("node listening on http://{listen_addr}");

    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .map_err(|e| format!("failed to bind {listen_addr}: {e}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("node HTTP server error: {e}"))?;

    Ok(())
}

/// Waits for Ctrl-C and returns, used for graceful shutdown.
async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
