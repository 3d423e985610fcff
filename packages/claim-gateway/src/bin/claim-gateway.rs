//! Claim gateway binary.

use claim_gateway::middleware::API_KEY_ENV;
use claim_gateway::proof_service::ProofServiceClient;
use claim_gateway::rpc::RpcClient;
use claim_gateway::{create_router, AppState, Config, DropClient};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting claim gateway");

    let config: Config = config::Config::builder()
        .add_source(config::File::with_name("claim-gateway").required(false))
        .add_source(config::Environment::with_prefix("CLAIM_GATEWAY"))
        .build()
        .and_then(|c| c.try_deserialize())
        .unwrap_or_else(|e| {
            // Fall back only when no config exists; parsing errors fail hard.
            let err_str = format!("{e}");
            if err_str.contains("not found") || err_str.contains("missing field") {
                warn!(error = %e, "No config file found, using defaults");
                Config::default()
            } else {
                error!(error = %e, "FATAL: Config error, fix env vars or claim-gateway.toml");
                std::process::exit(1);
            }
        });

    if let Err(e) = config.validate() {
        error!(error = %e, "FATAL: Deployment check failed");
        std::process::exit(1);
    }

    if std::env::var(API_KEY_ENV)
        .map(|k| !k.is_empty())
        .unwrap_or(false)
    {
        info!("API key auth enabled");
    } else {
        warn!("{API_KEY_ENV} not set, /claim is unprotected (dev mode)");
    }

    info!(
        chain_id = config.chain_id,
        contract = %config.contract_address,
        token_id = config.token_id,
        rpc = %config.rpc_url,
        proofs = %config.proof_service_url,
        "Configuration loaded"
    );

    let rpc = RpcClient::new(
        &config.rpc_url,
        &config.fallback_rpc_url,
        &config.wallet_rpc_url,
        config.rpc_timeout(),
    )?;
    let proofs = ProofServiceClient::new(&config.proof_service_url, config.rpc_timeout())?;
    let client = DropClient::new(rpc, proofs, config.contract()?, config.fallback_currency()?);

    client.check_network(config.chain_id).await?;
    match client.rpc().health_check().await {
        Ok(status) => info!(status, "RPC reachable"),
        Err(e) => warn!(error = %e, "RPC health check failed"),
    }

    let bind_address = config.bind_address.clone();
    let state = Arc::new(AppState::new(config, Arc::new(client))?);
    state.mark_ready();

    let cancel = CancellationToken::new();

    let state_bg = Arc::clone(&state);
    let cancel_bg = cancel.clone();
    let sweeper = tokio::spawn(async move {
        state_bg.run_sweeper(cancel_bg).await;
    });

    let app = create_router(state.clone());

    info!(address = %bind_address, "Listening");

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped, stopping sweeper...");
    cancel.cancel();
    if let Err(e) = sweeper.await {
        error!(error = %e, "Sweeper task failed");
    }

    info!(
        tracked_wallets = state.registry.len(),
        "Claim gateway shut down gracefully"
    );
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
