//! Orderline - WhatsApp ordering assistant
//!
//! Receives Cloud API webhook deliveries and walks each customer through a
//! greeting, address, catalog, order and payment conversation.

mod api;
mod config;
mod messaging;
mod runtime;
mod state_machine;

use api::{create_router, AppState};
use config::Config;
use messaging::{CloudApiClient, LoggingGateway};
use runtime::{ConversationEngine, DeferredSends, InMemoryStateStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "orderline=info,tower_http=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration: missing credentials stop startup here
    let config = Config::from_env().inspect_err(|e| {
        tracing::error!(error = %e, "Invalid configuration");
    })?;
    tracing::info!(
        phone_number_id = %config.gateway.phone_number_id,
        api_version = %config.gateway.api_version,
        signature_check = config.webhook.app_secret.is_some(),
        "Configuration loaded"
    );

    // Messaging gateway
    let client = CloudApiClient::new(&config.gateway)?;
    tracing::info!(endpoint = %client.endpoint(), "Cloud API client initialized");
    let gateway = Arc::new(LoggingGateway::new(Arc::new(client)));

    // Conversation engine
    let shutdown = CancellationToken::new();
    let engine = Arc::new(
        ConversationEngine::new(
            Arc::new(InMemoryStateStore::new()),
            gateway,
            config.conversation.clone(),
        )
        .with_deferred(DeferredSends::with_parent(&shutdown)),
    );

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(AppState::new(engine.clone(), config.webhook.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Orderline server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    engine.shutdown().await;
    tracing::info!("Server stopped");

    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM and cancels `token`
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl-C, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }

    token.cancel();
}
