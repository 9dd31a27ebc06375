//! Conference Controller
//!
//! Live-state service for online court hearings.
//!
//! # Servers
//!
//! - HTTP server for platform callback ingestion (default: 0.0.0.0:8080)
//! - HTTP server for health endpoints (default: 0.0.0.0:8081)
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment
//! 2. Connect to Redis (population lock)
//! 3. Build HTTP clients for the detail provider and media platform
//! 4. Assemble cache, invitation tracker, hub and dispatcher
//! 5. Start health and callback HTTP servers
//! 6. Run the daily population pass, then mark ready
//! 7. Wait for shutdown signal

#![warn(clippy::pedantic)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use conference_controller::conference::cache::ConferenceCache;
use conference_controller::config::Config;
use conference_controller::consultation::InvitationTracker;
use conference_controller::events::EventDispatcher;
use conference_controller::http::{
    callback_router, health_router, management_router, HealthState,
};
use conference_controller::hub::HubBroadcaster;
use conference_controller::jobs::populate_daily_conferences;
use conference_controller::platform::{HttpConferenceProvider, HttpVideoPlatformClient};
use conference_controller::redis::RedisLockClient;
use conference_controller::secret::ExposeSecret;
use conference_controller::service::ConferenceManagementService;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "conference_controller=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Conference Controller");

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        cc_id = %config.cc_id,
        callback_bind_address = %config.callback_bind_address,
        health_bind_address = %config.health_bind_address,
        invitation_ttl_seconds = config.invitation_ttl_seconds,
        population_lock_ttl_seconds = config.population_lock_ttl_seconds,
        "Configuration loaded successfully"
    );

    // Initialize health state
    let health_state = Arc::new(HealthState::new());

    // Initialize Redis connection (population lock)
    info!("Connecting to Redis...");
    let lock_client = RedisLockClient::new(config.redis_url.expose_secret())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to connect to Redis");
            e
        })?;
    info!("Redis connection established");

    // HTTP clients for the detail provider and media platform
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| {
            error!(error = %e, "Failed to build HTTP client");
            format!("Failed to build HTTP client: {e}")
        })?;
    let provider = Arc::new(HttpConferenceProvider::new(
        http_client.clone(),
        config.provider_base_url.clone(),
    ));
    let platform = Arc::new(HttpVideoPlatformClient::new(
        http_client,
        config.platform_base_url.clone(),
    ));

    // Core state and collaborators
    let cache = Arc::new(ConferenceCache::new());
    let invitations = Arc::new(InvitationTracker::new(Duration::from_secs(
        config.invitation_ttl_seconds,
    )));
    let (hub, mut hub_rx) = HubBroadcaster::channel();

    let dispatcher = Arc::new(EventDispatcher::new(
        Arc::clone(&cache),
        provider.clone(),
        platform,
        hub.clone(),
        Arc::clone(&invitations),
    ));
    let management = Arc::new(ConferenceManagementService::new(
        Arc::clone(&cache),
        provider.clone(),
        hub.clone(),
    ));

    let shutdown_token = CancellationToken::new();

    // Drain the hub channel to the real-time transport. The edge
    // transport is deployed separately; this process logs deliveries.
    let hub_task_token = shutdown_token.child_token();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                () = hub_task_token.cancelled() => {
                    info!("Hub drain task shutting down");
                    break;
                }
                envelope = hub_rx.recv() => {
                    match envelope {
                        Some(envelope) => {
                            debug!(
                                target: "cc.hub",
                                group = ?envelope.group,
                                "Hub message forwarded"
                            );
                        }
                        None => break,
                    }
                }
            }
        }
    });

    // Start health HTTP server (MUST succeed - fail startup if it doesn't)
    let health_addr: SocketAddr = config.health_bind_address.parse().map_err(|e| {
        error!(error = %e, addr = %config.health_bind_address, "Invalid health bind address");
        format!("Invalid health bind address: {e}")
    })?;
    let health_app: Router = health_router(Arc::clone(&health_state));

    // Bind listener BEFORE spawning to fail fast on bind errors
    let health_listener = tokio::net::TcpListener::bind(health_addr)
        .await
        .map_err(|e| {
            error!(error = %e, addr = %health_addr, "Failed to bind health server");
            format!("Failed to bind health server to {health_addr}: {e}")
        })?;
    let health_shutdown_token = shutdown_token.child_token();
    tokio::spawn(async move {
        info!(addr = %health_addr, "Health server starting");
        let server = axum::serve(health_listener, health_app).with_graceful_shutdown(async move {
            health_shutdown_token.cancelled().await;
            info!("Health server shutting down");
        });
        if let Err(e) = server.await {
            error!(error = %e, "Health server failed");
        }
    });
    info!(addr = %health_addr, "Health server started");

    // Start callback ingestion server
    let callback_addr: SocketAddr = config.callback_bind_address.parse().map_err(|e| {
        error!(error = %e, addr = %config.callback_bind_address, "Invalid callback bind address");
        format!("Invalid callback bind address: {e}")
    })?;
    let callback_app = callback_router(Arc::clone(&dispatcher)).merge(management_router(management));

    let callback_listener = tokio::net::TcpListener::bind(callback_addr)
        .await
        .map_err(|e| {
            error!(error = %e, addr = %callback_addr, "Failed to bind callback server");
            format!("Failed to bind callback server to {callback_addr}: {e}")
        })?;
    let callback_shutdown_token = shutdown_token.child_token();
    tokio::spawn(async move {
        info!(addr = %callback_addr, "Callback server starting");
        let server =
            axum::serve(callback_listener, callback_app).with_graceful_shutdown(async move {
                callback_shutdown_token.cancelled().await;
                info!("Callback server shutting down");
            });
        if let Err(e) = server.await {
            error!(error = %e, "Callback server failed");
        }
    });
    info!(addr = %callback_addr, "Callback server started");

    // Daily population pass. A failure is not fatal; cache-miss
    // loading covers any conference asked about before a retry.
    let lock_ttl = Duration::from_secs(config.population_lock_ttl_seconds);
    match populate_daily_conferences(
        &cache,
        provider.clone(),
        &lock_client,
        lock_ttl,
        &shutdown_token,
    )
    .await
    {
        Ok(outcome) => info!(outcome = ?outcome, "Daily population pass finished"),
        Err(e) => warn!(error = %e, "Daily population pass failed"),
    }

    health_state.set_ready();
    info!("Conference Controller running - press Ctrl+C to shutdown");
    shutdown_signal().await;

    info!("Shutdown signal received, initiating graceful shutdown...");

    // Readiness drops first so no new callbacks are routed our way.
    health_state.set_not_ready();
    shutdown_token.cancel();

    tokio::time::sleep(Duration::from_secs(2)).await;

    info!("Conference Controller shutdown complete");
    Ok(())
}

/// Resolve on Ctrl+C or, on unix, SIGTERM.
///
/// # Panics
///
/// Panics if a signal handler cannot be installed; a process that
/// cannot hear its shutdown signal should not keep running.
async fn shutdown_signal() {
    let ctrl_c = async {
        #[expect(
            clippy::expect_used,
            reason = "no handler means no graceful shutdown, so failing to install one is fatal"
        )]
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        #[expect(
            clippy::expect_used,
            reason = "no handler means no graceful shutdown, so failing to install one is fatal"
        )]
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
