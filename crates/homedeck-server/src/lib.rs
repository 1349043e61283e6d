//! HTTP surface for homedeck.
//!
//! Two POST endpoints, `/device-admin` (the [`AdminGateway`]) and
//! `/relay-webhook` (the [`Relay`]), plus `/health`. Every response carries
//! permissive CORS headers and both endpoints answer `OPTIONS` preflights
//! with an empty 200.

mod error;
mod routes;

use std::future::Future;
use std::time::Duration;

use axum::{
    Router,
    http::{HeaderValue, header},
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use homedeck_core::{AdminGateway, Relay};

pub use error::ApiError;

/// Headers browsers may send on cross-origin calls to either endpoint.
const ALLOWED_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

/// Shared handler state.
///
/// `gateway` is `None` when the data service is not configured; gateway
/// requests then fail closed while the relay keeps working.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Option<AdminGateway>,
    pub relay: Relay,
}

impl AppState {
    pub fn new(gateway: Option<AdminGateway>, relay: Relay) -> Self {
        Self { gateway, relay }
    }
}

/// Build the router with all endpoints.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route(
            "/device-admin",
            post(routes::device_admin).options(routes::preflight),
        )
        .route(
            "/relay-webhook",
            post(routes::relay_webhook).options(routes::preflight),
        )
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        ))
        .layer(TraceLayer::new_for_http())
}

/// Serve until `shutdown` resolves, then give background deliveries up to
/// `grace` to finish.
pub async fn serve<F>(
    listener: TcpListener,
    state: AppState,
    shutdown: F,
    grace: Duration,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let relay = state.relay.clone();
    info!(address = %listener.local_addr()?, "homedeck listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    if !relay.drain(grace).await {
        warn!(
            pending = relay.in_flight(),
            "background deliveries still running after grace period"
        );
    }
    info!("homedeck shut down");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl+C"),
        () = terminate => info!("received terminate signal"),
    }
}
