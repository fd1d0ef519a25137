use axum::{
    http::HeaderValue,
    routing::get,
    Router,
};
use configuration::ServerSettings;
use database::StatsSource;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
// Note: Tracing is initialized by the binary, not here.

pub mod error;
pub mod handlers;
pub mod stats;

#[cfg(test)]
mod memory;

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn StatsSource>,
}

/// The statistics routes, mounted both at the root and under `/api`.
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/overview", get(handlers::get_overview))
        .route("/timeseries", get(handlers::get_timeseries))
        .route("/ranking/ufs", get(handlers::get_ranking_ufs))
        .route("/health", get(handlers::health))
}

/// Builds the CORS policy for the configured origins.
///
/// An explicit list allows credentials and mirrors the requested method and
/// headers. A `*` entry switches to "any origin" without credentials.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin.trim() == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin.");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

/// Assembles the full application: routes, state and middleware.
pub fn build_router(state: Arc<AppState>, server: &ServerSettings) -> Router {
    Router::new()
        .merge(api_routes())
        .nest("/api", api_routes())
        .with_state(state)
        .layer(cors_layer(&server.cors_origins))
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
}

/// The main function to configure and run the web server.
///
/// Serves until Ctrl-C (or SIGTERM on Unix), then lets in-flight requests finish.
pub async fn run_server(server: &ServerSettings, source: Arc<dyn StatsSource>) -> anyhow::Result<()> {
    let addr = server.socket_addr()?;
    let app_state = Arc::new(AppState { source });
    let app = build_router(app_state, server);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Web server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Web server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C.");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM.");
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
    tracing::info!("Shutdown signal received.");
}
