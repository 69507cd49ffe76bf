//! Trio Server Library
//!
//! HTTP surface for the speech tools, the group discussion and the SDLC
//! cycle.

pub mod routes;
pub mod state;

use axum::{
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Once;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use state::AppState;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing subscriber (only once)
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let _ = tracing_subscriber::registry()
            .with(tracing_subscriber::EnvFilter::new(
                std::env::var("RUST_LOG").unwrap_or_else(|_| {
                    "trio=info,trio_core=info,trio_server=debug,tower_http=debug".into()
                }),
            ))
            .with(tracing_subscriber::fmt::layer())
            .try_init();
    });
}

/// Build the Axum router with all routes
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        // Speech tools
        .route("/stt", post(routes::speech_to_text))
        .route("/tts", post(routes::text_to_speech))
        // Discussion
        .route("/api/discuss", post(routes::discuss))
        // Sessions and SDLC
        .route(
            "/api/sessions",
            get(routes::list_sessions).post(routes::create_session),
        )
        .route(
            "/api/sessions/:app/:user/:session/sdlc",
            post(routes::run_sdlc),
        )
        .route(
            "/api/sessions/:app/:user/:session/retest",
            post(routes::retest),
        )
        .route(
            "/api/sessions/:app/:user/:session/fix",
            post(routes::fix_again),
        )
        .route(
            "/api/sessions/:app/:user/:session/listen",
            post(routes::listen),
        )
        .route(
            "/api/sessions/:app/:user/:session/artifacts/:key",
            get(routes::get_artifact),
        )
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Run the Trio server on the specified port
pub async fn run_server(port: u16) -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("Starting Trio Server...");

    let cwd = std::env::current_dir()?;
    let config = match trio_core::load_config(&cwd) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "Falling back to default configuration");
            trio_core::TrioConfig::default()
        }
    };

    let state = AppState::new(config)?;
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": trio_core::version()
    }))
}
