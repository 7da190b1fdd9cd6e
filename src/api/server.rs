//! HTTP server implementation

use std::time::Duration;

use axum::http::HeaderValue;
use axum::routing::get;
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::AllowOrigin;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing::warn;

use crate::api::handlers;
use crate::api::handlers::AppState;
use crate::api::routes;
use crate::config::AppConfig;
use crate::Result;

const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed_origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}

/// Full application router: `/` banner plus everything under `/api`
pub fn build_router(state: AppState, enable_cors: bool) -> Router {
    let allowed_origins = state.config.server.allowed_origins.clone();
    let mut app = Router::new()
        .route("/", get(handlers::root))
        .nest("/api", routes::api_routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    if enable_cors {
        info!("✅ CORS enabled");
        app = app.layer(cors_layer(&allowed_origins));
    }
    app
}

/// Start the API server
pub async fn serve_api(config: &AppConfig, host: String, port: u16, enable_cors: bool) -> Result<()> {
    info!("🚀 Starting {} API server...", config.advisor_name());

    let state = AppState::from_config(config).await?;
    let passages = state.advisor.retriever().store().count().await?;
    if passages == 0 {
        warn!("Vector store is empty; run `wisdomrag index` to build it");
    } else {
        info!("📚 {} scripture passages indexed", passages);
    }

    let _cleanup = state
        .auth
        .sessions()
        .spawn_cleanup(SESSION_CLEANUP_INTERVAL);
    let app = build_router(state, enable_cors);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 API server listening on http://{}", addr);
    info!("📋 RESTful API available at http://{}/api", addr);
    info!("");
    info!("Available endpoints:");
    info!("  GET  /api/health              - Health check");
    info!("  GET  /api/traditions          - List traditions");
    info!("  POST /api/chat                - Ask for guidance");
    info!("  POST /api/compare             - Compare traditions");
    info!("  GET  /api/daily-wisdom        - Daily wisdom");
    info!("  POST /api/journal             - Journal reflection");
    info!("  *    /api/auth/*              - Accounts");
    info!("  *    /api/chats/*             - Chat threads");
    info!("  GET  /api/search/*            - Search");
    info!("  *    /api/community/*         - Community matching");

    axum::serve(listener, app).await?;

    Ok(())
}
