//! HTTP server implementation

use std::sync::Arc;

use axum::Router;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::handlers::AppState;
use crate::api::routes;
use crate::config::AppConfig;
use crate::service::RagService;
use crate::Result;

/// Assemble the router with its middleware.
///
/// `max_concurrency` bounds in-flight requests across all routes together.
pub fn build_app(service: Arc<RagService>, enable_cors: bool, max_concurrency: usize) -> Router {
    let state = AppState { service };

    let mut app = Router::new()
        .nest("/api", routes::api_routes(state))
        .layer(GlobalConcurrencyLimitLayer::new(max_concurrency.max(1)))
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        info!("✅ CORS enabled");
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Start the API server
pub async fn serve_api(
    config: &AppConfig,
    host: String,
    port: u16,
    enable_cors: bool,
) -> Result<()> {
    info!("🚀 Starting computeless-rag API server...");

    let service = Arc::new(RagService::new(config)?);
    let app = build_app(service, enable_cors, config.server.max_concurrency);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 API server listening on http://{}", addr);
    info!("Available endpoints:");
    info!("  GET  /api/health - Health check");
    info!("  POST /api/query  - Answer a question");
    info!("  POST /api/store  - Store text as a vector");

    axum::serve(listener, app).await?;

    Ok(())
}
