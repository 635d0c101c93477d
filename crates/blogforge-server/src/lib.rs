pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

pub use state::AppState;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Pipeline
        .route("/api/pipeline/run", post(routes::pipeline::trigger_run))
        // Job runs
        .route("/api/jobs", get(routes::jobs::list_jobs))
        .route("/api/jobs/{id}", get(routes::jobs::get_job))
        // Posts
        .route("/api/posts", get(routes::posts::list_posts))
        .route("/api/posts/{slug}", get(routes::posts::get_post))
        // Keywords
        .route(
            "/api/keywords",
            get(routes::keywords::list_keywords).post(routes::keywords::create_keyword),
        )
        .layer(cors)
        .with_state(app_state)
}

/// Start the admin API server on `port`.
pub async fn serve(app_state: AppState, port: u16) -> anyhow::Result<()> {
    let app = build_router(app_state);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("admin API listening on http://localhost:{port}");

    axum::serve(listener, app).await?;
    Ok(())
}
