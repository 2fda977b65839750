//! Blog Content Server
//!
//! Serves paginated post feeds, post details with threaded comments and
//! repository pages from SQLite, and accepts comments from logged-in users.

mod api;
mod auth;
mod blog;
mod config;
mod db;
mod errors;
mod models;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::{BlogStore, SqliteStore};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BlogStore>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting blog server");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);
    tracing::info!(
        "Page size: {}, hot list size: {}",
        config.page_size,
        config.hot_list_size
    );

    if config.restrict_comment_delete {
        tracing::info!("Comment deletion restricted to comment authors");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let store: Arc<dyn BlogStore> = Arc::new(SqliteStore::new(pool));

    let state = AppState {
        store,
        config: Arc::new(config.clone()),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Posts
        .route("/posts", get(api::list_posts))
        .route("/posts/{id}", get(api::get_post))
        .route("/posts/{id}/comments", post(api::create_comment))
        // Filtered feeds
        .route("/tags/{slug}/posts", get(api::list_tag_posts))
        .route("/categories/{id}/posts", get(api::list_category_posts))
        .route("/authors/{id}/posts", get(api::list_author_posts))
        // Comments
        .route("/comments/{id}/delete", post(api::delete_comment))
        // Repositories
        .route("/repositories", get(api::list_repositories))
        .route("/repositories/{id}", get(api::get_repository));

    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
