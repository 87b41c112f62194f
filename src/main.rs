// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::board_service::BoardService;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::gitlab_repository::GitLabRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    group_board, group_details, health_check, list_groups, not_found, project_board,
    project_boards,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Load configuration
    let config = load_app_config()?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(GitLabRepository::new(
        config.gitlab.host,
        config.gitlab.token,
        &config.gitlab.user_agent,
        config.gitlab.per_page,
        config.gitlab.page_concurrency,
    )?);

    // Create services (application layer)
    let board_service = BoardService::new(repository);

    // Create application state
    let state = Arc::new(AppState { board_service });

    // Warm the group and project caches without holding up startup
    let warm_state = state.clone();
    tokio::spawn(async move {
        tracing::info!("Caching GitLab objects...");
        warm_state.board_service.warm_cache().await;
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/", get(list_groups))
        .route("/groups", get(list_groups))
        .route("/groups/:id", get(group_details))
        .route("/groups/:id/boards/:board_id", get(group_board))
        .route("/projects/:id", get(project_boards))
        .route("/projects/:id/boards/:board_id", get(project_board))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.server.bind_addr.parse()?;
    tracing::info!("Starting board-dashboard service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
