use axum::Router;
use axum::http::{Method, header};
use axum::response::Json;
use axum::routing::get;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::config::Config;
use crate::task::TaskStore;
use crate::task::api::v1::{ApiDoc, TaskState, create_api_router};

/// Builds the task store described by the configuration.
pub fn create_task_state(config: &Config) -> Arc<TaskState> {
    let store = if config.seed_sample_task {
        TaskStore::with_sample_task(config.id_assignment)
    } else {
        TaskStore::new(config.id_assignment)
    };
    Arc::new(TaskState::new(store))
}

/// Creates the application router: task endpoints, health check and OpenAPI document.
pub fn create_app(task_state: Arc<TaskState>) -> Router {
    Router::new()
        .route("/health", get(health_check_handler))
        .route("/api-docs/openapi.json", get(openapi_handler))
        .merge(create_api_router(task_state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([
                            Method::GET,
                            Method::POST,
                            Method::PATCH,
                            Method::PUT,
                            Method::DELETE,
                        ])
                        .allow_headers([header::CONTENT_TYPE]),
                ),
        )
}

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: Config) -> anyhow::Result<()> {
    let server_address = config.server_address();
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("Web server running on http://{}", server_address);

    let task_state = create_task_state(&config);
    tracing::info!(
        seeded = config.seed_sample_task,
        id_assignment = ?config.id_assignment,
        "Task store ready"
    );

    axum::serve(listener, create_app(task_state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
    }
}

#[tracing::instrument]
pub async fn health_check_handler() -> &'static str {
    "OK"
}

#[tracing::instrument]
pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
