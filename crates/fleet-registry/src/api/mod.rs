//! HTTP API: маршрутизация и состояние приложения.

pub mod auth;
pub mod host_routes;

use crate::config::OperatorCredentials;
use crate::error::{AppError, RegistryError};
use crate::services::registry_service::HostRegistry;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use sea_orm::{ConnectionTrait, DatabaseConnection};
use std::future::Future;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Общее состояние приложения.
#[derive(Clone)]
pub struct AppState {
    pub registry: HostRegistry,
    pub jwt_secret: String,
    pub operator: OperatorCredentials,
    pub query_timeout: Duration,
}

/// Построить маршрутизатор Axum.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .merge(auth::routes())
        .nest("/api/v1", host_routes::routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Выполнить операцию реестра с ограничением по времени.
///
/// По истечении срока future отбрасывается вместе с соединением из пула.
pub async fn with_deadline<T, F>(timeout: Duration, op: &str, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, RegistryError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result.map_err(AppError::from),
        Err(_) => {
            tracing::warn!("Операция {op} не уложилась в {} мс", timeout.as_millis());
            Err(AppError::Timeout(op.to_string()))
        }
    }
}

/// GET /health — проверка работоспособности сервиса.
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let db_ok = ping(state.registry.db()).await.is_ok();
    Json(serde_json::json!({
        "status": if db_ok { "ok" } else { "error" },
        "database": db_ok,
        "service": "fleet-registry"
    }))
}

async fn ping(db: &DatabaseConnection) -> Result<(), AppError> {
    db.execute_unprepared("SELECT 1").await?;
    Ok(())
}
