//! Реестр рабочих хостов кластера выполнения задач.

pub mod api;
pub mod config;
pub mod error;
pub mod services;


use api::AppState;
use config::ServerConfig;
use fleet_migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use services::group_guard::DbHostGroups;
use services::registry_service::HostRegistry;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

/// Запустить реестр хостов и обслуживать запросы до Ctrl+C.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = config.listen.parse()?;

    info!("Подключение к базе данных: {}", config.db_url);
    let db = Database::connect(&config.db_url).await?;
    Migrator::up(&db, None).await?;

    let app = api::build_router(build_state(&config, db));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        "Реестр хостов слушает {addr}, оператор: {}, окно свежести: {} с",
        config.operator.username(),
        config.liveness_window_secs
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Реестр хостов остановлен");
    Ok(())
}

/// Собрать состояние HTTP-слоя поверх уже мигрированной БД.
pub fn build_state(config: &ServerConfig, db: DatabaseConnection) -> AppState {
    let groups = Arc::new(DbHostGroups::new(db.clone()));
    AppState {
        registry: HostRegistry::new(db, groups)
            .with_liveness_window(config.liveness_window_secs),
        jwt_secret: config.jwt_secret.clone(),
        operator: config.operator.clone(),
        query_timeout: config.query_timeout,
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Не удалось подписаться на сигнал завершения: {e}");
        std::future::pending::<()>().await;
    }
    info!("Получен сигнал завершения, останавливаю сервер...");
}
