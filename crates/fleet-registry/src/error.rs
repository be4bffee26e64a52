//! Типы ошибок реестра хостов.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sea_orm::DbErr;
use serde_json::json;
use thiserror::Error;

/// Ошибки ядра реестра (хранилище, сервис, проверка ссылок).
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Хранилище недоступно ({op}): {source}")]
    StoreUnavailable {
        op: &'static str,
        #[source]
        source: DbErr,
    },

    #[error("Адрес уже зарегистрирован: {0}")]
    ConstraintViolation(String),

    #[error("Не найдено: {0}")]
    NotFound(String),

    #[error("Некорректный id задачи {0:?}: пустой или содержит ','")]
    InvalidTaskId(String),

    #[error("Хост {0} входит в группу хостов, сначала исключите его из группы")]
    Conflict(String),
}

impl RegistryError {
    /// Обернуть ошибку БД с именем операции хранилища.
    pub(crate) fn store(op: &'static str) -> impl FnOnce(DbErr) -> Self {
        move |source| RegistryError::StoreUnavailable { op, source }
    }
}

/// Ошибки HTTP-слоя.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Не авторизован: {0}")]
    Unauthorized(String),

    #[error("Не найдено: {0}")]
    NotFound(String),

    #[error("Конфликт: {0}")]
    Conflict(String),

    #[error("Истекло время ожидания: {0}")]
    Timeout(String),

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),

    #[error("Неверный запрос: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m.clone()),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
            AppError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
            AppError::Timeout(m) => (StatusCode::GATEWAY_TIMEOUT, m.clone()),
            AppError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m.clone()),
            AppError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
        };
        (status, axum::Json(json!({ "error": message }))).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(e: DbErr) -> Self {
        tracing::error!("Ошибка БД: {e}");
        AppError::Internal(format!("Ошибка БД: {e}"))
    }
}

impl From<RegistryError> for AppError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::StoreUnavailable { .. } => {
                tracing::error!("{e}");
                AppError::Internal(e.to_string())
            }
            RegistryError::ConstraintViolation(_) | RegistryError::Conflict(_) => {
                AppError::Conflict(e.to_string())
            }
            RegistryError::NotFound(_) => AppError::NotFound(e.to_string()),
            RegistryError::InvalidTaskId(_) => AppError::BadRequest(e.to_string()),
        }
    }
}
