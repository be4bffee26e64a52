//! Маршруты хостов: регистрация и heartbeat воркеров, управление для оператора.

use crate::api::auth::Operator;
use crate::api::{with_deadline, AppState};
use crate::error::AppError;
use crate::services::registry_service::{HeartbeatAck, HostView, RegisterData, Registration};
use axum::extract::{Path, Query, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Размер страницы списка по умолчанию.
pub const DEFAULT_PAGE_LIMIT: u64 = 20;

// ── Типы запросов/ответов ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub hostname: String,
    pub ip: String,
    pub port: u16,
    #[serde(default)]
    pub weight: i32,
    pub version: String,
    #[serde(default)]
    pub remark: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    /// id новой записи; пусто, если адрес уже был зарегистрирован
    pub id: Option<String>,
    pub already_registered: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatRequest {
    pub ip: String,
    pub port: u16,
    #[serde(default)]
    pub running_tasks: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatResponse {
    pub ok: bool,
    /// false — адрес неизвестен, воркеру нужно зарегистрироваться
    pub registered: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct StopRequest {
    pub id: String,
    /// Новое значение; если не задано — переключить текущее
    pub stop: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct StopResponse {
    pub id: String,
    pub stop: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/hosts", get(list_hosts))
        .route("/hosts/register", post(register))
        .route("/hosts/heartbeat", post(heartbeat))
        .route("/hosts/batch", post(get_hosts_batch))
        .route("/hosts/stop", put(change_stop))
        .route("/hosts/by-address/{address}", get(get_host_by_address))
        .route("/hosts/{id}", get(get_host).delete(delete_host))
}

// ── Обработчики воркеров ─────────────────────────────────────────────────────

/// POST /api/v1/hosts/register — регистрация воркера.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, AppError> {
    validate_endpoint(&req.ip, req.port)?;
    if req.hostname.trim().is_empty() {
        return Err(AppError::BadRequest("hostname обязателен".into()));
    }

    let data = RegisterData {
        hostname: req.hostname,
        ip: req.ip,
        port: req.port,
        weight: req.weight,
        version: req.version,
        remark: req.remark,
    };
    let outcome =
        with_deadline(state.query_timeout, "register", state.registry.register(data)).await?;

    Ok(Json(match outcome {
        Registration::Created { id } => RegisterResponse {
            id: Some(id),
            already_registered: false,
        },
        Registration::AlreadyRegistered => RegisterResponse {
            id: None,
            already_registered: true,
        },
    }))
}

/// POST /api/v1/hosts/heartbeat — heartbeat воркера.
async fn heartbeat(
    State(state): State<AppState>,
    Json(req): Json<HeartbeatRequest>,
) -> Result<Json<HeartbeatResponse>, AppError> {
    validate_endpoint(&req.ip, req.port)?;

    let ack = with_deadline(
        state.query_timeout,
        "heartbeat",
        state
            .registry
            .heartbeat(&req.ip, req.port, &req.running_tasks),
    )
    .await?;

    Ok(Json(HeartbeatResponse {
        ok: true,
        registered: ack == HeartbeatAck::Recorded,
    }))
}

// ── Обработчики оператора ────────────────────────────────────────────────────

/// GET /api/v1/hosts — постраничный список хостов.
async fn list_hosts(
    State(state): State<AppState>,
    Operator(_claims): Operator,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<HostView>>, AppError> {
    let offset = q.offset.unwrap_or(0);
    let limit = match q.limit {
        None | Some(0) => DEFAULT_PAGE_LIMIT,
        Some(limit) => limit,
    };

    let hosts = with_deadline(
        state.query_timeout,
        "list",
        state.registry.list(offset, limit),
    )
    .await?;
    Ok(Json(hosts))
}

/// GET /api/v1/hosts/{id}
async fn get_host(
    State(state): State<AppState>,
    Operator(_claims): Operator,
    Path(id): Path<String>,
) -> Result<Json<HostView>, AppError> {
    check_id(&id)?;
    let host = with_deadline(state.query_timeout, "get_by_id", state.registry.get_by_id(&id))
        .await?;
    Ok(Json(host))
}

/// GET /api/v1/hosts/by-address/{address}
async fn get_host_by_address(
    State(state): State<AppState>,
    Operator(_claims): Operator,
    Path(address): Path<String>,
) -> Result<Json<HostView>, AppError> {
    let host = with_deadline(
        state.query_timeout,
        "get_by_address",
        state.registry.get_by_address(&address),
    )
    .await?;
    Ok(Json(host))
}

/// POST /api/v1/hosts/batch — выборка по списку id, отсутствующие пропускаются.
async fn get_hosts_batch(
    State(state): State<AppState>,
    Operator(_claims): Operator,
    Json(req): Json<BatchRequest>,
) -> Result<Json<Vec<HostView>>, AppError> {
    let hosts = with_deadline(
        state.query_timeout,
        "get_by_ids",
        state.registry.get_by_ids(&req.ids),
    )
    .await?;
    Ok(Json(hosts))
}

/// PUT /api/v1/hosts/stop — остановить/возобновить хост.
async fn change_stop(
    State(state): State<AppState>,
    Operator(claims): Operator,
    Json(req): Json<StopRequest>,
) -> Result<Json<StopResponse>, AppError> {
    check_id(&req.id)?;

    let stop = match req.stop {
        Some(stop) => {
            with_deadline(
                state.query_timeout,
                "set_stop",
                state.registry.set_stop(&req.id, stop),
            )
            .await?;
            stop
        }
        None => {
            with_deadline(
                state.query_timeout,
                "toggle_stop",
                state.registry.toggle_stop(&req.id),
            )
            .await?
        }
    };

    tracing::info!("Оператор {} изменил stop хоста {}: {stop}", claims.sub, req.id);
    Ok(Json(StopResponse { id: req.id, stop }))
}

/// DELETE /api/v1/hosts/{id}
async fn delete_host(
    State(state): State<AppState>,
    Operator(claims): Operator,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_id(&id)?;
    with_deadline(state.query_timeout, "delete", state.registry.delete(&id)).await?;
    tracing::info!("Оператор {} удалил хост {id}", claims.sub);

    Ok(Json(serde_json::json!({ "ok": true })))
}

// ── Проверки ─────────────────────────────────────────────────────────────────

/// `ip` воркера — IP-литерал или DNS-имя; адрес хоста строится как `ip:port`.
fn validate_endpoint(ip: &str, port: u16) -> Result<(), AppError> {
    if ip.parse::<IpAddr>().is_err() && !is_dns_name(ip) {
        return Err(AppError::BadRequest(format!(
            "Некорректный адрес воркера: {ip:?}"
        )));
    }
    if port == 0 {
        return Err(AppError::BadRequest("port должен быть больше 0".into()));
    }
    Ok(())
}

/// Имя хоста по RFC 1123: метки из букв, цифр и '-', не длиннее 63 символов.
fn is_dns_name(name: &str) -> bool {
    if name.is_empty() || name.len() > 253 {
        return false;
    }
    name.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
    })
}

fn check_id(id: &str) -> Result<(), AppError> {
    if id.trim().is_empty() {
        return Err(AppError::BadRequest("id обязателен".into()));
    }
    Ok(())
}
