//! Аутентификация оператора: вход и JWT-экстрактор для маршрутов управления.

use crate::api::AppState;
use crate::error::AppError;
use axum::extract::{FromRequestParts, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Время жизни токена оператора.
const OPERATOR_TOKEN_TTL_SECS: usize = 12 * 3600;

/// Claims JWT-токена оператора.
#[derive(Debug, Serialize, Deserialize)]
pub struct OperatorClaims {
    /// Имя оператора
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
}

impl OperatorClaims {
    fn issued_now(username: &str) -> Self {
        let iat = chrono::Utc::now().timestamp().max(0) as usize;
        OperatorClaims {
            sub: username.to_string(),
            exp: iat + OPERATOR_TOKEN_TTL_SECS,
            iat,
        }
    }

    /// Подписать claims секретом реестра.
    pub fn sign(&self, jwt_secret: &str) -> Result<String, AppError> {
        let key = EncodingKey::from_secret(jwt_secret.as_bytes());
        jsonwebtoken::encode(&Header::default(), self, &key)
            .map_err(|e| AppError::Internal(format!("Ошибка создания токена: {e}")))
    }

    /// Проверить подпись и срок действия токена.
    pub fn verify(token: &str, jwt_secret: &str) -> Result<Self, AppError> {
        let key = DecodingKey::from_secret(jwt_secret.as_bytes());
        jsonwebtoken::decode::<OperatorClaims>(token, &key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| AppError::Unauthorized(format!("Невалидный токен: {e}")))
    }
}

/// Экстрактор аутентифицированного оператора.
pub struct Operator(pub OperatorClaims);

impl FromRequestParts<AppState> for Operator {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        OperatorClaims::verify(token, &state.jwt_secret).map(Operator)
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Отсутствует заголовок Authorization".into()))?
        .to_str()
        .map_err(|_| AppError::Unauthorized("Заголовок Authorization не ASCII".into()))?;
    value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Ожидается Bearer токен".into()))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

/// POST /auth/login — вход оператора.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    if !state.operator.matches(&req.username, &req.password) {
        tracing::warn!("Неудачная попытка входа оператора: {}", req.username);
        return Err(AppError::Unauthorized("Неверные учётные данные".into()));
    }

    let token = OperatorClaims::issued_now(&req.username).sign(&state.jwt_secret)?;
    tracing::info!("Оператор {} вошёл в систему", req.username);

    Ok(Json(LoginResponse { token }))
}
