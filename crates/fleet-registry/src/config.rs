//! Конфигурация реестра хостов.

use sha2::{Digest, Sha256};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Адрес для прослушивания (например "0.0.0.0:8080")
    pub listen: String,

    /// URL подключения к БД
    pub db_url: String,

    /// Секрет JWT (генерируется случайно если не задан)
    pub jwt_secret: String,

    /// Учётная запись оператора для маршрутов управления
    pub operator: OperatorCredentials,

    /// Окно свежести heartbeat в секундах
    pub liveness_window_secs: i64,

    /// Предельное время одного запроса к реестру
    pub query_timeout: Duration,
}

/// Учётная запись оператора. Пароль в памяти хранится только как SHA-256.
#[derive(Clone)]
pub struct OperatorCredentials {
    username: String,
    password_digest: Vec<u8>,
}

impl OperatorCredentials {
    pub fn new(username: impl Into<String>, password: &str) -> Self {
        OperatorCredentials {
            username: username.into(),
            password_digest: Sha256::new().chain_update(password).finalize().to_vec(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Совпадают ли имя и пароль с учётной записью.
    pub fn matches(&self, username: &str, password: &str) -> bool {
        username == self.username
            && Sha256::digest(password).as_slice() == self.password_digest.as_slice()
    }
}

impl fmt::Debug for OperatorCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorCredentials")
            .field("username", &self.username)
            .field("password_sha256", &hex::encode(&self.password_digest))
            .finish()
    }
}
