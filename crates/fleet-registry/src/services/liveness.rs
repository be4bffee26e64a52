//! Вычисление признака online по времени последнего heartbeat.

use chrono::{DateTime, Utc};

/// Период heartbeat у воркеров (секунды).
pub const HEARTBEAT_INTERVAL_SECS: i64 = 15;

/// Окно свежести: больше периода, чтобы один опоздавший heartbeat
/// не переводил хост в offline.
pub const DEFAULT_LIVENESS_WINDOW_SECS: i64 = 20;

/// Формат времени heartbeat для отображения.
pub const HEARTBEAT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Хост online, если `last_heartbeat_unix + window > now`.
pub fn is_online(last_heartbeat_unix: i64, now: i64, window: i64) -> bool {
    last_heartbeat_unix.saturating_add(window) > now
}

/// Unix-время в читаемом виде (UTC). Вне диапазона chrono — пустая строка.
pub fn format_unix(ts: i64) -> String {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .map(|dt| dt.format(HEARTBEAT_TIME_FORMAT).to_string())
        .unwrap_or_default()
}

/// Источник текущего времени.
pub trait Clock: Send + Sync {
    fn now_unix(&self) -> i64;
}

/// Системные часы.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> i64 {
        Utc::now().timestamp()
    }
}
