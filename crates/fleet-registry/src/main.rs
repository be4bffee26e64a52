//! Точка входа реестра хостов.

use clap::Parser;
use fleet_registry::config::{OperatorCredentials, ServerConfig};
use fleet_registry::services::liveness::DEFAULT_LIVENESS_WINDOW_SECS;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "fleet-registry",
    about = "Реестр рабочих хостов: регистрация, heartbeat, управление"
)]
struct Cli {
    /// Адрес для прослушивания (host:port)
    #[arg(long, default_value = "0.0.0.0:8080")]
    listen: String,

    /// URL базы данных
    #[arg(
        long,
        default_value = "sqlite:./fleet.db?mode=rwc",
        env = "DATABASE_URL"
    )]
    db_url: String,

    /// Секрет JWT (случайный если не задан)
    #[arg(long, env = "JWT_SECRET")]
    jwt_secret: Option<String>,

    /// Имя оператора
    #[arg(long, default_value = "admin")]
    admin_username: String,

    /// Пароль оператора
    #[arg(long, env = "ADMIN_PASSWORD")]
    admin_password: Option<String>,

    /// Окно свежести heartbeat, секунды
    #[arg(long, default_value_t = DEFAULT_LIVENESS_WINDOW_SECS)]
    liveness_window_secs: i64,

    /// Предельное время запроса к реестру, миллисекунды
    #[arg(long, default_value_t = 5000)]
    query_timeout_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Инициализация логгера
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.liveness_window_secs <= 0 {
        anyhow::bail!("--liveness-window-secs должно быть больше 0");
    }

    // JWT secret: из аргумента или генерируем случайный
    let jwt_secret = match cli.jwt_secret {
        Some(secret) => secret,
        None => {
            let mut buf = [0u8; 32];
            getrandom::fill(&mut buf)
                .map_err(|e| anyhow::anyhow!("Ошибка генерации JWT secret: {e}"))?;
            hex::encode(buf)
        }
    };

    let admin_password = cli.admin_password.unwrap_or_else(|| {
        tracing::warn!("Пароль оператора не задан, используется 'admin' (небезопасно!)");
        "admin".to_string()
    });

    let config = ServerConfig {
        listen: cli.listen,
        db_url: cli.db_url,
        jwt_secret,
        operator: OperatorCredentials::new(cli.admin_username, &admin_password),
        liveness_window_secs: cli.liveness_window_secs,
        query_timeout: Duration::from_millis(cli.query_timeout_ms),
    };

    fleet_registry::run(config).await
}
