//! Сервис реестра хостов: регистрация, heartbeat, выборки, stop/resume, удаление.

use crate::error::RegistryError;
use crate::services::group_guard::{self, HostGroupSource};
use crate::services::host_store::{self, HostRecord};
use crate::services::liveness::{self, Clock, SystemClock, DEFAULT_LIVENESS_WINDOW_SECS};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Данные для регистрации воркера.
#[derive(Debug, Clone)]
pub struct RegisterData {
    pub hostname: String,
    pub ip: String,
    pub port: u16,
    pub weight: i32,
    pub version: String,
    pub remark: String,
}

/// Итог регистрации.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// Создана новая запись.
    Created { id: String },
    /// Адрес уже есть в реестре, ничего не изменено.
    AlreadyRegistered,
}

/// Итог приёма heartbeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatAck {
    Recorded,
    /// Адрес неизвестен: строка не обновлена, воркеру стоит зарегистрироваться.
    UnknownHost,
}

/// Представление хоста для вызывающей стороны.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostView {
    pub id: String,
    pub address: String,
    pub hostname: String,
    pub running_tasks: Vec<String>,
    pub weight: i32,
    pub stop: bool,
    pub online: bool,
    pub version: String,
    pub remark: String,
    pub last_heartbeat_unix: i64,
    pub last_heartbeat_formatted: String,
}

/// Адрес воркера в виде `ip:port`.
pub fn host_address(ip: &str, port: u16) -> String {
    format!("{ip}:{port}")
}

/// Реестр хостов.
///
/// Состояние хостов между вызовами не кэшируется: каждое чтение идёт в БД,
/// а признак online вычисляется заново.
#[derive(Clone)]
pub struct HostRegistry {
    db: DatabaseConnection,
    groups: Arc<dyn HostGroupSource>,
    clock: Arc<dyn Clock>,
    liveness_window: i64,
}

impl HostRegistry {
    pub fn new(db: DatabaseConnection, groups: Arc<dyn HostGroupSource>) -> Self {
        Self {
            db,
            groups,
            clock: Arc::new(SystemClock),
            liveness_window: DEFAULT_LIVENESS_WINDOW_SECS,
        }
    }

    /// Заменить источник времени.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Задать окно свежести heartbeat (секунды).
    pub fn with_liveness_window(mut self, secs: i64) -> Self {
        self.liveness_window = secs;
        self
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn liveness_window(&self) -> i64 {
        self.liveness_window
    }

    /// Зарегистрировать воркер. Повторная регистрация того же адреса ничего не меняет.
    pub async fn register(&self, data: RegisterData) -> Result<Registration, RegistryError> {
        let address = host_address(&data.ip, data.port);

        if !host_store::find_by_address(&self.db, &address)
            .await?
            .is_empty()
        {
            info!("Адрес уже зарегистрирован: {address}");
            return Ok(Registration::AlreadyRegistered);
        }

        let now = self.clock.now_unix();
        let id = Uuid::new_v4().to_string();
        let record = HostRecord {
            id: id.clone(),
            address: address.clone(),
            hostname: data.hostname,
            weight: data.weight,
            version: data.version,
            remark: data.remark,
            running_tasks: Vec::new(),
            last_heartbeat_unix: now,
            stop: false,
            registered_at: registered_at(now),
        };

        match host_store::insert(&self.db, record).await {
            Ok(()) => {
                info!("Зарегистрирован новый хост {id} ({address})");
                Ok(Registration::Created { id })
            }
            // Параллельная регистрация того же адреса успела раньше
            Err(RegistryError::ConstraintViolation(_)) => {
                warn!("Адрес {address} зарегистрирован параллельным запросом");
                Ok(Registration::AlreadyRegistered)
            }
            Err(e) => Err(e),
        }
    }

    /// Принять heartbeat: время и список задач перезаписываются целиком.
    ///
    /// Список с пустым id или id, содержащим `,`, отклоняется до обращения к БД.
    pub async fn heartbeat(
        &self,
        ip: &str,
        port: u16,
        running_tasks: &[String],
    ) -> Result<HeartbeatAck, RegistryError> {
        running_tasks
            .iter()
            .try_for_each(|task| host_store::check_task_id(task))?;

        let address = host_address(ip, port);
        let now = self.clock.now_unix();

        let updated =
            host_store::update_heartbeat_fields(&self.db, &address, now, running_tasks).await?;
        if updated == 0 {
            debug!("Heartbeat от незарегистрированного адреса {address}");
            return Ok(HeartbeatAck::UnknownHost);
        }

        debug!("Heartbeat: {address} (задач: {})", running_tasks.len());
        Ok(HeartbeatAck::Recorded)
    }

    /// Постраничный список хостов. `limit == 0` — все хосты.
    pub async fn list(&self, offset: u64, limit: u64) -> Result<Vec<HostView>, RegistryError> {
        let records = host_store::list_all(&self.db, offset, limit).await?;
        Ok(self.views(records))
    }

    pub async fn get_by_id(&self, id: &str) -> Result<HostView, RegistryError> {
        let record = host_store::find_by_id(&self.db, id)
            .await?
            .ok_or_else(|| RegistryError::NotFound(format!("хост {id}")))?;
        Ok(self.view(record, self.clock.now_unix()))
    }

    pub async fn get_by_address(&self, address: &str) -> Result<HostView, RegistryError> {
        let record = host_store::find_by_address(&self.db, address)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RegistryError::NotFound(format!("хост с адресом {address}")))?;
        Ok(self.view(record, self.clock.now_unix()))
    }

    /// Пакетная выборка: отсутствующие id пропускаются без ошибки.
    pub async fn get_by_ids(&self, ids: &[String]) -> Result<Vec<HostView>, RegistryError> {
        let records = host_store::find_by_ids(&self.db, ids).await?;
        Ok(self.views(records))
    }

    /// Установить флаг stop. Запись при этом не удаляется.
    pub async fn set_stop(&self, id: &str, stop: bool) -> Result<(), RegistryError> {
        if host_store::update_stop_flag(&self.db, id, stop).await? == 0 {
            return Err(RegistryError::NotFound(format!("хост {id}")));
        }
        info!("Хост {id}: stop = {stop}");
        Ok(())
    }

    /// Переключить флаг stop и вернуть новое значение.
    pub async fn toggle_stop(&self, id: &str) -> Result<bool, RegistryError> {
        let record = host_store::find_by_id(&self.db, id)
            .await?
            .ok_or_else(|| RegistryError::NotFound(format!("хост {id}")))?;
        let stop = !record.stop;
        self.set_stop(id, stop).await?;
        Ok(stop)
    }

    /// Удалить хост.
    ///
    /// Сначала хост останавливается, затем проверяются группы. Если хост
    /// входит в группу, возвращается `Conflict`, а хост остаётся остановленным.
    pub async fn delete(&self, id: &str) -> Result<(), RegistryError> {
        if host_store::update_stop_flag(&self.db, id, true).await? == 0 {
            return Err(RegistryError::NotFound(format!("хост {id}")));
        }

        if group_guard::host_is_referenced(self.groups.as_ref(), id).await? {
            warn!("Удаление хоста {id} отклонено: хост входит в группу");
            return Err(RegistryError::Conflict(id.to_string()));
        }

        if host_store::delete(&self.db, id).await? == 0 {
            return Err(RegistryError::NotFound(format!("хост {id}")));
        }

        info!("Хост удалён: {id}");
        Ok(())
    }

    fn views(&self, records: Vec<HostRecord>) -> Vec<HostView> {
        let now = self.clock.now_unix();
        records.into_iter().map(|r| self.view(r, now)).collect()
    }

    fn view(&self, record: HostRecord, now: i64) -> HostView {
        HostView {
            online: liveness::is_online(record.last_heartbeat_unix, now, self.liveness_window),
            last_heartbeat_formatted: liveness::format_unix(record.last_heartbeat_unix),
            id: record.id,
            address: record.address,
            hostname: record.hostname,
            running_tasks: record.running_tasks,
            weight: record.weight,
            stop: record.stop,
            version: record.version,
            remark: record.remark,
            last_heartbeat_unix: record.last_heartbeat_unix,
        }
    }
}

fn registered_at(now: i64) -> String {
    DateTime::<Utc>::from_timestamp(now, 0)
        .unwrap_or_else(Utc::now)
        .to_rfc3339()
}
