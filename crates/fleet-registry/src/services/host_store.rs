//! Хранилище записей хостов поверх таблицы hosts.
//!
//! Каждая функция берёт соединение из пула на время одного запроса.
//! Отсутствие строк здесь не ошибка: поиск возвращает пустой результат,
//! изменения возвращают число затронутых строк.

use crate::error::RegistryError;
use fleet_entities::hosts::{ActiveModel, Column, Entity as HostEntity, Model};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, SqlErr,
};

const TASK_SEPARATOR: &str = ",";

/// Запись хоста в доменном виде.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRecord {
    pub id: String,
    pub address: String,
    pub hostname: String,
    pub weight: i32,
    pub version: String,
    pub remark: String,
    pub running_tasks: Vec<String>,
    pub last_heartbeat_unix: i64,
    pub stop: bool,
    pub registered_at: String,
}

impl From<Model> for HostRecord {
    fn from(m: Model) -> Self {
        HostRecord {
            running_tasks: decode_tasks(&m.running_tasks),
            id: m.id,
            address: m.address,
            hostname: m.hostname,
            weight: m.weight,
            version: m.version,
            remark: m.remark,
            last_heartbeat_unix: m.last_heartbeat_unix,
            stop: m.stop,
            registered_at: m.registered_at,
        }
    }
}

impl From<HostRecord> for ActiveModel {
    fn from(r: HostRecord) -> Self {
        ActiveModel {
            id: Set(r.id),
            address: Set(r.address),
            hostname: Set(r.hostname),
            weight: Set(r.weight),
            version: Set(r.version),
            remark: Set(r.remark),
            running_tasks: Set(encode_tasks(&r.running_tasks)),
            last_heartbeat_unix: Set(r.last_heartbeat_unix),
            stop: Set(r.stop),
            registered_at: Set(r.registered_at),
        }
    }
}

/// Склеить список задач в текст для колонки running_tasks.
pub fn encode_tasks(tasks: &[String]) -> String {
    tasks.join(TASK_SEPARATOR)
}

/// id задачи хранится в общей текстовой колонке: он не может быть пустым
/// и не может содержать разделитель, иначе список не прочитается обратно.
pub fn check_task_id(task: &str) -> Result<(), RegistryError> {
    if task.is_empty() || task.contains(TASK_SEPARATOR) {
        return Err(RegistryError::InvalidTaskId(task.to_string()));
    }
    Ok(())
}

/// Разобрать колонку running_tasks. Пустые элементы отбрасываются.
pub fn decode_tasks(raw: &str) -> Vec<String> {
    raw.split(TASK_SEPARATOR)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Вставить новую запись. Повтор адреса даёт `ConstraintViolation`.
pub async fn insert(db: &DatabaseConnection, record: HostRecord) -> Result<(), RegistryError> {
    let address = record.address.clone();
    let model: ActiveModel = record.into();
    model.insert(db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => RegistryError::ConstraintViolation(address),
        _ => RegistryError::StoreUnavailable {
            op: "insert",
            source: e,
        },
    })?;
    Ok(())
}

pub async fn find_by_address(
    db: &DatabaseConnection,
    address: &str,
) -> Result<Vec<HostRecord>, RegistryError> {
    let rows = HostEntity::find()
        .filter(Column::Address.eq(address))
        .all(db)
        .await
        .map_err(RegistryError::store("find_by_address"))?;
    Ok(rows.into_iter().map(HostRecord::from).collect())
}

pub async fn find_by_id(
    db: &DatabaseConnection,
    id: &str,
) -> Result<Option<HostRecord>, RegistryError> {
    let row = HostEntity::find_by_id(id.to_string())
        .one(db)
        .await
        .map_err(RegistryError::store("find_by_id"))?;
    Ok(row.map(HostRecord::from))
}

/// Найти записи по набору id. Отсутствующие id просто не попадают в результат.
pub async fn find_by_ids(
    db: &DatabaseConnection,
    ids: &[String],
) -> Result<Vec<HostRecord>, RegistryError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = HostEntity::find()
        .filter(Column::Id.is_in(ids.iter().map(String::as_str)))
        .order_by_asc(Column::RegisteredAt)
        .order_by_asc(Column::Id)
        .all(db)
        .await
        .map_err(RegistryError::store("find_by_ids"))?;
    Ok(rows.into_iter().map(HostRecord::from).collect())
}

/// Список всех записей. `limit == 0` — без ограничения (offset тогда не применяется).
pub async fn list_all(
    db: &DatabaseConnection,
    offset: u64,
    limit: u64,
) -> Result<Vec<HostRecord>, RegistryError> {
    let mut query = HostEntity::find()
        .order_by_asc(Column::RegisteredAt)
        .order_by_asc(Column::Id);
    if limit > 0 {
        query = query.offset(offset).limit(limit);
    }

    let rows = query
        .all(db)
        .await
        .map_err(RegistryError::store("list_all"))?;
    Ok(rows.into_iter().map(HostRecord::from).collect())
}

/// Перезаписать время heartbeat и список задач. Возвращает число затронутых строк.
pub async fn update_heartbeat_fields(
    db: &DatabaseConnection,
    address: &str,
    timestamp: i64,
    running_tasks: &[String],
) -> Result<u64, RegistryError> {
    let result = HostEntity::update_many()
        .col_expr(Column::LastHeartbeatUnix, Expr::value(timestamp))
        .col_expr(Column::RunningTasks, Expr::value(encode_tasks(running_tasks)))
        .filter(Column::Address.eq(address))
        .exec(db)
        .await
        .map_err(RegistryError::store("update_heartbeat_fields"))?;
    Ok(result.rows_affected)
}

pub async fn update_stop_flag(
    db: &DatabaseConnection,
    id: &str,
    stop: bool,
) -> Result<u64, RegistryError> {
    let result = HostEntity::update_many()
        .col_expr(Column::Stop, Expr::value(stop))
        .filter(Column::Id.eq(id))
        .exec(db)
        .await
        .map_err(RegistryError::store("update_stop_flag"))?;
    Ok(result.rows_affected)
}

pub async fn delete(db: &DatabaseConnection, id: &str) -> Result<u64, RegistryError> {
    let result = HostEntity::delete_by_id(id.to_string())
        .exec(db)
        .await
        .map_err(RegistryError::store("delete"))?;
    Ok(result.rows_affected)
}
