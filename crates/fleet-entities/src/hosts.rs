//! Entity для таблицы hosts.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hosts")]
pub struct Model {
    /// UUID хоста, выдаётся при регистрации и не меняется
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Сетевой адрес воркера (ip:port), уникален
    #[sea_orm(unique)]
    pub address: String,

    /// Отображаемое имя хоста
    pub hostname: String,

    /// Вес при планировании
    pub weight: i32,

    /// Версия воркера
    pub version: String,

    /// Произвольная заметка из запроса регистрации
    pub remark: String,

    /// Идентификаторы выполняющихся задач через запятую
    pub running_tasks: String,

    /// Unix-время последнего принятого heartbeat (секунды)
    pub last_heartbeat_unix: i64,

    /// Запрещено ли назначать хосту новые задачи
    pub stop: bool,

    /// Время регистрации (ISO-8601)
    pub registered_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
