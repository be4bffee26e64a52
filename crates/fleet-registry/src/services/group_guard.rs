//! Проверка ссылочной целостности перед удалением хоста.
//!
//! Группы хостов принадлежат внешней подсистеме, здесь они только читаются.
//! Проверка не держит блокировок: хост могут добавить в группу между
//! проверкой и удалением.

use crate::error::RegistryError;
use async_trait::async_trait;
use fleet_entities::host_groups::Entity as HostGroupEntity;
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder, QuerySelect};

/// Группа хостов и её участники.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostGroupMembers {
    pub id: String,
    pub host_ids: Vec<String>,
}

/// Источник групп хостов (только чтение).
#[async_trait]
pub trait HostGroupSource: Send + Sync {
    /// Список групп. `limit == 0` — все группы.
    async fn list_groups(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<HostGroupMembers>, RegistryError>;
}

/// Группы хостов из таблицы host_groups.
#[derive(Clone)]
pub struct DbHostGroups {
    db: DatabaseConnection,
}

impl DbHostGroups {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl HostGroupSource for DbHostGroups {
    async fn list_groups(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<HostGroupMembers>, RegistryError> {
        use fleet_entities::host_groups::Column;

        let mut query = HostGroupEntity::find().order_by_asc(Column::Id);
        if limit > 0 {
            query = query.offset(offset).limit(limit);
        }

        let groups = query
            .all(&self.db)
            .await
            .map_err(RegistryError::store("list_groups"))?;

        Ok(groups
            .into_iter()
            .map(|g| HostGroupMembers {
                id: g.id,
                host_ids: g
                    .host_ids
                    .split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
                    .collect(),
            })
            .collect())
    }
}

/// Ссылается ли хоть одна группа на хост (полный просмотр групп).
pub async fn host_is_referenced(
    groups: &dyn HostGroupSource,
    host_id: &str,
) -> Result<bool, RegistryError> {
    let groups = groups.list_groups(0, 0).await?;
    Ok(groups
        .iter()
        .any(|g| g.host_ids.iter().any(|id| id == host_id)))
}
