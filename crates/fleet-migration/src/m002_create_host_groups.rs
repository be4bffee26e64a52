//! Миграция: создание таблицы host_groups.

use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m002_create_host_groups"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(HostGroups::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(HostGroups::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(HostGroups::Name).string().not_null())
                    .col(
                        ColumnDef::new(HostGroups::HostIds)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(HostGroups::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum HostGroups {
    Table,
    Id,
    Name,
    HostIds,
}
