//! Миграция: создание таблицы hosts.

use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m001_create_hosts"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Hosts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Hosts::Id).string().not_null().primary_key())
                    .col(
                        ColumnDef::new(Hosts::Address)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Hosts::Hostname).string().not_null())
                    .col(
                        ColumnDef::new(Hosts::Weight)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Hosts::Version).string().not_null())
                    .col(
                        ColumnDef::new(Hosts::Remark)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Hosts::RunningTasks)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Hosts::LastHeartbeatUnix)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Hosts::Stop)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Hosts::RegisteredAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        // Индекс для стабильной постраничной выдачи списка
        manager
            .create_index(
                Index::create()
                    .table(Hosts::Table)
                    .col(Hosts::RegisteredAt)
                    .name("idx_hosts_registered_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Hosts::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Hosts {
    Table,
    Id,
    Address,
    Hostname,
    Weight,
    Version,
    Remark,
    RunningTasks,
    LastHeartbeatUnix,
    Stop,
    RegisteredAt,
}
