//! Миграции схемы реестра хостов.

pub use sea_orm_migration::prelude::*;

mod m001_create_hosts;
mod m002_create_host_groups;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m001_create_hosts::Migration),
            Box::new(m002_create_host_groups::Migration),
        ]
    }
}
