//! SeaORM-сущности реестра хостов.

pub mod host_groups;
pub mod hosts;
