//! Сервисный слой реестра хостов.

pub mod group_guard;
pub mod host_store;
pub mod liveness;
pub mod registry_service;
