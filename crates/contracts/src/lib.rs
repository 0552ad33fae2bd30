//! Контракты POS-бэкенда: агрегаты, DTO проекций и типы движка.
//!
//! Крейт не зависит от sea-orm и axum — только типы, их валидация
//! и коды ошибок, общие для всех слоёв.

pub mod domain;
pub mod engine;
pub mod projections;
