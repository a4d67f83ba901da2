//! Database migrations for the Rulehub backend

pub use sea_orm_migration::prelude::*;

mod migration;
pub use migration::Migrator;
