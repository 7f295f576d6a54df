use sea_orm::{DbErr, SqlErr};
use strum::Display;
use thiserror::Error;

use crate::auth::DenyReason;

pub type AccessResult<T> = Result<T, AccessError>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    Role,
    Department,
    Module,
    Menu,
    User,
    Permission,
    UserPermission,
}

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: EntityKind, key: String },

    #[error("{entity} is inactive: {key}")]
    Inactive { entity: EntityKind, key: String },

    /// Unique or foreign-key constraint rejected the write.
    #[error("integrity violation: {0}")]
    Integrity(String),

    #[error("access denied: {0}")]
    Denied(DenyReason),

    #[error("database error: {0}")]
    Database(DbErr),
}

impl AccessError {
    pub fn not_found(entity: EntityKind, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn inactive(entity: EntityKind, key: impl ToString) -> Self {
        Self::Inactive {
            entity,
            key: key.to_string(),
        }
    }
}

impl From<DbErr> for AccessError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg))
            | Some(SqlErr::ForeignKeyConstraintViolation(msg)) => Self::Integrity(msg),
            _ => match err {
                DbErr::RecordNotInserted => Self::Integrity("record not inserted".to_string()),
                other => Self::Database(other),
            },
        }
    }
}
