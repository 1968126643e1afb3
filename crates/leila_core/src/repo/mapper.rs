//! Mapper contract and error model.

use crate::db::DbError;
use crate::model::domain::{DomainObject, EntityType};
use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type MapperResult<T> = Result<T, MapperError>;

/// Mutating mapper operation, used to classify store failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    Insert,
    Update,
    Delete,
}

impl WriteOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Errors from mapper operations and mapper resolution.
#[derive(Debug)]
pub enum MapperError {
    /// No row with this id.
    RecordNotFound(i64),
    /// Insert failed in the store.
    Commit(DbError),
    /// Update failed in the store.
    Update(DbError),
    /// Delete failed in the store.
    Delete(DbError),
    /// Store stayed busy/locked past the connection busy timeout.
    Timeout { operation: WriteOp, cause: DbError },
    /// Read query failed.
    Query(DbError),
    /// No mapper is registered for this type name.
    UnregisteredType(String),
    /// Object handed to a mapper bound to another entity type.
    TypeMismatch {
        expected: EntityType,
        actual: EntityType,
    },
    /// Update/delete on an object that has no row yet.
    NotPersisted { operation: WriteOp },
    /// Insert on an object that already has a row.
    AlreadyPersisted(i64),
    /// Write through a copy while another instance is live for the same row.
    StaleInstance { entity_type: EntityType, id: i64 },
}

impl Display for MapperError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RecordNotFound(id) => write!(f, "record not found: id={id}"),
            Self::Commit(err) => write!(f, "db commit error: {err}"),
            Self::Update(err) => write!(f, "db update error: {err}"),
            Self::Delete(err) => write!(f, "db delete error: {err}"),
            Self::Timeout { operation, cause } => {
                write!(f, "db {} timed out: {cause}", operation.as_str())
            }
            Self::Query(err) => write!(f, "db query error: {err}"),
            Self::UnregisteredType(name) => write!(f, "no mapper registered for type `{name}`"),
            Self::TypeMismatch { expected, actual } => {
                write!(f, "mapper for `{expected}` cannot persist `{actual}`")
            }
            Self::NotPersisted { operation } => {
                write!(f, "cannot {} an object without a persisted id", operation.as_str())
            }
            Self::AlreadyPersisted(id) => write!(f, "object already persisted with id={id}"),
            Self::StaleInstance { entity_type, id } => write!(
                f,
                "`{entity_type}` id={id} is mapped to another live instance"
            ),
        }
    }
}

impl Error for MapperError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Commit(err) | Self::Update(err) | Self::Delete(err) | Self::Query(err) => {
                Some(err)
            }
            Self::Timeout { cause, .. } => Some(cause),
            Self::RecordNotFound(_)
            | Self::UnregisteredType(_)
            | Self::TypeMismatch { .. }
            | Self::NotPersisted { .. }
            | Self::AlreadyPersisted(_)
            | Self::StaleInstance { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for MapperError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Query(DbError::Sqlite(value))
    }
}

impl MapperError {
    /// Classifies a failed write statement.
    pub(crate) fn from_write(operation: WriteOp, err: rusqlite::Error) -> Self {
        let busy = matches!(
            err.sqlite_error_code(),
            Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
        );
        let cause = DbError::Sqlite(err);
        if busy {
            return Self::Timeout { operation, cause };
        }
        match operation {
            WriteOp::Insert => Self::Commit(cause),
            WriteOp::Update => Self::Update(cause),
            WriteOp::Delete => Self::Delete(cause),
        }
    }

    /// Stable short code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::RecordNotFound(_) => "record_not_found",
            Self::Commit(_) => "commit_failed",
            Self::Update(_) => "update_failed",
            Self::Delete(_) => "delete_failed",
            Self::Timeout { .. } => "store_timeout",
            Self::Query(_) => "query_failed",
            Self::UnregisteredType(_) => "unregistered_type",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::NotPersisted { .. } => "not_persisted",
            Self::AlreadyPersisted(_) => "already_persisted",
            Self::StaleInstance { .. } => "stale_instance",
        }
    }
}

/// Translator between one entity type and one table.
///
/// Implementations receive type-erased objects so the unit of work can drive
/// any registered mapper; objects of another type are rejected with
/// `MapperError::TypeMismatch`.
pub trait Mapper {
    fn entity_type(&self) -> EntityType;
    fn table(&self) -> &'static str;
    /// Snapshot of every row, in primary-key order, as fresh objects.
    fn all(&self) -> MapperResult<Vec<DomainObject>>;
    fn find_by_id(&self, id: i64) -> MapperResult<DomainObject>;
    /// Inserts a row and writes the generated id back into `object`.
    fn insert(&self, object: &DomainObject) -> MapperResult<i64>;
    fn update(&self, object: &DomainObject) -> MapperResult<()>;
    fn delete(&self, object: &DomainObject) -> MapperResult<()>;
}

#[cfg(test)]
mod tests {
    use super::{MapperError, WriteOp};
    use crate::db::DbError;
    use rusqlite::ffi;

    fn sqlite_failure(code: i32) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(ffi::Error::new(code), None)
    }

    #[test]
    fn busy_and_locked_map_to_timeout() {
        let busy = MapperError::from_write(WriteOp::Insert, sqlite_failure(ffi::SQLITE_BUSY));
        assert!(matches!(
            busy,
            MapperError::Timeout {
                operation: WriteOp::Insert,
                cause: DbError::Sqlite(_)
            }
        ));

        let locked = MapperError::from_write(WriteOp::Delete, sqlite_failure(ffi::SQLITE_LOCKED));
        assert_eq!(locked.code(), "store_timeout");
    }

    #[test]
    fn other_failures_map_by_operation() {
        let insert = MapperError::from_write(WriteOp::Insert, sqlite_failure(ffi::SQLITE_ERROR));
        let update = MapperError::from_write(WriteOp::Update, sqlite_failure(ffi::SQLITE_ERROR));
        let delete = MapperError::from_write(WriteOp::Delete, sqlite_failure(ffi::SQLITE_ERROR));

        assert!(matches!(insert, MapperError::Commit(_)));
        assert!(matches!(update, MapperError::Update(_)));
        assert!(matches!(delete, MapperError::Delete(_)));
        assert!(insert.to_string().starts_with("db commit error"));
    }
}
