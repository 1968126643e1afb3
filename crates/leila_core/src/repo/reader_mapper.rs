//! Reader mapper over the `readers` table.
//!
//! # Invariants
//! - `insert` populates `Reader::id` from `last_insert_rowid()`.
//! - `update`/`delete` require a persisted id and match exactly one row.
//! - Loaded readers are fresh objects; identity is the unit of work's concern.

use super::mapper::{Mapper, MapperError, MapperResult, WriteOp};
use crate::model::domain::{DomainObject, EntityType};
use crate::model::user::{Reader, ReaderId};
use crate::model::{shared, ReaderRef};
use log::{debug, error};
use rusqlite::{params, Connection, OptionalExtension, Row};

const READERS_TABLE: &str = "readers";
const READER_SELECT_SQL: &str = "SELECT id, name FROM readers";

/// SQLite-backed mapper for `Reader`.
#[derive(Debug, Clone, Copy)]
pub struct ReaderMapper<'conn> {
    conn: &'conn Connection,
}

impl<'conn> ReaderMapper<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn all_readers(&self) -> MapperResult<Vec<ReaderRef>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{READER_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut readers = Vec::new();

        while let Some(row) = rows.next()? {
            readers.push(shared(parse_reader_row(row)?));
        }

        Ok(readers)
    }

    pub fn find_reader(&self, id: ReaderId) -> MapperResult<ReaderRef> {
        let reader = self
            .conn
            .query_row(
                &format!("{READER_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_reader_row,
            )
            .optional()?;

        reader
            .map(shared)
            .ok_or(MapperError::RecordNotFound(id))
    }

    pub fn insert_reader(&self, reader: &ReaderRef) -> MapperResult<ReaderId> {
        let name = {
            let current = reader.borrow();
            if let Some(id) = current.id {
                return Err(MapperError::AlreadyPersisted(id));
            }
            current.name.clone()
        };

        self.conn
            .execute("INSERT INTO readers (name) VALUES (?1);", params![name])
            .map_err(|err| write_failed(WriteOp::Insert, err))?;

        let id = self.conn.last_insert_rowid();
        reader.borrow_mut().id = Some(id);
        debug!("event=mapper_write module=repo table={READERS_TABLE} op=insert status=ok id={id}");
        Ok(id)
    }

    pub fn update_reader(&self, reader: &ReaderRef) -> MapperResult<()> {
        let (id, name) = persisted_fields(reader, WriteOp::Update)?;

        let changed = self
            .conn
            .execute(
                "UPDATE readers SET name = ?1 WHERE id = ?2;",
                params![name, id],
            )
            .map_err(|err| write_failed(WriteOp::Update, err))?;

        if changed == 0 {
            return Err(MapperError::RecordNotFound(id));
        }
        debug!("event=mapper_write module=repo table={READERS_TABLE} op=update status=ok id={id}");
        Ok(())
    }

    pub fn delete_reader(&self, reader: &ReaderRef) -> MapperResult<()> {
        let (id, _) = persisted_fields(reader, WriteOp::Delete)?;

        let changed = self
            .conn
            .execute("DELETE FROM readers WHERE id = ?1;", [id])
            .map_err(|err| write_failed(WriteOp::Delete, err))?;

        if changed == 0 {
            return Err(MapperError::RecordNotFound(id));
        }
        debug!("event=mapper_write module=repo table={READERS_TABLE} op=delete status=ok id={id}");
        Ok(())
    }

    fn expect_reader<'a>(&self, object: &'a DomainObject) -> MapperResult<&'a ReaderRef> {
        object.as_reader().ok_or(MapperError::TypeMismatch {
            expected: EntityType::Reader,
            actual: object.entity_type(),
        })
    }
}

impl Mapper for ReaderMapper<'_> {
    fn entity_type(&self) -> EntityType {
        EntityType::Reader
    }

    fn table(&self) -> &'static str {
        READERS_TABLE
    }

    fn all(&self) -> MapperResult<Vec<DomainObject>> {
        Ok(self
            .all_readers()?
            .into_iter()
            .map(DomainObject::Reader)
            .collect())
    }

    fn find_by_id(&self, id: i64) -> MapperResult<DomainObject> {
        self.find_reader(id).map(DomainObject::Reader)
    }

    fn insert(&self, object: &DomainObject) -> MapperResult<i64> {
        self.insert_reader(self.expect_reader(object)?)
    }

    fn update(&self, object: &DomainObject) -> MapperResult<()> {
        self.update_reader(self.expect_reader(object)?)
    }

    fn delete(&self, object: &DomainObject) -> MapperResult<()> {
        self.delete_reader(self.expect_reader(object)?)
    }
}

fn persisted_fields(reader: &ReaderRef, operation: WriteOp) -> MapperResult<(ReaderId, String)> {
    let current = reader.borrow();
    match current.id {
        Some(id) => Ok((id, current.name.clone())),
        None => Err(MapperError::NotPersisted { operation }),
    }
}

fn write_failed(operation: WriteOp, err: rusqlite::Error) -> MapperError {
    let mapped = MapperError::from_write(operation, err);
    error!(
        "event=mapper_write module=repo table={READERS_TABLE} op={} status=error error_code={} error={}",
        operation.as_str(),
        mapped.code(),
        mapped
    );
    mapped
}

fn parse_reader_row(row: &Row<'_>) -> rusqlite::Result<Reader> {
    let id: ReaderId = row.get("id")?;
    let name: String = row.get("name")?;
    Ok(Reader::with_id(id, name))
}
