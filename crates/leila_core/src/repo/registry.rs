//! Mapper registry: resolves the mapper for an entity or a type name.

use super::mapper::{Mapper, MapperError, MapperResult};
use super::reader_mapper::ReaderMapper;
use crate::model::domain::{DomainObject, EntityType};
use rusqlite::Connection;

/// Resolves mappers bound to the one shared connection.
///
/// Mappers are cheap borrow wrappers, so each lookup builds a new one.
#[derive(Debug, Clone, Copy)]
pub struct MapperRegistry<'conn> {
    conn: &'conn Connection,
}

impl<'conn> MapperRegistry<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &'conn Connection {
        self.conn
    }

    /// Entity types that have a backing table.
    pub fn registered_types() -> &'static [EntityType] {
        &[EntityType::Reader]
    }

    pub fn mapper_for_type(
        &self,
        entity_type: EntityType,
    ) -> MapperResult<Box<dyn Mapper + 'conn>> {
        match entity_type {
            EntityType::Reader => Ok(Box::new(ReaderMapper::new(self.conn))),
            EntityType::Author | EntityType::Article | EntityType::Category => {
                Err(MapperError::UnregisteredType(entity_type.name().to_string()))
            }
        }
    }

    /// Mapper for the concrete variant of `object`.
    pub fn get_mapper(&self, object: &DomainObject) -> MapperResult<Box<dyn Mapper + 'conn>> {
        self.mapper_for_type(object.entity_type())
    }

    /// Mapper for a type name such as `"reader"`.
    pub fn get_current_mapper(&self, name: &str) -> MapperResult<Box<dyn Mapper + 'conn>> {
        let entity_type = EntityType::from_name(name)
            .ok_or_else(|| MapperError::UnregisteredType(name.to_string()))?;
        self.mapper_for_type(entity_type)
    }

    /// Typed reader mapper, for callers that want `ReaderRef`s directly.
    pub fn reader_mapper(&self) -> ReaderMapper<'conn> {
        ReaderMapper::new(self.conn)
    }
}
