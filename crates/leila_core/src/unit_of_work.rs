//! Unit of work: identity map plus new/dirty/removed staging.
//!
//! # Responsibility
//! - Stage pending inserts, updates and deletes between commits.
//! - Apply staged changes through the mapper registry in a fixed order.
//! - Guarantee one in-memory object per persisted row.
//!
//! # Invariants
//! - Staging sets never hold the same object twice.
//! - `commit` runs New, then Dirty, then Removed.
//! - A freshly inserted object carries its store id before the Dirty phase.
//! - Each write autocommits; on failure earlier writes stay, the failed object
//!   and everything after it stay staged.
//! - Nothing touches the store when no object is staged.
//! - Updates and deletes go through the identity-mapped instance only; a
//!   different instance for a mapped row is rejected before any write.

use crate::model::domain::{DomainObject, EntityType};
use crate::model::user::ReaderId;
use crate::model::ReaderRef;
use crate::repo::mapper::{MapperError, MapperResult};
use crate::repo::registry::MapperRegistry;
use log::{debug, error, info};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Instant;

/// Identity map key: entity type plus store primary key.
pub type IdentityKey = (EntityType, i64);

/// Explicitly scoped unit of work bound to one connection.
pub struct UnitOfWork<'conn> {
    mappers: MapperRegistry<'conn>,
    identity_map: HashMap<IdentityKey, DomainObject>,
    new_objects: Vec<DomainObject>,
    dirty_objects: Vec<DomainObject>,
    removed_objects: Vec<DomainObject>,
}

impl<'conn> UnitOfWork<'conn> {
    pub fn new(mappers: MapperRegistry<'conn>) -> Self {
        Self {
            mappers,
            identity_map: HashMap::new(),
            new_objects: Vec::new(),
            dirty_objects: Vec::new(),
            removed_objects: Vec::new(),
        }
    }

    pub fn mappers(&self) -> &MapperRegistry<'conn> {
        &self.mappers
    }

    /// Stages `object` for insertion. Returns `false` if it was already staged.
    pub fn mark_new(&mut self, object: impl Into<DomainObject>) -> bool {
        stage(&mut self.new_objects, object.into())
    }

    /// Stages `object` for a full-row update. No change detection is done.
    pub fn mark_dirty(&mut self, object: impl Into<DomainObject>) -> bool {
        stage(&mut self.dirty_objects, object.into())
    }

    pub fn mark_removed(&mut self, object: impl Into<DomainObject>) -> bool {
        stage(&mut self.removed_objects, object.into())
    }

    /// Drops `object` from every staging set. Returns `false` if it was not
    /// staged. The identity map is left untouched.
    pub fn discard(&mut self, object: impl Into<DomainObject>) -> bool {
        let object = object.into();
        let mut found = false;
        for set in [
            &mut self.new_objects,
            &mut self.dirty_objects,
            &mut self.removed_objects,
        ] {
            let before = set.len();
            set.retain(|staged| !staged.same_instance(&object));
            found |= set.len() != before;
        }
        if found {
            debug!(
                "event=uow_discard module=uow status=ok type={}",
                object.entity_type()
            );
        }
        found
    }

    /// Empties all staging sets, keeping the identity map.
    pub fn clear_staging(&mut self) {
        debug!(
            "event=uow_clear module=uow status=ok new={} dirty={} removed={}",
            self.new_objects.len(),
            self.dirty_objects.len(),
            self.removed_objects.len()
        );
        self.new_objects.clear();
        self.dirty_objects.clear();
        self.removed_objects.clear();
    }

    pub fn new_objects(&self) -> &[DomainObject] {
        &self.new_objects
    }

    pub fn dirty_objects(&self) -> &[DomainObject] {
        &self.dirty_objects
    }

    pub fn removed_objects(&self) -> &[DomainObject] {
        &self.removed_objects
    }

    pub fn is_clean(&self) -> bool {
        self.new_objects.is_empty()
            && self.dirty_objects.is_empty()
            && self.removed_objects.is_empty()
    }

    /// Identity-map lookup. Never touches the store.
    pub fn get(&self, entity_type: EntityType, id: i64) -> Option<DomainObject> {
        self.identity_map.get(&(entity_type, id)).cloned()
    }

    pub fn identity_map_len(&self) -> usize {
        self.identity_map.len()
    }

    /// Registers an already persisted object as the live instance for its row.
    ///
    /// Returns the live instance (`object` itself, or the one registered
    /// earlier), or `None` when `object` has no persisted id.
    pub fn register_clean(&mut self, object: DomainObject) -> Option<DomainObject> {
        let id = object.persisted_id()?;
        Some(
            self.identity_map
                .entry((object.entity_type(), id))
                .or_insert(object)
                .clone(),
        )
    }

    /// Loads one row, returning the live instance when the row is already mapped.
    pub fn load(&mut self, entity_type: EntityType, id: i64) -> MapperResult<DomainObject> {
        if let Some(live) = self.get(entity_type, id) {
            return Ok(live);
        }
        let loaded = self.mappers.mapper_for_type(entity_type)?.find_by_id(id)?;
        self.identity_map.insert((entity_type, id), loaded.clone());
        Ok(loaded)
    }

    pub fn load_reader(&mut self, id: ReaderId) -> MapperResult<ReaderRef> {
        match self.load(EntityType::Reader, id)? {
            DomainObject::Reader(reader) => Ok(reader),
            other => Err(MapperError::TypeMismatch {
                expected: EntityType::Reader,
                actual: other.entity_type(),
            }),
        }
    }

    /// Loads every reader row, reusing live instances for rows already mapped.
    pub fn load_all_readers(&mut self) -> MapperResult<Vec<ReaderRef>> {
        let loaded = self.mappers.reader_mapper().all_readers()?;
        Ok(loaded
            .into_iter()
            .map(|reader| self.live_reader(reader))
            .collect())
    }

    fn live_reader(&mut self, reader: ReaderRef) -> ReaderRef {
        match self.register_clean(DomainObject::Reader(Rc::clone(&reader))) {
            Some(DomainObject::Reader(live)) => live,
            _ => reader,
        }
    }

    /// Persists all staged objects.
    ///
    /// # Errors
    /// Returns the first mapper failure. Writes that succeeded before it are
    /// kept (no cross-object rollback); the failed object and all objects not
    /// yet processed remain staged.
    pub fn commit(&mut self) -> MapperResult<()> {
        if self.is_clean() {
            debug!("event=uow_commit module=uow status=skip reason=nothing_staged");
            return Ok(());
        }

        let started_at = Instant::now();
        info!(
            "event=uow_commit module=uow status=start new={} dirty={} removed={}",
            self.new_objects.len(),
            self.dirty_objects.len(),
            self.removed_objects.len()
        );

        let result = self
            .insert_new()
            .and_then(|()| self.update_dirty())
            .and_then(|()| self.delete_removed());

        match &result {
            Ok(()) => info!(
                "event=uow_commit module=uow status=ok duration_ms={} identity_map={}",
                started_at.elapsed().as_millis(),
                self.identity_map.len()
            ),
            Err(err) => error!(
                "event=uow_commit module=uow status=error duration_ms={} error_code={} pending_new={} pending_dirty={} pending_removed={} error={}",
                started_at.elapsed().as_millis(),
                err.code(),
                self.new_objects.len(),
                self.dirty_objects.len(),
                self.removed_objects.len(),
                err
            ),
        }
        result
    }

    fn insert_new(&mut self) -> MapperResult<()> {
        while let Some(object) = self.new_objects.first().cloned() {
            let id = self.mappers.get_mapper(&object)?.insert(&object)?;
            self.new_objects.remove(0);
            self.identity_map.insert((object.entity_type(), id), object);
        }
        Ok(())
    }

    fn update_dirty(&mut self) -> MapperResult<()> {
        while let Some(object) = self.dirty_objects.first().cloned() {
            self.ensure_live(&object)?;
            self.mappers.get_mapper(&object)?.update(&object)?;
            self.dirty_objects.remove(0);
            if let Some(id) = object.persisted_id() {
                self.identity_map
                    .entry((object.entity_type(), id))
                    .or_insert(object);
            }
        }
        Ok(())
    }

    fn delete_removed(&mut self) -> MapperResult<()> {
        while let Some(object) = self.removed_objects.first().cloned() {
            self.ensure_live(&object)?;
            let key = object.persisted_id().map(|id| (object.entity_type(), id));
            self.mappers.get_mapper(&object)?.delete(&object)?;
            self.removed_objects.remove(0);
            if let Some(key) = key {
                self.identity_map.remove(&key);
            }
        }
        Ok(())
    }

    /// Fails when a different instance is mapped for `object`'s row.
    fn ensure_live(&self, object: &DomainObject) -> MapperResult<()> {
        let entity_type = object.entity_type();
        if let Some(id) = object.persisted_id() {
            let stale = self
                .identity_map
                .get(&(entity_type, id))
                .is_some_and(|live| !live.same_instance(object));
            if stale {
                return Err(MapperError::StaleInstance { entity_type, id });
            }
        }
        Ok(())
    }
}

fn stage(set: &mut Vec<DomainObject>, object: DomainObject) -> bool {
    if set.iter().any(|staged| staged.same_instance(&object)) {
        return false;
    }
    set.push(object);
    true
}

impl std::fmt::Debug for UnitOfWork<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitOfWork")
            .field("identity_map", &self.identity_map.len())
            .field("new", &self.new_objects.len())
            .field("dirty", &self.dirty_objects.len())
            .field("removed", &self.removed_objects.len())
            .finish()
    }
}
