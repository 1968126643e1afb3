//! Core domain registry and persistence coordination for Leila.
//! This crate owns entity invariants, the data mappers and the unit of work.

pub mod context;
pub mod db;
pub mod engine;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod serializer;
pub mod unit_of_work;

pub use context::{AppContext, ContextError};
pub use db::{open_db, open_db_in_memory, open_store, DbError, StoreConfig};
pub use engine::{Engine, EngineError, EngineResult};
pub use logging::{
    default_log_level, init_logging, logging_status, LoggerRegistry, NamedLogger,
};
pub use model::article::{Article, ArticleKind, ArticleSnapshot, ReaderSnapshot};
pub use model::category::{Category, CategoryId};
pub use model::domain::{DomainObject, EntityType};
pub use model::factory::{ArticleFactory, EntityError, UserFactory};
pub use model::user::{Author, Reader, ReaderId, User, UserKind};
pub use model::{shared, ArticleRef, AuthorRef, CategoryRef, ReaderRef, Shared};
pub use notify::{EmailNotifier, Notifier, ReaderJoined, SmsNotifier};
pub use repo::mapper::{Mapper, MapperError, MapperResult, WriteOp};
pub use repo::reader_mapper::ReaderMapper;
pub use repo::registry::MapperRegistry;
pub use serializer::{article_records, serialize_articles, ArticleRecord};
pub use unit_of_work::{IdentityKey, UnitOfWork};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
