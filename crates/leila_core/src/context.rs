//! Application context passed to request handlers.
//!
//! # Responsibility
//! - Own the entity registry, named loggers and the unit of work for one scope.
//! - Offer the verb-level flows callers use (create, subscribe, list, commit).
//!
//! # Invariants
//! - No global state: every collaborator is reached through this struct.
//! - A reader is registered in the engine before it is staged for insertion.

use crate::engine::{Engine, EngineError};
use crate::logging::{LoggerRegistry, NamedLogger};
use crate::model::article::Article;
use crate::model::category::CategoryId;
use crate::model::user::{Reader, User};
use crate::model::{shared, ArticleRef, CategoryRef, ReaderRef};
use crate::notify::Notifier;
use crate::repo::mapper::MapperError;
use crate::repo::registry::MapperRegistry;
use crate::unit_of_work::UnitOfWork;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

const MAIN_LOGGER: &str = "main";

#[derive(Debug)]
pub enum ContextError {
    Engine(EngineError),
    Mapper(MapperError),
    ArticleNotFound(String),
    ReaderNotFound(String),
}

impl Display for ContextError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Engine(err) => write!(f, "{err}"),
            Self::Mapper(err) => write!(f, "{err}"),
            Self::ArticleNotFound(name) => write!(f, "article not found: `{name}`"),
            Self::ReaderNotFound(name) => write!(f, "reader not found: `{name}`"),
        }
    }
}

impl Error for ContextError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Engine(err) => Some(err),
            Self::Mapper(err) => Some(err),
            Self::ArticleNotFound(_) | Self::ReaderNotFound(_) => None,
        }
    }
}

impl From<EngineError> for ContextError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<MapperError> for ContextError {
    fn from(value: MapperError) -> Self {
        Self::Mapper(value)
    }
}

pub struct AppContext<'conn> {
    pub engine: Engine,
    pub loggers: LoggerRegistry,
    pub unit_of_work: UnitOfWork<'conn>,
}

impl<'conn> AppContext<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_engine(conn, Engine::new())
    }

    /// Context whose engine attaches `notifiers` to every created article.
    pub fn with_notifiers(conn: &'conn Connection, notifiers: Vec<Rc<dyn Notifier>>) -> Self {
        Self::with_engine(conn, Engine::with_notifiers(notifiers))
    }

    fn with_engine(conn: &'conn Connection, engine: Engine) -> Self {
        Self {
            engine,
            loggers: LoggerRegistry::new(),
            unit_of_work: UnitOfWork::new(MapperRegistry::new(conn)),
        }
    }

    pub fn logger(&mut self, name: &str) -> Rc<NamedLogger> {
        self.loggers.get_or_create(name)
    }

    /// Creates a reader, registers it, stages it as new and commits.
    ///
    /// On commit failure the reader stays registered and staged.
    pub fn register_reader(&mut self, name: &str) -> Result<ReaderRef, ContextError> {
        let reader = shared(Reader::new(name));
        self.engine.add_user(User::Reader(Rc::clone(&reader)));
        self.unit_of_work.mark_new(&reader);
        self.unit_of_work.commit()?;
        self.logger(MAIN_LOGGER).log("reader registered");
        Ok(reader)
    }

    /// Readers currently persisted, as live identity-mapped instances.
    pub fn stored_readers(&mut self) -> Result<Vec<ReaderRef>, ContextError> {
        self.logger(MAIN_LOGGER).log("reader list");
        Ok(self.unit_of_work.load_all_readers()?)
    }

    /// Creates a category under the optional registered parent and registers it.
    pub fn add_category(
        &mut self,
        name: &str,
        parent_id: Option<CategoryId>,
    ) -> Result<CategoryRef, ContextError> {
        let parent = parent_id
            .map(|id| self.engine.find_category_by_id(id))
            .transpose()?;
        let category = self.engine.create_category(name, parent.as_ref());
        self.engine.add_category(Rc::clone(&category));
        Ok(category)
    }

    /// Creates a tagged article in the registered category `category_id` and
    /// registers it.
    pub fn add_article(
        &mut self,
        category_id: CategoryId,
        tag: &str,
        name: &str,
    ) -> Result<ArticleRef, ContextError> {
        let category = self.engine.find_category_by_id(category_id)?;
        let article = self.engine.create_article(tag, name, &category)?;
        self.engine.add_article(Rc::clone(&article));
        self.logger(MAIN_LOGGER).log("article created");
        Ok(article)
    }

    /// Subscribes the registered reader `reader_name` to the registered
    /// article `article_name`. Returns the number of subscribers notified.
    pub fn subscribe(
        &mut self,
        article_name: &str,
        reader_name: &str,
    ) -> Result<usize, ContextError> {
        let article = self
            .engine
            .get_article(article_name)
            .ok_or_else(|| ContextError::ArticleNotFound(article_name.to_string()))?;
        let reader = self
            .engine
            .get_reader(reader_name)
            .ok_or_else(|| ContextError::ReaderNotFound(reader_name.to_string()))?;
        Ok(Article::add_reader(&article, &reader))
    }
}
