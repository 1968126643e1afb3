//! Entity registry ("engine").
//!
//! # Responsibility
//! - Own the canonical in-process collections of authors, readers, articles
//!   and categories.
//! - Construct entities through the factories without registering them.
//! - Resolve entities by category id or by name.
//!
//! # Invariants
//! - `create_*` never appends; registration is an explicit `add_*` call so
//!   callers can stage objects before committing them.
//! - Category lookup misses are errors; article/reader lookup misses are
//!   `None`. Category ids arrive as request parameters, so a miss is a broken
//!   reference. Names are free text, so a miss is ordinary absence.

use crate::model::article::Article;
use crate::model::category::{Category, CategoryId};
use crate::model::factory::{ArticleFactory, EntityError, UserFactory};
use crate::model::user::User;
use crate::model::{shared, ArticleRef, AuthorRef, CategoryRef, ReaderRef};
use crate::notify::Notifier;
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    Entity(EntityError),
    CategoryNotFound(CategoryId),
    /// Form value is not valid UTF-8 after percent decoding.
    InvalidEncoding(String),
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Entity(err) => write!(f, "{err}"),
            Self::CategoryNotFound(id) => write!(f, "category not found: id={id}"),
            Self::InvalidEncoding(message) => write!(f, "invalid form value encoding: {message}"),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Entity(err) => Some(err),
            Self::CategoryNotFound(_) | Self::InvalidEncoding(_) => None,
        }
    }
}

impl From<EntityError> for EngineError {
    fn from(value: EntityError) -> Self {
        Self::Entity(value)
    }
}

/// In-process entity registry.
#[derive(Debug, Default)]
pub struct Engine {
    authors: Vec<AuthorRef>,
    readers: Vec<ReaderRef>,
    articles: Vec<ArticleRef>,
    categories: Vec<CategoryRef>,
    notifiers: Vec<Rc<dyn Notifier>>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry whose created articles get `notifiers` attached.
    pub fn with_notifiers(notifiers: Vec<Rc<dyn Notifier>>) -> Self {
        Self {
            notifiers,
            ..Self::default()
        }
    }

    pub fn authors(&self) -> &[AuthorRef] {
        &self.authors
    }

    pub fn readers(&self) -> &[ReaderRef] {
        &self.readers
    }

    pub fn articles(&self) -> &[ArticleRef] {
        &self.articles
    }

    pub fn categories(&self) -> &[CategoryRef] {
        &self.categories
    }

    pub fn create_user(&self, tag: &str, name: impl Into<String>) -> EngineResult<User> {
        Ok(UserFactory::create(tag, name)?)
    }

    pub fn create_category(
        &self,
        name: impl Into<String>,
        parent: Option<&CategoryRef>,
    ) -> CategoryRef {
        shared(Category::new(name, parent.cloned()))
    }

    /// Creates a tagged article filed under `category`, with the registry's
    /// notification channels attached.
    pub fn create_article(
        &self,
        tag: &str,
        name: impl Into<String>,
        category: &CategoryRef,
    ) -> EngineResult<ArticleRef> {
        let article = ArticleFactory::create(tag, name, category)?;
        {
            let mut article = article.borrow_mut();
            for notifier in &self.notifiers {
                article.attach(Rc::clone(notifier));
            }
        }
        Ok(article)
    }

    pub fn add_user(&mut self, user: User) {
        match user {
            User::Reader(reader) => self.readers.push(reader),
            User::Author(author) => self.authors.push(author),
        }
    }

    pub fn add_category(&mut self, category: CategoryRef) {
        self.categories.push(category);
    }

    pub fn add_article(&mut self, article: ArticleRef) {
        self.articles.push(article);
    }

    pub fn find_category_by_id(&self, id: CategoryId) -> EngineResult<CategoryRef> {
        self.categories
            .iter()
            .find(|category| category.borrow().id() == id)
            .cloned()
            .ok_or_else(|| {
                debug!("event=category_lookup module=engine status=miss id={id}");
                EngineError::CategoryNotFound(id)
            })
    }

    pub fn get_article(&self, name: &str) -> Option<ArticleRef> {
        self.articles
            .iter()
            .find(|article| article.borrow().name == name)
            .cloned()
    }

    pub fn get_reader(&self, name: &str) -> Option<ReaderRef> {
        self.readers
            .iter()
            .find(|reader| reader.borrow().name == name)
            .cloned()
    }

    /// Clones the registered article `name` as `copy_<name>` and registers
    /// the copy. Returns `None` when no article has that name.
    pub fn copy_article(&mut self, name: &str) -> Option<ArticleRef> {
        let original = self.get_article(name)?;
        let copy = Article::deep_clone(&original);
        copy.borrow_mut().name = format!("copy_{name}");
        self.articles.push(Rc::clone(&copy));
        Some(copy)
    }

    /// Decodes one URL-form value: `+` is a space, `%XX` an escaped byte.
    pub fn decode_value(raw: &str) -> EngineResult<String> {
        let spaced = raw.replace('+', " ");
        urlencoding::decode(&spaced)
            .map(|decoded| decoded.into_owned())
            .map_err(|err| EngineError::InvalidEncoding(err.to_string()))
    }
}
