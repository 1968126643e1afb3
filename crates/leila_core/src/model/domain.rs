//! Type-erased entity handle consumed by the persistence layer.

use super::user::User;
use super::{ArticleRef, AuthorRef, CategoryRef, ReaderRef};
use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// Closed set of entity types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityType {
    Reader,
    Author,
    Article,
    Category,
}

impl EntityType {
    pub const ALL: [EntityType; 4] = [
        EntityType::Reader,
        EntityType::Author,
        EntityType::Article,
        EntityType::Category,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Reader => "reader",
            Self::Author => "author",
            Self::Article => "article",
            Self::Category => "category",
        }
    }

    pub fn from_name(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == value)
    }
}

impl Display for EntityType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Any entity handle, as staged by the unit of work.
#[derive(Debug, Clone)]
pub enum DomainObject {
    Reader(ReaderRef),
    Author(AuthorRef),
    Article(ArticleRef),
    Category(CategoryRef),
}

impl DomainObject {
    pub fn entity_type(&self) -> EntityType {
        match self {
            Self::Reader(_) => EntityType::Reader,
            Self::Author(_) => EntityType::Author,
            Self::Article(_) => EntityType::Article,
            Self::Category(_) => EntityType::Category,
        }
    }

    /// Store primary key, when the entity type is persisted and has a row.
    pub fn persisted_id(&self) -> Option<i64> {
        match self {
            Self::Reader(reader) => reader.borrow().id,
            Self::Author(_) | Self::Article(_) | Self::Category(_) => None,
        }
    }

    /// True when both handles point at the same in-memory entity.
    pub fn same_instance(&self, other: &DomainObject) -> bool {
        match (self, other) {
            (Self::Reader(a), Self::Reader(b)) => Rc::ptr_eq(a, b),
            (Self::Author(a), Self::Author(b)) => Rc::ptr_eq(a, b),
            (Self::Article(a), Self::Article(b)) => Rc::ptr_eq(a, b),
            (Self::Category(a), Self::Category(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn as_reader(&self) -> Option<&ReaderRef> {
        match self {
            Self::Reader(reader) => Some(reader),
            _ => None,
        }
    }
}

impl From<ReaderRef> for DomainObject {
    fn from(value: ReaderRef) -> Self {
        Self::Reader(value)
    }
}

impl From<&ReaderRef> for DomainObject {
    fn from(value: &ReaderRef) -> Self {
        Self::Reader(Rc::clone(value))
    }
}

impl From<&AuthorRef> for DomainObject {
    fn from(value: &AuthorRef) -> Self {
        Self::Author(Rc::clone(value))
    }
}

impl From<&ArticleRef> for DomainObject {
    fn from(value: &ArticleRef) -> Self {
        Self::Article(Rc::clone(value))
    }
}

impl From<&CategoryRef> for DomainObject {
    fn from(value: &CategoryRef) -> Self {
        Self::Category(Rc::clone(value))
    }
}

impl From<User> for DomainObject {
    fn from(value: User) -> Self {
        match value {
            User::Reader(reader) => Self::Reader(reader),
            User::Author(author) => Self::Author(author),
        }
    }
}
