//! User roles: authors and readers.
//!
//! # Invariants
//! - `Reader::id` is `None` until the reader row has been inserted.
//! - A reader lists each subscribed article at most once.

use super::{shared, ArticleRef, AuthorRef, ReaderRef};
use crate::model::factory::EntityError;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;
use std::str::FromStr;

/// Store-generated reader primary key.
pub type ReaderId = i64;

/// Closed set of user variants known to `UserFactory`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserKind {
    Reader,
    Author,
}

impl UserKind {
    pub const ALL: [UserKind; 2] = [UserKind::Reader, UserKind::Author];

    /// Wire tag used by callers to select this variant.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Reader => "reader",
            Self::Author => "author",
        }
    }
}

impl Display for UserKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for UserKind {
    type Err = EntityError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag() == value)
            .ok_or_else(|| EntityError::UnknownType {
                family: "user",
                tag: value.to_string(),
            })
    }
}

/// Author role. Carries no state beyond its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
}

impl Author {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Reader role: the only persisted entity.
pub struct Reader {
    /// Row id in `readers`; `None` before the first insert.
    pub id: Option<ReaderId>,
    pub name: String,
    articles: Vec<ArticleRef>,
}

impl Reader {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            articles: Vec::new(),
        }
    }

    /// Rehydrates a reader loaded from the store.
    pub fn with_id(id: ReaderId, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            ..Self::new(name)
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Articles this reader is subscribed to, in subscription order.
    pub fn articles(&self) -> &[ArticleRef] {
        &self.articles
    }

    pub fn is_subscribed_to(&self, article: &ArticleRef) -> bool {
        self.articles.iter().any(|linked| Rc::ptr_eq(linked, article))
    }

    pub(crate) fn link_article(&mut self, article: &ArticleRef) {
        if !self.is_subscribed_to(article) {
            self.articles.push(Rc::clone(article));
        }
    }

    /// Same id and name, subscribed to nothing.
    pub(crate) fn unlinked_copy(&self) -> Self {
        Self {
            id: self.id,
            ..Self::new(self.name.clone())
        }
    }
}

// Articles hold their readers, so subscriptions are printed as a count.
impl Debug for Reader {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reader")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("articles", &self.articles.len())
            .finish()
    }
}

/// A constructed user of either role.
#[derive(Debug, Clone)]
pub enum User {
    Reader(ReaderRef),
    Author(AuthorRef),
}

impl User {
    /// Builds a fresh user of the given variant.
    pub fn new(kind: UserKind, name: impl Into<String>) -> Self {
        match kind {
            UserKind::Reader => Self::Reader(shared(Reader::new(name))),
            UserKind::Author => Self::Author(shared(Author::new(name))),
        }
    }

    pub fn kind(&self) -> UserKind {
        match self {
            Self::Reader(_) => UserKind::Reader,
            Self::Author(_) => UserKind::Author,
        }
    }

    pub fn name(&self) -> String {
        match self {
            Self::Reader(reader) => reader.borrow().name.clone(),
            Self::Author(author) => author.borrow().name.clone(),
        }
    }

    pub fn into_reader(self) -> Option<ReaderRef> {
        match self {
            Self::Reader(reader) => Some(reader),
            Self::Author(_) => None,
        }
    }

    pub fn into_author(self) -> Option<AuthorRef> {
        match self {
            Self::Author(author) => Some(author),
            Self::Reader(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Reader, User, UserKind};

    #[test]
    fn user_kind_parses_known_tags_only() {
        assert_eq!("reader".parse::<UserKind>().unwrap(), UserKind::Reader);
        assert_eq!("author".parse::<UserKind>().unwrap(), UserKind::Author);
        assert!("Reader".parse::<UserKind>().is_err());
        assert!("editor".parse::<UserKind>().is_err());
    }

    #[test]
    fn new_reader_is_not_persisted() {
        let reader = Reader::new("Alice");
        assert!(!reader.is_persisted());
        assert!(reader.articles().is_empty());

        let loaded = Reader::with_id(7, "Bob");
        assert_eq!(loaded.id, Some(7));
    }

    #[test]
    fn user_reports_kind_and_name() {
        let user = User::new(UserKind::Author, "Homer");
        assert_eq!(user.kind(), UserKind::Author);
        assert_eq!(user.name(), "Homer");
        assert!(user.into_reader().is_none());
    }
}
