//! In-memory domain model for readers, authors, articles and categories.
//!
//! # Responsibility
//! - Define the entity graph mutated by callers and by the observer channel.
//! - Provide tag-based factories and the `DomainObject` sum used by persistence.
//!
//! # Invariants
//! - Entities are shared through `Rc<RefCell<_>>`; identity is `Rc::ptr_eq`.
//! - Links are strong in both directions: a category keeps its articles and
//!   a reader keeps its subscriptions. Entities live for the whole process,
//!   so the resulting cycles are never torn down.
//! - An article belongs to exactly one category from construction onward.

use std::cell::RefCell;
use std::rc::Rc;

pub mod article;
pub mod category;
pub mod domain;
pub mod factory;
pub mod user;

use article::Article;
use category::Category;
use user::{Author, Reader};

/// Shared, interior-mutable entity handle.
pub type Shared<T> = Rc<RefCell<T>>;

pub type ReaderRef = Shared<Reader>;
pub type AuthorRef = Shared<Author>;
pub type ArticleRef = Shared<Article>;
pub type CategoryRef = Shared<Category>;

/// Wraps an entity into a shared handle.
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}
