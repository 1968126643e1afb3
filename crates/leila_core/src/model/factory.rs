//! Tag-based entity factories.
//!
//! # Responsibility
//! - Map caller-provided type tags to concrete entity variants.
//! - Keep callers decoupled from concrete constructors.
//!
//! # Invariants
//! - Tags resolve through closed enums; unknown tags fail, never default.
//! - Every call returns a fresh, independent object.

use super::article::{Article, ArticleKind};
use super::user::{User, UserKind};
use super::{ArticleRef, CategoryRef};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors raised while constructing entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityError {
    /// `tag` is not registered for the given factory family.
    UnknownType { family: &'static str, tag: String },
}

impl Display for EntityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownType { family, tag } => {
                write!(f, "unknown {family} type tag: `{tag}`")
            }
        }
    }
}

impl Error for EntityError {}

/// Factory for `reader` / `author` users.
pub struct UserFactory;

impl UserFactory {
    pub fn create(tag: &str, name: impl Into<String>) -> Result<User, EntityError> {
        let kind = tag.parse::<UserKind>()?;
        Ok(User::new(kind, name))
    }
}

/// Factory for `approved` / `unapproved` articles.
pub struct ArticleFactory;

impl ArticleFactory {
    /// Creates an article of the tagged variant, filed under `category`.
    pub fn create(
        tag: &str,
        name: impl Into<String>,
        category: &CategoryRef,
    ) -> Result<ArticleRef, EntityError> {
        let kind = tag.parse::<ArticleKind>()?;
        Ok(Article::create(kind, name, category))
    }
}
