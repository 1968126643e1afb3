//! Category tree nodes.
//!
//! # Invariants
//! - `id` comes from a process-wide counter and is never reused.
//! - Categories form a forest: a root has no parent.
//! - `article_count()` counts only articles filed directly under the category.
//! - A category keeps every article filed under it for its whole lifetime.

use super::{ArticleRef, CategoryRef};
use std::fmt::{Debug, Formatter};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

pub type CategoryId = u64;

static NEXT_CATEGORY_ID: AtomicU64 = AtomicU64::new(0);

fn next_category_id() -> CategoryId {
    NEXT_CATEGORY_ID.fetch_add(1, Ordering::Relaxed)
}

pub struct Category {
    id: CategoryId,
    pub name: String,
    parent: Option<CategoryRef>,
    articles: Vec<ArticleRef>,
}

impl Category {
    /// Creates a category with a freshly assigned id.
    pub fn new(name: impl Into<String>, parent: Option<CategoryRef>) -> Self {
        Self {
            id: next_category_id(),
            name: name.into(),
            parent,
            articles: Vec::new(),
        }
    }

    pub fn id(&self) -> CategoryId {
        self.id
    }

    pub fn parent(&self) -> Option<CategoryRef> {
        self.parent.clone()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Articles filed under this category, in filing order.
    pub fn articles(&self) -> &[ArticleRef] {
        &self.articles
    }

    /// Number of articles filed directly under this category.
    pub fn article_count(&self) -> usize {
        self.articles.len()
    }

    pub(crate) fn file_article(&mut self, article: &ArticleRef) {
        if !self.articles.iter().any(|filed| Rc::ptr_eq(filed, article)) {
            self.articles.push(Rc::clone(article));
        }
    }

    /// Same id and name, with no parent and no articles.
    ///
    /// The copy describes the same category; links are rewired by the caller.
    pub(crate) fn unlinked_copy(&self) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            parent: None,
            articles: Vec::new(),
        }
    }

    pub(crate) fn set_parent(&mut self, parent: Option<CategoryRef>) {
        self.parent = parent;
    }
}

// Articles point back at their category, so only ids are printed.
impl Debug for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Category")
            .field("id", &self.id)
            .field("name", &self.name)
            .field(
                "parent",
                &self
                    .parent
                    .as_ref()
                    .and_then(|parent| parent.try_borrow().ok().map(|parent| parent.id)),
            )
            .field("articles", &self.articles.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Category;
    use crate::model::article::{Article, ArticleKind};
    use crate::model::shared;

    #[test]
    fn ids_increase_monotonically() {
        let first = Category::new("history", None);
        let second = Category::new("science", None);
        assert!(second.id() > first.id());
    }

    #[test]
    fn unlinked_copy_keeps_identity_fields_only() {
        let root = shared(Category::new("history", None));
        let child = shared(Category::new("greece", Some(root.clone())));
        let _article = Article::create(ArticleKind::Approved, "marathon", &child);

        let copy = child.borrow().unlinked_copy();
        assert_eq!(copy.id(), child.borrow().id());
        assert_eq!(copy.name, "greece");
        assert!(copy.is_root());
        assert_eq!(copy.article_count(), 0);
    }

    #[test]
    fn filed_articles_outlive_the_creating_handle() {
        let category = shared(Category::new("rome", None));
        drop(Article::create(ArticleKind::Approved, "caesar", &category));

        let category = category.borrow();
        assert_eq!(category.article_count(), 1);
        assert_eq!(category.articles()[0].borrow().name, "caesar");
    }
}
