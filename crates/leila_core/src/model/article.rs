//! Articles: category members, reader subscriptions and the prototype clone.
//!
//! # Responsibility
//! - Keep the article <-> reader link bidirectional.
//! - Notify attached channels when a reader joins an article.
//! - Produce fully independent deep copies of an article's reachable subgraph.
//!
//! # Invariants
//! - An article is filed in its category's article list at construction.
//! - `readers` holds each reader at most once, in join order.
//! - The joining reader is never a recipient of its own join notice.

use super::category::{Category, CategoryId};
use super::domain::DomainObject;
use super::user::{Reader, ReaderId};
use super::{shared, ArticleRef, CategoryRef, ReaderRef, Shared};
use crate::model::factory::EntityError;
use crate::notify::{Notifier, ReaderJoined};
use log::debug;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;
use std::str::FromStr;

/// Closed set of article variants known to `ArticleFactory`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleKind {
    Approved,
    Unapproved,
}

impl ArticleKind {
    pub const ALL: [ArticleKind; 2] = [ArticleKind::Approved, ArticleKind::Unapproved];

    pub fn tag(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Unapproved => "unapproved",
        }
    }
}

impl Display for ArticleKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ArticleKind {
    type Err = EntityError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag() == value)
            .ok_or_else(|| EntityError::UnknownType {
                family: "article",
                tag: value.to_string(),
            })
    }
}

pub struct Article {
    pub name: String,
    kind: ArticleKind,
    category: CategoryRef,
    readers: Vec<ReaderRef>,
    notifiers: Vec<Rc<dyn Notifier>>,
}

/// Value view of an article and its neighbourhood, used to compare
/// articles by content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleSnapshot {
    pub name: String,
    pub kind: ArticleKind,
    pub category_id: CategoryId,
    pub category_name: String,
    /// Names of every article filed in the same category, in filing order.
    pub category_articles: Vec<String>,
    /// Parent chain names, nearest first.
    pub category_path: Vec<String>,
    pub readers: Vec<ReaderSnapshot>,
}

/// Subscriber entry of an `ArticleSnapshot`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReaderSnapshot {
    pub id: Option<ReaderId>,
    pub name: String,
    /// Names of every article the reader is subscribed to.
    pub articles: Vec<String>,
}

impl Article {
    /// Creates an article and files it under `category`.
    pub fn create(
        kind: ArticleKind,
        name: impl Into<String>,
        category: &CategoryRef,
    ) -> ArticleRef {
        let article = shared(Self {
            name: name.into(),
            kind,
            category: Rc::clone(category),
            readers: Vec::new(),
            notifiers: Vec::new(),
        });
        category.borrow_mut().file_article(&article);
        article
    }

    pub fn kind(&self) -> ArticleKind {
        self.kind
    }

    pub fn category(&self) -> CategoryRef {
        Rc::clone(&self.category)
    }

    pub fn readers(&self) -> &[ReaderRef] {
        &self.readers
    }

    /// Reader at `index` in join order.
    pub fn reader(&self, index: usize) -> Option<ReaderRef> {
        self.readers.get(index).cloned()
    }

    pub fn has_reader(&self, reader: &ReaderRef) -> bool {
        self.readers.iter().any(|linked| Rc::ptr_eq(linked, reader))
    }

    /// Attaches a notification channel to this article.
    pub fn attach(&mut self, notifier: Rc<dyn Notifier>) {
        if !self
            .notifiers
            .iter()
            .any(|attached| Rc::ptr_eq(attached, &notifier))
        {
            self.notifiers.push(notifier);
        }
    }

    pub fn notifier_count(&self) -> usize {
        self.notifiers.len()
    }

    /// Links `reader` to `article` on both sides, then notifies subscribers.
    ///
    /// The link is created once per pair; the notification pass runs on
    /// every call. Every existing subscriber except `reader` gets one
    /// `ReaderJoined` notice per attached channel, in join order.
    ///
    /// Returns the number of subscribers notified.
    pub fn add_reader(article: &ArticleRef, reader: &ReaderRef) -> usize {
        let already_linked = article.borrow().has_reader(reader);
        if !already_linked {
            article.borrow_mut().readers.push(Rc::clone(reader));
            reader.borrow_mut().link_article(article);
        }

        let (notices, notifiers) = {
            let current = article.borrow();
            let joined = reader.borrow().name.clone();
            let category = current.category.borrow().name.clone();
            let notices = current
                .readers
                .iter()
                .filter(|subscriber| !Rc::ptr_eq(subscriber, reader))
                .map(|subscriber| ReaderJoined {
                    article: current.name.clone(),
                    category: category.clone(),
                    subscriber: subscriber.borrow().name.clone(),
                    joined: joined.clone(),
                })
                .collect::<Vec<_>>();
            (notices, current.notifiers.clone())
        };

        for notice in &notices {
            for notifier in &notifiers {
                notifier.notify(notice);
            }
        }

        debug!(
            "event=reader_join module=model status=ok relinked={} subscribers_notified={} channels={}",
            already_linked,
            notices.len(),
            notifiers.len()
        );
        notices.len()
    }

    /// Deep copy of `article` and everything reachable from it.
    ///
    /// The reachable subgraph is the article's category with its parent
    /// chain and sibling articles, every reader, every other article those
    /// readers follow, and so on transitively. Each node is copied exactly
    /// once and every link is rewired to the copies, so the clone shares no
    /// entity with the source graph. Ids and names are kept; notification
    /// channels are shared since they are not entity state.
    ///
    /// The clone is not registered anywhere.
    pub fn deep_clone(article: &ArticleRef) -> ArticleRef {
        let copy = Subgraph::reachable_from(article).copy();
        debug!(
            "event=article_clone module=model status=ok articles={} categories={} readers={}",
            copy.articles.len(),
            copy.categories.len(),
            copy.readers.len()
        );
        copy.root
    }

    pub fn snapshot(&self) -> ArticleSnapshot {
        let category = self.category.borrow();
        let mut category_path = Vec::new();
        let mut parent = category.parent();
        while let Some(node) = parent {
            let node = node.borrow();
            category_path.push(node.name.clone());
            parent = node.parent();
        }
        ArticleSnapshot {
            name: self.name.clone(),
            kind: self.kind,
            category_id: category.id(),
            category_name: category.name.clone(),
            category_articles: article_names(category.articles()),
            category_path,
            readers: self
                .readers
                .iter()
                .map(|reader| {
                    let reader = reader.borrow();
                    ReaderSnapshot {
                        id: reader.id,
                        name: reader.name.clone(),
                        articles: article_names(reader.articles()),
                    }
                })
                .collect(),
        }
    }
}

// Categories and readers point back at their articles, so links are
// printed as ids and counts.
impl Debug for Article {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Article")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field(
                "category",
                &self.category.try_borrow().ok().map(|category| category.id()),
            )
            .field("readers", &self.readers.len())
            .field("notifiers", &self.notifiers.len())
            .finish()
    }
}

fn article_names(articles: &[ArticleRef]) -> Vec<String> {
    articles
        .iter()
        .map(|article| article.borrow().name.clone())
        .collect()
}

/// Nodes of one shared type in discovery order, indexed by address.
struct Nodes<T> {
    order: Vec<Shared<T>>,
    index: HashMap<*const RefCell<T>, usize>,
}

impl<T> Nodes<T> {
    fn new() -> Self {
        Self {
            order: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Records `node`; returns `false` when it was already seen.
    fn visit(&mut self, node: &Shared<T>) -> bool {
        let key = Rc::as_ptr(node);
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key, self.order.len());
        self.order.push(Rc::clone(node));
        true
    }

    fn position(&self, node: &Shared<T>) -> Option<usize> {
        self.index.get(&Rc::as_ptr(node)).copied()
    }

    /// Element of `copies` standing for `node`.
    fn counterpart(&self, node: &Shared<T>, copies: &[Shared<T>]) -> Option<Shared<T>> {
        self.position(node)
            .and_then(|position| copies.get(position))
            .cloned()
    }
}

/// Every entity reachable from one article. `root` is `articles.order[0]`.
struct Subgraph {
    root: ArticleRef,
    articles: Nodes<Article>,
    categories: Nodes<Category>,
    readers: Nodes<Reader>,
}

/// Copies of a `Subgraph`, index-aligned with its discovery order.
struct SubgraphCopy {
    root: ArticleRef,
    articles: Vec<ArticleRef>,
    categories: Vec<CategoryRef>,
    readers: Vec<ReaderRef>,
}

impl Subgraph {
    fn reachable_from(root: &ArticleRef) -> Self {
        let mut graph = Self {
            root: Rc::clone(root),
            articles: Nodes::new(),
            categories: Nodes::new(),
            readers: Nodes::new(),
        };
        let mut pending = vec![DomainObject::Article(Rc::clone(root))];

        while let Some(node) = pending.pop() {
            match node {
                DomainObject::Article(handle) => {
                    if graph.articles.visit(&handle) {
                        let article = handle.borrow();
                        pending.push(DomainObject::Category(article.category()));
                        pending.extend(
                            article.readers.iter().cloned().map(DomainObject::Reader),
                        );
                    }
                }
                DomainObject::Category(handle) => {
                    if graph.categories.visit(&handle) {
                        let category = handle.borrow();
                        pending.extend(category.parent().map(DomainObject::Category));
                        pending.extend(
                            category.articles().iter().cloned().map(DomainObject::Article),
                        );
                    }
                }
                DomainObject::Reader(handle) => {
                    if graph.readers.visit(&handle) {
                        let reader = handle.borrow();
                        pending.extend(
                            reader.articles().iter().cloned().map(DomainObject::Article),
                        );
                    }
                }
                DomainObject::Author(_) => {}
            }
        }
        graph
    }

    /// Copies every node, then rewires each link in its source order.
    fn copy(&self) -> SubgraphCopy {
        let categories: Vec<CategoryRef> = self
            .categories
            .order
            .iter()
            .map(|category| shared(category.borrow().unlinked_copy()))
            .collect();
        let readers: Vec<ReaderRef> = self
            .readers
            .order
            .iter()
            .map(|reader| shared(reader.borrow().unlinked_copy()))
            .collect();
        let root = self.article_copy(&self.root, &categories);
        let articles: Vec<ArticleRef> = std::iter::once(Rc::clone(&root))
            .chain(
                self.articles
                    .order
                    .iter()
                    .skip(1)
                    .map(|source| self.article_copy(source, &categories)),
            )
            .collect();

        for (source, copy) in self.categories.order.iter().zip(&categories) {
            let source = source.borrow();
            let mut copy = copy.borrow_mut();
            copy.set_parent(
                source
                    .parent()
                    .and_then(|parent| self.categories.counterpart(&parent, &categories)),
            );
            for article in source.articles() {
                if let Some(article) = self.articles.counterpart(article, &articles) {
                    copy.file_article(&article);
                }
            }
        }
        for (source, copy) in self.readers.order.iter().zip(&readers) {
            let mut copy = copy.borrow_mut();
            for article in source.borrow().articles() {
                if let Some(article) = self.articles.counterpart(article, &articles) {
                    copy.link_article(&article);
                }
            }
        }
        for (source, copy) in self.articles.order.iter().zip(&articles) {
            let mut copy = copy.borrow_mut();
            for reader in &source.borrow().readers {
                if let Some(reader) = self.readers.counterpart(reader, &readers) {
                    copy.readers.push(reader);
                }
            }
        }

        SubgraphCopy {
            root,
            articles,
            categories,
            readers,
        }
    }

    /// Unlinked copy of `source`, pointing at the copy of its category.
    fn article_copy(&self, source: &ArticleRef, categories: &[CategoryRef]) -> ArticleRef {
        let source = source.borrow();
        let category = self
            .categories
            .counterpart(&source.category, categories)
            .unwrap_or_else(|| shared(source.category.borrow().unlinked_copy()));
        shared(Article {
            name: source.name.clone(),
            kind: source.kind,
            category,
            readers: Vec::with_capacity(source.readers.len()),
            notifiers: source.notifiers.clone(),
        })
    }
}
