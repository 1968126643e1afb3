//! Read-only JSON view of registered articles.

use crate::model::article::{Article, ArticleKind};
use crate::model::ArticleRef;
use serde::Serialize;

/// Flat article record exposed to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleRecord {
    pub name: String,
    pub kind: ArticleKind,
    pub category: String,
    pub readers: Vec<String>,
}

impl From<&Article> for ArticleRecord {
    fn from(article: &Article) -> Self {
        Self {
            name: article.name.clone(),
            kind: article.kind(),
            category: article.category().borrow().name.clone(),
            readers: article
                .readers()
                .iter()
                .map(|reader| reader.borrow().name.clone())
                .collect(),
        }
    }
}

pub fn article_records(articles: &[ArticleRef]) -> Vec<ArticleRecord> {
    articles
        .iter()
        .map(|article| ArticleRecord::from(&*article.borrow()))
        .collect()
}

/// Serializes `articles` as a JSON array of `ArticleRecord`s.
pub fn serialize_articles(articles: &[ArticleRef]) -> serde_json::Result<String> {
    serde_json::to_string(&article_records(articles))
}
