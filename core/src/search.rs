use crate::document::{Document, FileType, SearchResult};
use crate::rank::rank_all;
use serde::Deserialize;
use time::OffsetDateTime;

fn default_page() -> usize { 1 }
fn default_page_size() -> usize { 20 }

pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub file_type: Option<FileType>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub from: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub to: Option<OffsetDateTime>,
    pub uploaded_by: Option<String>,
    /// 1-based.
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            q: String::new(),
            file_type: None,
            from: None,
            to: None,
            uploaded_by: None,
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl SearchQuery {
    pub fn new(q: impl Into<String>) -> Self {
        Self { q: q.into(), ..Default::default() }
    }

    /// Filters other than the text query.
    fn accepts(&self, doc: &Document) -> bool {
        if let Some(ft) = self.file_type {
            if doc.file_type != ft { return false; }
        }
        if let Some(from) = self.from {
            if doc.upload_date < from { return false; }
        }
        if let Some(to) = self.to {
            if doc.upload_date > to { return false; }
        }
        if let Some(user) = &self.uploaded_by {
            if !user.is_empty() && &doc.uploaded_by != user { return false; }
        }
        true
    }
}

/// True when the whole query occurs, case-insensitively, in any searchable field.
/// A blank query matches everything.
pub fn matches_text(doc: &Document, q: &str) -> bool {
    if q.trim().is_empty() {
        return true;
    }
    let q = q.to_lowercase();
    doc.title.to_lowercase().contains(&q)
        || doc.content.to_lowercase().contains(&q)
        || doc.summary.to_lowercase().contains(&q)
        || doc.keywords.to_lowercase().contains(&q)
}

/// Apply filters to `docs` (expected newest first), cut out the requested
/// page, and rank that page.
pub fn search(docs: Vec<Document>, query: &SearchQuery) -> Vec<SearchResult> {
    let page = query.page.max(1);
    let page_size = query.page_size.clamp(1, MAX_PAGE_SIZE);
    let candidates: Vec<Document> = docs
        .into_iter()
        .filter(|d| query.accepts(d) && matches_text(d, &query.q))
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();
    rank_all(&candidates, &query.q)
}
