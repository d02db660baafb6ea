use crate::document::{Document, SearchResult};
use rayon::prelude::*;
use regex::{Captures, RegexBuilder};
use std::cmp::Ordering;

pub const TITLE_WEIGHT: f64 = 10.0;
pub const CONTENT_WEIGHT: f64 = 5.0;
pub const SUMMARY_WEIGHT: f64 = 8.0;
pub const KEYWORDS_WEIGHT: f64 = 12.0;

/// Lower-cased copies of the searchable fields, built once per ranking.
struct Fields {
    title: String,
    content: String,
    summary: String,
    keywords: String,
}

impl Fields {
    fn of(doc: &Document) -> Self {
        Self {
            title: doc.title.to_lowercase(),
            content: doc.content.to_lowercase(),
            summary: doc.summary.to_lowercase(),
            keywords: doc.keywords.to_lowercase(),
        }
    }

    fn score(&self, needle: &str) -> f64 {
        let mut score = 0.0;
        if self.title.contains(needle) { score += TITLE_WEIGHT; }
        if self.content.contains(needle) { score += CONTENT_WEIGHT; }
        if self.summary.contains(needle) { score += SUMMARY_WEIGHT; }
        if self.keywords.contains(needle) { score += KEYWORDS_WEIGHT; }
        score
    }

    fn any_contains(&self, needle: &str) -> bool {
        self.title.contains(needle)
            || self.content.contains(needle)
            || self.summary.contains(needle)
            || self.keywords.contains(needle)
    }
}

/// Field-weighted score of the whole query as one case-insensitive substring.
pub fn relevance_score(doc: &Document, query: &str) -> f64 {
    if query.trim().is_empty() {
        return 0.0;
    }
    Fields::of(doc).score(&query.to_lowercase())
}

/// Whitespace-separated query terms present in any field, as typed, first occurrence only.
pub fn matched_terms(doc: &Document, query: &str) -> Vec<String> {
    collect_matched(&Fields::of(doc), query)
}

fn collect_matched(fields: &Fields, query: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for term in query.split_whitespace() {
        if out.iter().any(|t| t == term) {
            continue;
        }
        if fields.any_contains(&term.to_lowercase()) {
            out.push(term.to_string());
        }
    }
    out
}

/// Wrap every whole-word, case-insensitive occurrence of each query term in `<mark>` tags.
///
/// Terms are applied one after another over the already highlighted text, so a
/// term that is part of an earlier term (or of the tag itself) is marked again.
pub fn highlight(content: &str, query: &str) -> String {
    let mut out = content.to_string();
    for term in query.split_whitespace() {
        let pattern = format!(r"\b{}\b", regex::escape(term));
        let re = match RegexBuilder::new(&pattern).case_insensitive(true).build() {
            Ok(re) => re,
            Err(e) => {
                tracing::warn!(term, error = %e, "skipping highlight term");
                continue;
            }
        };
        out = re
            .replace_all(&out, |caps: &Captures| format!("<mark>{}</mark>", &caps[0]))
            .into_owned();
    }
    out
}

pub fn rank_document(doc: &Document, query: &str) -> SearchResult {
    let fields = Fields::of(doc);
    let (relevance_score, matched_terms) = if query.trim().is_empty() {
        (0.0, Vec::new())
    } else {
        (fields.score(&query.to_lowercase()), collect_matched(&fields, query))
    };
    SearchResult {
        document_id: doc.id,
        title: doc.title.clone(),
        file_name: doc.file_name.clone(),
        file_type: doc.file_type,
        summary: doc.summary.clone(),
        keywords: doc.keywords.clone(),
        upload_date: doc.upload_date,
        uploaded_by: doc.uploaded_by.clone(),
        relevance_score,
        matched_terms,
        highlighted_content: highlight(&doc.content, query),
    }
}

/// Rank every document and order by score, highest first. Equal scores keep input order.
pub fn rank_all(docs: &[Document], query: &str) -> Vec<SearchResult> {
    let mut results: Vec<SearchResult> = docs.par_iter().map(|d| rank_document(d, query)).collect();
    results.sort_by(|a, b| b.relevance_score.partial_cmp(&a.relevance_score).unwrap_or(Ordering::Equal));
    results
}
