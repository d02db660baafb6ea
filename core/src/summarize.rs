use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::frequency::WordFrequencyTable;
use crate::metadata;
use crate::sentence::{self, Sentence};
use crate::tokenizer::tokenize;
use lazy_static::lazy_static;
use std::cmp::Ordering;

lazy_static! {
    static ref IMPORTANT_TERMS: Vec<&'static str> = vec![
        "sonuç", "bulgu", "araştırma", "çalışma", "yöntem", "veri", "analiz",
        "result", "finding", "research", "study", "method", "data", "analysis", "conclusion", "summary",
    ];
}

const WELL_FORMED_BONUS: f64 = 1.2;
const FRAGMENT_PENALTY: f64 = 0.5;
const MID_DOCUMENT_BONUS: f64 = 1.1;
const IMPORTANT_TERM_BONUS: f64 = 1.3;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSentence {
    pub sentence: Sentence,
    pub score: f64,
}

/// Sentences considered for a summary: metadata stripped first, falling back
/// to the raw content, and finally to the whole trimmed content.
pub fn candidate_sentences(content: &str, min_chars: usize) -> Vec<Sentence> {
    let stripped = metadata::strip(content);
    let mut sentences = sentence::split(&stripped, min_chars);
    if sentences.is_empty() {
        tracing::debug!("no sentences after metadata removal, using original content");
        sentences = sentence::split(content, min_chars);
    }
    if sentences.is_empty() {
        let text = content.trim();
        if !text.is_empty() {
            sentences.push(Sentence { text: text.to_string(), original_index: 0 });
        }
    }
    sentences
}

pub fn score_sentences(sentences: Vec<Sentence>) -> Vec<ScoredSentence> {
    let texts: Vec<&str> = sentences.iter().map(|s| s.text.as_str()).collect();
    let table = WordFrequencyTable::build(&texts);
    let total = sentences.len() as f64;

    sentences
        .into_iter()
        .enumerate()
        .map(|(i, sentence)| {
            let tokens = tokenize(&sentence.text);
            let mut score = table.score(&tokens);

            let n = tokens.len();
            if (8..=25).contains(&n) {
                score *= WELL_FORMED_BONUS;
            } else if n < 5 || n > 40 {
                score *= FRAGMENT_PENALTY;
            }

            let position = i as f64 / total;
            if (0.2..=0.8).contains(&position) {
                score *= MID_DOCUMENT_BONUS;
            }

            let lower = sentence.text.to_lowercase();
            if IMPORTANT_TERMS.iter().any(|t| lower.contains(t)) {
                score *= IMPORTANT_TERM_BONUS;
            }

            ScoredSentence { sentence, score }
        })
        .collect()
}

/// Highest `count` sentences, ties broken by document position, returned in document order.
pub fn select_top(mut scored: Vec<ScoredSentence>, count: usize) -> Vec<ScoredSentence> {
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then(a.sentence.original_index.cmp(&b.sentence.original_index))
    });
    scored.truncate(count);
    scored.sort_by_key(|s| s.sentence.original_index);
    scored
}

fn ends_with_terminator(s: &str) -> bool {
    s.ends_with(['.', '!', '?'])
}

/// Join sentences with `". "`, not doubling a terminator a sentence already has.
pub fn join_sentences(selected: &[ScoredSentence]) -> String {
    let mut summary = String::new();
    for (i, s) in selected.iter().enumerate() {
        if i > 0 {
            if !ends_with_terminator(&summary) {
                summary.push('.');
            }
            summary.push(' ');
        }
        summary.push_str(&s.sentence.text);
    }
    if !ends_with_terminator(&summary) {
        summary.push('.');
    }
    summary
}

/// Extractive summary of `content`.
pub fn summarize(content: &str, cfg: &AnalysisConfig) -> Result<String, AnalysisError> {
    if content.trim().is_empty() {
        return Err(AnalysisError::EmptyContent);
    }
    let sentences = candidate_sentences(content, cfg.min_sentence_chars);
    if sentences.is_empty() {
        return Err(AnalysisError::NoSentences);
    }
    let total = sentences.len();
    let selected = select_top(score_sentences(sentences), cfg.summary_sentences);
    tracing::debug!(total, selected = selected.len(), "summary sentences chosen");
    Ok(join_sentences(&selected))
}
