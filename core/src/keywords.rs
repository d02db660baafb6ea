use crate::error::AnalysisError;
use crate::tokenizer::{is_stopword, keyword_tokens};
use std::collections::HashMap;

struct Group<'a> {
    display: &'a str,
    count: usize,
    first_seen: usize,
}

/// Most frequent content words of `content`, at most `limit`, joined with `", "`.
///
/// Tokens are grouped case-insensitively and shown in the casing of their
/// first occurrence. Equal counts keep first-occurrence order.
pub fn extract_keywords(content: &str, limit: usize) -> Result<String, AnalysisError> {
    if content.trim().is_empty() {
        return Err(AnalysisError::EmptyContent);
    }

    let mut groups: HashMap<String, Group> = HashMap::new();
    for (pos, token) in keyword_tokens(content).enumerate() {
        if token.chars().count() <= 3 {
            continue;
        }
        let key = token.to_lowercase();
        if is_stopword(&key) {
            continue;
        }
        groups
            .entry(key)
            .and_modify(|g| g.count += 1)
            .or_insert(Group { display: token, count: 1, first_seen: pos });
    }

    let mut ranked: Vec<Group> = groups.into_values().collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then(a.first_seen.cmp(&b.first_seen)));
    let keywords: Vec<&str> = ranked.iter().take(limit).map(|g| g.display).collect();
    Ok(keywords.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_by_count_then_first_occurrence() {
        let text = "Rust memory safety. Rust ownership model. Memory layout and rust.";
        assert_eq!(extract_keywords(text, 10).unwrap(), "Rust, memory, safety, ownership, model, layout");
    }

    #[test]
    fn respects_limit() {
        let text = "alpha1 alpha2 alpha3 alpha4 alpha5";
        assert_eq!(extract_keywords(text, 2).unwrap(), "alpha1, alpha2");
    }

    #[test]
    fn narrow_separators_keep_trailing_punctuation() {
        let text = "Modern sistemler (yapay zeka) API'ler: kullanır";
        let kw = extract_keywords(text, 10).unwrap();
        assert!(kw.contains("API'ler:"));
        assert!(kw.contains("zeka)"));
    }

    #[test]
    fn only_short_or_stop_words_yields_empty_list() {
        assert_eq!(extract_keywords("the and for with that this", 10).unwrap(), "");
    }

    #[test]
    fn blank_is_an_error() {
        assert!(matches!(extract_keywords(" \r\n", 10), Err(AnalysisError::EmptyContent)));
    }
}
