use crate::tokenizer::{is_stopword, tokenize};
use std::collections::HashMap;

/// Occurrence counts of lower-cased tokens over one scoring corpus.
#[derive(Debug, Default, Clone)]
pub struct WordFrequencyTable {
    counts: HashMap<String, u32>,
}

impl WordFrequencyTable {
    /// Count tokens across all given texts. Stop words are counted as well;
    /// [`WordFrequencyTable::score`] is what skips them.
    pub fn build<S: AsRef<str>>(texts: &[S]) -> Self {
        let mut counts: HashMap<String, u32> = HashMap::new();
        for text in texts {
            for token in tokenize(text.as_ref()) {
                *counts.entry(token).or_insert(0) += 1;
            }
        }
        Self { counts }
    }

    pub fn get(&self, token: &str) -> u32 {
        self.counts.get(token).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of counts for the non-stop-word tokens.
    pub fn score(&self, tokens: &[String]) -> f64 {
        tokens
            .iter()
            .filter(|t| !is_stopword(t))
            .map(|t| self.get(t) as f64)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_across_texts_including_stopwords() {
        let table = WordFrequencyTable::build(&["The data model.", "the DATA pipeline"]);
        assert_eq!(table.get("data"), 2);
        assert_eq!(table.get("the"), 2);
        assert_eq!(table.get("model"), 1);
        assert_eq!(table.get("missing"), 0);
    }

    #[test]
    fn score_skips_stopwords() {
        let table = WordFrequencyTable::build(&["the data the data the"]);
        let tokens = tokenize("the data");
        assert_eq!(table.score(&tokens), 2.0);
    }
}
