use lazy_static::lazy_static;
use std::collections::HashSet;

/// Separators for sentence scoring: whitespace, sentence punctuation, brackets and quotes.
const SCORING_SEPARATORS: &[char] = &[
    ' ', '\t', '\n', '\r', '.', ',', '!', '?', ':', ';', '(', ')', '[', ']', '"', '\u{201C}', '\u{201D}',
];

/// Separators for keyword extraction. Narrower on purpose: `:` and brackets stay attached.
const KEYWORD_SEPARATORS: &[char] = &[' ', '\t', '\n', '\r', '.', ',', '!', '?'];

lazy_static! {
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "ve","veya","ile","için","bu","bir","da","de","mi","mu","mü",
            "the","and","or","for","this","that","with","in","on","at","to","of","a","an",
            "is","are","was","were","be","been","have","has","had","do","does","did",
            "will","would","could","should","may","might","can","must","shall"
        ];
        words.iter().copied().collect()
    };
}

/// Case-insensitive stop-word lookup.
pub fn is_stopword(token: &str) -> bool {
    if STOPWORDS.contains(token) {
        return true;
    }
    STOPWORDS.contains(token.to_lowercase().as_str())
}

/// Tokenize text for frequency scoring: split on [`SCORING_SEPARATORS`], keep tokens
/// longer than two characters, lower-case them. Stop words are kept.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(SCORING_SEPARATORS)
        .filter(|t| t.chars().count() > 2)
        .map(|t| t.to_lowercase())
        .collect()
}

/// Raw tokens for keyword extraction, original casing preserved.
pub fn keyword_tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(KEYWORD_SEPARATORS).filter(|t| !t.is_empty())
}
