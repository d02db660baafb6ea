use serde::Serialize;

pub const DEFAULT_MIN_SENTENCE_CHARS: usize = 20;

const QUOTES: &[char] = &['"', '\u{201C}', '\u{201D}', '\u{201E}'];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sentence {
    pub text: String,
    /// Position among the emitted sentences, starting at 0.
    pub original_index: usize,
}

/// Split text into sentences on `.`, `!` and `?` outside quotes.
///
/// The terminator stays with its sentence. Trimmed fragments of `min_chars`
/// characters or fewer are noise and are dropped without taking an index.
pub fn split(text: &str, min_chars: usize) -> Vec<Sentence> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in text.chars() {
        current.push(c);
        if QUOTES.contains(&c) {
            in_quotes = !in_quotes;
        }
        if matches!(c, '.' | '!' | '?') && !in_quotes {
            push_sentence(&mut sentences, &current, min_chars);
            current.clear();
        }
    }
    push_sentence(&mut sentences, &current, min_chars);
    sentences
}

fn push_sentence(out: &mut Vec<Sentence>, raw: &str, min_chars: usize) {
    let text = raw.trim();
    if text.chars().count() > min_chars {
        let original_index = out.len();
        out.push(Sentence { text: text.to_string(), original_index });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_indexes() {
        let s = split("This is the first sentence here. Short one. And this is the second long one!", 20);
        assert_eq!(s.len(), 2);
        assert_eq!(s[0].text, "This is the first sentence here.");
        assert_eq!(s[0].original_index, 0);
        assert_eq!(s[1].text, "And this is the second long one!");
        assert_eq!(s[1].original_index, 1);
    }

    #[test]
    fn terminators_inside_quotes_do_not_split() {
        let s = split("He said \"stop. wait!\" and then walked away from the door.", 20);
        assert_eq!(s.len(), 1);
        assert_eq!(s[0].text, "He said \"stop. wait!\" and then walked away from the door.");
    }

    #[test]
    fn curly_quotes_toggle_too() {
        let s = split("She wrote \u{201C}done. really\u{201D} on the final page of it.", 20);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn trailing_text_is_flushed() {
        let s = split("A complete opening sentence is here. Trailing text without a stop", 20);
        assert_eq!(s.len(), 2);
        assert_eq!(s[1].text, "Trailing text without a stop");
    }

    #[test]
    fn exactly_min_chars_is_dropped() {
        // 20 characters including the period
        let s = split("abcdefghij abcdefgh.", 20);
        assert!(s.is_empty());
        let s = split("abcdefghij abcdefghi.", 20);
        assert_eq!(s.len(), 1);
    }
}
