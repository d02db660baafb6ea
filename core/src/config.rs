use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

/// Language of the fixed fallback messages returned by the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Turkish,
    English,
}

impl Language {
    pub fn content_not_found(&self) -> &'static str {
        match self {
            Language::Turkish => "İçerik bulunamadı.",
            Language::English => "Content not found.",
        }
    }

    pub fn summary_failed(&self) -> &'static str {
        match self {
            Language::Turkish => "Özet oluşturulurken hata oluştu.",
            Language::English => "Summary generation failed.",
        }
    }

    pub fn keywords_failed(&self) -> &'static str {
        match self {
            Language::Turkish => "Anahtar kelimeler çıkarılırken hata oluştu.",
            Language::English => "Keyword extraction failed.",
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tr" | "turkish" => Ok(Language::Turkish),
            "en" | "english" => Ok(Language::English),
            other => Err(format!("unknown language: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub language: Language,
    /// Number of sentences kept in a summary.
    pub summary_sentences: usize,
    /// Fragments with this many characters or fewer are not sentences.
    pub min_sentence_chars: usize,
    pub max_keywords: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { language: Language::default(), summary_sentences: 4, min_sentence_chars: 20, max_keywords: 10 }
    }
}

impl AnalysisConfig {
    /// Load from a JSON file; missing fields fall back to defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let f = File::open(path).with_context(|| format!("cannot open config {}", path.display()))?;
        let cfg = serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(cfg)
    }

    /// Apply `DMS_LANGUAGE` when set to a recognised value.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("DMS_LANGUAGE") {
            match val.parse() {
                Ok(lang) => self.language = lang,
                Err(e) => tracing::warn!(error = %e, "ignoring DMS_LANGUAGE"),
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{"language": "english", "max_keywords": 5}}"#).unwrap();
        let cfg = AnalysisConfig::from_file(f.path()).unwrap();
        assert_eq!(cfg.language, Language::English);
        assert_eq!(cfg.max_keywords, 5);
        assert_eq!(cfg.summary_sentences, 4);
        assert_eq!(cfg.min_sentence_chars, 20);
    }

    #[test]
    fn language_parses_codes() {
        assert_eq!("EN".parse::<Language>().unwrap(), Language::English);
        assert_eq!("turkish".parse::<Language>().unwrap(), Language::Turkish);
        assert!("klingon".parse::<Language>().is_err());
    }
}
