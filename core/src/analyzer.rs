use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::{keywords, summarize};

/// Entry point for document enrichment. Never fails: degenerate input and
/// internal failures come back as the configured sentinel messages.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn try_summarize(&self, content: &str) -> Result<String, AnalysisError> {
        summarize::summarize(content, &self.config)
    }

    pub fn try_extract_keywords(&self, content: &str) -> Result<String, AnalysisError> {
        keywords::extract_keywords(content, self.config.max_keywords)
    }

    pub fn summarize(&self, content: &str) -> String {
        let lang = self.config.language;
        match self.try_summarize(content) {
            Ok(summary) => {
                tracing::info!(chars = summary.chars().count(), "summary generated");
                summary
            }
            Err(AnalysisError::EmptyContent) => lang.content_not_found().to_string(),
            Err(e) => {
                tracing::error!(error = %e, "summary generation failed");
                lang.summary_failed().to_string()
            }
        }
    }

    pub fn extract_keywords(&self, content: &str) -> String {
        let lang = self.config.language;
        match self.try_extract_keywords(content) {
            Ok(keywords) => {
                tracing::info!("keywords extracted");
                keywords
            }
            Err(AnalysisError::EmptyContent) => lang.content_not_found().to_string(),
            Err(e) => {
                tracing::error!(error = %e, "keyword extraction failed");
                lang.keywords_failed().to_string()
            }
        }
    }
}
