pub mod analyzer;
pub mod config;
pub mod document;
pub mod error;
pub mod extract;
pub mod frequency;
pub mod keywords;
pub mod metadata;
pub mod persist;
pub mod rank;
pub mod search;
pub mod sentence;
pub mod service;
pub mod store;
pub mod summarize;
pub mod tokenizer;
pub mod users;

pub use analyzer::Analyzer;
pub use config::{AnalysisConfig, Language};
pub use document::{Document, DocumentId, FileType, ProcessingStatus, SearchResult};
pub use error::{AnalysisError, AuthError, ExtractError, ServiceError, StoreError};
pub use rank::{rank_all, rank_document};
pub use search::SearchQuery;
pub use service::DocumentService;
