use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

pub type DocumentId = u64;
pub type UserId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Pdf,
    Txt,
    Docx,
}

impl FileType {
    pub fn extension(&self) -> &'static str {
        match self {
            FileType::Pdf => "pdf",
            FileType::Txt => "txt",
            FileType::Docx => "docx",
        }
    }

    /// Resolve a file type from a file name such as `report.PDF`.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        ext.parse().ok()
    }
}

impl FromStr for FileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_start_matches('.').to_lowercase().as_str() {
            "pdf" => Ok(FileType::Pdf),
            "txt" => Ok(FileType::Txt),
            "docx" => Ok(FileType::Docx),
            other => Err(format!("unsupported file type: {other}")),
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProcessingStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    /// Name of the file as uploaded by the user.
    pub file_name: String,
    /// Path of the stored copy relative to the data directory, e.g. uploads/{uuid}.pdf
    pub file_path: String,
    pub file_type: FileType,
    pub file_size: u64,
    pub content: String,
    pub summary: String,
    pub keywords: String,
    #[serde(with = "time::serde::rfc3339")]
    pub upload_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_modified: OffsetDateTime,
    pub uploaded_by: String,
    pub is_processed: bool,
    pub processing_status: ProcessingStatus,
}

impl Document {
    /// A fresh, unsaved document (id 0) stamped with the current time.
    pub fn new(title: impl Into<String>, file_type: FileType, uploaded_by: impl Into<String>) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: 0,
            title: title.into(),
            file_name: String::new(),
            file_path: String::new(),
            file_type,
            file_size: 0,
            content: String::new(),
            summary: String::new(),
            keywords: String::new(),
            upload_date: now,
            last_modified: now,
            uploaded_by: uploaded_by.into(),
            is_processed: false,
            processing_status: ProcessingStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub document_id: DocumentId,
    pub title: String,
    pub file_name: String,
    pub file_type: FileType,
    pub summary: String,
    pub keywords: String,
    #[serde(with = "time::serde::rfc3339")]
    pub upload_date: OffsetDateTime,
    pub uploaded_by: String,
    pub relevance_score: f64,
    /// Query terms found in any field, in query order, without duplicates.
    pub matched_terms: Vec<String>,
    pub highlighted_content: String,
}
