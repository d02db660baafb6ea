use crate::analyzer::Analyzer;
use crate::document::{Document, DocumentId, FileType, ProcessingStatus, SearchResult};
use crate::error::ServiceError;
use crate::extract::TextExtractor;
use crate::persist::{self, DataPaths};
use crate::search::{self, SearchQuery};
use crate::store::DocumentStore;
use std::sync::Arc;
use time::OffsetDateTime;

struct Enrichment {
    content: String,
    summary: String,
    keywords: String,
}

/// Document lifecycle: upload, enrichment, lookup, search, edit and delete.
#[derive(Clone)]
pub struct DocumentService {
    store: Arc<dyn DocumentStore>,
    extractor: Arc<dyn TextExtractor>,
    analyzer: Analyzer,
    paths: DataPaths,
}

impl DocumentService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        extractor: Arc<dyn TextExtractor>,
        analyzer: Analyzer,
        paths: DataPaths,
    ) -> Self {
        Self { store, extractor, analyzer, paths }
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    /// Store the file and register the document as `Processing`.
    /// Enrichment is left to [`DocumentService::process`].
    pub fn upload(&self, title: &str, file_name: &str, bytes: &[u8], uploaded_by: &str) -> Result<Document, ServiceError> {
        if bytes.is_empty() {
            return Err(ServiceError::InvalidInput("a file is required".into()));
        }
        if title.trim().is_empty() {
            return Err(ServiceError::InvalidInput("a title is required".into()));
        }
        let file_type = FileType::from_file_name(file_name)
            .ok_or_else(|| ServiceError::InvalidInput("only PDF, TXT and DOCX files are supported".into()))?;

        let file_path = persist::save_upload(&self.paths, bytes, file_type)?;
        let mut doc = Document::new(title.trim(), file_type, uploaded_by);
        doc.file_name = file_name.to_string();
        doc.file_path = file_path;
        doc.file_size = bytes.len() as u64;
        doc.processing_status = ProcessingStatus::Processing;
        doc.id = self.store.save(doc.clone())?;
        tracing::info!(id = doc.id, file = %doc.file_name, size = doc.file_size, "document uploaded");
        Ok(doc)
    }

    /// Extract text, summary and keywords for a stored document.
    ///
    /// Returns false when the document is unknown, was deleted or marked
    /// failed while processing ran, or enrichment failed; in the last case
    /// the document is left in the `Failed` state. Only the derived fields
    /// are written back, so edits made meanwhile are kept.
    pub fn process(&self, id: DocumentId) -> Result<bool, ServiceError> {
        let started = self.store.update(id, &mut |doc| {
            doc.processing_status = ProcessingStatus::Processing;
            true
        })?;
        let Some(doc) = started else {
            tracing::warn!(id, "process requested for unknown document");
            return Ok(false);
        };

        let enriched = match self.enrich(&doc) {
            Ok(enriched) => enriched,
            Err(e) => {
                tracing::error!(id, error = %e, "document processing failed");
                self.mark_failed(id)?;
                return Ok(false);
            }
        };

        // A status other than Processing means the job was given up on (timeout).
        let saved = self.store.update(id, &mut |doc| {
            if doc.processing_status != ProcessingStatus::Processing {
                return false;
            }
            doc.content = enriched.content.clone();
            doc.summary = enriched.summary.clone();
            doc.keywords = enriched.keywords.clone();
            doc.is_processed = true;
            doc.processing_status = ProcessingStatus::Completed;
            doc.last_modified = OffsetDateTime::now_utc();
            true
        })?;
        match saved {
            Some(_) => {
                tracing::info!(id, "document processed");
                Ok(true)
            }
            None => {
                tracing::warn!(id, "document deleted or failed during processing, result dropped");
                Ok(false)
            }
        }
    }

    fn enrich(&self, doc: &Document) -> Result<Enrichment, ServiceError> {
        let bytes = persist::read_upload(&self.paths, &doc.file_path)?;
        let content = self.extractor.extract(&bytes, doc.file_type)?;
        let summary = self.analyzer.summarize(&content);
        let keywords = self.analyzer.extract_keywords(&content);
        Ok(Enrichment { content, summary, keywords })
    }

    /// Flag a document as failed unless processing already completed.
    pub fn mark_failed(&self, id: DocumentId) -> Result<(), ServiceError> {
        self.store.update(id, &mut |doc| {
            if doc.processing_status == ProcessingStatus::Completed {
                return false;
            }
            doc.processing_status = ProcessingStatus::Failed;
            true
        })?;
        Ok(())
    }

    pub fn get(&self, id: DocumentId) -> Result<Option<Document>, ServiceError> {
        Ok(self.store.find(id)?)
    }

    pub fn list(&self) -> Result<Vec<Document>, ServiceError> {
        Ok(self.store.list_all()?)
    }

    pub fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, ServiceError> {
        let results = search::search(self.store.list_all()?, query);
        tracing::debug!(q = %query.q, hits = results.len(), "search");
        Ok(results)
    }

    /// Rename a document. Only the uploader may edit.
    pub fn update_title(&self, id: DocumentId, title: &str, current_user: &str) -> Result<Document, ServiceError> {
        if title.trim().is_empty() {
            return Err(ServiceError::InvalidInput("a title is required".into()));
        }
        let doc = self.store.find(id)?.ok_or(ServiceError::NotFound(id))?;
        if doc.uploaded_by != current_user {
            return Err(ServiceError::Forbidden { id, user: current_user.to_string() });
        }
        let title = title.trim();
        self.store
            .update(id, &mut |doc| {
                doc.title = title.to_string();
                doc.last_modified = OffsetDateTime::now_utc();
                true
            })?
            .ok_or(ServiceError::NotFound(id))
    }

    /// Delete a document and its stored file. Only the uploader may delete.
    pub fn delete(&self, id: DocumentId, current_user: &str) -> Result<bool, ServiceError> {
        let Some(doc) = self.store.find(id)? else {
            return Ok(false);
        };
        if doc.uploaded_by != current_user {
            return Err(ServiceError::Forbidden { id, user: current_user.to_string() });
        }
        persist::remove_upload(&self.paths, &doc.file_path)?;
        let removed = self.store.delete(id)?;
        tracing::info!(id, user = current_user, "document deleted");
        Ok(removed)
    }
}
