//! Upload ingestion: recognize, extract and record a ticket per uploaded file.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::{HaulError, Result, StoreError};
use crate::models::config::{HaulConfig, IngestConfig};
use crate::models::ticket::{TicketRecord, TicketStatus};
use crate::ticket::{ExtractionResult, TicketFieldExtractor, TicketParser};

use super::blob::BlobStore;
use super::recognizer::TextRecognizer;
use super::store::TicketStore;

/// A finalized upload reported by the blob store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// Blob path of the uploaded file.
    pub storage_path: String,
    pub content_type: String,
    /// Caller id of the uploader, if known.
    pub uploader: Option<String>,
}

impl Upload {
    pub fn new(storage_path: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            storage_path: storage_path.into(),
            content_type: content_type.into(),
            uploader: None,
        }
    }

    pub fn with_uploader(mut self, uploader: impl Into<String>) -> Self {
        self.uploader = Some(uploader.into());
        self
    }
}

/// What ingestion did with an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// A record was created; `status` is draft, pending or ocr_error.
    Processed { id: String, status: TicketStatus },
    /// The upload was ignored.
    Skipped { reason: String },
    /// The file had already been ingested.
    Duplicate { existing_id: String },
}

/// Ingestion pipeline wired to its collaborators.
pub struct IngestionPipeline<'a> {
    store: &'a dyn TicketStore,
    blobs: &'a dyn BlobStore,
    recognizer: &'a dyn TextRecognizer,
    extractor: TicketFieldExtractor,
    config: IngestConfig,
    log_raw_text: bool,
}

impl<'a> IngestionPipeline<'a> {
    /// Create a pipeline with default settings.
    pub fn new(
        store: &'a dyn TicketStore,
        blobs: &'a dyn BlobStore,
        recognizer: &'a dyn TextRecognizer,
    ) -> Self {
        Self {
            store,
            blobs,
            recognizer,
            extractor: TicketFieldExtractor::new(),
            config: IngestConfig::default(),
            log_raw_text: true,
        }
    }

    /// Apply extraction and ingestion settings.
    pub fn with_config(mut self, config: &HaulConfig) -> Self {
        self.extractor = TicketFieldExtractor::from_config(&config.extraction);
        self.config = config.ingest.clone();
        self.log_raw_text = config.extraction.log_raw_text;
        self
    }

    /// Ingest one upload.
    ///
    /// Recognition and download failures are recorded on the ticket as
    /// `ocr_error`; only store failures are returned as errors.
    pub fn ingest(&self, upload: &Upload) -> Result<IngestOutcome> {
        if !self.config.accepts(&upload.content_type) {
            debug!(
                "Skipping {} with content type {:?}",
                upload.storage_path, upload.content_type
            );
            return Ok(IngestOutcome::Skipped {
                reason: format!("unsupported content type: {}", upload.content_type),
            });
        }

        if let Some(existing) = self.store.find_by_storage_path(&upload.storage_path)? {
            info!("{} already ingested as ticket {}", upload.storage_path, existing.id);
            return Ok(IngestOutcome::Duplicate { existing_id: existing.id });
        }

        let mut record = TicketRecord::for_upload(
            upload.storage_path.clone(),
            upload.content_type.clone(),
            upload.uploader.clone(),
            Utc::now(),
        );
        match self.store.insert(record.clone()) {
            Ok(()) => {}
            Err(StoreError::Duplicate { existing_id, .. }) => {
                info!("{} already ingested as ticket {}", upload.storage_path, existing_id);
                return Ok(IngestOutcome::Duplicate { existing_id });
            }
            Err(e) => return Err(e.into()),
        }

        info!("Created ticket {} for {}", record.id, upload.storage_path);

        match self.recognize(upload) {
            Ok(result) => {
                record.fields = result.fields;
                record.fix_needed = result.needs_fix;
                record.status = TicketStatus::for_fields(&record.fields);
                for warning in &result.warnings {
                    debug!("Ticket {}: {}", record.id, warning);
                }
            }
            Err(e) => {
                warn!("OCR process error for {}: {}", upload.storage_path, e);
                record.status = TicketStatus::OcrError;
                record.fix_needed = true;
                record.ocr_error = Some(e.to_string());
            }
        }
        record.ocr_processed_at = Some(Utc::now());

        self.store.update(&record)?;

        info!(
            "Processed ticket {} (status: {}, fields: {:?})",
            record.id, record.status, record.fields
        );

        Ok(IngestOutcome::Processed {
            id: record.id,
            status: record.status,
        })
    }

    /// Ingest several uploads, stopping at the first store failure.
    pub fn ingest_all<'u>(
        &self,
        uploads: impl IntoIterator<Item = &'u Upload>,
    ) -> Result<Vec<IngestOutcome>> {
        uploads.into_iter().map(|u| self.ingest(u)).collect()
    }

    fn recognize(&self, upload: &Upload) -> std::result::Result<ExtractionResult, HaulError> {
        let image = self.blobs.download(&upload.storage_path)?;
        let text = self.recognizer.recognize(&image)?;

        if self.log_raw_text {
            debug!(
                "Recognized text for {} ({}): {}",
                upload.storage_path,
                self.recognizer.name(),
                text
            );
        }

        Ok(self.extractor.parse(&text))
    }
}
