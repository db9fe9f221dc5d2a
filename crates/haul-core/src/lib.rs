//! Core library for waste-disposal ticket intake.
//!
//! This crate provides:
//! - Ticket field extraction from recognized (OCR) text
//! - Ticket records and the manager review workflow
//! - Upload ingestion over injected store and OCR collaborators
//! - Date-range CSV export

pub mod error;
pub mod export;
pub mod models;
pub mod ticket;
pub mod workflow;

pub use error::{HaulError, Result};
pub use export::{export_csv, ExportFilter, StatusFilter};
pub use models::config::HaulConfig;
pub use models::ticket::{ExtractedFields, FieldPatch, TicketField, TicketRecord, TicketStatus};
pub use ticket::{ExtractionResult, TicketFieldExtractor, TicketParser};
pub use workflow::{
    IngestOutcome, IngestionPipeline, JsonFileStore, ReviewService, TicketQuery, TicketStats,
    TicketStore, Upload,
};
