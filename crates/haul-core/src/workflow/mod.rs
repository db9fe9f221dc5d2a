//! Ticket intake and review workflow.
//!
//! External collaborators (document store, blob store, OCR engine) are
//! passed in explicitly as trait objects.

pub mod blob;
pub mod ingest;
pub mod query;
pub mod recognizer;
pub mod review;
pub mod store;

pub use blob::{BlobStore, FsBlobStore, MemoryBlobStore};
pub use ingest::{IngestOutcome, IngestionPipeline, Upload};
pub use query::{TicketQuery, TicketStats};
pub use recognizer::{PlainTextRecognizer, TextRecognizer};
pub use review::{ReviewService, WorkflowResult};
pub use store::{JsonFileStore, MemoryTicketStore, StoreResult, TicketStore};
