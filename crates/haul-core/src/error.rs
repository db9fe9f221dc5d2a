//! Error types for the haul-core library.

use thiserror::Error;

use crate::models::ticket::TicketStatus;

/// Main error type for the haul library.
#[derive(Error, Debug)]
pub enum HaulError {
    /// Ticket store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Text recognition (OCR) error.
    #[error("recognition error: {0}")]
    Recognition(#[from] RecognitionError),

    /// Review workflow error.
    #[error("workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    /// Export error.
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised by ticket and blob stores.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No record or blob exists under the given key.
    #[error("not found: {0}")]
    NotFound(String),

    /// A record already exists for this uploaded file.
    #[error("a ticket already exists for {path} ({existing_id})")]
    Duplicate { path: String, existing_id: String },

    /// The backing store could not be read or written.
    #[error("backend failure: {0}")]
    Backend(String),

    /// Stored data could not be (de)serialized.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Another writer changed the record's status first.
    #[error("ticket {id} was changed concurrently (now {found})")]
    Conflict { id: String, found: TicketStatus },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by a text recognizer.
#[derive(Error, Debug)]
pub enum RecognitionError {
    /// The image could not be decoded or was rejected.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The recognition service failed.
    #[error("service failure: {0}")]
    Service(String),
}

/// Errors raised by review operations.
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// The caller is not signed in.
    #[error("sign-in required")]
    Unauthenticated,

    /// An argument was missing or malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The ticket does not exist.
    #[error("ticket not found: {0}")]
    NotFound(String),

    /// The ticket's current status does not allow the operation.
    #[error("cannot move ticket {id} from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: TicketStatus,
        to: TicketStatus,
    },

    /// The underlying store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors raised while exporting tickets.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The requested date range is empty.
    #[error("start date {start} is after end date {end}")]
    InvalidRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    /// The configured delimiter is not a single ASCII character.
    #[error("invalid delimiter: {0:?}")]
    InvalidDelimiter(char),

    /// The configured date format is not a valid strftime pattern.
    #[error("invalid date format: {0:?}")]
    InvalidDateFormat(String),

    /// CSV writer error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the haul library.
pub type Result<T> = std::result::Result<T, HaulError>;
