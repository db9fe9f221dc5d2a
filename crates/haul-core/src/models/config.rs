//! Configuration structures for ticket intake.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the haul pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HaulConfig {
    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Upload ingestion configuration.
    pub ingest: IngestConfig,

    /// Ticket store configuration.
    pub store: StoreConfig,

    /// Export configuration.
    pub export: ExportConfig,
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Fall back to the first all-digit line when no labeled ticket number is found.
    pub ticket_line_fallback: bool,

    /// Log the full recognized text of every ingested ticket.
    pub log_raw_text: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            ticket_line_fallback: true,
            log_raw_text: true,
        }
    }
}

/// Upload ingestion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Content-type prefixes that trigger ingestion (e.g. "image/").
    pub accepted_content_types: Vec<String>,

    /// Root directory for the filesystem blob store.
    pub blob_root: PathBuf,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            accepted_content_types: vec!["image/".to_string()],
            blob_root: PathBuf::from("."),
        }
    }
}

impl IngestConfig {
    /// Whether uploads of this content type should be ingested.
    pub fn accepts(&self, content_type: &str) -> bool {
        let content_type = content_type.trim().to_lowercase();
        self.accepted_content_types
            .iter()
            .any(|prefix| content_type.starts_with(&prefix.to_lowercase()))
    }
}

/// Ticket store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON file holding all ticket records.
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("tickets.json"),
        }
    }
}

/// Export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// CSV field delimiter (single ASCII character).
    pub delimiter: char,

    /// chrono format string for the date column.
    pub date_format: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

impl HaulConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
