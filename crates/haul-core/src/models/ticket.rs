//! Ticket data models: extracted fields, stored records and review history.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Structured fields extracted from a ticket's recognized text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    /// Printed ticket number (3+ digits, leading zeros kept).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_number: Option<String>,

    /// Net weight in tons.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_tons: Option<Decimal>,

    /// Truck number or plate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truck_number: Option<String>,

    /// Driver name as printed on the ticket.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_actual: Option<String>,

    /// Driver badge from the monitor line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_badge: Option<String>,

    /// Debris classification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debris_type: Option<String>,
}

impl ExtractedFields {
    /// True when the ticket number or the weight is missing.
    pub fn needs_fix(&self) -> bool {
        self.ticket_number.is_none() || self.weight_tons.is_none()
    }

    /// Required fields that are absent.
    pub fn missing_required(&self) -> Vec<TicketField> {
        let mut missing = Vec::new();
        if self.ticket_number.is_none() {
            missing.push(TicketField::TicketNumber);
        }
        if self.weight_tons.is_none() {
            missing.push(TicketField::WeightTons);
        }
        missing
    }

    /// True when no field was extracted at all.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overwrite every field the patch sets.
    pub fn apply(&mut self, patch: &FieldPatch) {
        if let Some(v) = &patch.ticket_number {
            self.ticket_number = Some(v.clone());
        }
        if let Some(v) = patch.weight_tons {
            self.weight_tons = Some(v);
        }
        if let Some(v) = &patch.truck_number {
            self.truck_number = Some(v.clone());
        }
        if let Some(v) = &patch.driver_actual {
            self.driver_actual = Some(v.clone());
        }
        if let Some(v) = &patch.driver_badge {
            self.driver_badge = Some(v.clone());
        }
        if let Some(v) = &patch.debris_type {
            self.debris_type = Some(v.clone());
        }
    }
}

/// Manual corrections submitted by a reviewer.
pub type FieldPatch = ExtractedFields;

/// Names of the extracted fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketField {
    TicketNumber,
    WeightTons,
    TruckNumber,
    DriverActual,
    DriverBadge,
    DebrisType,
}

impl TicketField {
    pub const ALL: [TicketField; 6] = [
        TicketField::TicketNumber,
        TicketField::WeightTons,
        TicketField::TruckNumber,
        TicketField::DriverActual,
        TicketField::DriverBadge,
        TicketField::DebrisType,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketField::TicketNumber => "ticket_number",
            TicketField::WeightTons => "weight_tons",
            TicketField::TruckNumber => "truck_number",
            TicketField::DriverActual => "driver_actual",
            TicketField::DriverBadge => "driver_badge",
            TicketField::DebrisType => "debris_type",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            TicketField::TicketNumber => "ticket number",
            TicketField::WeightTons => "weight",
            TicketField::TruckNumber => "truck number",
            TicketField::DriverActual => "driver",
            TicketField::DriverBadge => "driver badge",
            TicketField::DebrisType => "debris type",
        }
    }
}

impl fmt::Display for TicketField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Review status of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Uploaded, waiting for text recognition.
    ProcessingOcr,
    /// Extracted data is incomplete and needs a manual fix.
    Draft,
    /// Waiting for a manager decision.
    Pending,
    Approved,
    Rejected,
    /// Text recognition failed.
    OcrError,
}

impl TicketStatus {
    /// Status for freshly extracted or corrected fields.
    pub fn for_fields(fields: &ExtractedFields) -> Self {
        if fields.needs_fix() {
            TicketStatus::Draft
        } else {
            TicketStatus::Pending
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::ProcessingOcr => "processing_ocr",
            TicketStatus::Draft => "draft",
            TicketStatus::Pending => "pending",
            TicketStatus::Approved => "approved",
            TicketStatus::Rejected => "rejected",
            TicketStatus::OcrError => "ocr_error",
        }
    }

    /// No review operation may leave a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TicketStatus::Approved | TicketStatus::Rejected)
    }

    /// Whether a reviewer may perform `action` on a ticket in this status.
    pub fn allows(&self, action: ReviewAction) -> bool {
        use TicketStatus::*;
        match action {
            ReviewAction::Fixed => matches!(self, Draft | Pending | OcrError),
            ReviewAction::Approved => matches!(self, Draft | Pending),
            ReviewAction::Rejected => matches!(self, Draft | Pending | OcrError),
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "processing_ocr" | "processing" => Ok(TicketStatus::ProcessingOcr),
            "draft" => Ok(TicketStatus::Draft),
            "pending" => Ok(TicketStatus::Pending),
            "approved" => Ok(TicketStatus::Approved),
            "rejected" => Ok(TicketStatus::Rejected),
            "ocr_error" => Ok(TicketStatus::OcrError),
            other => Err(format!("unknown ticket status: {}", other)),
        }
    }
}

/// What a reviewer did to a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    Fixed,
    Approved,
    Rejected,
}

impl ReviewAction {
    /// Status a ticket ends up in after this action, given its merged fields.
    pub fn target_status(&self, fields: &ExtractedFields) -> TicketStatus {
        match self {
            ReviewAction::Fixed => TicketStatus::for_fields(fields),
            ReviewAction::Approved => TicketStatus::Approved,
            ReviewAction::Rejected => TicketStatus::Rejected,
        }
    }
}

/// One entry of a ticket's review history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Caller id of the reviewer.
    pub reviewer: String,
    pub reviewed_at: DateTime<Utc>,
    pub action: ReviewAction,
}

/// A ticket as kept in the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketRecord {
    pub id: String,

    /// Blob path of the uploaded image; absent for manual entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Caller id of whoever uploaded or entered the ticket.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploader: Option<String>,

    pub created_at: DateTime<Utc>,

    pub status: TicketStatus,

    pub fix_needed: bool,

    /// Entered by hand instead of extracted from a photo.
    #[serde(default)]
    pub manual: bool,

    #[serde(default)]
    pub fields: ExtractedFields,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_processed_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_error: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reviews: Vec<Review>,
}

impl TicketRecord {
    /// A new record for an uploaded file, waiting for recognition.
    pub fn for_upload(
        storage_path: impl Into<String>,
        content_type: impl Into<String>,
        uploader: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let storage_path = storage_path.into();
        let file_name = storage_path
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Self {
            id: new_ticket_id(),
            storage_path: Some(storage_path),
            file_name,
            content_type: Some(content_type.into()),
            uploader,
            created_at,
            status: TicketStatus::ProcessingOcr,
            fix_needed: false,
            manual: false,
            fields: ExtractedFields::default(),
            ocr_processed_at: None,
            ocr_error: None,
            reviews: Vec::new(),
        }
    }

    /// A hand-entered record.
    pub fn manual(fields: ExtractedFields, uploader: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: new_ticket_id(),
            storage_path: None,
            file_name: None,
            content_type: None,
            uploader: Some(uploader),
            created_at,
            status: TicketStatus::for_fields(&fields),
            fix_needed: fields.needs_fix(),
            manual: true,
            fields,
            ocr_processed_at: None,
            ocr_error: None,
            reviews: Vec::new(),
        }
    }

    /// Ticket number when known, the record id otherwise.
    pub fn display_number(&self) -> &str {
        self.fields.ticket_number.as_deref().unwrap_or(&self.id)
    }

    pub fn last_review(&self) -> Option<&Review> {
        self.reviews.last()
    }

    /// True when the most recent review was a manual fix.
    pub fn was_fixed(&self) -> bool {
        matches!(self.last_review(), Some(r) if r.action == ReviewAction::Fixed)
    }
}

fn new_ticket_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn complete() -> ExtractedFields {
        ExtractedFields {
            ticket_number: Some("12345".to_string()),
            weight_tons: Some(Decimal::new(125, 1)),
            ..Default::default()
        }
    }

    #[test]
    fn test_needs_fix_truth_table() {
        let mut fields = complete();
        assert!(!fields.needs_fix());

        fields.weight_tons = None;
        assert!(fields.needs_fix());
        assert_eq!(fields.missing_required(), vec![TicketField::WeightTons]);

        fields.ticket_number = None;
        assert!(fields.needs_fix());
        assert_eq!(
            fields.missing_required(),
            vec![TicketField::TicketNumber, TicketField::WeightTons]
        );

        fields.weight_tons = Some(Decimal::ONE);
        assert!(fields.needs_fix());
        assert_eq!(fields.missing_required(), vec![TicketField::TicketNumber]);
    }

    #[test]
    fn test_apply_patch_keeps_unset_fields() {
        let mut fields = complete();
        fields.truck_number = Some("T9".to_string());

        let patch = FieldPatch {
            weight_tons: Some(Decimal::new(7, 0)),
            driver_actual: Some("Jane Doe".to_string()),
            ..Default::default()
        };
        fields.apply(&patch);

        assert_eq!(fields.ticket_number.as_deref(), Some("12345"));
        assert_eq!(fields.weight_tons, Some(Decimal::new(7, 0)));
        assert_eq!(fields.truck_number.as_deref(), Some("T9"));
        assert_eq!(fields.driver_actual.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("pending".parse::<TicketStatus>(), Ok(TicketStatus::Pending));
        assert_eq!("OCR_ERROR".parse::<TicketStatus>(), Ok(TicketStatus::OcrError));
        assert!("fixed".parse::<TicketStatus>().is_err());
    }

    #[test]
    fn test_review_permissions() {
        assert!(TicketStatus::Draft.allows(ReviewAction::Approved));
        assert!(TicketStatus::OcrError.allows(ReviewAction::Fixed));
        assert!(!TicketStatus::OcrError.allows(ReviewAction::Approved));
        assert!(!TicketStatus::ProcessingOcr.allows(ReviewAction::Rejected));
        assert!(!TicketStatus::Approved.allows(ReviewAction::Fixed));
        assert!(TicketStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_record_for_upload() {
        let record = TicketRecord::for_upload(
            "tickets/driver-7/scan.jpg",
            "image/jpeg",
            Some("driver-7".to_string()),
            Utc::now(),
        );

        assert_eq!(record.file_name.as_deref(), Some("scan.jpg"));
        assert_eq!(record.status, TicketStatus::ProcessingOcr);
        assert_eq!(record.display_number(), record.id);
        assert!(!record.manual);
    }

    #[test]
    fn test_weight_serializes_as_string() {
        let json = serde_json::to_value(complete()).unwrap();
        assert_eq!(json["weight_tons"], "12.5");
        assert!(json.get("truck_number").is_none());
    }
}
