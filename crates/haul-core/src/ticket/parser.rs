//! Ticket field extractor combining the per-field rule sets.

use std::time::Instant;

use rust_decimal::Decimal;
use tracing::debug;

use crate::models::config::ExtractionConfig;
use crate::models::ticket::{ExtractedFields, TicketField};

use super::rules::{
    weight::parse_weight, DebrisTypeExtractor, DriverBadgeExtractor, DriverNameExtractor,
    ExtractionMatch, FieldExtractor, TicketNumberExtractor, TruckNumberExtractor, WeightExtractor,
};
use super::TicketParser;

/// A field value together with the rule that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMatch {
    pub field: TicketField,
    pub value: String,
    pub rule: &'static str,
    pub source: String,
    pub confidence: f32,
}

impl FieldMatch {
    fn from_match<T: ToString>(field: TicketField, m: &ExtractionMatch<T>) -> Self {
        Self {
            field,
            value: m.value.to_string(),
            rule: m.rule,
            source: m.source.clone(),
            confidence: m.confidence,
        }
    }
}

/// Result of parsing one recognized text.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted fields.
    pub fields: ExtractedFields,
    /// True when the ticket number or weight is missing.
    pub needs_fix: bool,
    /// Which rule produced each present field.
    pub matches: Vec<FieldMatch>,
    /// Raw recognized text.
    pub raw_text: String,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Deterministic extractor of ticket fields from recognized text.
///
/// Holds no mutable state; one instance can serve any number of threads.
#[derive(Debug, Clone)]
pub struct TicketFieldExtractor {
    ticket_number: TicketNumberExtractor,
    weight: WeightExtractor,
    truck_number: TruckNumberExtractor,
    driver_name: DriverNameExtractor,
    driver_badge: DriverBadgeExtractor,
    debris_type: DebrisTypeExtractor,
}

impl TicketFieldExtractor {
    /// Create an extractor with default settings.
    pub fn new() -> Self {
        Self {
            ticket_number: TicketNumberExtractor::new(),
            weight: WeightExtractor::new(),
            truck_number: TruckNumberExtractor::new(),
            driver_name: DriverNameExtractor::new(),
            driver_badge: DriverBadgeExtractor::new(),
            debris_type: DebrisTypeExtractor::new(),
        }
    }

    /// Create an extractor from configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new().with_ticket_line_fallback(config.ticket_line_fallback)
    }

    /// Enable or disable the all-digit line fallback for ticket numbers.
    pub fn with_ticket_line_fallback(mut self, enabled: bool) -> Self {
        self.ticket_number = self.ticket_number.with_line_fallback(enabled);
        self
    }

    /// Extract all fields from `text`. Never fails; unmatched fields are absent.
    pub fn extract(&self, text: &str) -> ExtractedFields {
        ExtractedFields {
            ticket_number: self.ticket_number.extract(text).map(|m| m.value),
            weight_tons: self.weight.extract(text).map(|m| m.value),
            truck_number: self.truck_number.extract(text).map(|m| m.value),
            driver_actual: self.driver_name.extract(text).map(|m| m.value),
            driver_badge: self.driver_badge.extract(text).map(|m| m.value),
            debris_type: self.debris_type.extract(text).map(|m| m.value),
        }
    }

    fn collect_matches(&self, text: &str) -> Vec<FieldMatch> {
        let mut matches = Vec::new();

        if let Some(m) = self.ticket_number.extract(text) {
            matches.push(FieldMatch::from_match(TicketField::TicketNumber, &m));
        }
        if let Some(m) = self.weight.extract(text) {
            matches.push(FieldMatch::from_match(TicketField::WeightTons, &m));
        }
        if let Some(m) = self.truck_number.extract(text) {
            matches.push(FieldMatch::from_match(TicketField::TruckNumber, &m));
        }
        if let Some(m) = self.driver_name.extract(text) {
            matches.push(FieldMatch::from_match(TicketField::DriverActual, &m));
        }
        if let Some(m) = self.driver_badge.extract(text) {
            matches.push(FieldMatch::from_match(TicketField::DriverBadge, &m));
        }
        if let Some(m) = self.debris_type.extract(text) {
            matches.push(FieldMatch::from_match(TicketField::DebrisType, &m));
        }

        matches
    }

    /// A weight label was found but its value could not be parsed.
    fn has_unparsable_weight(&self, text: &str, weight: Option<Decimal>) -> bool {
        weight.is_none()
            && self
                .weight
                .rules()
                .first_match(text)
                .is_some_and(|m| parse_weight(&m.value).is_none())
    }
}

impl Default for TicketFieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TicketParser for TicketFieldExtractor {
    fn parse(&self, text: &str) -> ExtractionResult {
        let start = Instant::now();
        let mut warnings = Vec::new();

        let fields = self.extract(text);
        let matches = self.collect_matches(text);

        if text.trim().is_empty() {
            warnings.push("Recognized text is empty".to_string());
        }
        for field in fields.missing_required() {
            warnings.push(format!("Could not extract {}", field.label()));
        }
        if self.has_unparsable_weight(text, fields.weight_tons) {
            warnings.push("Weight value could not be parsed as a number".to_string());
        }

        let needs_fix = fields.needs_fix();

        debug!(
            "Extracted {} of {} ticket fields (needs_fix: {})",
            matches.len(),
            TicketField::ALL.len(),
            needs_fix
        );

        ExtractionResult {
            fields,
            needs_fix,
            matches,
            raw_text: text.to_string(),
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}
