//! Ticket field extraction module.

mod parser;
pub mod rules;

pub use parser::{ExtractionResult, FieldMatch, TicketFieldExtractor};

/// Trait for ticket parsers.
///
/// Parsing never fails: fields that cannot be found are simply absent and
/// reported through [`ExtractionResult::needs_fix`] and its warnings.
pub trait TicketParser {
    /// Parse ticket fields from recognized text.
    fn parse(&self, text: &str) -> ExtractionResult;
}
