//! Ticket number extraction.
//!
//! Printed tickets usually label the number ("Ticket #: 12345"). Poor scans
//! often detach the label from the digits, so a line made only of digits is
//! used as a fallback.

use super::patterns::{DIGIT_LINE, TICKET_NUMBER};
use super::{ExtractionMatch, ExtractionRule, FieldExtractor, RuleSet};

/// Ticket number field extractor.
#[derive(Debug, Clone)]
pub struct TicketNumberExtractor {
    rules: RuleSet,
}

impl TicketNumberExtractor {
    pub fn new() -> Self {
        Self::build(true)
    }

    /// Enable or disable the all-digit line fallback.
    pub fn with_line_fallback(self, enabled: bool) -> Self {
        Self::build(enabled)
    }

    fn build(line_fallback: bool) -> Self {
        let mut rules = RuleSet::new(vec![ExtractionRule::labeled(
            "ticket-label",
            &TICKET_NUMBER,
        )]);
        if line_fallback {
            rules.push(ExtractionRule::line("digit-line", &DIGIT_LINE));
        }
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }
}

impl Default for TicketNumberExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for TicketNumberExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.rules.first_match(text)
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.rules.all_matches(text)
    }
}

/// Extract the ticket number from text.
pub fn extract_ticket_number(text: &str) -> Option<String> {
    TicketNumberExtractor::new().extract(text).map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeled_variants() {
        assert_eq!(extract_ticket_number("Ticket #: 12345"), Some("12345".to_string()));
        assert_eq!(extract_ticket_number("TICKET#: 00123"), Some("00123".to_string()));
        assert_eq!(extract_ticket_number("ticket 4567"), Some("4567".to_string()));
        assert_eq!(extract_ticket_number("Ticket:987"), Some("987".to_string()));
    }

    #[test]
    fn test_label_wins_over_digit_line() {
        let text = "55501\nTicket #: 12345\n";
        let m = TicketNumberExtractor::new().extract(text).unwrap();
        assert_eq!(m.value, "12345");
        assert_eq!(m.rule, "ticket-label");
    }

    #[test]
    fn test_digit_line_fallback() {
        let text = "CITY LANDFILL\r\n  98765  \r\nWeight: 4.5";
        let m = TicketNumberExtractor::new().extract(text).unwrap();
        assert_eq!(m.value, "98765");
        assert_eq!(m.rule, "digit-line");
    }

    #[test]
    fn test_short_numbers_are_ignored() {
        assert_eq!(extract_ticket_number("Ticket #: 12"), None);
        assert_eq!(extract_ticket_number("CITY LANDFILL\n42\n7"), None);
        assert_eq!(extract_ticket_number("Ticket #: 12\n99"), None);
    }

    #[test]
    fn test_mixed_lines_are_not_fallback_candidates() {
        assert_eq!(extract_ticket_number("No. 12345\n12 345"), None);
    }

    #[test]
    fn test_fallback_disabled() {
        let extractor = TicketNumberExtractor::new().with_line_fallback(false);
        assert!(extractor.extract("98765").is_none());
        assert_eq!(extractor.extract("Ticket 98765").unwrap().value, "98765");
    }

    #[test]
    fn test_extract_all_lists_both_candidates() {
        let all = TicketNumberExtractor::new().extract_all("Ticket # 111\n222");
        let values: Vec<_> = all.into_iter().map(|m| m.value).collect();
        assert_eq!(values, vec!["111", "222"]);
    }
}
