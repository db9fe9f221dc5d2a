//! Truck number extraction.

use super::patterns::TRUCK_NUMBER;
use super::{ExtractionMatch, ExtractionRule, FieldExtractor, RuleSet};

/// Truck number field extractor.
#[derive(Debug, Clone)]
pub struct TruckNumberExtractor {
    rules: RuleSet,
}

impl TruckNumberExtractor {
    pub fn new() -> Self {
        Self {
            rules: RuleSet::new(vec![ExtractionRule::labeled("truck-label", &TRUCK_NUMBER)]),
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }
}

impl Default for TruckNumberExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for TruckNumberExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.rules.first_match(text)
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.rules.all_matches(text)
    }
}

/// Extract the truck number from text.
pub fn extract_truck_number(text: &str) -> Option<String> {
    TruckNumberExtractor::new().extract(text).map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truck_variants() {
        assert_eq!(extract_truck_number("Truck No: AB-123"), Some("AB-123".to_string()));
        assert_eq!(extract_truck_number("Truck #: T9"), Some("T9".to_string()));
        assert_eq!(extract_truck_number("TRUCK - 4421"), Some("4421".to_string()));
    }

    #[test]
    fn test_missing_truck() {
        assert_eq!(extract_truck_number("Trailer: 12"), None);
        assert_eq!(extract_truck_number(""), None);
    }
}
