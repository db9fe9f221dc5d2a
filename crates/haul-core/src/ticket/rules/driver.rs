//! Driver identification.
//!
//! Two independent channels: the free-text driver name and the badge code
//! printed on the monitor line. Both may be present for cross-checking.

use super::patterns::{DRIVER_BADGE, DRIVER_NAME};
use super::{trim, ExtractionMatch, ExtractionRule, FieldExtractor, RuleSet};

/// Driver name field extractor.
#[derive(Debug, Clone)]
pub struct DriverNameExtractor {
    rules: RuleSet,
}

impl DriverNameExtractor {
    pub fn new() -> Self {
        Self {
            rules: RuleSet::new(vec![
                ExtractionRule::labeled("driver-label", &DRIVER_NAME).with_transform(trim),
            ]),
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }
}

impl Default for DriverNameExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DriverNameExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.rules.first_match(text)
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.rules.all_matches(text)
    }
}

/// Driver badge field extractor.
#[derive(Debug, Clone)]
pub struct DriverBadgeExtractor {
    rules: RuleSet,
}

impl DriverBadgeExtractor {
    pub fn new() -> Self {
        Self {
            rules: RuleSet::new(vec![ExtractionRule::labeled("monitor-badge", &DRIVER_BADGE)]),
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }
}

impl Default for DriverBadgeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DriverBadgeExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.rules.first_match(text)
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.rules.all_matches(text)
    }
}

/// Extract the driver name from text.
pub fn extract_driver_name(text: &str) -> Option<String> {
    DriverNameExtractor::new().extract(text).map(|m| m.value)
}

/// Extract the driver badge from text.
pub fn extract_driver_badge(text: &str) -> Option<String> {
    DriverBadgeExtractor::new().extract(text).map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_name() {
        assert_eq!(extract_driver_name("Driver: Jane O'Brien"), Some("Jane O'Brien".to_string()));
        assert_eq!(extract_driver_name("DRIVER - J. Smith-Jones  \nTruck: 4"), Some("J. Smith-Jones".to_string()));
        assert_eq!(extract_driver_name("Driver: John Smith\nDebris Type: Mixed"), Some("John Smith".to_string()));
    }

    #[test]
    fn test_short_driver_name_counts_leading_space() {
        // The pattern backtracks into the separator to reach three characters
        assert_eq!(extract_driver_name("Driver: Al"), Some("Al".to_string()));
        assert_eq!(extract_driver_name("Driver: A  \n"), Some("A".to_string()));

        let m = DriverNameExtractor::new().extract("Driver: Al").unwrap();
        assert_eq!(m.source, "Driver: Al");
    }

    #[test]
    fn test_driver_name_too_short() {
        assert_eq!(extract_driver_name("Driver: 12345"), None);
        assert_eq!(extract_driver_name("Driver:A"), None);
    }

    #[test]
    fn test_driver_badge() {
        assert_eq!(extract_driver_badge("Monitor Name(Id): M4512"), Some("M4512".to_string()));
        assert_eq!(extract_driver_badge("MONITOR NAME(ID):   b77"), Some("b77".to_string()));
        assert_eq!(extract_driver_badge("Monitor Name: M4512"), None);
    }

    #[test]
    fn test_name_and_badge_are_independent() {
        let text = "Driver: Sam Lee\nMonitor Name(Id): K900";
        assert_eq!(extract_driver_name(text), Some("Sam Lee".to_string()));
        assert_eq!(extract_driver_badge(text), Some("K900".to_string()));
    }
}
