//! Debris type extraction.

use super::patterns::DEBRIS_TYPE;
use super::{trim, ExtractionMatch, ExtractionRule, FieldExtractor, RuleSet};

/// Debris type field extractor.
#[derive(Debug, Clone)]
pub struct DebrisTypeExtractor {
    rules: RuleSet,
}

impl DebrisTypeExtractor {
    pub fn new() -> Self {
        Self {
            rules: RuleSet::new(vec![
                ExtractionRule::labeled("debris-label", &DEBRIS_TYPE).with_transform(trim),
            ]),
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }
}

impl Default for DebrisTypeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DebrisTypeExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.rules.first_match(text)
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.rules.all_matches(text)
    }
}

/// Extract the debris type from text.
pub fn extract_debris_type(text: &str) -> Option<String> {
    DebrisTypeExtractor::new().extract(text).map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debris_type() {
        assert_eq!(
            extract_debris_type("Debris Type: Vegetative Debris"),
            Some("Vegetative Debris".to_string())
        );
        assert_eq!(
            extract_debris_type("DEBRISTYPE - C and D \nLoad: 1"),
            Some("C and D".to_string())
        );
        assert_eq!(extract_debris_type("Debris: Mixed"), None);
    }

    #[test]
    fn test_debris_type_without_letters_is_present() {
        assert_eq!(extract_debris_type("Debris Type: 123"), Some(" ".to_string()));
        assert_eq!(extract_debris_type("Debris Type:123"), None);
    }
}
