//! Weight extraction.
//!
//! Weights are printed with grouping commas ("12,345.6"). The capture is
//! normalized to a plain decimal string and parsed into a [`Decimal`]; a
//! capture that does not parse is treated as absent.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::WEIGHT;
use super::{ExtractionMatch, ExtractionRule, FieldExtractor, RuleSet};

/// Weight field extractor.
#[derive(Debug, Clone)]
pub struct WeightExtractor {
    rules: RuleSet,
}

impl WeightExtractor {
    pub fn new() -> Self {
        Self {
            rules: RuleSet::new(vec![
                ExtractionRule::labeled("weight-label", &WEIGHT).with_transform(normalize_weight),
            ]),
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }
}

impl Default for WeightExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for WeightExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.rules
            .all_matches(text)
            .into_iter()
            .filter_map(|m| {
                let weight = parse_weight(&m.value)?;
                Some(m.map(|_| weight))
            })
            .collect()
    }
}

/// Strip grouping commas and sentence-ending periods from a weight capture.
pub fn normalize_weight(raw: &str) -> Option<String> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    let cleaned = cleaned.trim_end_matches('.');
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

/// Parse a weight such as "12,345.6" or "5000".
pub fn parse_weight(s: &str) -> Option<Decimal> {
    let normalized = normalize_weight(s.trim())?;
    if !normalized.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    Decimal::from_str(&normalized).ok()
}

/// Extract the weight from text.
pub fn extract_weight(text: &str) -> Option<Decimal> {
    WeightExtractor::new().extract(text).map(|m| m.value)
}
