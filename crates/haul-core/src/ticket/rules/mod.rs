//! Rule-based field extractors for disposal tickets.
//!
//! Every field is described by an ordered [`RuleSet`]: a list of
//! `(pattern, transform)` rules tried in order, where the first rule that
//! yields a value wins.

pub mod debris;
pub mod driver;
pub mod patterns;
pub mod ticket_number;
pub mod truck;
pub mod weight;

pub use debris::{extract_debris_type, DebrisTypeExtractor};
pub use driver::{extract_driver_badge, extract_driver_name, DriverBadgeExtractor, DriverNameExtractor};
pub use ticket_number::{extract_ticket_number, TicketNumberExtractor};
pub use truck::{extract_truck_number, TruckNumberExtractor};
pub use weight::{extract_weight, normalize_weight, parse_weight, WeightExtractor};

use regex::Regex;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Every candidate the rules produce, in priority order.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// Extraction context with confidence scores.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Byte range of the captured value in the source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
    /// Name of the rule that produced the value.
    pub rule: &'static str,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            position: None,
            source: source.into(),
            rule: "",
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }

    pub fn with_rule(mut self, rule: &'static str) -> Self {
        self.rule = rule;
        self
    }

    /// Replace the value, keeping the match context.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ExtractionMatch<U> {
        ExtractionMatch {
            value: f(self.value),
            confidence: self.confidence,
            position: self.position,
            source: self.source,
            rule: self.rule,
        }
    }
}

/// Where a rule's pattern is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleScope {
    /// Search the full text; the first capture group is the value.
    Text,
    /// Try each trimmed, non-empty line in order; the value is the line.
    Line,
}

/// Post-processing applied to a raw capture. `None` rejects the capture.
pub type Transform = fn(&str) -> Option<String>;

/// A single `(pattern, transform)` extraction rule.
#[derive(Clone)]
pub struct ExtractionRule {
    pub name: &'static str,
    pub scope: RuleScope,
    pub pattern: &'static Regex,
    pub transform: Transform,
    pub confidence: f32,
}

impl ExtractionRule {
    /// A rule searching the whole text for a labeled value.
    pub fn labeled(name: &'static str, pattern: &'static Regex) -> Self {
        Self {
            name,
            scope: RuleScope::Text,
            pattern,
            transform: keep,
            confidence: 0.95,
        }
    }

    /// A rule matching whole lines.
    pub fn line(name: &'static str, pattern: &'static Regex) -> Self {
        Self {
            name,
            scope: RuleScope::Line,
            pattern,
            transform: keep,
            confidence: 0.6,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    /// Apply the rule to `text`.
    ///
    /// Text rules only look at the first regex match: if its capture is
    /// rejected by the transform, the rule yields nothing.
    pub fn apply(&self, text: &str) -> Option<ExtractionMatch<String>> {
        match self.scope {
            RuleScope::Text => {
                let caps = self.pattern.captures(text)?;
                let captured = caps.get(1).or_else(|| caps.get(0))?;
                let value = (self.transform)(captured.as_str())?;
                Some(
                    ExtractionMatch::new(value, self.confidence, &caps[0])
                        .with_position(captured.start(), captured.end())
                        .with_rule(self.name),
                )
            }
            RuleScope::Line => trimmed_lines(text).find_map(|line| {
                if !self.pattern.is_match(line) {
                    return None;
                }
                let value = (self.transform)(line)?;
                Some(ExtractionMatch::new(value, self.confidence, line).with_rule(self.name))
            }),
        }
    }
}

impl std::fmt::Debug for ExtractionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionRule")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .field("pattern", &self.pattern.as_str())
            .field("confidence", &self.confidence)
            .finish()
    }
}

/// Ordered rules for one field; first match wins.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<ExtractionRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<ExtractionRule>) -> Self {
        Self { rules }
    }

    pub fn push(&mut self, rule: ExtractionRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[ExtractionRule] {
        &self.rules
    }

    /// Value of the first rule that matches.
    pub fn first_match(&self, text: &str) -> Option<ExtractionMatch<String>> {
        self.rules.iter().find_map(|rule| rule.apply(text))
    }

    /// Values of every rule that matches, in rule order.
    pub fn all_matches(&self, text: &str) -> Vec<ExtractionMatch<String>> {
        self.rules.iter().filter_map(|rule| rule.apply(text)).collect()
    }
}

/// Trimmed, non-empty lines of `text`. Accepts both `\n` and `\r\n` breaks.
pub fn trimmed_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty())
}

/// Transform returning the capture unchanged.
pub fn keep(s: &str) -> Option<String> {
    Some(s.to_string())
}

/// Transform trimming surrounding whitespace.
///
/// Presence is decided by the pattern alone: a capture that is all
/// whitespace is kept as captured.
pub fn trim(s: &str) -> Option<String> {
    let trimmed = s.trim();
    Some(if trimmed.is_empty() { s } else { trimmed }.to_string())
}
