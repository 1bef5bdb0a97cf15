//! Structural Validation - Rule/Policy Separation
//!
//! One scan of the document produces a tag census. Rules read the census
//! and produce structured violations. Any violation rejects the document.

use bstr::ByteSlice;
use serde::Serialize;
use thiserror::Error;

use crate::config::TranspileConfig;
use crate::document::Document;
use crate::region::{LineKind, RegionScanner, RegionState, TagEvent};

/// Which structural rule a document broke.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, Error)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    #[error("No LHP tags detected in this file.")]
    NoTags,

    #[error("LHP tag pairs are inconsistent. Either a start tag or an end tag is missing!")]
    UnbalancedTags,

    #[error("LHP end tag appears before the start tag.")]
    MisorderedTags,

    #[error("Too many LHP tags detected in this file.")]
    TooManyTags,

    #[error("This program does not permit double quotation marks in HTML code. Please replace these with single quotation marks!")]
    QuotedMarkupRejected,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ValidationViolation {
    pub rule: String,
    pub reason: RejectionReason,
    pub message: String,
    /// 1-based source line, when the violation belongs to one line.
    pub line: Option<usize>,
    pub remediation: Vec<String>,
}

impl ValidationViolation {
    fn new(rule: &str, reason: RejectionReason) -> Self {
        Self {
            rule: rule.to_string(),
            reason,
            message: reason.to_string(),
            line: None,
            remediation: vec![],
        }
    }

    fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.message = format!("{} ({})", self.message, detail.into());
        self
    }

    fn with_remediation(mut self, hint: &str) -> Self {
        self.remediation.push(hint.to_string());
        self
    }
}

impl std::fmt::Display for ValidationViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {}: {}", line, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// A rejected document, with every rule it broke. Serializes to the JSON
/// report printed by `lhpc --json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{}", format_violations(.violations))]
pub struct Rejection {
    pub violations: Vec<ValidationViolation>,
}

fn format_violations(violations: &[ValidationViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl Rejection {
    /// The primary reason: the first violation reported.
    pub fn reason(&self) -> Option<RejectionReason> {
        self.violations.first().map(|v| v.reason)
    }

    pub fn has(&self, reason: RejectionReason) -> bool {
        self.violations.iter().any(|v| v.reason == reason)
    }
}

#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub valid: bool,
    pub violations: Vec<ValidationViolation>,
    pub census: TagCensus,
}

impl ValidationResult {
    pub fn into_result(self) -> Result<TagCensus, Rejection> {
        if self.valid {
            Ok(self.census)
        } else {
            Err(Rejection {
                violations: self.violations,
            })
        }
    }
}

/// What a single validation scan observed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagCensus {
    pub open_count: usize,
    pub close_count: usize,
    /// First line where a tag broke the `open -> close` order.
    pub overrun_at: Option<usize>,
    /// Markup-region lines containing a double quote.
    pub quoted_lines: Vec<usize>,
}

impl TagCensus {
    pub fn scan(document: &Document, config: &TranspileConfig) -> Self {
        let mut census = Self::default();
        // Every tag flips between markup and code, whatever the region state
        // says once the tags are out of order.
        let mut in_markup = true;

        for line in RegionScanner::new(document, config) {
            match line.kind {
                LineKind::Boundary(TagEvent::Open) => census.open_count += 1,
                LineKind::Boundary(TagEvent::Close) => census.close_count += 1,
                _ => {}
            }
            if let LineKind::Boundary(_) = line.kind {
                in_markup = !in_markup;
            }
            if line.state == RegionState::Overrun && census.overrun_at.is_none() {
                census.overrun_at = Some(line.number);
            }
            if in_markup && line.text.find_byte(b'"').is_some() {
                census.quoted_lines.push(line.number);
            }
        }

        census
    }

    pub fn total(&self) -> usize {
        self.open_count + self.close_count
    }
}

/// Validation rule trait - produces violations
pub trait ValidationRule {
    fn name(&self) -> &'static str;
    fn validate(&self, census: &TagCensus) -> Vec<ValidationViolation>;
}

// --- Concrete Rules ---

/// Opening and closing tags must pair up, in that order.
pub struct TagBalanceRule;

impl ValidationRule for TagBalanceRule {
    fn name(&self) -> &'static str { "tag_balance" }

    fn validate(&self, census: &TagCensus) -> Vec<ValidationViolation> {
        if census.open_count != census.close_count {
            return vec![ValidationViolation::new(self.name(), RejectionReason::UnbalancedTags)
                .with_detail(format!(
                    "{} start tag(s), {} end tag(s)",
                    census.open_count, census.close_count
                ))
                .with_remediation("Add the missing start or end tag")];
        }

        match census.overrun_at {
            Some(line) if census.total() == 2 => {
                vec![ValidationViolation::new(self.name(), RejectionReason::MisorderedTags)
                    .at_line(line)
                    .with_remediation("Place the start tag before the end tag")]
            }
            _ => vec![],
        }
    }
}

/// Exactly one tagged region per document.
pub struct TagCountRule;

impl ValidationRule for TagCountRule {
    fn name(&self) -> &'static str { "tag_count" }

    fn validate(&self, census: &TagCensus) -> Vec<ValidationViolation> {
        let total = census.total();
        if total > 2 {
            vec![ValidationViolation::new(self.name(), RejectionReason::TooManyTags)
                .with_detail(format!("found {}, expected 2", total))
                .with_remediation("Merge the code into a single tagged block")]
        } else if total < 1 {
            vec![ValidationViolation::new(self.name(), RejectionReason::NoTags)
                .with_remediation("Wrap the program's code in a start and end tag")]
        } else {
            vec![]
        }
    }
}

/// Markup is embedded in quoted print arguments and must not contain `"`.
pub struct QuotedMarkupRule;

impl ValidationRule for QuotedMarkupRule {
    fn name(&self) -> &'static str { "quoted_markup" }

    fn validate(&self, census: &TagCensus) -> Vec<ValidationViolation> {
        census
            .quoted_lines
            .iter()
            .map(|&line| {
                ValidationViolation::new(self.name(), RejectionReason::QuotedMarkupRejected)
                    .at_line(line)
                    .with_remediation("Use single quotation marks in markup")
            })
            .collect()
    }
}

/// Validator orchestrates rules; any violation rejects the document.
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(TagBalanceRule),
                Box::new(TagCountRule),
                Box::new(QuotedMarkupRule),
            ],
        }
    }

    pub fn validate(&self, document: &Document, config: &TranspileConfig) -> ValidationResult {
        let census = TagCensus::scan(document, config);

        let violations: Vec<_> = self
            .rules
            .iter()
            .flat_map(|rule| rule.validate(&census))
            .collect();

        ValidationResult {
            valid: violations.is_empty(),
            violations,
            census,
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
