//! Validation System - Rule/Policy Separation
//!
//! Rules produce structured violations.
//! Policy (errors drop the record, warnings keep it) lives in the compiler.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::config::{non_empty, CategoryKey, CategoryMetadata, CertificationRecord};

pub const REQUIRED_FIELDS: [&str; 4] = ["title", "provider", "category", "badge_image"];
pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const URL_PLACEHOLDER_MARKER: &str = "YOUR-";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationViolation {
    pub rule: String,
    pub severity: ViolationSeverity,
    pub message: String,
    pub remediation: Option<String>,
}

impl ValidationViolation {
    fn error(rule: &str, message: String, remediation: &str) -> Self {
        Self {
            rule: rule.to_string(),
            severity: ViolationSeverity::Error,
            message,
            remediation: Some(remediation.to_string()),
        }
    }

    fn warning(rule: &str, message: String, remediation: &str) -> Self {
        Self {
            rule: rule.to_string(),
            severity: ViolationSeverity::Warning,
            message,
            remediation: Some(remediation.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == ViolationSeverity::Error
    }
}

/// Outcome of validating one record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    pub violations: Vec<ValidationViolation>,
}

impl ValidationResult {
    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(ValidationViolation::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationViolation> {
        self.violations.iter().filter(|v| v.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationViolation> {
        self.violations.iter().filter(|v| !v.is_error())
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }
}

/// What the rules may look at besides the record itself.
pub struct ValidationContext<'a> {
    pub categories: &'a BTreeMap<CategoryKey, CategoryMetadata>,
    pub badges_dir: &'a Path,
}

/// Validation rule trait - produces violations
pub trait ValidationRule {
    fn name(&self) -> &'static str;
    fn validate(
        &self,
        record: &CertificationRecord,
        ctx: &ValidationContext<'_>,
    ) -> Vec<ValidationViolation>;
}

// --- Concrete Rules ---

pub struct RequiredFieldsRule;

impl ValidationRule for RequiredFieldsRule {
    fn name(&self) -> &'static str { "required_fields" }

    fn validate(
        &self,
        record: &CertificationRecord,
        _ctx: &ValidationContext<'_>,
    ) -> Vec<ValidationViolation> {
        let values = [
            &record.title,
            &record.provider,
            &record.category,
            &record.badge_image,
        ];
        REQUIRED_FIELDS
            .iter()
            .zip(values)
            .filter(|(_, value)| non_empty(value).is_none())
            .map(|(field, _)| {
                ValidationViolation::error(
                    self.name(),
                    format!("Missing required field: {}", field),
                    "Fill in the field in badge_certifications.yaml",
                )
            })
            .collect()
    }
}

pub struct KnownCategoryRule;

impl ValidationRule for KnownCategoryRule {
    fn name(&self) -> &'static str { "known_category" }

    fn validate(
        &self,
        record: &CertificationRecord,
        ctx: &ValidationContext<'_>,
    ) -> Vec<ValidationViolation> {
        match non_empty(&record.category) {
            Some(category) if !ctx.categories.contains_key(category) => {
                vec![ValidationViolation::error(
                    self.name(),
                    format!("Invalid category: {}", category),
                    "Use a key listed under `categories:`",
                )]
            }
            _ => vec![],
        }
    }
}

pub struct BadgeImageRule;

impl ValidationRule for BadgeImageRule {
    fn name(&self) -> &'static str { "badge_image" }

    fn validate(
        &self,
        record: &CertificationRecord,
        ctx: &ValidationContext<'_>,
    ) -> Vec<ValidationViolation> {
        let Some(image) = non_empty(&record.badge_image) else {
            return vec![];
        };
        let path = ctx.badges_dir.join(image);
        if path.exists() {
            vec![]
        } else {
            vec![ValidationViolation::warning(
                self.name(),
                format!("Badge image not found: {}", path.display()),
                "Add the badge artwork to the badges directory",
            )]
        }
    }
}

pub struct DateFormatRule;

impl ValidationRule for DateFormatRule {
    fn name(&self) -> &'static str { "date_format" }

    fn validate(
        &self,
        record: &CertificationRecord,
        _ctx: &ValidationContext<'_>,
    ) -> Vec<ValidationViolation> {
        [("issue_date", &record.issue_date), ("expiry_date", &record.expiry_date)]
            .into_iter()
            .filter_map(|(field, value)| {
                let value = non_empty(value)?;
                if is_valid_date(value) {
                    None
                } else {
                    Some(ValidationViolation::error(
                        self.name(),
                        format!("Invalid date format for {}. Use YYYY-MM-DD", field),
                        "Write dates as YYYY-MM-DD",
                    ))
                }
            })
            .collect()
    }
}

pub struct VerificationUrlRule;

impl ValidationRule for VerificationUrlRule {
    fn name(&self) -> &'static str { "verification_url" }

    fn validate(
        &self,
        record: &CertificationRecord,
        _ctx: &ValidationContext<'_>,
    ) -> Vec<ValidationViolation> {
        let configured = non_empty(&record.verification_url)
            .is_some_and(|url| !url.contains(URL_PLACEHOLDER_MARKER));
        if configured {
            vec![]
        } else {
            vec![ValidationViolation::warning(
                self.name(),
                format!("Verification URL not configured for: {}", record.display_title()),
                "Replace the placeholder with the issuer's verification link",
            )]
        }
    }
}

/// Digits and dashes only, starting with a digit; chrono alone would let a
/// leading sign or whitespace through, and those break string ordering.
pub fn is_valid_date(value: &str) -> bool {
    let shape_ok = value.as_bytes().first().is_some_and(u8::is_ascii_digit)
        && value.bytes().all(|b| b.is_ascii_digit() || b == b'-');
    shape_ok && NaiveDate::parse_from_str(value, DATE_FORMAT).is_ok()
}

/// Validator runs the rules in order.
pub struct Validator {
    gate: Box<dyn ValidationRule>,
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            gate: Box::new(RequiredFieldsRule),
            rules: vec![
                Box::new(KnownCategoryRule),
                Box::new(BadgeImageRule),
                Box::new(DateFormatRule),
                Box::new(VerificationUrlRule),
            ],
        }
    }

    pub fn validate(
        &self,
        record: &CertificationRecord,
        ctx: &ValidationContext<'_>,
    ) -> ValidationResult {
        // Nothing else is meaningful for a record without its required fields.
        let missing = self.gate.validate(record, ctx);
        if !missing.is_empty() {
            return ValidationResult { violations: missing };
        }

        let violations = self
            .rules
            .iter()
            .flat_map(|rule| rule.validate(record, ctx))
            .collect();
        ValidationResult { violations }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
