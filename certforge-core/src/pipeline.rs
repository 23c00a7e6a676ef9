//! Compilation Pipeline - Single Entry Point
//!
//! compile() validates every record before it can reach the document.
//! Records with errors are dropped, records with warnings are kept.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

use crate::config::{non_empty, CategoryMetadata, CertificationConfig, CertificationRecord};
use crate::output::{CategoryGroup, CategoryGroups, CertificationEntry, OutputDocument};
use crate::placeholder::fallback_svg;
use crate::validation::{ValidationContext, ValidationResult, Validator};

/// Where the page expects badge artwork, relative to the site root.
pub const BADGE_ASSET_DIR: &str = "assets/badges";

/// Sort key standing in for a missing issue date.
pub const MISSING_DATE_SORT_KEY: &str = "1970-01-01";

/// Validation outcome for one input record, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct RecordReport {
    /// 1-based position in `certifications:`.
    pub index: usize,
    pub title: String,
    pub included: bool,
    pub validation: ValidationResult,
}

#[derive(Debug, Clone)]
pub struct Compilation {
    pub document: OutputDocument,
    pub records: Vec<RecordReport>,
    /// Error violations across rejected records.
    pub error_count: usize,
    /// Warning violations across included records.
    pub warning_count: usize,
}

impl Compilation {
    pub fn is_success(&self) -> bool {
        self.error_count == 0
    }

    pub fn rejected_count(&self) -> usize {
        self.records.iter().filter(|r| !r.included).count()
    }
}

/// The compilation pipeline - single entry point for document generation
pub struct CertificationCompiler {
    validator: Validator,
    badges_dir: PathBuf,
}

impl CertificationCompiler {
    pub fn new(badges_dir: impl Into<PathBuf>) -> Self {
        Self {
            validator: Validator::new(),
            badges_dir: badges_dir.into(),
        }
    }

    /// Validate a single record against the configured categories.
    pub fn validate_record(
        &self,
        record: &CertificationRecord,
        config: &CertificationConfig,
    ) -> ValidationResult {
        let ctx = ValidationContext {
            categories: &config.categories,
            badges_dir: &self.badges_dir,
        };
        self.validator.validate(record, &ctx)
    }

    pub fn compile(&self, config: &CertificationConfig) -> Compilation {
        self.compile_at(config, Utc::now())
    }

    /// Compile with an explicit generation timestamp.
    pub fn compile_at(&self, config: &CertificationConfig, now: DateTime<Utc>) -> Compilation {
        let mut groups = CategoryGroups::new();
        let mut records = Vec::with_capacity(config.certifications.len());
        let mut error_count = 0;
        let mut warning_count = 0;
        let mut total_count = 0;

        if config.certifications.is_empty() {
            tracing::warn!("no certifications found in config");
        }

        for (idx, record) in config.certifications.iter().enumerate() {
            // MANDATORY: nothing reaches the document without validation.
            let validation = self.validate_record(record, config);
            let included = !validation.has_errors();

            if included {
                warning_count += validation.warning_count();
                let entry = build_entry(record);
                let key = entry.category.clone();
                let group = groups.entry_or_insert_with(&key, || {
                    new_group(&key, config.categories.get(&key))
                });
                group.certifications.push(entry);
                group.count += 1;
                total_count += 1;
                tracing::debug!(index = idx + 1, category = %key, "record accepted");
            } else {
                error_count += validation.error_count();
                tracing::warn!(
                    index = idx + 1,
                    title = record.display_title(),
                    errors = validation.error_count(),
                    "record dropped"
                );
            }

            records.push(RecordReport {
                index: idx + 1,
                title: record.display_title().to_string(),
                included,
                validation,
            });
        }

        order_groups(&mut groups);

        tracing::info!(
            total = total_count,
            categories = groups.len(),
            errors = error_count,
            warnings = warning_count,
            "compilation finished"
        );

        Compilation {
            document: OutputDocument {
                last_updated: now,
                total_count,
                categories: groups,
            },
            records,
            error_count,
            warning_count,
        }
    }
}

/// Categories by ascending sort order, entries by issue date newest first.
pub fn order_groups(groups: &mut CategoryGroups) {
    groups.sort_by_order();
    for group in groups.groups_mut() {
        // Plain string comparison; correct for fixed-width YYYY-MM-DD only.
        group
            .certifications
            .sort_by(|a, b| issue_date_sort_key(b).cmp(issue_date_sort_key(a)));
    }
}

pub fn issue_date_sort_key(entry: &CertificationEntry) -> &str {
    entry.issue_date.as_deref().unwrap_or(MISSING_DATE_SORT_KEY)
}

fn owned(value: &Option<String>) -> Option<String> {
    non_empty(value).map(str::to_string)
}

fn build_entry(record: &CertificationRecord) -> CertificationEntry {
    let provider = owned(&record.provider).unwrap_or_default();
    let badge_image = owned(&record.badge_image).unwrap_or_default();
    CertificationEntry {
        title: owned(&record.title).unwrap_or_default(),
        badge_path: format!("{}/{}", BADGE_ASSET_DIR, badge_image),
        verification_url: record.verification_url.clone().unwrap_or_default(),
        fallback_svg: fallback_svg(&provider),
        category: owned(&record.category).unwrap_or_default(),
        issue_date: owned(&record.issue_date),
        expiry_date: owned(&record.expiry_date),
        credential_id: owned(&record.credential_id),
        description: owned(&record.description),
        provider,
        badge_image,
    }
}

fn new_group(key: &str, meta: Option<&CategoryMetadata>) -> CategoryGroup {
    let fallback = CategoryMetadata::default();
    let meta = meta.unwrap_or(&fallback);
    CategoryGroup {
        display_name: meta.display_name_for(key),
        icon: meta.icon().to_string(),
        color: meta.color().to_string(),
        description: meta.description().to_string(),
        sort_order: meta.sort_order(),
        count: 0,
        certifications: vec![],
    }
}
