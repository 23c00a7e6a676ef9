//! CertForge Core - Certification Compiler
//!
//! Turns the hand-edited badge certification YAML into the JSON document the
//! portfolio's certifications page loads.
//!
//! 1. Validation decides what ships; errors drop a record, warnings do not.
//! 2. Output is deterministic apart from `last_updated`.
//! 3. A failed run never touches the previous output.
//!
//! `feed` refreshes the Medium posts list the portfolio shows alongside.

pub mod authoring;
pub mod config;
pub mod feed;
pub mod hashing;
pub mod output;
pub mod pipeline;
pub mod placeholder;
pub mod report;
pub mod validation;

pub use authoring::{append_certification, collect_certification, AuthoringError, Prompter};
pub use config::{CategoryMetadata, CertificationConfig, CertificationRecord, ConfigError};
pub use feed::{FeedConfig, FeedError, MediumPost, PostsDocument};
pub use hashing::{canonical_json, content_digest, sha256_hex};
pub use output::{write_document, CategoryGroup, CertificationEntry, OutputDocument, OutputError};
pub use pipeline::{CertificationCompiler, Compilation, RecordReport, BADGE_ASSET_DIR};
pub use placeholder::{fallback_svg, ProviderStyle};
pub use validation::{ValidationResult, ValidationRule, ValidationViolation, ViolationSeverity};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
