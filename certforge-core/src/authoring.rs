//! Certification Authoring
//!
//! Interactive prompts for one new certification, appended to the YAML
//! config. The rest of the document (comments aside) is kept as-is.

use serde_yaml::{Mapping, Value};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::{CategoryMetadata, CertificationRecord};
use crate::output::{write_atomic, OutputError};
use crate::validation::is_valid_date;

pub const DEFAULT_CATEGORY: &str = "Credentials";
pub const BADGE_EXTENSION: &str = ".png";

#[derive(Debug, Error)]
pub enum AuthoringError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Malformed config {path}: {reason}")]
    Malformed { path: PathBuf, reason: &'static str },

    #[error("Cancelled: input ended before the certification was complete")]
    Cancelled,

    #[error("Prompt I/O failed: {0}")]
    Prompt(#[source] io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[source] serde_yaml::Error),

    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Line-oriented prompts over any reader/writer pair.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn say(&mut self, line: &str) -> Result<(), AuthoringError> {
        writeln!(self.output, "{}", line).map_err(AuthoringError::Prompt)
    }

    fn read_line(&mut self) -> Result<String, AuthoringError> {
        let mut line = String::new();
        let n = self.input.read_line(&mut line).map_err(AuthoringError::Prompt)?;
        if n == 0 {
            return Err(AuthoringError::Cancelled);
        }
        Ok(line.trim().to_string())
    }

    /// Ask until a usable answer arrives. Empty input takes the default.
    pub fn ask(
        &mut self,
        label: &str,
        default: Option<&str>,
        required: bool,
    ) -> Result<String, AuthoringError> {
        loop {
            let shown = match default {
                Some(d) => write!(self.output, "{} [{}]: ", label, d),
                None => write!(self.output, "{}: ", label),
            };
            shown
                .and_then(|_| self.output.flush())
                .map_err(AuthoringError::Prompt)?;

            let value = self.read_line()?;
            if value.is_empty() {
                if let Some(d) = default {
                    return Ok(d.to_string());
                }
                if required {
                    self.say("❌ This field is required!")?;
                    continue;
                }
            }
            return Ok(value);
        }
    }

    /// Empty string, or a valid YYYY-MM-DD date.
    pub fn ask_date(&mut self, label: &str, required: bool) -> Result<String, AuthoringError> {
        let label = format!("{} (YYYY-MM-DD)", label);
        loop {
            let value = self.ask(&label, None, required)?;
            if value.is_empty() || is_valid_date(&value) {
                return Ok(value);
            }
            self.say("❌ Invalid date format. Please use YYYY-MM-DD")?;
        }
    }
}

fn optional(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Run the prompt sequence and build the record.
pub fn collect_certification<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    categories: &[(&str, &CategoryMetadata)],
) -> Result<CertificationRecord, AuthoringError> {
    prompter.say("Enter certification details:\n")?;

    let title = prompter.ask("Certification Title", None, true)?;
    let provider = prompter.ask("Provider/Issuer", None, true)?;

    if !categories.is_empty() {
        prompter.say("\nAvailable categories:")?;
        for (key, meta) in categories {
            prompter.say(&format!("  - {} ({})", key, meta.display_name_for(key)))?;
        }
    }
    let category = prompter.ask("Category", Some(DEFAULT_CATEGORY), true)?;

    let mut badge_image = prompter.ask("Badge image filename (in assets/badges/)", None, true)?;
    if !badge_image.ends_with(BADGE_EXTENSION) {
        badge_image.push_str(BADGE_EXTENSION);
    }

    let verification_url = prompter.ask("Verification URL", None, false)?;
    let issue_date = prompter.ask_date("Issue Date", false)?;
    let expiry_date = prompter.ask_date("Expiry Date", false)?;
    let credential_id = prompter.ask("Credential ID", None, false)?;
    let description = prompter.ask("Description", None, false)?;

    Ok(CertificationRecord {
        title: Some(title),
        provider: Some(provider),
        category: Some(category),
        badge_image: Some(badge_image),
        verification_url: optional(verification_url),
        issue_date: optional(issue_date),
        expiry_date: optional(expiry_date),
        credential_id: optional(credential_id),
        description: optional(description),
    })
}

/// Append `record` to the `certifications` list of the YAML file at `path`.
pub fn append_certification(path: &Path, record: &CertificationRecord) -> Result<(), AuthoringError> {
    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            AuthoringError::NotFound(path.to_path_buf())
        } else {
            AuthoringError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let mut doc: Value = serde_yaml::from_str(&content).map_err(|source| AuthoringError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    if doc.is_null() {
        doc = Value::Mapping(Mapping::new());
    }

    let malformed = |reason| AuthoringError::Malformed {
        path: path.to_path_buf(),
        reason,
    };
    let root = doc
        .as_mapping_mut()
        .ok_or_else(|| malformed("top level is not a mapping"))?;

    let key = Value::String("certifications".to_string());
    let list = root.entry(key).or_insert(Value::Sequence(vec![]));
    if list.is_null() {
        *list = Value::Sequence(vec![]);
    }
    let list = list
        .as_sequence_mut()
        .ok_or_else(|| malformed("`certifications` is not a list"))?;

    list.push(serde_yaml::to_value(record).map_err(AuthoringError::Serialize)?);

    let rendered = serde_yaml::to_string(&doc).map_err(AuthoringError::Serialize)?;
    write_atomic(path, rendered.as_bytes())?;

    tracing::info!(
        path = %path.display(),
        title = record.display_title(),
        "appended certification"
    );
    Ok(())
}
