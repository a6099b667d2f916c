//! Structural and checksum validation
//!
//! Every check runs; all findings are collected as [`Issue`] values rather
//! than raised as errors. Callers decide the severity, with
//! [`Issue::is_structural`] marking the ones that make a payload unusable.

use std::fmt;

use crate::codec::crc::{self, CRC_HEADER};
use crate::codec::tags;
use crate::config::EditorConfig;
use crate::error::ParseError;
use crate::models::{MerchantField, Payload, Tag};

/// Expected first six characters: tag 00, length 02, value 01
pub const PAYLOAD_HEADER: &str = "000201";

/// One validation finding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    /// Fewer characters than the configured minimum
    TooShort {
        /// Characters after trimming
        len: usize,
        /// Configured minimum
        min: usize,
    },
    /// Does not start with `000201`
    BadHeader,
    /// The last top-level field is not tag 63
    MissingChecksum,
    /// Stored checksum differs from the recomputed one
    ChecksumMismatch {
        /// Recomputed hex
        expected: String,
        /// Stored hex, uppercased
        found: String,
    },
    /// The string is not a valid TLV stream, so field checks were skipped
    Malformed(ParseError),
    /// Tag 59 is absent
    MissingMerchantName,
    /// A merchant field exceeds its limit
    FieldTooLong {
        /// Offending tag
        tag: Tag,
        /// Current length
        len: usize,
        /// Configured maximum
        max: usize,
    },
}

impl Issue {
    /// Structural issues make a payload unfit for editing
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Issue::TooShort { .. }
                | Issue::BadHeader
                | Issue::MissingChecksum
                | Issue::ChecksumMismatch { .. }
                | Issue::Malformed(_)
        )
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::TooShort { len, min } => {
                write!(f, "payload too short ({len} characters, need at least {min})")
            }
            Issue::BadHeader => write!(f, "payload does not start with {PAYLOAD_HEADER}"),
            Issue::MissingChecksum => write!(f, "checksum field ({CRC_HEADER}) not found"),
            Issue::ChecksumMismatch { expected, found } => {
                write!(f, "checksum mismatch (expected {expected}, got {found})")
            }
            Issue::Malformed(err) => write!(f, "malformed TLV: {err}"),
            Issue::MissingMerchantName => {
                write!(f, "merchant name (tag {}) not found", tags::MERCHANT_NAME)
            }
            Issue::FieldTooLong { tag, len, max } => {
                write!(f, "tag {tag} too long ({len} characters, max {max})")
            }
        }
    }
}

/// Verdict plus every finding, in check order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// No issue at all
    pub ok: bool,
    /// Every finding, in check order
    pub diagnostics: Vec<Issue>,
}

impl ValidationResult {
    fn from_issues(diagnostics: Vec<Issue>) -> Self {
        Self {
            ok: diagnostics.is_empty(),
            diagnostics,
        }
    }

    /// No structural issue; the payload may be edited
    pub fn is_structurally_sound(&self) -> bool {
        !self.diagnostics.iter().any(Issue::is_structural)
    }

    /// Issues that block editing
    pub fn structural(&self) -> impl Iterator<Item = &Issue> {
        self.diagnostics.iter().filter(|i| i.is_structural())
    }

    /// Non-structural findings (advisory)
    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.diagnostics.iter().filter(|i| !i.is_structural())
    }
}

/// Validate with default limits
pub fn validate(raw: &str) -> ValidationResult {
    validate_with(raw, &EditorConfig::default())
}

/// Run every check against `raw` with the limits in `config`.
///
/// Surrounding whitespace is ignored.
pub fn validate_with(raw: &str, config: &EditorConfig) -> ValidationResult {
    let data = raw.trim();
    let mut issues = Vec::new();

    let len = data.chars().count();
    if len < config.min_length {
        issues.push(Issue::TooShort {
            len,
            min: config.min_length,
        });
    }

    if !data.starts_with(PAYLOAD_HEADER) {
        issues.push(Issue::BadHeader);
    }

    match Payload::parse_with(data, &config.codec()) {
        Err(err) => {
            // No field tree to consult; fall back to locating `6304` in the text
            match crc::split_checksum(data) {
                None => issues.push(Issue::MissingChecksum),
                Some((scope, found)) => check_checksum(&mut issues, scope, found),
            }
            issues.push(Issue::Malformed(err));
        }
        Ok(payload) => {
            match payload.fields().last() {
                Some(last) if last.tag() == tags::CRC => {
                    let found = last.text().unwrap_or_default();
                    check_checksum(&mut issues, &payload.checksum_scope(), found);
                }
                _ => issues.push(Issue::MissingChecksum),
            }

            if payload.get(&[tags::MERCHANT_NAME]).is_none() {
                issues.push(Issue::MissingMerchantName);
            }
            for field in MerchantField::ALL {
                let Some(current) = payload.get(&[field.tag()]) else {
                    continue;
                };
                let max = config.limits.max_for(field);
                if current.length() > max {
                    issues.push(Issue::FieldTooLong {
                        tag: field.tag(),
                        len: current.length(),
                        max,
                    });
                }
            }
        }
    }

    for issue in &issues {
        log::debug!("validation issue: {}", issue);
    }
    ValidationResult::from_issues(issues)
}

fn check_checksum(issues: &mut Vec<Issue>, scope: &str, found: &str) {
    let expected = crc::checksum_hex(scope.as_bytes());
    if !found.eq_ignore_ascii_case(&expected) {
        issues.push(Issue::ChecksumMismatch {
            expected,
            found: found.to_ascii_uppercase(),
        });
    }
}
