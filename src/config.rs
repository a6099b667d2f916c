//! Editor configuration
//!
//! Configuration is an explicit value handed to the validator and the edit
//! pipeline. [`EditorConfig::from_env`] builds one from `QRIS_*` environment
//! variables; unparsable values fall back to the defaults.

use crate::codec::tags;
use crate::codec::tlv::{CompositeTags, TlvCodec};
use crate::models::field::MAX_VALUE_LEN;
use crate::models::{MerchantField, Tag};

/// Default minimum payload length accepted by the validator
pub const DEFAULT_MIN_LENGTH: usize = 50;

/// Default edited-marker text
pub const DEFAULT_MARKER_TEXT: &str = "EDITED";

/// Maximum characters per editable merchant field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLimits {
    /// Tag 59, default 25
    pub merchant_name: usize,
    /// Tag 60, default 15
    pub merchant_city: usize,
    /// Tag 61, default 5
    pub postal_code: usize,
}

impl FieldLimits {
    /// Limit for one field
    pub fn max_for(&self, field: MerchantField) -> usize {
        match field {
            MerchantField::Name => self.merchant_name,
            MerchantField::City => self.merchant_city,
            MerchantField::PostalCode => self.postal_code,
        }
    }
}

impl Default for FieldLimits {
    fn default() -> Self {
        Self {
            merchant_name: 25,
            merchant_city: 15,
            postal_code: 5,
        }
    }
}

/// Settings shared by the validator and the editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    /// Payloads shorter than this are reported as too short
    pub min_length: usize,
    /// Merchant field limits
    pub limits: FieldLimits,
    /// Preferred tag for the edited marker; ignored outside 80-99
    pub marker_tag: Tag,
    /// Value of the edited marker field
    pub marker_text: String,
    /// Top-level tags parsed as nested TLV
    pub composite_tags: CompositeTags,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
            limits: FieldLimits::default(),
            marker_tag: tags::UNRESERVED_LAST,
            marker_text: DEFAULT_MARKER_TEXT.to_string(),
            composite_tags: CompositeTags::default(),
        }
    }
}

impl EditorConfig {
    /// Read overrides from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let limits = FieldLimits {
            merchant_name: parse_usize(&lookup, "QRIS_MAX_NAME", defaults.limits.merchant_name)
                .clamp(1, MAX_VALUE_LEN),
            merchant_city: parse_usize(&lookup, "QRIS_MAX_CITY", defaults.limits.merchant_city)
                .clamp(1, MAX_VALUE_LEN),
            postal_code: parse_usize(&lookup, "QRIS_MAX_POSTAL", defaults.limits.postal_code)
                .clamp(1, MAX_VALUE_LEN),
        };

        let marker_tag = lookup("QRIS_MARKER_TAG")
            .and_then(|v| v.trim().parse::<Tag>().ok())
            .filter(|tag| (tags::UNRESERVED_FIRST..=tags::UNRESERVED_LAST).contains(tag))
            .unwrap_or(defaults.marker_tag);

        let marker_text = lookup("QRIS_MARKER_TEXT")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty() && v.chars().count() <= MAX_VALUE_LEN)
            .unwrap_or(defaults.marker_text);

        let composite_tags = lookup("QRIS_COMPOSITE_TAGS")
            .and_then(|v| parse_tag_list(&v))
            .unwrap_or(defaults.composite_tags);

        Self {
            min_length: parse_usize(&lookup, "QRIS_MIN_LENGTH", defaults.min_length),
            limits,
            marker_tag,
            marker_text,
            composite_tags,
        }
    }

    /// Codec honouring the configured composite tags
    pub fn codec(&self) -> TlvCodec {
        TlvCodec::new(self.composite_tags)
    }
}

fn parse_usize<F>(lookup: &F, name: &str, default: usize) -> usize
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

/// `"26, 51,62"` -> set; any bad entry rejects the whole list
fn parse_tag_list(value: &str) -> Option<CompositeTags> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<Tag>().ok())
        .collect::<Option<Vec<_>>>()
        .map(|tags| tags.into_iter().collect())
}
