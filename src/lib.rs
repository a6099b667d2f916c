//! RustQRIS - QRIS payment payload codec
//!
//! Decodes, validates and edits EMVCo-style merchant-presented QR payloads
//! (the Indonesian QRIS variant): a flat tag-length-value string ending in a
//! CRC-16/IBM-3740 checksum field.
//!
//! The crate works on the decoded text only. Getting the string out of an
//! image and rendering the edited string back into a QR symbol are left to
//! the caller.
//!
//! # Example
//! ```
//! use rust_qris::{Edit, edit, validate};
//!
//! let raw = "0002010102115802ID5914TOKO MAJU JAYA6007BANDUNG6105401116304";
//! let raw = format!("{}{}", raw, rust_qris::codec::crc::checksum_hex(raw.as_bytes()));
//! assert!(validate(&raw).ok);
//!
//! let outcome = edit(&raw, [Edit::merchant_city("Jakarta")]).unwrap();
//! assert!(outcome.edited);
//! assert!(validate(&outcome.payload).ok);
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// CRC engine, TLV codec and tag table
pub mod codec;
/// Editor configuration (limits, marker, composite tags)
pub mod config;
/// Error taxonomy
pub mod error;
/// Core data structures (Tag, Field, Payload)
pub mod models;
/// Edit and recompute pipeline
pub mod pipeline;
/// Helpers for the CLI and benches (loading, batch processing, reports)
pub mod tools;
/// Structural and checksum validation
pub mod validator;

pub use config::{EditorConfig, FieldLimits};
pub use error::{EditError, LookupError, ParseError, PipelineError};
pub use models::{Field, FieldValue, MerchantField, MerchantInfo, Mutation, Payload, Tag};
pub use pipeline::{Edit, EditOutcome, Editor, SessionState};
pub use validator::{Issue, ValidationResult, validate, validate_with};

/// Parse a raw QRIS string with the default composite tags
pub fn parse(raw: &str) -> Result<Payload, ParseError> {
    Payload::parse(raw)
}

/// Run the full pipeline with the default configuration.
///
/// Rejected edits do not fail the call; they are listed in
/// [`EditOutcome::rejected`].
pub fn edit<I>(raw: &str, edits: I) -> Result<EditOutcome, PipelineError>
where
    I: IntoIterator<Item = Edit>,
{
    edit_with(raw, edits, EditorConfig::default())
}

/// Run the full pipeline with an explicit configuration
pub fn edit_with<I>(raw: &str, edits: I, config: EditorConfig) -> Result<EditOutcome, PipelineError>
where
    I: IntoIterator<Item = Edit>,
{
    let mut editor = Editor::open_with(raw, config)?;
    editor.apply_all(edits);
    editor.finalize()
}
