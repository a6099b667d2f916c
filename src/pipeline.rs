//! Edit and recompute pipeline
//!
//! One [`Editor`] owns one payload for its whole life:
//!
//! ```text
//! Parsed -> Validated -> [Editing -> Recomputing]* -> Finalized
//! ```
//!
//! Opening parses and validates the source and refuses structurally broken
//! input. Edits are applied one at a time; a rejected edit leaves the payload
//! untouched and is recorded. [`Editor::finalize`] consumes the editor, adds
//! the edited marker when anything changed, regenerates the checksum and
//! returns the new wire string.

use crate::codec::tags;
use crate::config::EditorConfig;
use crate::error::{EditError, PipelineError};
use crate::models::{Field, MerchantField, Mutation, Payload, Tag};
use crate::validator::{Issue, ValidationResult, validate_with};

/// Where an [`Editor`] is in its life
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// TLV tree built, nothing checked yet
    Parsed,
    /// Source passed the structural checks
    Validated,
    /// At least one edit was attempted
    Editing,
    /// Marker and checksum are being regenerated
    Recomputing,
    /// Output produced; terminal
    Finalized,
}

/// A requested mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Name, city or postal code, checked against the configured limits
    Merchant {
        /// Which field
        field: MerchantField,
        /// New text, trimmed before use
        value: String,
    },
    /// Any existing leaf, addressed by tag path (e.g. `62.07`). A single
    /// merchant tag (59, 60, 61) gets the same limits as [`Edit::Merchant`].
    Leaf {
        /// Tag path from the top level down
        path: Vec<Tag>,
        /// New text
        value: String,
    },
}

impl Edit {
    /// Edit tag 59
    pub fn merchant_name(value: impl Into<String>) -> Self {
        Edit::Merchant {
            field: MerchantField::Name,
            value: value.into(),
        }
    }

    /// Edit tag 60
    pub fn merchant_city(value: impl Into<String>) -> Self {
        Edit::Merchant {
            field: MerchantField::City,
            value: value.into(),
        }
    }

    /// Edit tag 61
    pub fn postal_code(value: impl Into<String>) -> Self {
        Edit::Merchant {
            field: MerchantField::PostalCode,
            value: value.into(),
        }
    }

    /// Edit the leaf at `path`
    pub fn leaf(path: &[Tag], value: impl Into<String>) -> Self {
        Edit::Leaf {
            path: path.to_vec(),
            value: value.into(),
        }
    }
}

/// Result of a finalized session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    /// Final wire string
    pub payload: String,
    /// Checksum hex carried in tag 63
    pub checksum: String,
    /// True when at least one edit changed a value
    pub edited: bool,
    /// Tag of the edited marker, if the output carries one
    pub marker: Option<Tag>,
    /// Mutations that changed the payload, in order
    pub applied: Vec<Mutation>,
    /// Edits refused by the limits
    pub rejected: Vec<EditError>,
    /// Non-structural findings on the source payload
    pub source_warnings: Vec<Issue>,
    /// Validation of the produced payload
    pub validation: ValidationResult,
}

/// Editing session over one payload
pub struct Editor {
    payload: Payload,
    config: EditorConfig,
    state: SessionState,
    source_warnings: Vec<Issue>,
    applied: Vec<Mutation>,
    rejected: Vec<EditError>,
}

impl Editor {
    /// Open with the default configuration
    pub fn open(raw: &str) -> Result<Self, PipelineError> {
        Self::open_with(raw, EditorConfig::default())
    }

    /// Parse and validate `raw`.
    ///
    /// Parse errors and structural issues abort; field-length issues are
    /// kept as warnings since an edit may fix them.
    pub fn open_with(raw: &str, config: EditorConfig) -> Result<Self, PipelineError> {
        let payload = Payload::parse_with(raw, &config.codec())?;
        log::debug!("session {:?}", SessionState::Parsed);

        let validation = validate_with(raw, &config);
        let structural: Vec<Issue> = validation.structural().cloned().collect();
        if !structural.is_empty() {
            log::warn!("refusing to edit structurally invalid payload ({} issues)", structural.len());
            return Err(PipelineError::InvalidSource { issues: structural });
        }
        let source_warnings: Vec<Issue> = validation.warnings().cloned().collect();
        for issue in &source_warnings {
            log::warn!("source payload: {}", issue);
        }

        Ok(Self {
            payload,
            config,
            state: SessionState::Validated,
            source_warnings,
            applied: Vec::new(),
            rejected: Vec::new(),
        })
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Payload as edited so far (checksum may be stale)
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Configuration in use
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Non-structural findings on the source
    pub fn source_warnings(&self) -> &[Issue] {
        &self.source_warnings
    }

    /// Edits refused so far
    pub fn rejected(&self) -> &[EditError] {
        &self.rejected
    }

    /// Apply one edit. Rejections are returned and also recorded for the
    /// outcome; they never abort the session.
    pub fn apply(&mut self, edit: Edit) -> Result<Mutation, EditError> {
        self.state = SessionState::Editing;
        let result = match &edit {
            Edit::Merchant { field, value } => {
                self.payload
                    .set_merchant_field(*field, value, &self.config.limits)
            }
            Edit::Leaf { path, value } => {
                self.payload
                    .set_leaf_with(path, value, &self.config.limits)
            }
        };

        match &result {
            Ok(mutation) => {
                log::debug!("edit {:?} -> {:?}", edit, mutation);
                if mutation.is_applied() {
                    self.applied.push(mutation.clone());
                }
            }
            Err(err) => {
                log::warn!("edit rejected: {}", err);
                self.rejected.push(err.clone());
            }
        }
        result
    }

    /// Apply several edits, continuing past rejections
    pub fn apply_all<I>(&mut self, edits: I) -> Vec<Result<Mutation, EditError>>
    where
        I: IntoIterator<Item = Edit>,
    {
        edits.into_iter().map(|edit| self.apply(edit)).collect()
    }

    /// Shorthand for [`Edit::merchant_name`]
    pub fn set_merchant_name(&mut self, value: &str) -> Result<Mutation, EditError> {
        self.apply(Edit::merchant_name(value))
    }

    /// Shorthand for [`Edit::merchant_city`]
    pub fn set_merchant_city(&mut self, value: &str) -> Result<Mutation, EditError> {
        self.apply(Edit::merchant_city(value))
    }

    /// Shorthand for [`Edit::postal_code`]
    pub fn set_postal_code(&mut self, value: &str) -> Result<Mutation, EditError> {
        self.apply(Edit::postal_code(value))
    }

    /// Recompute the checksum and serialize; the session ends here
    pub fn finalize(mut self) -> Result<EditOutcome, PipelineError> {
        self.state = SessionState::Recomputing;
        let edited = !self.applied.is_empty();

        let marker = if edited {
            Some(place_marker(&mut self.payload, &self.config)?)
        } else {
            self.payload.edited_marker(&self.config.marker_text)
        };

        let checksum = crate::codec::crc::format_hex(self.payload.recompute_checksum());
        let payload = self.payload.to_wire();
        self.state = SessionState::Finalized;
        log::debug!("session {:?}, edited={}, checksum {}", self.state, edited, checksum);

        let validation = validate_with(&payload, &self.config);
        Ok(EditOutcome {
            payload,
            checksum,
            edited,
            marker,
            applied: self.applied,
            rejected: self.rejected,
            source_warnings: self.source_warnings,
            validation,
        })
    }
}

/// Ensure the payload carries the edited marker; reuse an existing one
fn place_marker(payload: &mut Payload, config: &EditorConfig) -> Result<Tag, PipelineError> {
    if let Some(existing) = payload.edited_marker(&config.marker_text) {
        return Ok(existing);
    }

    let unreserved = tags::UNRESERVED_FIRST..=tags::UNRESERVED_LAST;
    let descending = (unreserved.start().value()..=unreserved.end().value())
        .rev()
        .filter_map(Tag::new);
    let slot = std::iter::once(config.marker_tag)
        .filter(|tag| unreserved.contains(tag))
        .chain(descending)
        .find(|tag| payload.is_free(*tag))
        .ok_or(PipelineError::NoMarkerSlot)?;

    let field = Field::leaf(slot, config.marker_text.clone()).map_err(PipelineError::Marker)?;
    payload.insert_before_checksum(field);
    log::debug!("placed edited marker at tag {}", slot);
    Ok(slot)
}
