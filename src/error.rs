//! Error taxonomy
//!
//! Parse and pipeline errors are fatal for the payload at hand. Edit errors
//! are local to one mutation attempt. Validation findings are not errors at
//! all; see [`crate::validator::Issue`].

use thiserror::Error;

use crate::models::Tag;
use crate::models::tag::format_path;
use crate::validator::Issue;

/// Input is not a valid TLV stream
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Tag characters at `offset` are not two decimal digits
    #[error("malformed tag at offset {offset}")]
    MalformedTag {
        /// Character offset of the header
        offset: usize,
    },
    /// Length characters at `offset` are not two decimal digits
    #[error("malformed length at offset {offset}")]
    MalformedLength {
        /// Character offset of the length digits
        offset: usize,
    },
    /// Fewer than four characters left for a tag/length header
    #[error("truncated field header at offset {offset}")]
    TruncatedHeader {
        /// Character offset of the partial header
        offset: usize,
    },
    /// Declared length runs past the end of the input
    #[error("truncated value at offset {offset}: declared {declared}, only {available} available")]
    TruncatedValue {
        /// Character offset of the value
        offset: usize,
        /// Length from the header
        declared: usize,
        /// Characters actually left
        available: usize,
    },
    /// Failure inside the value of a composite tag
    #[error("in tag {tag}: {source}")]
    Nested {
        /// Composite being scanned; offsets in `source` are relative to its value
        tag: Tag,
        /// Error inside the value
        #[source]
        source: Box<ParseError>,
    },
}

impl ParseError {
    /// Innermost error, unwrapping composite context
    pub fn root_cause(&self) -> &ParseError {
        match self {
            ParseError::Nested { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Semantic or path lookup failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// Nothing at this path
    #[error("tag {} not found", format_path(.path))]
    NotFound {
        /// Requested path
        path: Vec<Tag>,
    },
    /// The path goes through a leaf
    #[error("tag {tag} is not a composite field")]
    NotComposite {
        /// The leaf in the way
        tag: Tag,
    },
    /// Text was requested from a composite
    #[error("tag {tag} is not a leaf field")]
    NotLeaf {
        /// The composite
        tag: Tag,
    },
}

/// A single mutation was refused; the payload is left unchanged
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// New value exceeds the field limit
    #[error("tag {tag} value too long ({len} characters, max {max})")]
    FieldTooLong {
        /// Edited tag
        tag: Tag,
        /// Proposed length
        len: usize,
        /// Limit for this tag
        max: usize,
    },
    /// Nothing at this path
    #[error("tag {} not found", format_path(.path))]
    NotFound {
        /// Requested path
        path: Vec<Tag>,
    },
    /// Only leaves carry text
    #[error("tag {tag} is not a leaf field")]
    NotLeaf {
        /// Offending tag
        tag: Tag,
    },
    /// Accepting the edit would push a composite past 99 characters
    #[error("composite tag {tag} would grow to {len} characters")]
    CompositeOverflow {
        /// Ancestor that would overflow
        tag: Tag,
        /// Its would-be length
        len: usize,
    },
    /// Tag 63 is owned by the recompute step
    #[error("tag {tag} is managed by the editor and cannot be set directly")]
    Reserved {
        /// The reserved tag
        tag: Tag,
    },
}

impl From<LookupError> for EditError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::NotFound { path } => EditError::NotFound { path },
            LookupError::NotComposite { tag } | LookupError::NotLeaf { tag } => {
                EditError::NotLeaf { tag }
            }
        }
    }
}

/// The whole edit pipeline was aborted; no output is produced
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Source is not valid TLV
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    /// Editing was attempted on a structurally invalid payload
    #[error("invalid source payload: {}", describe(.issues))]
    InvalidSource {
        /// The structural issues found
        issues: Vec<Issue>,
    },
    /// Every unreserved template tag (80-99) is already taken
    #[error("no free tag available for the edited marker")]
    NoMarkerSlot,
    /// Re-appending the marker would exceed the field limits
    #[error("cannot place edited marker: {0}")]
    Marker(#[source] EditError),
}

fn describe(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(Issue::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_cause_unwraps_nesting() {
        let inner = ParseError::TruncatedValue {
            offset: 4,
            declared: 10,
            available: 3,
        };
        let err = ParseError::Nested {
            tag: Tag::new(26).unwrap(),
            source: Box::new(inner.clone()),
        };
        assert_eq!(err.root_cause(), &inner);
        assert!(err.to_string().starts_with("in tag 26: truncated value"));
    }

    #[test]
    fn test_lookup_error_converts_to_edit_error() {
        let path = vec![Tag::new(62).unwrap(), Tag::new(7).unwrap()];
        let err: EditError = LookupError::NotFound { path: path.clone() }.into();
        assert_eq!(err, EditError::NotFound { path });
        assert_eq!(err.to_string(), "tag 62.07 not found");
    }
}
