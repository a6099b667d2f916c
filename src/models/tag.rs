use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Two-digit QRIS tag (`00`-`99`)
///
/// Tags are positional identifiers; their meaning depends on the parent
/// namespace (a sub-tag `02` inside tag 51 is not the same as top-level `02`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub struct Tag(u8);

impl Tag {
    /// Largest representable tag number
    pub const MAX: u8 = 99;

    /// Create a tag from its numeric value (`None` above 99)
    pub const fn new(value: u8) -> Option<Self> {
        if value <= Self::MAX {
            Some(Tag(value))
        } else {
            None
        }
    }

    /// Build a tag from a compile-time constant; values above 99 are clamped.
    pub(crate) const fn constant(value: u8) -> Self {
        if value <= Self::MAX {
            Tag(value)
        } else {
            Tag(Self::MAX)
        }
    }

    /// Numeric value of the tag
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Parse exactly two ASCII digits
    pub fn from_digits(digits: &[u8]) -> Option<Self> {
        match digits {
            [hi, lo] if hi.is_ascii_digit() && lo.is_ascii_digit() => {
                Some(Tag((hi - b'0') * 10 + (lo - b'0')))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.to_string()
    }
}

/// Error returned when a string is not a two-digit tag
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid tag {0:?}: expected two decimal digits")]
pub struct InvalidTag(pub String);

impl FromStr for Tag {
    type Err = InvalidTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.len() {
            2 => Tag::from_digits(trimmed.as_bytes()),
            1 => trimmed
                .parse::<u8>()
                .ok()
                .and_then(Tag::new),
            _ => None,
        }
        .ok_or_else(|| InvalidTag(s.to_string()))
    }
}

/// Render a tag path as `26.02`
pub fn format_path(path: &[Tag]) -> String {
    path.iter()
        .map(Tag::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_display_is_zero_padded() {
        assert_eq!(Tag::new(0).unwrap().to_string(), "00");
        assert_eq!(Tag::new(7).unwrap().to_string(), "07");
        assert_eq!(Tag::new(63).unwrap().to_string(), "63");
    }

    #[test]
    fn test_tag_from_digits() {
        assert_eq!(Tag::from_digits(b"59"), Tag::new(59));
        assert_eq!(Tag::from_digits(b"5A"), None);
        assert_eq!(Tag::from_digits(b"5"), None);
    }

    #[test]
    fn test_tag_from_str() {
        assert_eq!("62".parse::<Tag>(), Ok(Tag::new(62).unwrap()));
        assert_eq!("7".parse::<Tag>(), Ok(Tag::new(7).unwrap()));
        assert!("100".parse::<Tag>().is_err());
        assert!("ab".parse::<Tag>().is_err());
    }

    #[test]
    fn test_format_path() {
        let path = [Tag::new(26).unwrap(), Tag::new(2).unwrap()];
        assert_eq!(format_path(&path), "26.02");
    }
}
