//! Tag-length-value codec
//!
//! Wire grammar: `TT LL V{LL}` repeated, where `TT` and `LL` are two decimal
//! digits and `LL` counts the characters of `V`. Values of composite tags are
//! themselves scanned with the same grammar, one level deep.

use crate::codec::tags;
use crate::error::ParseError;
use crate::models::field::HEADER_LEN;
use crate::models::{Field, FieldValue, Tag};

/// Closed set of top-level tags whose values are nested TLV
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositeTags(u128);

impl CompositeTags {
    /// No composite tags; every value stays opaque
    pub const fn empty() -> Self {
        CompositeTags(0)
    }

    /// True if `tag` is parsed as nested TLV
    pub fn contains(&self, tag: Tag) -> bool {
        self.0 & (1u128 << tag.value()) != 0
    }

    /// Add `tag` to the set
    pub fn insert(&mut self, tag: Tag) {
        self.0 |= 1u128 << tag.value();
    }

    /// Drop `tag` from the set
    pub fn remove(&mut self, tag: Tag) {
        self.0 &= !(1u128 << tag.value());
    }

    /// Members in ascending order
    pub fn iter(&self) -> impl Iterator<Item = Tag> + '_ {
        (0..=Tag::MAX)
            .filter_map(Tag::new)
            .filter(|tag| self.contains(*tag))
    }
}

impl Default for CompositeTags {
    /// Tags 26, 51 and 62
    fn default() -> Self {
        tags::DEFAULT_COMPOSITE.into_iter().collect()
    }
}

impl FromIterator<Tag> for CompositeTags {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        let mut set = CompositeTags::empty();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

/// TLV parser/serializer configured with a composite tag set
#[derive(Debug, Clone, Default)]
pub struct TlvCodec {
    composite: CompositeTags,
}

impl TlvCodec {
    /// Codec nesting the given top-level tags
    pub fn new(composite: CompositeTags) -> Self {
        Self { composite }
    }

    /// Tags this codec nests
    pub fn composite_tags(&self) -> &CompositeTags {
        &self.composite
    }

    /// Parse a raw string into an ordered field sequence.
    ///
    /// Unknown tags are kept as opaque leaves. No partial result is returned
    /// on failure.
    pub fn parse(&self, input: &str) -> Result<Vec<Field>, ParseError> {
        scan(input, Some(&self.composite))
    }

    /// Serialize fields back to the canonical wire layout
    pub fn serialize(&self, fields: &[Field]) -> String {
        serialize(fields)
    }
}

/// Parse with the default composite set (26, 51, 62)
pub fn parse(input: &str) -> Result<Vec<Field>, ParseError> {
    TlvCodec::default().parse(input)
}

/// Concatenate `tag + length + value` for every field, recursing into
/// composites. Lengths are always recomputed from the values.
pub fn serialize(fields: &[Field]) -> String {
    let mut out = String::with_capacity(fields.iter().map(Field::encoded_len).sum());
    for field in fields {
        field.write_to(&mut out);
    }
    out
}

fn scan(input: &str, composite: Option<&CompositeTags>) -> Result<Vec<Field>, ParseError> {
    let mut fields = Vec::new();
    let mut rest = input;
    let mut offset = 0usize;

    while !rest.is_empty() {
        let (header, after) =
            split_chars(rest, HEADER_LEN).ok_or(ParseError::TruncatedHeader { offset })?;

        let tag = header
            .get(..2)
            .and_then(|t| Tag::from_digits(t.as_bytes()))
            .ok_or(ParseError::MalformedTag { offset })?;
        let declared = header
            .get(2..)
            .and_then(parse_length)
            .ok_or(ParseError::MalformedLength { offset: offset + 2 })?;

        let (value, remainder) =
            split_chars(after, declared).ok_or_else(|| ParseError::TruncatedValue {
                offset: offset + HEADER_LEN,
                declared,
                available: after.chars().count(),
            })?;

        log::trace!("tlv: tag {} len {} at offset {}", tag, declared, offset);

        let value = match composite {
            Some(set) if set.contains(tag) => {
                let children = scan(value, None).map_err(|source| ParseError::Nested {
                    tag,
                    source: Box::new(source),
                })?;
                FieldValue::Composite(children)
            }
            _ => FieldValue::Leaf(value.to_string()),
        };

        fields.push(Field::from_parts(tag, value));
        offset += HEADER_LEN + declared;
        rest = remainder;
    }

    Ok(fields)
}

fn parse_length(digits: &str) -> Option<usize> {
    match digits.as_bytes() {
        [hi, lo] if hi.is_ascii_digit() && lo.is_ascii_digit() => {
            Some(((hi - b'0') * 10 + (lo - b'0')) as usize)
        }
        _ => None,
    }
}

/// Split after `n` characters; `None` if the string is shorter
fn split_chars(s: &str, n: usize) -> Option<(&str, &str)> {
    if s.is_ascii() {
        return (s.len() >= n).then(|| s.split_at(n));
    }
    match s.char_indices().nth(n) {
        Some((idx, _)) => Some(s.split_at(idx)),
        None if s.chars().count() == n => Some((s, "")),
        None => None,
    }
}
