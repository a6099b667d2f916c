use super::Tag;
use crate::error::EditError;

/// Largest value a two-digit length prefix can describe
pub const MAX_VALUE_LEN: usize = 99;

/// Characters taken by a field header (2 tag + 2 length)
pub const HEADER_LEN: usize = 4;

/// Value carried by a [`Field`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Opaque text or digits
    Leaf(String),
    /// Nested TLV sequence scoped to the parent tag
    Composite(Vec<Field>),
}

impl FieldValue {
    /// Character count of the encoded value
    pub fn encoded_len(&self) -> usize {
        match self {
            FieldValue::Leaf(text) => text.chars().count(),
            FieldValue::Composite(children) => children.iter().map(Field::encoded_len).sum(),
        }
    }
}

/// A single tag-length-value unit.
///
/// The length is never stored: it is derived from the value whenever the
/// field is measured or serialized, so the prefix always matches the value.
/// Constructors and mutators refuse values that would not fit in two digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    tag: Tag,
    value: FieldValue,
}

impl Field {
    /// Create a leaf field
    pub fn leaf(tag: Tag, text: impl Into<String>) -> Result<Self, EditError> {
        let text = text.into();
        let len = text.chars().count();
        if len > MAX_VALUE_LEN {
            return Err(EditError::FieldTooLong {
                tag,
                len,
                max: MAX_VALUE_LEN,
            });
        }
        Ok(Self {
            tag,
            value: FieldValue::Leaf(text),
        })
    }

    /// Create a composite field from already-built children
    pub fn composite(tag: Tag, children: Vec<Field>) -> Result<Self, EditError> {
        let value = FieldValue::Composite(children);
        let len = value.encoded_len();
        if len > MAX_VALUE_LEN {
            return Err(EditError::CompositeOverflow { tag, len });
        }
        Ok(Self { tag, value })
    }

    /// Construct without the length check; only the parser uses this, and
    /// its input lengths come from two-digit prefixes.
    pub(crate) fn from_parts(tag: Tag, value: FieldValue) -> Self {
        Self { tag, value }
    }

    /// Two-digit tag
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Leaf text or children
    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    /// Length prefix as it will be serialized
    pub fn length(&self) -> usize {
        self.value.encoded_len()
    }

    /// Total characters including the 4-character header
    pub fn encoded_len(&self) -> usize {
        HEADER_LEN + self.length()
    }

    /// True for nested TLV
    pub fn is_composite(&self) -> bool {
        matches!(self.value, FieldValue::Composite(_))
    }

    /// Leaf text, `None` for composites
    pub fn text(&self) -> Option<&str> {
        match &self.value {
            FieldValue::Leaf(text) => Some(text),
            FieldValue::Composite(_) => None,
        }
    }

    /// Nested fields, `None` for leaves
    pub fn children(&self) -> Option<&[Field]> {
        match &self.value {
            FieldValue::Leaf(_) => None,
            FieldValue::Composite(children) => Some(children),
        }
    }

    /// First direct child carrying `tag`
    pub fn child(&self, tag: Tag) -> Option<&Field> {
        self.children()?.iter().find(|f| f.tag == tag)
    }

    /// Value rendered as it appears on the wire
    pub fn encoded_value(&self) -> String {
        match &self.value {
            FieldValue::Leaf(text) => text.clone(),
            FieldValue::Composite(children) => {
                let mut out = String::with_capacity(self.length());
                for child in children {
                    child.write_to(&mut out);
                }
                out
            }
        }
    }

    /// Append `tag + length + value` to `out`
    pub fn write_to(&self, out: &mut String) {
        out.push_str(&self.tag.to_string());
        out.push_str(&format!("{:02}", self.length()));
        match &self.value {
            FieldValue::Leaf(text) => out.push_str(text),
            FieldValue::Composite(children) => {
                for child in children {
                    child.write_to(out);
                }
            }
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<Field>> {
        match &mut self.value {
            FieldValue::Leaf(_) => None,
            FieldValue::Composite(children) => Some(children),
        }
    }

    /// Replace leaf text; caller has already checked the length budget.
    pub(crate) fn replace_text(&mut self, text: String) -> Option<String> {
        match &mut self.value {
            FieldValue::Leaf(current) => Some(std::mem::replace(current, text)),
            FieldValue::Composite(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(n: u8) -> Tag {
        Tag::new(n).unwrap()
    }

    #[test]
    fn test_leaf_length_is_derived() {
        let field = Field::leaf(tag(59), "TOKO MAJU JAYA").unwrap();
        assert_eq!(field.length(), 14);
        assert_eq!(field.encoded_len(), 18);

        let mut out = String::new();
        field.write_to(&mut out);
        assert_eq!(out, "5914TOKO MAJU JAYA");
    }

    #[test]
    fn test_short_lengths_are_zero_padded() {
        let field = Field::leaf(tag(1), "1").unwrap();
        let mut out = String::new();
        field.write_to(&mut out);
        assert_eq!(out, "01011");
    }

    #[test]
    fn test_composite_length_covers_children() {
        let field = Field::composite(
            tag(62),
            vec![
                Field::leaf(tag(7), "A01").unwrap(),
                Field::leaf(tag(1), "INV9").unwrap(),
            ],
        )
        .unwrap();
        assert_eq!(field.length(), 7 + 8);
        assert_eq!(field.encoded_value(), "0703A010104INV9");
        assert_eq!(field.child(tag(7)).and_then(Field::text), Some("A01"));
    }

    #[test]
    fn test_leaf_over_99_is_rejected() {
        let err = Field::leaf(tag(62), "x".repeat(100)).unwrap_err();
        assert_eq!(
            err,
            EditError::FieldTooLong {
                tag: tag(62),
                len: 100,
                max: MAX_VALUE_LEN
            }
        );
    }

    #[test]
    fn test_composite_over_99_is_rejected() {
        let children = vec![
            Field::leaf(tag(0), "a".repeat(60)).unwrap(),
            Field::leaf(tag(1), "b".repeat(40)).unwrap(),
        ];
        let err = Field::composite(tag(26), children).unwrap_err();
        assert_eq!(err, EditError::CompositeOverflow { tag: tag(26), len: 108 });
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let field = Field::leaf(tag(59), "KOPI Ñ").unwrap();
        assert_eq!(field.length(), 6);
    }
}
