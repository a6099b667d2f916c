use std::fmt;

use super::field::MAX_VALUE_LEN;
use super::info::MerchantInfo;
use super::tag::format_path;
use super::{Field, FieldValue, Tag};
use crate::codec::crc::{self, CRC_HEADER};
use crate::codec::tags::{self, account, additional};
use crate::codec::tlv::{self, TlvCodec};
use crate::config::FieldLimits;
use crate::error::{EditError, LookupError, ParseError};

/// Merchant fields that can be edited through the semantic view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MerchantField {
    /// Tag 59
    Name,
    /// Tag 60
    City,
    /// Tag 61
    PostalCode,
}

impl MerchantField {
    /// Every editable field, in tag order
    pub const ALL: [MerchantField; 3] = [
        MerchantField::Name,
        MerchantField::City,
        MerchantField::PostalCode,
    ];

    /// Top-level tag holding this field
    pub fn tag(self) -> Tag {
        match self {
            MerchantField::Name => tags::MERCHANT_NAME,
            MerchantField::City => tags::MERCHANT_CITY,
            MerchantField::PostalCode => tags::POSTAL_CODE,
        }
    }

    /// Field governing a top-level tag, if any
    pub fn from_tag(tag: Tag) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.tag() == tag)
    }

    /// Human label used in reports
    pub fn label(self) -> &'static str {
        match self {
            MerchantField::Name => "Merchant Name",
            MerchantField::City => "Merchant City",
            MerchantField::PostalCode => "Postal Code",
        }
    }
}

/// Result of an accepted mutation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// The value changed; `previous` is `None` when the field was inserted
    Applied {
        /// Tag path of the changed leaf
        path: Vec<Tag>,
        /// Text before the change
        previous: Option<String>,
    },
    /// New value equals the current one
    Unchanged,
    /// Empty input, treated as an explicit "keep as is"
    Skipped,
}

impl Mutation {
    /// True if the payload changed
    pub fn is_applied(&self) -> bool {
        matches!(self, Mutation::Applied { .. })
    }
}

/// Parsed QRIS payload: an ordered top-level field sequence.
///
/// Lengths are derived from values, so every edit implicitly fixes the
/// length prefixes of the edited field and all of its ancestors. The
/// checksum field is the only stored derived value; it goes stale on edit
/// (see [`Payload::is_dirty`]) until [`Payload::recompute_checksum`] runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    fields: Vec<Field>,
    dirty: bool,
}

impl Payload {
    /// Parse with the default composite tags; surrounding whitespace is ignored
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        Self::parse_with(raw, &TlvCodec::default())
    }

    /// Parse with an explicit codec (e.g. a custom composite set)
    pub fn parse_with(raw: &str, codec: &TlvCodec) -> Result<Self, ParseError> {
        let fields = codec.parse(raw.trim())?;
        log::debug!("parsed payload with {} top-level fields", fields.len());
        Ok(Self::from_fields(fields))
    }

    /// Wrap an already built field sequence
    pub fn from_fields(fields: Vec<Field>) -> Self {
        Self {
            fields,
            dirty: false,
        }
    }

    /// Top-level fields in wire order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// True when an edit happened after the checksum was last computed
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Serialize to the wire string
    pub fn to_wire(&self) -> String {
        tlv::serialize(&self.fields)
    }

    // -- lookups ---------------------------------------------------------

    /// Field at a tag path such as `[62, 07]`
    pub fn get(&self, path: &[Tag]) -> Option<&Field> {
        self.lookup(path).ok()
    }

    /// Like [`Payload::get`], but says why the path failed
    pub fn lookup(&self, path: &[Tag]) -> Result<&Field, LookupError> {
        let not_found = || LookupError::NotFound {
            path: path.to_vec(),
        };
        let (first, rest) = path.split_first().ok_or_else(not_found)?;
        let mut field = self
            .fields
            .iter()
            .find(|f| f.tag() == *first)
            .ok_or_else(not_found)?;
        for tag in rest {
            let children = field
                .children()
                .ok_or(LookupError::NotComposite { tag: field.tag() })?;
            field = children
                .iter()
                .find(|f| f.tag() == *tag)
                .ok_or_else(not_found)?;
        }
        Ok(field)
    }

    /// Leaf text at a tag path
    pub fn text_at(&self, path: &[Tag]) -> Result<&str, LookupError> {
        let field = self.lookup(path)?;
        field.text().ok_or(LookupError::NotLeaf { tag: field.tag() })
    }

    fn top(&self, tag: Tag) -> Result<&str, LookupError> {
        self.text_at(&[tag])
    }

    fn get_mut(&mut self, path: &[Tag]) -> Option<&mut Field> {
        let (first, rest) = path.split_first()?;
        let mut field = self.fields.iter_mut().find(|f| f.tag() == *first)?;
        for tag in rest {
            field = field.children_mut()?.iter_mut().find(|f| f.tag() == *tag)?;
        }
        Some(field)
    }

    // -- semantic view ---------------------------------------------------

    /// Tag 00
    pub fn payload_format(&self) -> Result<&str, LookupError> {
        self.top(tags::PAYLOAD_FORMAT)
    }

    /// Tag 01
    pub fn point_of_initiation(&self) -> Result<&str, LookupError> {
        self.top(tags::POINT_OF_INITIATION)
    }

    /// Tag 59
    pub fn merchant_name(&self) -> Result<&str, LookupError> {
        self.top(tags::MERCHANT_NAME)
    }

    /// Tag 60
    pub fn merchant_city(&self) -> Result<&str, LookupError> {
        self.top(tags::MERCHANT_CITY)
    }

    /// Tag 61
    pub fn postal_code(&self) -> Result<&str, LookupError> {
        self.top(tags::POSTAL_CODE)
    }

    /// Tag 52
    pub fn merchant_category(&self) -> Result<&str, LookupError> {
        self.top(tags::MERCHANT_CATEGORY)
    }

    /// Tag 53, ISO 4217 numeric
    pub fn currency(&self) -> Result<&str, LookupError> {
        self.top(tags::CURRENCY)
    }

    /// Tag 54, absent for static codes
    pub fn amount(&self) -> Result<&str, LookupError> {
        self.top(tags::AMOUNT)
    }

    /// Tag 58
    pub fn country_code(&self) -> Result<&str, LookupError> {
        self.top(tags::COUNTRY_CODE)
    }

    /// Stored checksum hex (not verified)
    pub fn checksum(&self) -> Result<&str, LookupError> {
        self.top(tags::CRC)
    }

    /// Current value of an editable merchant field
    pub fn merchant_field(&self, field: MerchantField) -> Result<&str, LookupError> {
        self.top(field.tag())
    }

    /// Sub-fields of a merchant account template (26 or 51)
    pub fn account_info(&self, tag: Tag) -> Result<&[Field], LookupError> {
        let field = self.lookup(&[tag])?;
        field.children().ok_or(LookupError::NotComposite { tag })
    }

    /// National Merchant ID: sub-tag 02 of tag 51, else of tag 26
    pub fn nmid(&self) -> Option<&str> {
        [tags::MERCHANT_ACCOUNT_QRIS, tags::MERCHANT_ACCOUNT]
            .into_iter()
            .find_map(|parent| self.text_at(&[parent, account::MERCHANT_ID]).ok())
    }

    /// First 8 characters of sub-tag 01 of tag 26, else of tag 51
    pub fn acquiring_id(&self) -> Option<&str> {
        [tags::MERCHANT_ACCOUNT, tags::MERCHANT_ACCOUNT_QRIS]
            .into_iter()
            .find_map(|parent| self.text_at(&[parent, account::MERCHANT_PAN]).ok())
            .map(|pan| match pan.char_indices().nth(8) {
                Some((idx, _)) => &pan[..idx],
                None => pan,
            })
    }

    /// Terminal label: sub-tag 07 of tag 62
    pub fn terminal_id(&self) -> Option<&str> {
        self.text_at(&[tags::ADDITIONAL_DATA, additional::TERMINAL_LABEL])
            .ok()
    }

    /// Summary of the merchant-facing fields
    pub fn info(&self) -> MerchantInfo {
        let owned = |value: Result<&str, LookupError>| value.ok().map(str::to_string);
        MerchantInfo {
            merchant_name: owned(self.merchant_name()),
            merchant_city: owned(self.merchant_city()),
            nmid: self.nmid().map(str::to_string),
            terminal_id: self.terminal_id().map(str::to_string),
            acquiring_id: self.acquiring_id().map(str::to_string),
            country_code: owned(self.country_code()),
            postal_code: owned(self.postal_code()),
            merchant_category: owned(self.merchant_category()),
            currency: owned(self.currency()),
            checksum: owned(self.checksum()),
        }
    }

    /// Tag of a top-level leaf in 80-99 carrying `marker_text`
    pub fn edited_marker(&self, marker_text: &str) -> Option<Tag> {
        self.fields
            .iter()
            .filter(|f| (tags::UNRESERVED_FIRST..=tags::UNRESERVED_LAST).contains(&f.tag()))
            .find(|f| f.text() == Some(marker_text))
            .map(Field::tag)
    }

    // -- mutators --------------------------------------------------------

    /// Set tag 59 with the default limit
    pub fn set_merchant_name(&mut self, text: &str) -> Result<Mutation, EditError> {
        self.set_merchant_field(MerchantField::Name, text, &FieldLimits::default())
    }

    /// Set tag 60 with the default limit
    pub fn set_merchant_city(&mut self, text: &str) -> Result<Mutation, EditError> {
        self.set_merchant_field(MerchantField::City, text, &FieldLimits::default())
    }

    /// Set tag 61 with the default limit
    pub fn set_postal_code(&mut self, text: &str) -> Result<Mutation, EditError> {
        self.set_merchant_field(MerchantField::PostalCode, text, &FieldLimits::default())
    }

    /// Set a merchant field subject to `limits`.
    ///
    /// Surrounding whitespace is stripped and empty input is a no-op. An
    /// absent field is inserted at its ascending tag position, ahead of the
    /// checksum.
    pub fn set_merchant_field(
        &mut self,
        field: MerchantField,
        text: &str,
        limits: &FieldLimits,
    ) -> Result<Mutation, EditError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Mutation::Skipped);
        }
        let tag = field.tag();
        let max = limits.max_for(field);
        let len = text.chars().count();
        if len > max {
            return Err(EditError::FieldTooLong { tag, len, max });
        }

        if self.fields.iter().any(|f| f.tag() == tag) {
            return self.replace_leaf(&[tag], text);
        }

        let position = self
            .fields
            .iter()
            .position(|f| f.tag() > tag || f.tag() == tags::CRC)
            .unwrap_or(self.fields.len());
        self.fields.insert(position, Field::leaf(tag, text)?);
        self.dirty = true;
        log::debug!("inserted missing tag {} at position {}", tag, position);
        Ok(Mutation::Applied {
            path: vec![tag],
            previous: None,
        })
    }

    /// Replace the text of any existing leaf, nested or not.
    ///
    /// The new value must fit in a two-digit length, and so must every
    /// composite on the way down. Top-level merchant fields go through
    /// [`Payload::set_merchant_field`] with the default limits. On error
    /// nothing is changed.
    pub fn set_leaf(&mut self, path: &[Tag], text: &str) -> Result<Mutation, EditError> {
        self.set_leaf_with(path, text, &FieldLimits::default())
    }

    /// [`Payload::set_leaf`] with explicit merchant field limits
    pub fn set_leaf_with(
        &mut self,
        path: &[Tag],
        text: &str,
        limits: &FieldLimits,
    ) -> Result<Mutation, EditError> {
        let merchant = match path {
            [tag] => MerchantField::from_tag(*tag),
            _ => None,
        };
        if let Some(field) = merchant {
            return self.set_merchant_field(field, text, limits);
        }
        self.replace_leaf(path, text)
    }

    fn replace_leaf(&mut self, path: &[Tag], text: &str) -> Result<Mutation, EditError> {
        if text.is_empty() {
            return Ok(Mutation::Skipped);
        }
        let Some(&tag) = path.last() else {
            return Err(EditError::NotFound { path: Vec::new() });
        };
        if path.len() == 1 && tag == tags::CRC {
            return Err(EditError::Reserved { tag });
        }

        let len = text.chars().count();
        if len > MAX_VALUE_LEN {
            return Err(EditError::FieldTooLong {
                tag,
                len,
                max: MAX_VALUE_LEN,
            });
        }

        let current = self.lookup(path)?;
        let current_text = current.text().ok_or(EditError::NotLeaf { tag })?;
        if current_text == text {
            return Ok(Mutation::Unchanged);
        }
        let growth = len as isize - current_text.chars().count() as isize;

        for depth in 1..path.len() {
            let ancestor = self.lookup(&path[..depth])?;
            let grown = ancestor.length() as isize + growth;
            if grown > MAX_VALUE_LEN as isize {
                return Err(EditError::CompositeOverflow {
                    tag: ancestor.tag(),
                    len: grown as usize,
                });
            }
        }

        let target = self.get_mut(path).ok_or_else(|| EditError::NotFound {
            path: path.to_vec(),
        })?;
        let previous = target.replace_text(text.to_string());
        self.dirty = true;
        log::debug!("set tag {} to {:?}", format_path(path), text);
        Ok(Mutation::Applied {
            path: path.to_vec(),
            previous,
        })
    }

    /// Insert a top-level leaf right before the checksum field
    pub(crate) fn insert_before_checksum(&mut self, field: Field) {
        let position = self
            .fields
            .iter()
            .position(|f| f.tag() == tags::CRC)
            .unwrap_or(self.fields.len());
        self.fields.insert(position, field);
        self.dirty = true;
    }

    /// True if no top-level field uses `tag`
    pub fn is_free(&self, tag: Tag) -> bool {
        self.fields.iter().all(|f| f.tag() != tag)
    }

    // -- checksum --------------------------------------------------------

    /// Wire prefix covered by the checksum: every non-CRC field followed
    /// by `6304`
    pub fn checksum_scope(&self) -> String {
        let body: Vec<Field> = self
            .fields
            .iter()
            .filter(|f| f.tag() != tags::CRC)
            .cloned()
            .collect();
        let mut scope = tlv::serialize(&body);
        scope.push_str(CRC_HEADER);
        scope
    }

    /// Drop any checksum field, recompute it over the new scope and append it
    /// as the last field.
    pub fn recompute_checksum(&mut self) -> u16 {
        self.fields.retain(|f| f.tag() != tags::CRC);
        let mut scope = tlv::serialize(&self.fields);
        scope.push_str(CRC_HEADER);
        let value = crc::checksum(scope.as_bytes());
        self.fields
            .push(Field::from_parts(tags::CRC, FieldValue::Leaf(crc::format_hex(value))));
        self.dirty = false;
        log::debug!("recomputed checksum {}", crc::format_hex(value));
        value
    }

    /// Stored checksum matches the recomputed one and is the last field
    pub fn checksum_is_valid(&self) -> bool {
        match self.fields.last() {
            Some(last) if last.tag() == tags::CRC => last
                .text()
                .is_some_and(|hex| crc::QRIS_CRC.verify_hex(self.checksum_scope().as_bytes(), hex)),
            _ => false,
        }
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wire())
    }
}
