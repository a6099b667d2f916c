//! Integration tests for QRIS payload handling
//!
//! These run the public API end to end on a realistic merchant payload:
//! parse, validate, edit and re-validate. They protect the wire format and
//! the checksum recomputation against regressions.

use rust_qris::codec::crc::{self, checksum_hex};
use rust_qris::codec::tags;
use rust_qris::{
    Edit, EditError, EditorConfig, Field, Issue, MerchantField, Payload, PipelineError, Tag,
    edit, edit_with, validate,
};

const SAMPLE: &str = "00020101021126680016ID.CO.TELKOM.WWW01189360000800000000010215ID10200000000010303UMI51440014ID.CO.QRIS.WWW0215ID10200000000010303UMI5204581253033605802ID5914TOKO MAJU JAYA6007BANDUNG61054011162070703A016304E35E";

fn tag(value: u8) -> Tag {
    Tag::new(value).unwrap()
}

fn assert_lengths_consistent(fields: &[Field]) {
    for field in fields {
        assert_eq!(
            field.length(),
            field.encoded_value().chars().count(),
            "tag {}",
            field.tag()
        );
        if let Some(children) = field.children() {
            assert_lengths_consistent(children);
        }
    }
}

#[test]
fn test_crc_check_value() {
    assert_eq!(crc::checksum(b"123456789"), 0x29B1);
    assert_eq!(checksum_hex(b"0002015909SomeMerch6304"), "2764");
}

#[test]
fn test_round_trip_is_byte_identical() {
    let payload = Payload::parse(SAMPLE).unwrap();
    assert_eq!(payload.to_wire(), SAMPLE);
    assert_lengths_consistent(payload.fields());
}

#[test]
fn test_round_trip_with_surrounding_whitespace() {
    let padded = format!("  {}\n", SAMPLE);
    assert_eq!(Payload::parse(&padded).unwrap().to_wire(), SAMPLE);
    assert!(validate(&padded).ok);
}

#[test]
fn test_checksum_recompute_is_idempotent() {
    let mut payload = Payload::parse(SAMPLE).unwrap();
    assert_eq!(payload.recompute_checksum(), 0xE35E);
    assert_eq!(payload.to_wire(), SAMPLE);
    assert_eq!(payload.recompute_checksum(), 0xE35E);
    assert_eq!(payload.to_wire(), SAMPLE);
}

#[test]
fn test_merchant_info() {
    let payload = Payload::parse(SAMPLE).unwrap();
    let info = payload.info();
    assert_eq!(info.merchant_name.as_deref(), Some("TOKO MAJU JAYA"));
    assert_eq!(info.merchant_city.as_deref(), Some("BANDUNG"));
    assert_eq!(info.nmid.as_deref(), Some("ID1020000000001"));
    assert_eq!(info.terminal_id.as_deref(), Some("A01"));
    assert_eq!(info.postal_code.as_deref(), Some("40111"));
    assert_eq!(info.checksum.as_deref(), Some("E35E"));
}

#[test]
fn test_nested_accounts_are_parsed() {
    let payload = Payload::parse(SAMPLE).unwrap();
    let account = payload.get(&[tags::MERCHANT_ACCOUNT]).unwrap();
    assert!(account.is_composite());
    assert_eq!(account.children().unwrap().len(), 4);
    assert_eq!(
        payload.text_at(&[tags::MERCHANT_ACCOUNT, tag(0)]),
        Ok("ID.CO.TELKOM.WWW")
    );
    // Non-composite tags keep their raw text even if it looks like TLV
    assert!(!payload.get(&[tags::MERCHANT_NAME]).unwrap().is_composite());
}

#[test]
fn test_overlong_name_leaves_payload_untouched() {
    let mut payload = Payload::parse(SAMPLE).unwrap();
    let err = payload
        .set_merchant_field(
            MerchantField::Name,
            &"X".repeat(26),
            &EditorConfig::default().limits,
        )
        .unwrap_err();
    assert_eq!(
        err,
        EditError::FieldTooLong {
            tag: tags::MERCHANT_NAME,
            len: 26,
            max: 25
        }
    );
    assert_eq!(payload.to_wire(), SAMPLE);
    assert!(!payload.is_dirty());
}

#[test]
fn test_city_edit_end_to_end() {
    let outcome = edit(SAMPLE, [Edit::merchant_city("Jakarta")]).unwrap();
    assert!(outcome.edited);
    assert!(outcome.payload.contains("6007Jakarta"));
    assert!(!outcome.payload.contains("BANDUNG"));
    assert_eq!(outcome.checksum, "E047");
    assert!(outcome.payload.ends_with("6304E047"));
    assert!(validate(&outcome.payload).ok);

    let reparsed = Payload::parse(&outcome.payload).unwrap();
    assert_eq!(reparsed.merchant_city(), Ok("Jakarta"));
    assert_eq!(reparsed.edited_marker("EDITED"), Some(tag(99)));
    assert_lengths_consistent(reparsed.fields());
}

#[test]
fn test_name_edit_changes_length_prefix() {
    let outcome = edit(SAMPLE, [Edit::merchant_name("WARUNG BARU")]).unwrap();
    assert!(outcome.payload.contains("5911WARUNG BARU"));
    assert!(validate(&outcome.payload).ok);
}

#[test]
fn test_terminal_label_edit_keeps_nesting_intact() {
    let outcome = edit(
        SAMPLE,
        [Edit::leaf(
            &[tags::ADDITIONAL_DATA, tags::additional::TERMINAL_LABEL],
            "KASIR02",
        )],
    )
    .unwrap();
    assert!(outcome.payload.contains("62110707KASIR02"));
    assert_eq!(outcome.checksum, "B7C9");

    let reparsed = Payload::parse(&outcome.payload).unwrap();
    assert_eq!(reparsed.terminal_id(), Some("KASIR02"));
    // Untouched composites are preserved exactly
    let before = Payload::parse(SAMPLE).unwrap();
    assert_eq!(
        reparsed.get(&[tags::MERCHANT_ACCOUNT]),
        before.get(&[tags::MERCHANT_ACCOUNT])
    );
    assert_eq!(
        reparsed.get(&[tags::MERCHANT_ACCOUNT_QRIS]),
        before.get(&[tags::MERCHANT_ACCOUNT_QRIS])
    );
}

#[test]
fn test_short_payload_is_rejected() {
    let result = validate(&SAMPLE[..40]);
    assert!(!result.ok);
    assert!(
        result
            .diagnostics
            .contains(&Issue::TooShort { len: 40, min: 50 })
    );
}

#[test]
fn test_altered_checksum_digit_is_rejected() {
    let altered = format!("{}F", &SAMPLE[..SAMPLE.len() - 1]);
    let result = validate(&altered);
    assert!(!result.ok);
    assert!(matches!(
        result.diagnostics.as_slice(),
        [Issue::ChecksumMismatch { .. }]
    ));
    assert!(matches!(
        edit(&altered, [Edit::merchant_city("Jakarta")]),
        Err(PipelineError::InvalidSource { .. })
    ));
}

#[test]
fn test_checksum_located_inside_value_text() {
    // Name contains "6304" but the real checksum field is still the trailing one
    let body = "0002010102115802ID5910A6304ABCDE6007BANDUNG6304";
    let raw = format!("{}{}", body, checksum_hex(body.as_bytes()));
    assert!(validate(&raw).ok);
    assert_eq!(
        Payload::parse(&raw).unwrap().merchant_name(),
        Ok("A6304ABCDE")
    );
}

#[test]
fn test_custom_config_marker() {
    let config = EditorConfig::from_lookup(|key| match key {
        "QRIS_MARKER_TAG" => Some("85".to_string()),
        "QRIS_MARKER_TEXT" => Some("MODIFIED".to_string()),
        _ => None,
    });
    let outcome = edit_with(SAMPLE, [Edit::postal_code("10110")], config).unwrap();
    assert_eq!(outcome.marker, Some(tag(85)));
    assert!(outcome.payload.contains("610510110"));
    assert!(outcome.payload.contains("A018508MODIFIED6304"));
    assert!(validate(&outcome.payload).ok);
}

#[test]
fn test_merchant_account_sub_field_edit_grows_parent() {
    let path = [tags::MERCHANT_ACCOUNT, tags::account::MERCHANT_CRITERIA];
    let outcome = edit(SAMPLE, [Edit::leaf(&path, "UMKM")]).unwrap();
    assert!(outcome.payload.contains("26690016ID.CO.TELKOM.WWW"));
    assert!(outcome.payload.contains("0304UMKM51440014"));
    assert!(validate(&outcome.payload).ok);

    let reparsed = Payload::parse(&outcome.payload).unwrap();
    assert_eq!(reparsed.get(&[tags::MERCHANT_ACCOUNT]).unwrap().length(), 69);
    assert_eq!(reparsed.text_at(&path), Ok("UMKM"));
}

#[test]
fn test_payload_without_checksum_field_is_rejected() {
    // The name value ends in "6304" plus a CRC over everything before it
    let prefix = "0002010102115204581253033605802ID6007BANDUNG5910AB6304";
    let raw = format!("{}{}", prefix, checksum_hex(prefix.as_bytes()));
    assert_eq!(Payload::parse(&raw).unwrap().checksum().ok(), None);

    let result = validate(&raw);
    assert!(!result.ok);
    assert!(result.diagnostics.contains(&Issue::MissingChecksum));
    assert!(matches!(
        edit(&raw, [Edit::merchant_city("Jakarta")]),
        Err(PipelineError::InvalidSource { .. })
    ));
}

#[test]
fn test_leaf_edit_on_merchant_fields_respects_limits() {
    let outcome = edit(
        SAMPLE,
        [
            Edit::leaf(&[tags::MERCHANT_NAME], "N".repeat(30)),
            Edit::leaf(&[tags::MERCHANT_CITY], "KOTA BANDUNG BARAT"),
            Edit::leaf(&[tags::POSTAL_CODE], "10110"),
        ],
    )
    .unwrap();
    assert_eq!(
        outcome.rejected,
        vec![
            EditError::FieldTooLong {
                tag: tags::MERCHANT_NAME,
                len: 30,
                max: 25
            },
            EditError::FieldTooLong {
                tag: tags::MERCHANT_CITY,
                len: 18,
                max: 15
            },
        ]
    );
    assert!(outcome.edited);
    assert!(outcome.payload.contains("5914TOKO MAJU JAYA6007BANDUNG610510110"));
    assert!(outcome.validation.ok, "{:?}", outcome.validation.diagnostics);
}
