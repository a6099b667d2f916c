//! QRIS tag table (EMVCo merchant-presented mode)

use crate::models::Tag;

/// Payload format indicator, always `01`
pub const PAYLOAD_FORMAT: Tag = Tag::constant(0);
/// `11` static, `12` dynamic
pub const POINT_OF_INITIATION: Tag = Tag::constant(1);
/// Merchant account information template
pub const MERCHANT_ACCOUNT: Tag = Tag::constant(26);
/// Merchant account information, QRIS domestic
pub const MERCHANT_ACCOUNT_QRIS: Tag = Tag::constant(51);
/// ISO 18245 merchant category code
pub const MERCHANT_CATEGORY: Tag = Tag::constant(52);
/// ISO 4217 numeric currency
pub const CURRENCY: Tag = Tag::constant(53);
/// Transaction amount
pub const AMOUNT: Tag = Tag::constant(54);
/// Tip or convenience indicator
pub const TIP_INDICATOR: Tag = Tag::constant(55);
/// Fixed convenience fee
pub const CONVENIENCE_FEE_FIXED: Tag = Tag::constant(56);
/// Percentage convenience fee
pub const CONVENIENCE_FEE_PERCENT: Tag = Tag::constant(57);
/// ISO 3166-1 alpha-2 country
pub const COUNTRY_CODE: Tag = Tag::constant(58);
/// Merchant name
pub const MERCHANT_NAME: Tag = Tag::constant(59);
/// Merchant city
pub const MERCHANT_CITY: Tag = Tag::constant(60);
/// Postal code
pub const POSTAL_CODE: Tag = Tag::constant(61);
/// Additional data field template
pub const ADDITIONAL_DATA: Tag = Tag::constant(62);
/// Checksum, always last
pub const CRC: Tag = Tag::constant(63);

/// First tag of the unreserved template range
pub const UNRESERVED_FIRST: Tag = Tag::constant(80);
/// Last tag of the unreserved template range
pub const UNRESERVED_LAST: Tag = Tag::constant(99);

/// Sub-tags inside merchant account templates (26 / 51)
pub mod account {
    use crate::models::Tag;

    /// Reverse-domain acquirer identifier
    pub const GLOBALLY_UNIQUE_ID: Tag = Tag::constant(0);
    /// Merchant PAN
    pub const MERCHANT_PAN: Tag = Tag::constant(1);
    /// Merchant ID (NMID in tag 51)
    pub const MERCHANT_ID: Tag = Tag::constant(2);
    /// Merchant criteria (UMI, UKE, ...)
    pub const MERCHANT_CRITERIA: Tag = Tag::constant(3);
}

/// Sub-tags inside the additional data template (62)
pub mod additional {
    use crate::models::Tag;

    /// Bill number
    pub const BILL_NUMBER: Tag = Tag::constant(1);
    /// Mobile number
    pub const MOBILE_NUMBER: Tag = Tag::constant(2);
    /// Store label
    pub const STORE_LABEL: Tag = Tag::constant(3);
    /// Loyalty number
    pub const LOYALTY_NUMBER: Tag = Tag::constant(4);
    /// Reference label
    pub const REFERENCE_LABEL: Tag = Tag::constant(5);
    /// Customer label
    pub const CUSTOMER_LABEL: Tag = Tag::constant(6);
    /// Terminal label
    pub const TERMINAL_LABEL: Tag = Tag::constant(7);
    /// Purpose of transaction
    pub const PURPOSE: Tag = Tag::constant(8);
}

/// Tags whose values are parsed as nested TLV by default
pub const DEFAULT_COMPOSITE: [Tag; 3] = [MERCHANT_ACCOUNT, MERCHANT_ACCOUNT_QRIS, ADDITIONAL_DATA];

/// Human label of a top-level tag
pub fn name(tag: Tag) -> String {
    let label = match tag.value() {
        0 => "Payload Format Indicator",
        1 => "Point of Initiation Method",
        26 => "Merchant Account Information",
        51 => "Merchant Account Information (QRIS)",
        52 => "Merchant Category Code",
        53 => "Transaction Currency",
        54 => "Transaction Amount",
        55 => "Tip or Convenience Indicator",
        56 => "Value of Convenience Fee Fixed",
        57 => "Value of Convenience Fee Percentage",
        58 => "Country Code",
        59 => "Merchant Name",
        60 => "Merchant City",
        61 => "Postal Code",
        62 => "Additional Data Field Template",
        63 => "CRC (Checksum)",
        _ => return format!("Unknown Tag {tag}"),
    };
    label.to_string()
}

/// Human label of a sub-tag, scoped by its parent
pub fn sub_name(parent: Tag, tag: Tag) -> String {
    let label = match (parent.value(), tag.value()) {
        (26 | 51, 0) => "Globally Unique Identifier",
        (26 | 51, 1) => "Merchant PAN",
        (26 | 51, 2) => "Merchant ID",
        (26 | 51, 3) => "Merchant Criteria",
        (62, 1) => "Bill Number",
        (62, 2) => "Mobile Number",
        (62, 3) => "Store Label",
        (62, 4) => "Loyalty Number",
        (62, 5) => "Reference Label",
        (62, 6) => "Customer Label",
        (62, 7) => "Terminal Label",
        (62, 8) => "Purpose of Transaction",
        _ => return format!("Unknown Sub-tag {tag}"),
    };
    label.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_names() {
        assert_eq!(name(MERCHANT_NAME), "Merchant Name");
        assert_eq!(name(CRC), "CRC (Checksum)");
        assert_eq!(name(Tag::new(88).unwrap()), "Unknown Tag 88");
    }

    #[test]
    fn test_sub_names_depend_on_parent() {
        assert_eq!(sub_name(MERCHANT_ACCOUNT_QRIS, account::MERCHANT_ID), "Merchant ID");
        assert_eq!(sub_name(ADDITIONAL_DATA, Tag::new(2).unwrap()), "Mobile Number");
        assert_eq!(sub_name(ADDITIONAL_DATA, additional::TERMINAL_LABEL), "Terminal Label");
    }
}
