use serde::Serialize;

/// Merchant-facing summary of a payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MerchantInfo {
    /// Tag 59
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_name: Option<String>,
    /// Tag 60
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_city: Option<String>,
    /// National Merchant ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nmid: Option<String>,
    /// Tag 62.07
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminal_id: Option<String>,
    /// Issuer prefix of the merchant PAN
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acquiring_id: Option<String>,
    /// Tag 58
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    /// Tag 61
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    /// Tag 52
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_category: Option<String>,
    /// Tag 53
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Tag 63 as stored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl MerchantInfo {
    /// Labelled rows for the fields that are present, in display order
    pub fn rows(&self) -> Vec<(&'static str, &str)> {
        [
            ("Merchant Name", &self.merchant_name),
            ("Merchant City", &self.merchant_city),
            ("NMID", &self.nmid),
            ("Terminal ID", &self.terminal_id),
            ("Acquiring ID", &self.acquiring_id),
            ("Country Code", &self.country_code),
            ("Postal Code", &self.postal_code),
            ("Merchant Category", &self.merchant_category),
            ("Currency", &self.currency),
            ("Checksum", &self.checksum),
        ]
        .into_iter()
        .filter_map(|(label, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| (label, v))
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_skip_missing_values() {
        let info = MerchantInfo {
            merchant_name: Some("TOKO".to_string()),
            postal_code: Some(String::new()),
            checksum: Some("ABCD".to_string()),
            ..Default::default()
        };
        assert_eq!(info.rows(), vec![("Merchant Name", "TOKO"), ("Checksum", "ABCD")]);
    }

    #[test]
    fn test_json_omits_missing_values() {
        let info = MerchantInfo {
            nmid: Some("ID1020000000001".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&info).unwrap();
        assert_eq!(json, r#"{"nmid":"ID1020000000001"}"#);
    }
}
