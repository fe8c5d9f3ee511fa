use crate::directory::error::DirectoryError;
use serde::Deserialize;
use std::str::FromStr;

/// Which key a member lookup searches by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberSearchKey {
    MemberCode,
    TaxId,
}

impl MemberSearchKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberSearchKey::MemberCode => "member_code",
            MemberSearchKey::TaxId => "tax_id",
        }
    }
}

impl FromStr for MemberSearchKey {
    type Err = DirectoryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "member_code" | "membercode" => Ok(MemberSearchKey::MemberCode),
            "tax_id" | "taxid" => Ok(MemberSearchKey::TaxId),
            _ => Err(DirectoryError::Validation {
                message: format!(
                    "invalid search_by value '{value}'; use member_code or tax_id"
                ),
            }),
        }
    }
}

/// Member row as the legacy directory returns it
#[derive(Debug, Clone, Deserialize)]
pub struct MemberRecord {
    #[serde(rename = "MEMBER_CODE")]
    pub member_code: String,
    #[serde(rename = "TAX_ID")]
    pub tax_id: Option<String>,
    #[serde(rename = "COMPANY_NAME")]
    pub company_name: Option<String>,
}

/// Shipment row as the legacy tracking view returns it
#[derive(Debug, Clone, Deserialize)]
pub struct TrackingRecord {
    #[serde(rename = "IV_TRAN_NO")]
    pub invoice_no: String,
    #[serde(rename = "MEMBER_CODE")]
    pub member_code: Option<String>,
    #[serde(rename = "TAX_ID")]
    pub tax_id: Option<String>,
    #[serde(rename = "Tracking_Number")]
    pub tracking_number: Option<String>,
    #[serde(rename = "Shipping_Date")]
    pub shipping_date: Option<String>,
    #[serde(rename = "Shipping_To")]
    pub shipping_to: Option<String>,
    #[serde(rename = "TRAN_DATE")]
    pub tran_date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_key_parsing_accepts_both_spellings() {
        assert_eq!(
            MemberSearchKey::from_str("member_code").unwrap(),
            MemberSearchKey::MemberCode
        );
        assert_eq!(
            MemberSearchKey::from_str("taxId").unwrap(),
            MemberSearchKey::TaxId
        );
        assert!(MemberSearchKey::from_str("email").is_err());
    }

    #[test]
    fn member_record_decodes_legacy_column_names() {
        let record: MemberRecord = serde_json::from_value(serde_json::json!({
            "MEMBER_CODE": "M-100",
            "TAX_ID": "0105551234567",
            "COMPANY_NAME": "Example Co., Ltd."
        }))
        .unwrap();

        assert_eq!(record.member_code, "M-100");
        assert_eq!(record.company_name.as_deref(), Some("Example Co., Ltd."));
    }
}
