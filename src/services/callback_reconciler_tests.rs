use crate::database::transaction_repository::PaymentStatus;
use crate::gateway::types::CallbackClaims;
use crate::services::callback_reconciler::{
    build_payment_detail, parse_gateway_timestamp, status_for_resp_code, ReconcilerError,
};
use bigdecimal::BigDecimal;

fn claims(resp_code: &str) -> CallbackClaims {
    serde_json::from_value(serde_json::json!({
        "merchantID": "JT01",
        "invoiceNo": "INV-9-1725000000000",
        "amount": 100.50,
        "respCode": resp_code,
        "respDesc": if resp_code == "0000" { "Success" } else { "Payment failed" },
        "tranRef": "T9999",
        "approvalCode": "A1234",
        "transactionDateTime": "20250901123045"
    }))
    .expect("claims fixture should decode")
}

#[test]
fn success_code_completes_and_any_other_code_fails() {
    assert_eq!(status_for_resp_code("0000"), PaymentStatus::Completed);
    assert_eq!(status_for_resp_code("2001"), PaymentStatus::Failed);
    assert_eq!(status_for_resp_code("9999"), PaymentStatus::Failed);
    assert_eq!(status_for_resp_code(""), PaymentStatus::Failed);
}

#[test]
fn payment_detail_snapshots_the_decoded_callback() {
    let claims = claims("0000");
    let detail = build_payment_detail(&claims, PaymentStatus::Completed);

    assert_eq!(detail.payment_method, "credit_card");
    assert_eq!(detail.payment_reference.as_deref(), Some("T9999"));
    assert_eq!(detail.payment_status, "completed");
    assert_eq!(
        detail.amount_paid,
        Some(BigDecimal::try_from(100.50).unwrap())
    );
    assert_eq!(detail.gateway_response["respCode"], "0000");
    assert_eq!(detail.gateway_response["approvalCode"], "A1234");
}

#[test]
fn failed_callback_detail_carries_failed_status() {
    let claims = claims("4002");
    let detail = build_payment_detail(&claims, status_for_resp_code(&claims.resp_code));
    assert_eq!(detail.payment_status, "failed");
}

#[test]
fn gateway_timestamp_parsing() {
    let parsed = parse_gateway_timestamp(Some("20250901123045")).unwrap();
    assert_eq!(parsed.to_rfc3339(), "2025-09-01T12:30:45+00:00");

    assert!(parse_gateway_timestamp(Some("not-a-date")).is_none());
    assert!(parse_gateway_timestamp(None).is_none());
}

#[test]
fn detail_without_optional_fields_still_builds() {
    let claims: CallbackClaims = serde_json::from_value(serde_json::json!({
        "merchantID": "JT01",
        "invoiceNo": "INV-9",
        "amount": 55.0,
        "respCode": "4002"
    }))
    .unwrap();

    let detail = build_payment_detail(&claims, status_for_resp_code(&claims.resp_code));
    assert_eq!(detail.payment_reference, None);
    assert_eq!(detail.payment_date, None);
    assert_eq!(detail.payment_status, "failed");
}

#[test]
fn reconciler_error_display() {
    assert_eq!(
        ReconcilerError::InvalidSignature.to_string(),
        "Invalid callback signature"
    );
    assert_eq!(
        ReconcilerError::MerchantMismatch.to_string(),
        "Merchant identifier mismatch"
    );
    assert_eq!(
        ReconcilerError::TransactionNotFound {
            invoice_no: "INV-1".to_string()
        }
        .to_string(),
        "No transaction matches invoice INV-1"
    );
}
