use epay_backend::config::{GatewayConfig, GatewayEnvironment};
use epay_backend::database::payment_detail_repository::NewPaymentDetail;
use epay_backend::database::transaction_repository::{PaymentStatus, TransactionRepository};
use epay_backend::gateway::envelope::sign_claims;
use epay_backend::gateway::types::{AcknowledgeResponse, GatewayEnvelope};
use epay_backend::services::callback_reconciler::status_for_resp_code;
use epay_backend::services::payment_intake::{PaymentIntakeService, PaymentRequestForm};
use epay_backend::services::{CallbackReconciler, InquiryService, ReconcilerError};
use serde_json::json;

const SECRET: &str = "integration-secret";

fn gateway_config() -> GatewayConfig {
    GatewayConfig {
        merchant_id: "JT01".to_string(),
        secret_key: SECRET.to_string(),
        currency_code: "THB".to_string(),
        environment: GatewayEnvironment::Sandbox,
        base_url_override: None,
        frontend_return_url: None,
        backend_return_url: None,
        request_timeout: 5,
    }
}

fn signed_callback(merchant_id: &str, invoice_no: &str, resp_code: &str) -> GatewayEnvelope {
    let payload = sign_claims(
        &json!({
            "merchantID": merchant_id,
            "invoiceNo": invoice_no,
            "amount": 100.01,
            "respCode": resp_code,
            "respDesc": if resp_code == "0000" { "Success" } else { "Payment failed" },
            "tranRef": "T-INTEGRATION",
            "transactionDateTime": "20250901123045"
        }),
        SECRET,
    )
    .expect("signing the fixture should succeed");

    GatewayEnvelope { payload }
}

#[test]
fn resp_code_mapping_is_total() {
    assert_eq!(status_for_resp_code("0000"), PaymentStatus::Completed);
    for code in ["0001", "2001", "4002", "9999", ""] {
        assert_eq!(status_for_resp_code(code), PaymentStatus::Failed);
    }
}

#[test]
fn acknowledgement_body_never_varies() {
    let body = serde_json::to_value(AcknowledgeResponse::success()).unwrap();
    assert_eq!(body, json!({"respCode": "0000", "respDesc": "Success"}));
}

async fn test_pool() -> sqlx::PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = epay_backend::database::init_pool(&url, None)
        .await
        .expect("pool init should succeed");
    epay_backend::database::run_migrations(&pool)
        .await
        .expect("migrations should run");
    pool
}

fn unique_invoice(prefix: &str) -> String {
    format!("{}-{}", prefix, chrono::Utc::now().timestamp_millis())
}

async fn create_pending(repo: &TransactionRepository, invoice: &str) {
    let intake = PaymentIntakeService::new(repo.clone());
    intake
        .create_payment(PaymentRequestForm {
            invoice_number: Some(invoice.to_string()),
            total_amount: Some("100.005".to_string()),
            email: Some("payer@example.com".to_string()),
            ..Default::default()
        })
        .await
        .expect("intake should create a pending transaction");
}

#[tokio::test]
#[ignore] // Requires database running
async fn tampered_callback_leaves_state_untouched() {
    let pool = test_pool().await;
    let repo = TransactionRepository::new(pool);
    let invoice = unique_invoice("IT-SIG");
    create_pending(&repo, &invoice).await;

    let reconciler = CallbackReconciler::new(repo.clone(), gateway_config());

    let mut envelope = signed_callback("JT01", &invoice, "0000");
    envelope.payload.push('x');
    let result = reconciler.process_callback(&envelope).await;
    assert!(matches!(
        result,
        Err(ReconcilerError::InvalidSignature) | Err(ReconcilerError::MalformedPayload(_))
    ));

    let stored = repo
        .find_by_invoice(&invoice)
        .await
        .unwrap()
        .expect("transaction should exist");
    assert_eq!(stored.payment_status, "pending");
}

#[tokio::test]
#[ignore] // Requires database running
async fn merchant_mismatch_is_rejected_without_state_change() {
    let pool = test_pool().await;
    let repo = TransactionRepository::new(pool);
    let invoice = unique_invoice("IT-MERCHANT");
    create_pending(&repo, &invoice).await;

    let reconciler = CallbackReconciler::new(repo.clone(), gateway_config());
    let result = reconciler
        .process_callback(&signed_callback("OTHER", &invoice, "0000"))
        .await;
    assert!(matches!(result, Err(ReconcilerError::MerchantMismatch)));

    let stored = repo.find_by_invoice(&invoice).await.unwrap().unwrap();
    assert_eq!(stored.payment_status, "pending");
}

#[tokio::test]
#[ignore] // Requires database running
async fn unknown_invoice_is_not_found() {
    let pool = test_pool().await;
    let repo = TransactionRepository::new(pool);
    let reconciler = CallbackReconciler::new(repo, gateway_config());

    let result = reconciler
        .process_callback(&signed_callback("JT01", &unique_invoice("IT-GHOST"), "0000"))
        .await;
    assert!(matches!(
        result,
        Err(ReconcilerError::TransactionNotFound { .. })
    ));
}

#[tokio::test]
#[ignore] // Requires database running
async fn callback_replay_is_a_state_noop_with_audit_per_delivery() {
    let pool = test_pool().await;
    let repo = TransactionRepository::new(pool.clone());
    let invoice = unique_invoice("IT-REPLAY");
    create_pending(&repo, &invoice).await;

    let reconciler = CallbackReconciler::new(repo.clone(), gateway_config());
    let envelope = signed_callback("JT01", &invoice, "0000");

    reconciler.process_callback(&envelope).await.unwrap();
    // At-least-once delivery: the second identical callback must not error
    reconciler.process_callback(&envelope).await.unwrap();

    let inquiry = InquiryService::new(repo.clone(), "THB".to_string());
    let status = inquiry.status_by_invoice(&invoice).await.unwrap();
    assert_eq!(status.resp_code, "0000");
    assert_eq!(status.payment_status, "completed");

    let stored = repo.find_by_invoice(&invoice).await.unwrap().unwrap();
    let detail_rows: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM payment_details WHERE transaction_id = $1")
            .bind(stored.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(detail_rows, 2);
}

#[tokio::test]
#[ignore] // Requires database running
async fn concurrent_conflicting_callbacks_transition_exactly_once() {
    let pool = test_pool().await;
    let repo = TransactionRepository::new(pool);
    let invoice = unique_invoice("IT-RACE");
    create_pending(&repo, &invoice).await;

    let detail = |status: PaymentStatus| NewPaymentDetail {
        payment_method: "credit_card".to_string(),
        payment_reference: Some("T-RACE".to_string()),
        payment_date: None,
        amount_paid: None,
        payment_status: status.as_str().to_string(),
        gateway_response: json!({"respCode": "race"}),
    };

    let detail_completed = detail(PaymentStatus::Completed);
    let detail_failed = detail(PaymentStatus::Failed);
    let (first, second) = tokio::join!(
        repo.reconcile_by_invoice(
            &invoice,
            PaymentStatus::Completed,
            &detail_completed
        ),
        repo.reconcile_by_invoice(
            &invoice,
            PaymentStatus::Failed,
            &detail_failed
        ),
    );

    let first = first.unwrap();
    let second = second.unwrap();
    // Whichever commits first wins; the loser observes zero affected rows
    assert_eq!(first.transitioned + second.transitioned, 1);

    let stored = repo.find_by_invoice(&invoice).await.unwrap().unwrap();
    assert_ne!(stored.payment_status, "pending");
}
