use crate::config::GatewayConfig;
use crate::database::payment_detail_repository::NewPaymentDetail;
use crate::database::transaction_repository::{PaymentStatus, TransactionRepository};
use crate::gateway::envelope;
use crate::gateway::types::{CallbackClaims, GatewayEnvelope, RESP_CODE_SUCCESS};
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum ReconcilerError {
    #[error("Invalid callback signature")]
    InvalidSignature,
    #[error("Malformed callback payload: {0}")]
    MalformedPayload(String),
    #[error("Merchant identifier mismatch")]
    MerchantMismatch,
    #[error("No transaction matches invoice {invoice_no}")]
    TransactionNotFound { invoice_no: String },
}

/// Applies gateway callbacks to stored transactions.
///
/// The only legal transitions are `pending -> completed` and
/// `pending -> failed`; a redelivered callback finds no pending rows and
/// becomes a no-op while still appending its audit row. Persistence
/// failures after the payload has been authenticated are logged and
/// swallowed so the acknowledgement to the gateway does not depend on
/// internal storage health — the transaction is left pending for a later
/// redelivery.
pub struct CallbackReconciler {
    transactions: TransactionRepository,
    gateway: GatewayConfig,
}

impl CallbackReconciler {
    pub fn new(transactions: TransactionRepository, gateway: GatewayConfig) -> Self {
        Self {
            transactions,
            gateway,
        }
    }

    pub async fn process_callback(
        &self,
        callback: &GatewayEnvelope,
    ) -> Result<(), ReconcilerError> {
        // 1. Authenticate before touching any state
        let claims: CallbackClaims =
            envelope::verify_payload(&callback.payload, &self.gateway.secret_key).map_err(
                |e| match e {
                    crate::gateway::error::GatewayError::InvalidSignature { .. } => {
                        warn!("callback rejected: bad signature");
                        ReconcilerError::InvalidSignature
                    }
                    other => {
                        warn!(error = %other, "callback rejected: undecodable payload");
                        ReconcilerError::MalformedPayload(other.to_string())
                    }
                },
            )?;

        // 2. The envelope must be addressed to this merchant
        if claims.merchant_id != self.gateway.merchant_id {
            warn!(merchant_id = %claims.merchant_id, "callback rejected: unknown merchant");
            return Err(ReconcilerError::MerchantMismatch);
        }

        let new_status = status_for_resp_code(&claims.resp_code);
        let detail = build_payment_detail(&claims, new_status);

        // 3-7. Locate, transition and audit inside one database transaction;
        // storage failures are swallowed per the callback contract.
        match self
            .transactions
            .reconcile_by_invoice(&claims.invoice_no, new_status, &detail)
            .await
        {
            Ok(outcome) if outcome.matched == 0 => {
                error!(
                    invoice_no = %claims.invoice_no,
                    "callback for unknown invoice; nothing reconciled"
                );
                Err(ReconcilerError::TransactionNotFound {
                    invoice_no: claims.invoice_no,
                })
            }
            Ok(outcome) => {
                if outcome.transitioned == 0 {
                    info!(
                        invoice_no = %claims.invoice_no,
                        "callback redelivery for already reconciled invoice; no-op"
                    );
                } else {
                    info!(
                        invoice_no = %claims.invoice_no,
                        status = new_status.as_str(),
                        transitioned = outcome.transitioned,
                        transaction_id = ?outcome.transaction_id,
                        "payment reconciled"
                    );
                }
                Ok(())
            }
            Err(e) => {
                error!(
                    invoice_no = %claims.invoice_no,
                    error = %e,
                    "reconciliation persistence failed; acknowledging gateway anyway"
                );
                Ok(())
            }
        }
    }
}

/// Response code `"0000"` completes the transaction; everything else fails it.
pub fn status_for_resp_code(resp_code: &str) -> PaymentStatus {
    if resp_code == RESP_CODE_SUCCESS {
        PaymentStatus::Completed
    } else {
        PaymentStatus::Failed
    }
}

/// Snapshot the decoded callback into an audit row
pub fn build_payment_detail(claims: &CallbackClaims, status: PaymentStatus) -> NewPaymentDetail {
    NewPaymentDetail {
        payment_method: "credit_card".to_string(),
        payment_reference: claims.tran_ref.clone(),
        payment_date: parse_gateway_timestamp(claims.transaction_date_time.as_deref()),
        amount_paid: BigDecimal::try_from(claims.amount).ok(),
        payment_status: status.as_str().to_string(),
        gateway_response: serde_json::to_value(claims).unwrap_or_default(),
    }
}

/// Gateway timestamps arrive as local `yyyyMMddHHmmss`; anything else is
/// dropped rather than guessed at.
pub fn parse_gateway_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    NaiveDateTime::parse_from_str(raw, "%Y%m%d%H%M%S")
        .ok()
        .map(|naive| naive.and_utc())
}
