use crate::database::transaction_repository::TransactionRepository;
use crate::error::{AppError, AppErrorKind, AppResult, DomainError};
use serde::Serialize;

/// Gateway-style status payload synthesized from stored state
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryResponse {
    pub invoice_no: String,
    pub transaction_reference: String,
    pub amount: String,
    pub currency_code: String,
    pub tran_ref: String,
    pub reference_no: String,
    pub approval_code: String,
    pub transaction_date_time: String,
    pub resp_code: String,
    pub resp_desc: String,
    pub payment_status: String,
}

/// Read-only status lookups for the result page. Exact invoice match: the
/// caller holds the invoice number the transaction was stored under.
#[derive(Clone)]
pub struct InquiryService {
    transactions: TransactionRepository,
    currency_code: String,
}

impl InquiryService {
    pub fn new(transactions: TransactionRepository, currency_code: String) -> Self {
        Self {
            transactions,
            currency_code,
        }
    }

    pub async fn status_by_invoice(&self, invoice_no: &str) -> AppResult<InquiryResponse> {
        let invoice_no = invoice_no.trim();
        if invoice_no.is_empty() {
            return Err(AppError::missing_field("invoice_no"));
        }

        let row = self
            .transactions
            .latest_with_detail(invoice_no)
            .await?
            .ok_or_else(|| {
                AppError::new(AppErrorKind::Domain(DomainError::TransactionNotFound {
                    invoice_no: invoice_no.to_string(),
                }))
            })?;

        let (resp_code, resp_desc) = synthesize_resp(&row.payment_status);

        let snapshot = row.gateway_response.unwrap_or_default();
        let snapshot_str = |key: &str| -> String {
            snapshot
                .get(key)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };

        let amount = row
            .amount_paid
            .unwrap_or_else(|| row.total_amount.clone())
            .to_string();

        let tran_ref = match row.payment_reference {
            Some(reference) => reference,
            None => snapshot_str("tranRef"),
        };

        let transaction_date_time = row
            .payment_date
            .map(|d| d.to_rfc3339())
            .unwrap_or_else(|| row.updated_at.to_rfc3339());

        Ok(InquiryResponse {
            invoice_no: row.invoice_number,
            transaction_reference: row.transaction_reference,
            amount,
            currency_code: self.currency_code.clone(),
            tran_ref,
            reference_no: snapshot_str("referenceNo"),
            approval_code: snapshot_str("approvalCode"),
            transaction_date_time,
            resp_code: resp_code.to_string(),
            resp_desc: resp_desc.to_string(),
            payment_status: row.payment_status,
        })
    }
}

/// Map internal payment status to the gateway-style response code pair
pub fn synthesize_resp(payment_status: &str) -> (&'static str, &'static str) {
    match payment_status {
        "completed" => ("0000", "Success"),
        "pending" => ("2001", "Transaction in progress"),
        _ => ("2003", "Payment Failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_synthesis_matches_gateway_codes() {
        assert_eq!(synthesize_resp("completed"), ("0000", "Success"));
        assert_eq!(synthesize_resp("pending"), ("2001", "Transaction in progress"));
        assert_eq!(synthesize_resp("failed"), ("2003", "Payment Failed"));
        assert_eq!(synthesize_resp("anything-else"), ("2003", "Payment Failed"));
    }
}
