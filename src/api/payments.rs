use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::error::AppError;
use crate::middleware::error::get_request_id_from_headers;
use crate::services::payment_intake::{PaymentIntakeService, PaymentRequestForm};

pub struct PaymentsState {
    pub intake: Arc<PaymentIntakeService>,
}

#[derive(Debug, Serialize)]
pub struct PaymentCreatedResponse {
    pub success: bool,
    pub message: String,
    pub transaction_id: i64,
    pub transaction_reference: String,
    pub customer_id: i64,
}

/// POST /api/payments
///
/// Records the payer and one pending transaction. The gateway is not
/// contacted here; the browser requests a payment token separately.
pub async fn create_payment(
    State(state): State<Arc<PaymentsState>>,
    headers: HeaderMap,
    Json(form): Json<PaymentRequestForm>,
) -> Result<Json<PaymentCreatedResponse>, AppError> {
    let request_id = get_request_id_from_headers(&headers);

    let created = state.intake.create_payment(form).await.map_err(|e| {
        match request_id {
            Some(id) => e.with_request_id(id),
            None => e,
        }
    })?;

    Ok(Json(PaymentCreatedResponse {
        success: true,
        message: "payment request recorded".to_string(),
        transaction_id: created.transaction_id,
        transaction_reference: created.transaction_reference,
        customer_id: created.customer_id,
    }))
}
