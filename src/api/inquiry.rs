use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::AppError;
use crate::middleware::error::get_request_id_from_headers;
use crate::services::inquiry::{InquiryResponse, InquiryService};

pub struct InquiryState {
    pub inquiry: Arc<InquiryService>,
}

#[derive(Debug, Deserialize)]
pub struct InquiryRequestBody {
    pub invoice_no: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InquiryResponseBody {
    pub success: bool,
    pub data: InquiryResponse,
}

/// POST /api/payment/inquiry
///
/// Latest known status for an invoice, polled by the result page after the
/// browser returns from the hosted payment page.
pub async fn payment_inquiry(
    State(state): State<Arc<InquiryState>>,
    headers: HeaderMap,
    Json(body): Json<InquiryRequestBody>,
) -> Result<Json<InquiryResponseBody>, AppError> {
    let request_id = get_request_id_from_headers(&headers);

    let data = state
        .inquiry
        .status_by_invoice(body.invoice_no.as_deref().unwrap_or_default())
        .await
        .map_err(|e| match request_id {
            Some(id) => e.with_request_id(id),
            None => e,
        })?;

    Ok(Json(InquiryResponseBody {
        success: true,
        data,
    }))
}
