use axum::{extract::State, http::HeaderMap, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::AppError;
use crate::gateway::client::GatewayClient;
use crate::gateway::types::{PaymentTokenParams, UserDefinedFields};
use crate::middleware::error::get_request_id_from_headers;
use crate::services::payment_intake::normalize_amount;

pub struct TokensState {
    pub gateway: Arc<GatewayClient>,
}

#[derive(Debug, Deserialize)]
pub struct TokenRequestBody {
    pub invoice_no: Option<String>,
    pub amount: Option<String>,
    pub description: Option<String>,
    /// Suffix the invoice with a timestamp so a resubmitted form cannot
    /// collide with an earlier gateway invoice
    pub ensure_unique: Option<bool>,
    pub user_defined_1: Option<String>,
    pub user_defined_2: Option<String>,
    pub user_defined_3: Option<String>,
    pub user_defined_4: Option<String>,
    pub user_defined_5: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponseBody {
    pub success: bool,
    /// Invoice number actually sent to the gateway (may carry the
    /// uniqueness suffix)
    pub invoice_no: String,
    pub payment_token: String,
    pub web_payment_url: String,
    pub resp_code: String,
    pub resp_desc: String,
}

/// POST /api/payment/token
///
/// Requests a hosted-payment-page token from the gateway. One attempt per
/// call; failures surface immediately and the caller decides whether to
/// resubmit.
pub async fn request_token(
    State(state): State<Arc<TokensState>>,
    headers: HeaderMap,
    Json(body): Json<TokenRequestBody>,
) -> Result<Json<TokenResponseBody>, AppError> {
    let request_id = get_request_id_from_headers(&headers);
    let attach = |e: AppError| match &request_id {
        Some(id) => e.with_request_id(id.clone()),
        None => e,
    };

    let invoice_no = match body.invoice_no.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => return Err(attach(AppError::missing_field("invoice_no"))),
    };
    let raw_amount = match body.amount.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => return Err(attach(AppError::missing_field("amount"))),
    };
    let amount = normalize_amount(&raw_amount).map_err(&attach)?;

    let invoice_no = if body.ensure_unique.unwrap_or(false) {
        format!("{}-{}", invoice_no, Utc::now().timestamp_millis())
    } else {
        invoice_no
    };

    let params = PaymentTokenParams {
        invoice_no: invoice_no.clone(),
        description: body
            .description
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| "item 1".to_string()),
        amount,
        user_defined: UserDefinedFields {
            user_defined_1: body.user_defined_1,
            user_defined_2: body.user_defined_2,
            user_defined_3: body.user_defined_3,
            user_defined_4: body.user_defined_4,
            user_defined_5: body.user_defined_5,
        },
    };

    let result = state
        .gateway
        .request_payment_token(&params)
        .await
        .map_err(|e| attach(AppError::from(e)))?;

    Ok(Json(TokenResponseBody {
        success: true,
        invoice_no,
        payment_token: result.payment_token,
        web_payment_url: result.web_payment_url,
        resp_code: result.resp_code,
        resp_desc: result.resp_desc,
    }))
}
