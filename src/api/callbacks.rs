use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::gateway::types::{AcknowledgeResponse, GatewayEnvelope};
use crate::middleware::error::json_error_response;
use crate::services::callback_reconciler::{CallbackReconciler, ReconcilerError};

pub struct CallbacksState {
    pub reconciler: Arc<CallbackReconciler>,
}

/// Callback body; `payload` is the signed JWT envelope
#[derive(Debug, Deserialize)]
pub struct BackendReturnBody {
    pub payload: Option<String>,
}

/// POST /api/payment/backend-return
///
/// Server-to-server notification from the gateway. Unauthenticated or
/// unaddressed envelopes are rejected with 400 and an unknown invoice with
/// 404; once the envelope is accepted the response is always the fixed
/// success acknowledgement, whatever happened to persistence, so the
/// gateway's redelivery does not depend on internal storage health.
pub async fn backend_return(
    State(state): State<Arc<CallbacksState>>,
    Json(body): Json<BackendReturnBody>,
) -> impl IntoResponse {
    info!("received gateway callback");

    let payload = match body.payload {
        Some(payload) if !payload.trim().is_empty() => payload,
        _ => {
            warn!("callback without payload");
            return json_error_response(StatusCode::BAD_REQUEST, "Missing payload", None)
                .into_response();
        }
    };

    let envelope = GatewayEnvelope { payload };

    match state.reconciler.process_callback(&envelope).await {
        Ok(()) => {
            (StatusCode::OK, Json(AcknowledgeResponse::success())).into_response()
        }
        Err(ReconcilerError::InvalidSignature) => {
            json_error_response(StatusCode::BAD_REQUEST, "Invalid payload signature", None)
                .into_response()
        }
        Err(ReconcilerError::MalformedPayload(message)) => {
            json_error_response(StatusCode::BAD_REQUEST, message, None).into_response()
        }
        Err(ReconcilerError::MerchantMismatch) => {
            json_error_response(StatusCode::BAD_REQUEST, "Invalid merchant", None).into_response()
        }
        Err(err @ ReconcilerError::TransactionNotFound { .. }) => {
            json_error_response(StatusCode::NOT_FOUND, err.to_string(), None).into_response()
        }
    }
}
