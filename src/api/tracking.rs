use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::directory::client::DirectoryClient;
use crate::directory::types::TrackingRecord;
use crate::error::AppError;
use crate::middleware::error::get_request_id_from_headers;

pub struct TrackingState {
    pub directory: Arc<DirectoryClient>,
}

#[derive(Debug, Deserialize)]
pub struct TrackingQuery {
    pub invoice_no: Option<String>,
    pub tax_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TrackingRow {
    pub invoice_no: String,
    pub member_code: Option<String>,
    pub tax_id: Option<String>,
    pub tracking_number: Option<String>,
    pub shipping_date: Option<String>,
    pub shipping_to: Option<String>,
    pub tran_date: Option<String>,
}

impl From<TrackingRecord> for TrackingRow {
    fn from(record: TrackingRecord) -> Self {
        Self {
            invoice_no: record.invoice_no,
            member_code: record.member_code,
            tax_id: record.tax_id,
            tracking_number: record.tracking_number,
            shipping_date: record.shipping_date,
            shipping_to: record.shipping_to,
            tran_date: record.tran_date,
        }
    }
}

/// GET /api/tracking?invoice_no=...&tax_id=...
///
/// Both keys are required; the upstream tracking view is keyed on the pair.
pub async fn search_tracking(
    State(state): State<Arc<TrackingState>>,
    headers: HeaderMap,
    Query(params): Query<TrackingQuery>,
) -> Result<Json<Vec<TrackingRow>>, AppError> {
    let request_id = get_request_id_from_headers(&headers);
    let attach = |e: AppError| match &request_id {
        Some(id) => e.with_request_id(id.clone()),
        None => e,
    };

    let invoice_no = match params.invoice_no.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => return Err(attach(AppError::missing_field("invoice_no"))),
    };
    let tax_id = match params.tax_id.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => return Err(attach(AppError::missing_field("tax_id"))),
    };

    let rows = state
        .directory
        .find_tracking(&invoice_no, &tax_id)
        .await
        .map_err(|e| attach(AppError::from(e)))?;

    Ok(Json(rows.into_iter().map(TrackingRow::from).collect()))
}
