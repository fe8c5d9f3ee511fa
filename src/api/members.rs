use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

use crate::directory::client::DirectoryClient;
use crate::directory::types::{MemberRecord, MemberSearchKey};
use crate::error::{AppError, AppErrorKind, DomainError};
use crate::middleware::error::get_request_id_from_headers;

pub struct MembersState {
    pub directory: Arc<DirectoryClient>,
}

#[derive(Debug, Deserialize)]
pub struct MemberQuery {
    pub query: Option<String>,
    pub search_by: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub success: bool,
    pub message: String,
    pub data: MemberData,
}

#[derive(Debug, Serialize)]
pub struct MemberData {
    pub member_code: String,
    pub tax_id: Option<String>,
    pub company_name: Option<String>,
}

impl From<MemberRecord> for MemberData {
    fn from(record: MemberRecord) -> Self {
        Self {
            member_code: record.member_code,
            tax_id: record.tax_id,
            company_name: record.company_name,
        }
    }
}

async fn lookup(
    state: &MembersState,
    headers: &HeaderMap,
    query: Option<String>,
    search_by: Option<String>,
) -> Result<Json<MemberResponse>, AppError> {
    let request_id = get_request_id_from_headers(headers);
    let attach = |e: AppError| match &request_id {
        Some(id) => e.with_request_id(id.clone()),
        None => e,
    };

    let query = match query.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => return Err(attach(AppError::missing_field("query"))),
    };

    let search_by = match search_by.as_deref() {
        Some(raw) => MemberSearchKey::from_str(raw).map_err(|e| attach(AppError::from(e)))?,
        None => MemberSearchKey::MemberCode,
    };

    let member = state
        .directory
        .find_member(search_by, &query)
        .await
        .map_err(|e| attach(AppError::from(e)))?;

    match member {
        Some(record) => Ok(Json(MemberResponse {
            success: true,
            message: "member found".to_string(),
            data: record.into(),
        })),
        None => Err(attach(AppError::new(AppErrorKind::Domain(
            DomainError::MemberNotFound { query },
        )))),
    }
}

/// GET /api/members?query=...&search_by=member_code|tax_id
pub async fn search_member(
    State(state): State<Arc<MembersState>>,
    headers: HeaderMap,
    Query(params): Query<MemberQuery>,
) -> Result<Json<MemberResponse>, AppError> {
    lookup(&state, &headers, params.query, params.search_by).await
}

/// POST /api/members with the same parameters in the JSON body
pub async fn search_member_post(
    State(state): State<Arc<MembersState>>,
    headers: HeaderMap,
    Json(params): Json<MemberQuery>,
) -> Result<Json<MemberResponse>, AppError> {
    lookup(&state, &headers, params.query, params.search_by).await
}
