use crate::config::DirectoryConfig;
use crate::directory::error::{DirectoryError, DirectoryResult};
use crate::directory::types::{MemberRecord, MemberSearchKey, TrackingRecord};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP client for the membership directory. Pass-through queries only:
/// no retry, no caching, a single bounded-timeout attempt per call.
#[derive(Clone)]
pub struct DirectoryClient {
    http: Client,
    config: DirectoryConfig,
}

impl DirectoryClient {
    pub fn new(config: DirectoryConfig) -> DirectoryResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()
            .map_err(|e| DirectoryError::Network {
                message: format!("failed to initialize HTTP client: {e}"),
            })?;

        Ok(Self { http, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn map_request_error(&self, e: reqwest::Error) -> DirectoryError {
        if e.is_timeout() {
            DirectoryError::Timeout {
                seconds: self.config.request_timeout,
            }
        } else {
            DirectoryError::Network {
                message: format!("directory request failed: {e}"),
            }
        }
    }

    /// Look up one member by member code or tax id. Returns `None` when the
    /// directory has no matching member.
    pub async fn find_member(
        &self,
        search_by: MemberSearchKey,
        query: &str,
    ) -> DirectoryResult<Option<MemberRecord>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DirectoryError::Validation {
                message: "query is required".to_string(),
            });
        }

        debug!(search_by = search_by.as_str(), query = %query, "member lookup");

        let response = self
            .http
            .get(self.endpoint("/members"))
            .query(&[("query", query), ("searchBy", search_by.as_str())])
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "member lookup failed upstream");
            return Err(DirectoryError::Network {
                message: format!("directory returned HTTP {status}"),
            });
        }

        response
            .json::<MemberRecord>()
            .await
            .map(Some)
            .map_err(|e| DirectoryError::InvalidResponse {
                message: format!("unparseable member record: {e}"),
            })
    }

    /// Fetch shipment rows for an invoice number + tax id pair. Both keys
    /// are mandatory upstream; the result may be empty.
    pub async fn find_tracking(
        &self,
        invoice_no: &str,
        tax_id: &str,
    ) -> DirectoryResult<Vec<TrackingRecord>> {
        let invoice_no = invoice_no.trim();
        let tax_id = tax_id.trim();
        if invoice_no.is_empty() || tax_id.is_empty() {
            return Err(DirectoryError::Validation {
                message: "invoice_no and tax_id are both required".to_string(),
            });
        }

        debug!(invoice_no = %invoice_no, "tracking lookup");

        let response = self
            .http
            .get(self.endpoint("/tracking"))
            .query(&[("invoiceNo", invoice_no), ("taxId", tax_id)])
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "tracking lookup failed upstream");
            return Err(DirectoryError::Network {
                message: format!("directory returned HTTP {status}"),
            });
        }

        response
            .json::<Vec<TrackingRecord>>()
            .await
            .map_err(|e| DirectoryError::InvalidResponse {
                message: format!("unparseable tracking rows: {e}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> DirectoryClient {
        DirectoryClient::new(DirectoryConfig {
            base_url: "http://directory.local/".to_string(),
            request_timeout: 5,
        })
        .expect("client init should succeed")
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let client = client();
        assert_eq!(client.endpoint("/members"), "http://directory.local/members");
    }

    #[tokio::test]
    async fn blank_member_query_is_rejected() {
        let client = client();
        let result = client.find_member(MemberSearchKey::MemberCode, "  ").await;
        assert!(matches!(result, Err(DirectoryError::Validation { .. })));
    }

    #[tokio::test]
    async fn tracking_requires_both_keys() {
        let client = client();
        let result = client.find_tracking("INV-1", "").await;
        assert!(matches!(result, Err(DirectoryError::Validation { .. })));
    }
}
