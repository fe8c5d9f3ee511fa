use crate::config::GatewayConfig;
use crate::gateway::envelope;
use crate::gateway::error::{GatewayError, GatewayResult};
use crate::gateway::types::{
    GatewayEnvelope, PaymentTokenParams, TokenRequestClaims, TokenResponseClaims, TokenResult,
    RESP_CODE_SUCCESS,
};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

/// Client for the card gateway's payment-token API.
///
/// One attempt per call; the browser decides whether to resubmit after a
/// failure, so there is no retry policy here.
#[derive(Clone)]
pub struct GatewayClient {
    http: Client,
    config: GatewayConfig,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()
            .map_err(|e| GatewayError::Network {
                message: format!("failed to initialize HTTP client: {e}"),
            })?;

        Ok(Self { http, config })
    }

    fn token_endpoint(&self) -> String {
        format!("{}/payment/4.3/paymentToken", self.config.base_url())
    }

    /// Request a hosted-payment-page token for an invoice.
    ///
    /// Builds the fixed-shape payload, signs it into the JWT envelope,
    /// posts it to the environment-selected endpoint and verifies the
    /// response envelope before trusting any field in it.
    pub async fn request_payment_token(
        &self,
        params: &PaymentTokenParams,
    ) -> GatewayResult<TokenResult> {
        if params.invoice_no.trim().is_empty() {
            return Err(GatewayError::Validation {
                message: "invoice_no is required".to_string(),
                field: Some("invoice_no".to_string()),
            });
        }

        let claims = TokenRequestClaims::build(&self.config, params)?;
        let token = envelope::sign_claims(&claims, &self.config.secret_key)?;
        let request = GatewayEnvelope { payload: token };

        let endpoint = self.token_endpoint();
        debug!(invoice_no = %params.invoice_no, endpoint = %endpoint, "requesting payment token");

        let response = self
            .http
            .post(&endpoint)
            .header("Accept", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::Network {
                message: format!("gateway request failed: {e}"),
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(GatewayError::Network {
                message: format!("gateway returned HTTP {status}: {body}"),
            });
        }

        let raw: GatewayEnvelope =
            serde_json::from_str(&body).map_err(|e| GatewayError::InvalidEnvelope {
                message: format!("gateway response is not an envelope: {e}"),
            })?;

        let decoded: TokenResponseClaims =
            envelope::verify_payload(&raw.payload, &self.config.secret_key)?;

        if decoded.resp_code != RESP_CODE_SUCCESS {
            return Err(GatewayError::Declined {
                resp_code: decoded.resp_code,
                resp_desc: decoded.resp_desc,
            });
        }

        let web_payment_url =
            decoded
                .web_payment_url
                .ok_or_else(|| GatewayError::InvalidEnvelope {
                    message: "success response is missing webPaymentUrl".to_string(),
                })?;

        info!(invoice_no = %params.invoice_no, "payment token issued");

        Ok(TokenResult {
            payment_token: decoded.payment_token.unwrap_or_default(),
            web_payment_url,
            resp_code: RESP_CODE_SUCCESS.to_string(),
            resp_desc: decoded.resp_desc,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayEnvironment;
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    fn client() -> GatewayClient {
        GatewayClient::new(GatewayConfig {
            merchant_id: "JT01".to_string(),
            secret_key: "shared-secret".to_string(),
            currency_code: "THB".to_string(),
            environment: GatewayEnvironment::Sandbox,
            base_url_override: None,
            frontend_return_url: None,
            backend_return_url: None,
            request_timeout: 5,
        })
        .expect("client init should succeed")
    }

    #[test]
    fn token_endpoint_follows_environment() {
        let client = client();
        assert_eq!(
            client.token_endpoint(),
            "https://sandbox-pgw.2c2p.com/payment/4.3/paymentToken"
        );
    }

    #[tokio::test]
    async fn empty_invoice_is_rejected_before_any_network_call() {
        let client = client();
        let result = client
            .request_payment_token(&PaymentTokenParams {
                invoice_no: "  ".to_string(),
                description: "item 1".to_string(),
                amount: BigDecimal::from_str("100.00").unwrap(),
                user_defined: Default::default(),
            })
            .await;

        assert!(matches!(result, Err(GatewayError::Validation { .. })));
    }
}
