use crate::config::GatewayConfig;
use crate::gateway::error::{GatewayError, GatewayResult};
use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Response code the gateway uses for success, both in envelopes it sends
/// and in the acknowledgement it expects back.
pub const RESP_CODE_SUCCESS: &str = "0000";

/// Outer wire shape exchanged with the gateway: a single signed JWT string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayEnvelope {
    pub payload: String,
}

/// Caller-facing parameters for a payment-token request
#[derive(Debug, Clone)]
pub struct PaymentTokenParams {
    pub invoice_no: String,
    pub description: String,
    pub amount: BigDecimal,
    pub user_defined: UserDefinedFields,
}

/// Merchant-defined passthrough fields of the token contract
#[derive(Debug, Clone, Default)]
pub struct UserDefinedFields {
    pub user_defined_1: Option<String>,
    pub user_defined_2: Option<String>,
    pub user_defined_3: Option<String>,
    pub user_defined_4: Option<String>,
    pub user_defined_5: Option<String>,
}

/// Fixed-shape claims of the payment-token request (gateway API 4.3).
/// Every field is part of the external contract, including the ones this
/// service always sends empty.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequestClaims {
    #[serde(rename = "merchantID")]
    pub merchant_id: String,
    pub invoice_no: String,
    pub description: String,
    pub amount: f64,
    pub currency_code: String,
    pub payment_channel: Vec<String>,
    #[serde(rename = "request3DS")]
    pub request_3ds: String,
    pub tokenize: bool,
    pub card_tokens: Vec<String>,
    pub card_token_only: bool,
    pub tokenize_only: bool,
    pub interest_type: String,
    pub installment_period_filter: Vec<u32>,
    pub product_code: String,
    pub recurring: bool,
    pub invoice_prefix: String,
    pub recurring_amount: f64,
    pub allow_accumulate: bool,
    pub max_accumulate_amount: f64,
    pub recurring_interval: u32,
    pub recurring_count: u32,
    pub charge_next_date: String,
    pub charge_on_date: String,
    pub payment_expiry: String,
    pub promotion_code: String,
    #[serde(rename = "paymentRouteID")]
    pub payment_route_id: String,
    pub fx_provider_code: String,
    pub immediate_payment: bool,
    pub user_defined_1: String,
    pub user_defined_2: String,
    pub user_defined_3: String,
    pub user_defined_4: String,
    pub user_defined_5: String,
    pub statement_descriptor: String,
    pub sub_merchants: Vec<JsonValue>,
    pub locale: String,
    pub frontend_return_url: String,
    pub backend_return_url: String,
    pub nonce_str: String,
    pub ui_params: JsonValue,
    pub iat: i64,
}

impl TokenRequestClaims {
    /// Assemble the fixed-shape payload for one token request
    pub fn build(config: &GatewayConfig, params: &PaymentTokenParams) -> GatewayResult<Self> {
        let amount = params
            .amount
            .to_f64()
            .ok_or_else(|| GatewayError::Validation {
                message: format!("amount {} is not representable", params.amount),
                field: Some("amount".to_string()),
            })?;

        let user = &params.user_defined;

        Ok(TokenRequestClaims {
            merchant_id: config.merchant_id.clone(),
            invoice_no: params.invoice_no.clone(),
            description: params.description.clone(),
            amount,
            currency_code: config.currency_code.clone(),
            payment_channel: vec!["CC".to_string()],
            request_3ds: String::new(),
            tokenize: false,
            card_tokens: Vec::new(),
            card_token_only: false,
            tokenize_only: false,
            interest_type: String::new(),
            installment_period_filter: Vec::new(),
            product_code: String::new(),
            recurring: false,
            invoice_prefix: String::new(),
            recurring_amount: 0.0,
            allow_accumulate: false,
            max_accumulate_amount: 0.0,
            recurring_interval: 0,
            recurring_count: 0,
            charge_next_date: String::new(),
            charge_on_date: String::new(),
            payment_expiry: String::new(),
            promotion_code: String::new(),
            payment_route_id: String::new(),
            fx_provider_code: String::new(),
            immediate_payment: false,
            user_defined_1: user.user_defined_1.clone().unwrap_or_default(),
            user_defined_2: user.user_defined_2.clone().unwrap_or_default(),
            user_defined_3: user.user_defined_3.clone().unwrap_or_default(),
            user_defined_4: user.user_defined_4.clone().unwrap_or_default(),
            user_defined_5: user.user_defined_5.clone().unwrap_or_default(),
            statement_descriptor: String::new(),
            sub_merchants: Vec::new(),
            locale: "en".to_string(),
            frontend_return_url: config.frontend_return_url.clone().unwrap_or_default(),
            backend_return_url: config.backend_return_url.clone().unwrap_or_default(),
            nonce_str: nonce(),
            ui_params: serde_json::json!({}),
            iat: Utc::now().timestamp(),
        })
    }
}

fn nonce() -> String {
    Uuid::new_v4().simple().to_string()[..13].to_string()
}

/// Claims of the payment-token response envelope. `respCode` is mandatory;
/// the token and hosted-page URL only accompany success.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponseClaims {
    #[serde(default)]
    pub payment_token: Option<String>,
    #[serde(default)]
    pub web_payment_url: Option<String>,
    pub resp_code: String,
    #[serde(default)]
    pub resp_desc: String,
}

/// Decoded result surfaced to callers of the token requester
#[derive(Debug, Clone, Serialize)]
pub struct TokenResult {
    pub payment_token: String,
    pub web_payment_url: String,
    pub resp_code: String,
    pub resp_desc: String,
}

/// Claims of the server-to-server callback envelope. Decoding fails when a
/// required field is missing or mistyped; fields the gateway adds over time
/// are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackClaims {
    #[serde(rename = "merchantID")]
    pub merchant_id: String,
    pub invoice_no: String,
    pub amount: f64,
    pub resp_code: String,
    #[serde(default)]
    pub resp_desc: String,
    #[serde(default)]
    pub account_no: Option<String>,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub tran_ref: Option<String>,
    #[serde(default)]
    pub reference_no: Option<String>,
    #[serde(default)]
    pub approval_code: Option<String>,
    #[serde(default)]
    pub eci: Option<String>,
    /// Gateway-local timestamp, `yyyyMMddHHmmss`
    #[serde(default)]
    pub transaction_date_time: Option<String>,
}

/// Fixed acknowledgement body returned to the gateway
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcknowledgeResponse {
    pub resp_code: String,
    pub resp_desc: String,
}

impl AcknowledgeResponse {
    pub fn success() -> Self {
        Self {
            resp_code: RESP_CODE_SUCCESS.to_string(),
            resp_desc: "Success".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayEnvironment;
    use std::str::FromStr;

    fn config() -> GatewayConfig {
        GatewayConfig {
            merchant_id: "JT01".to_string(),
            secret_key: "shared-secret".to_string(),
            currency_code: "THB".to_string(),
            environment: GatewayEnvironment::Sandbox,
            base_url_override: None,
            frontend_return_url: Some("https://shop.example/return".to_string()),
            backend_return_url: Some("https://shop.example/backend".to_string()),
            request_timeout: 30,
        }
    }

    #[test]
    fn token_request_claims_use_contract_field_names() {
        let claims = TokenRequestClaims::build(
            &config(),
            &PaymentTokenParams {
                invoice_no: "INV-1".to_string(),
                description: "membership fee".to_string(),
                amount: BigDecimal::from_str("100.50").unwrap(),
                user_defined: UserDefinedFields::default(),
            },
        )
        .unwrap();

        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["merchantID"], "JT01");
        assert_eq!(json["invoiceNo"], "INV-1");
        assert_eq!(json["currencyCode"], "THB");
        assert_eq!(json["paymentChannel"], serde_json::json!(["CC"]));
        assert_eq!(json["request3DS"], "");
        assert_eq!(json["paymentRouteID"], "");
        assert_eq!(json["userDefined1"], "");
        assert_eq!(json["backendReturnUrl"], "https://shop.example/backend");
        assert_eq!(json["amount"], 100.5);
        assert!(json["iat"].is_i64());
    }

    #[test]
    fn callback_claims_decode_rejects_missing_resp_code() {
        let payload = serde_json::json!({
            "merchantID": "JT01",
            "invoiceNo": "INV-1",
            "amount": 100.50
        });
        let parsed: Result<CallbackClaims, _> = serde_json::from_value(payload);
        assert!(parsed.is_err());
    }

    #[test]
    fn callback_claims_decode_ignores_additive_fields() {
        let payload = serde_json::json!({
            "merchantID": "JT01",
            "invoiceNo": "INV-1",
            "amount": 100.50,
            "respCode": "0000",
            "respDesc": "Success",
            "tranRef": "T123",
            "someFutureField": true
        });
        let parsed: CallbackClaims = serde_json::from_value(payload).unwrap();
        assert_eq!(parsed.resp_code, "0000");
        assert_eq!(parsed.tran_ref.as_deref(), Some("T123"));
    }

    #[test]
    fn acknowledge_response_is_fixed_success_shape() {
        let json = serde_json::to_value(AcknowledgeResponse::success()).unwrap();
        assert_eq!(json["respCode"], "0000");
        assert_eq!(json["respDesc"], "Success");
    }
}
