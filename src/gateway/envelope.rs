//! Signed envelope codec for the gateway contract: payloads travel as
//! HS256 JWTs signed with the merchant's shared secret.

use crate::gateway::error::{GatewayError, GatewayResult};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Sign a claims payload into the gateway's JWT envelope
pub fn sign_claims<T: Serialize>(claims: &T, secret: &str) -> GatewayResult<String> {
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| GatewayError::InvalidEnvelope {
        message: format!("failed to sign gateway payload: {e}"),
    })
}

/// Verify a gateway JWT and decode its claims, failing closed.
///
/// Signature failures and malformed payloads are distinct errors so that
/// callers can reject tampered envelopes with no state change while
/// reporting unusable-but-authentic responses differently. The gateway's
/// tokens carry `iat` only, so registered-claim checks are disabled.
pub fn verify_payload<T: DeserializeOwned>(token: &str, secret: &str) -> GatewayResult<T> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    jsonwebtoken::decode::<T>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::InvalidSignature => GatewayError::InvalidSignature {
            message: "envelope signature verification failed".to_string(),
        },
        _ => GatewayError::InvalidEnvelope {
            message: format!("failed to decode gateway payload: {e}"),
        },
    })
}
