use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde_json::Value;
use thiserror::Error;

use super::claims::{Claims, RawClaims};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("invalid token payload: {0}")]
    InvalidPayload(String),
}

impl DecodeError {
    /// Short label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            DecodeError::Malformed(_) => "malformed",
            DecodeError::InvalidPayload(_) => "invalid_payload",
        }
    }
}

/// Extract claims from a bearer token without checking its signature.
///
/// Signature, issuer and audience belong to the server. This only reads the
/// payload segment to decide where the client should go.
pub fn decode(token: &str) -> Result<Claims, DecodeError> {
    // JWT format: header.payload.signature
    let parts: Vec<&str> = token.trim().split('.').collect();
    if parts.len() != 3 {
        return Err(DecodeError::Malformed(format!(
            "expected 3 segments (header.payload.signature), found {}",
            parts.len()
        )));
    }

    let payload = parts[1].trim_end_matches('=');
    let decoded = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| DecodeError::Malformed(format!("payload is not base64url: {}", e)))?;

    let value: Value = serde_json::from_slice(&decoded)
        .map_err(|e| DecodeError::InvalidPayload(e.to_string()))?;
    if !value.is_object() {
        return Err(DecodeError::InvalidPayload(
            "payload is not a JSON object".to_string(),
        ));
    }

    let raw: RawClaims = serde_json::from_value(value)
        .map_err(|e| DecodeError::InvalidPayload(e.to_string()))?;

    Ok(Claims::from(raw))
}

/// Extract the token from an `Authorization` header value.
pub fn extract_bearer_token(authorization: &str) -> Option<&str> {
    let mut parts = authorization.split_whitespace();
    let scheme = parts.next()?;
    let token = parts.next()?;
    if parts.next().is_some() || !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token)
}
