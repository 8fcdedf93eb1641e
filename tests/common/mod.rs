use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;

/// Compact token with the given payload. The signature is never checked,
/// so a placeholder is enough.
pub fn create_jwt(payload: serde_json::Value) -> String {
    let header = json!({"alg": "HS256", "typ": "JWT"});

    let header_b64 = URL_SAFE_NO_PAD.encode(header.to_string());
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload.to_string());
    let signature = "test_signature";

    format!("{}.{}.{}", header_b64, payload_b64, signature)
}

#[allow(dead_code)]
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}
