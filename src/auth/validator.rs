use chrono::{DateTime, Utc};

use super::claims::{Claims, Role};
use super::jwt::decode;

/// True when the token decodes and its `exp` lies strictly after `now`.
///
/// Decode failures are logged and reported as `false`. A token without an
/// `exp` claim is never valid.
pub fn is_valid(token: &str, now: DateTime<Utc>) -> bool {
    match decode(token) {
        Ok(claims) => claims_valid_at(&claims, now),
        Err(err) => {
            tracing::debug!(error.kind = err.kind(), error = %err, "token rejected");
            false
        }
    }
}

/// Expiry check on already decoded claims.
pub fn claims_valid_at(claims: &Claims, now: DateTime<Utc>) -> bool {
    match claims.exp {
        // `timestamp()` floors, so for integral `exp` this is `exp > now`.
        Some(exp) => exp > now.timestamp(),
        None => {
            tracing::debug!("token has no exp claim");
            false
        }
    }
}

/// Role carried by the token, `Unknown` when it cannot be read.
pub fn token_role(token: &str) -> Role {
    decode(token)
        .map(|claims| claims.effective_role())
        .unwrap_or(Role::Unknown)
}
