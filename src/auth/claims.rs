use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Authorization level carried in the `role` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Instructor,
    Guest,
    /// Missing or unrecognized role. Routed exactly like `Guest`.
    Unknown,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Instructor => "instructor",
            Role::Guest => "guest",
            Role::Unknown => "unknown",
        }
    }

    /// Map a raw claim string onto a role. Never fails; anything that is not
    /// exactly a known role name becomes `Unknown`.
    pub fn from_claim(raw: &str) -> Self {
        match raw {
            "admin" => Role::Admin,
            "instructor" => Role::Instructor,
            "guest" => Role::Guest,
            _ => Role::Unknown,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims read from a token payload.
///
/// Only the fields that drive routing are kept; everything else in the
/// payload is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Claims {
    pub role: Option<Role>,
    /// Expiry as Unix seconds.
    pub exp: Option<i64>,
}

impl Claims {
    /// Role used for routing: an absent claim counts as `Unknown`.
    pub fn effective_role(&self) -> Role {
        self.role.unwrap_or(Role::Unknown)
    }
}

/// Untyped view of the payload. Field presence is checked here, field types
/// are checked in `Claims::from`.
#[derive(Debug, Deserialize)]
pub(crate) struct RawClaims {
    #[serde(default)]
    role: Option<Value>,
    #[serde(default)]
    exp: Option<Value>,
}

impl From<RawClaims> for Claims {
    fn from(raw: RawClaims) -> Self {
        let role = match raw.role {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(Role::from_claim(&s)),
            Some(_) => Some(Role::Unknown),
        };

        Claims {
            role,
            exp: raw.exp.as_ref().and_then(numeric_date),
        }
    }
}

/// Interpret a JSON value as NumericDate seconds. Fractional values are
/// floored so a token is never trusted past its stated expiry.
fn numeric_date(value: &Value) -> Option<i64> {
    if let Some(secs) = value.as_i64() {
        return Some(secs);
    }
    let secs = value.as_f64()?;
    if !secs.is_finite() || secs < i64::MIN as f64 || secs >= i64::MAX as f64 {
        return None;
    }
    Some(secs.floor() as i64)
}
