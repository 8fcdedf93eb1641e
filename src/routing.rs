//! Role-based redirect.
//!
//! Maps an optional bearer token onto exactly one application area. The
//! caller performs the navigation; nothing here has side effects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::auth::{self, Role};

/// Application area a bearer may enter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    AdminArea,
    InstructorArea,
    DefaultArea,
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdminArea => write!(f, "admin_area"),
            Self::InstructorArea => write!(f, "instructor_area"),
            Self::DefaultArea => write!(f, "default_area"),
        }
    }
}

/// What the router knows about the presented token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "role", rename_all = "snake_case")]
pub enum TokenState {
    NoToken,
    /// Rejected by the validator: expired, missing `exp`, or undecodable.
    Expired,
    ValidWithRole(Role),
    ValidNoRole,
}

impl TokenState {
    pub fn destination(&self) -> Destination {
        match self {
            TokenState::ValidWithRole(Role::Admin) => Destination::AdminArea,
            TokenState::ValidWithRole(Role::Instructor) => Destination::InstructorArea,
            TokenState::ValidWithRole(Role::Guest | Role::Unknown)
            | TokenState::ValidNoRole
            | TokenState::Expired
            | TokenState::NoToken => Destination::DefaultArea,
        }
    }
}

pub fn classify(token: Option<&str>, now: DateTime<Utc>) -> TokenState {
    let Some(token) = token else {
        return TokenState::NoToken;
    };

    let claims = match auth::decode(token) {
        Ok(claims) => claims,
        Err(err) => {
            tracing::debug!(error.kind = err.kind(), error = %err, "token rejected");
            return TokenState::Expired;
        }
    };

    if !auth::claims_valid_at(&claims, now) {
        return TokenState::Expired;
    }

    match claims.role {
        Some(Role::Unknown) | None => TokenState::ValidNoRole,
        Some(role) => TokenState::ValidWithRole(role),
    }
}

/// Classify `token` and pick its destination, logging the decision.
pub fn decide(token: Option<&str>, now: DateTime<Utc>) -> (TokenState, Destination) {
    let state = classify(token, now);
    let destination = state.destination();
    tracing::debug!(?state, %destination, "routing decision");
    (state, destination)
}

/// Decide where the bearer of `token` goes at `now`. Total: every input,
/// including garbage, yields a destination.
pub fn route(token: Option<&str>, now: DateTime<Utc>) -> Destination {
    decide(token, now).1
}

/// Paths the navigation layer uses for each destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    #[serde(default = "RouteTable::default_admin")]
    pub admin: String,
    #[serde(default = "RouteTable::default_instructor")]
    pub instructor: String,
    #[serde(default = "RouteTable::default_fallback")]
    pub default: String,
}

impl RouteTable {
    fn default_admin() -> String {
        "/admin".to_string()
    }

    fn default_instructor() -> String {
        "/instructor".to_string()
    }

    fn default_fallback() -> String {
        "/".to_string()
    }

    pub fn path(&self, destination: Destination) -> &str {
        match destination {
            Destination::AdminArea => &self.admin,
            Destination::InstructorArea => &self.instructor,
            Destination::DefaultArea => &self.default,
        }
    }

    pub fn resolve(&self, token: Option<&str>, now: DateTime<Utc>) -> &str {
        self.path(route(token, now))
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            admin: Self::default_admin(),
            instructor: Self::default_instructor(),
            default: Self::default_fallback(),
        }
    }
}
