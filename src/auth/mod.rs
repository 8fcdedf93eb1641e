//! Bearer token inspection.
//!
//! Tokens are read, never verified: the payload segment is decoded into
//! [`Claims`] and checked for expiry against a caller-supplied instant.

mod claims;
pub mod jwt;
pub mod validator;

pub use claims::{Claims, Role};
pub use jwt::{decode, extract_bearer_token, DecodeError};
pub use validator::{claims_valid_at, is_valid, token_role};
