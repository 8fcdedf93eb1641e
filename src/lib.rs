pub mod auth;
pub mod configuration;
pub mod routing;
pub mod session;
pub mod telemetry;

pub use auth::{decode, is_valid, token_role, Claims, DecodeError, Role};
pub use routing::{classify, decide, route, Destination, RouteTable, TokenState};
