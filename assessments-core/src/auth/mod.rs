//! Bearer-token authentication for API callers

mod config;
mod context;
mod error;
mod validator;

pub use config::AuthConfig;
pub use context::{AuthContext, CallerIdentity};
pub use error::AuthError;
pub use validator::{CallerClaims, JwtValidator, TokenRequest, issue_token};
