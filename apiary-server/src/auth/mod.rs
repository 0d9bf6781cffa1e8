//! Authentication
//!
//! - [`JwtService`] - HS256 token issue / validation
//! - [`CurrentUser`] - caller context, injected by [`require_admin`] or extracted per handler
//! - [`service`] - login, verify, bootstrap admin
//! - [`password`] - argon2 hashing

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod service;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::require_admin;
pub use service::{AuthError, AuthResult};
