//! Authentication: password hashing, JWT issuance, and the request
//! extractor that enforces caller identity.

mod extractor;
mod service;


pub use extractor::CurrentUser;
pub use service::{AuthConfig, AuthError, AuthService, Claims, validate_password_strength};
