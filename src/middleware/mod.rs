pub mod auth;
pub mod logging;

pub use auth::{generate_token, require_admin, require_auth, verify_token, AuthUser, Claims};
pub use logging::setup_logging;
