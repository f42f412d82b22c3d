pub mod bearer_auth;
pub mod original_uri;

pub use bearer_auth::{authenticate, extract_token, require_auth};
pub use original_uri::{original_path_and_query, OriginalUri};
