pub mod service_auth;

pub use service_auth::require_service_key;
