pub mod health;
pub mod sessions;

pub use health::{health_check, metrics_endpoint, readiness_check};
pub use sessions::get_session;
