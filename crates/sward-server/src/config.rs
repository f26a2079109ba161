use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
pub struct ApiConfig {
    /// Bounded wait for a model's recompute lock before the request is
    /// told to retry.
    pub lock_wait: Duration,
    pub max_body_bytes: usize,
    pub enable_audit_log: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            lock_wait: Duration::from_secs(2),
            max_body_bytes: 16 * 1024,
            enable_audit_log: false,
        }
    }
}
