use std::sync::Arc;

use crate::config::Config;
use crate::notify::{Notifier, RateLimitStore};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Sliding-window request history for the public contact endpoints.
    pub rate_limits: Arc<dyn RateLimitStore>,
    /// Outbound transactional messages (demo, hiring, referral).
    pub notifier: Arc<dyn Notifier>,
}
