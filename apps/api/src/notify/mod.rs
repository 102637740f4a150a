// Public contact endpoints: demo requests, hiring requests, referral notices.
// Request history for rate limiting lives in an injected store, never a global.

pub mod handlers;
pub mod notifier;
pub mod rate_limit;

pub use notifier::{LogNotifier, Notification, Notifier, NotifyError};
pub use rate_limit::{InMemoryRateLimitStore, RateDecision, RateLimitStore, RateRule};
