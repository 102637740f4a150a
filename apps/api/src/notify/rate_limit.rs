use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    /// `check` is the index of the first rule that refused.
    Limited { check: usize },
}

/// One sliding-window rule: at most `max` hits per `window`.
#[derive(Debug, Clone, Copy)]
pub struct RateRule {
    pub window: Duration,
    pub max: usize,
}

/// Keyed request timestamps. Injected into `AppState`; swap for a shared
/// backend when running more than one instance.
pub trait RateLimitStore: Send + Sync {
    /// Checks every `(key, rule)` pair and records `now` under each key only
    /// when all of them allow it.
    fn hit_all(&self, checks: &[(&str, RateRule)], now: DateTime<Utc>) -> RateDecision;

    /// Drops timestamps older than `horizon` and forgets keys left empty.
    /// Returns the number of keys still tracked.
    fn sweep(&self, now: DateTime<Utc>, horizon: Duration) -> usize;
}

#[derive(Default)]
pub struct InMemoryRateLimitStore {
    hits: Mutex<HashMap<String, Vec<DateTime<Utc>>>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RateLimitStore for InMemoryRateLimitStore {
    fn hit_all(&self, checks: &[(&str, RateRule)], now: DateTime<Utc>) -> RateDecision {
        let mut hits = self.hits.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        for (index, (key, rule)) in checks.iter().enumerate() {
            let recent = hits
                .get(*key)
                .map(|times| times.iter().filter(|t| now - **t < rule.window).count())
                .unwrap_or(0);
            if recent >= rule.max {
                return RateDecision::Limited { check: index };
            }
        }

        for (key, rule) in checks {
            let times = hits.entry((*key).to_string()).or_default();
            times.retain(|t| now - *t < rule.window);
            times.push(now);
        }

        RateDecision::Allowed
    }

    fn sweep(&self, now: DateTime<Utc>, horizon: Duration) -> usize {
        let mut hits = self.hits.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        hits.retain(|_, times| {
            times.retain(|t| now - *t < horizon);
            !times.is_empty()
        });
        hits.len()
    }
}
