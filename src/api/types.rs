//! Shared types for the HTTP API layer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::auth::SessionStore;
use crate::core_state::CoreState;

// ═══════════════════════════════════════════════════════════
// API context — shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
/// Wraps `CoreState` plus API-specific caches.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
    pub sessions: Arc<Mutex<SessionStore>>,
    pub rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self {
            core,
            sessions: Arc::new(Mutex::new(SessionStore::new())),
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new())),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// User context — injected by auth middleware
// ═══════════════════════════════════════════════════════════

/// Authenticated user, injected into request extensions by the auth
/// middleware after successful token validation.
#[derive(Debug, Clone)]
pub struct UserContext {
    pub username: String,
    /// The raw bearer token, kept so logout can revoke it.
    pub token: String,
}

// ═══════════════════════════════════════════════════════════
// Rate limiter — per-client sliding window
// ═══════════════════════════════════════════════════════════

/// Per-client rate limiter with per-minute and per-hour limits.
/// The front-desk UI polls the waiting board, so the limits are generous.
pub struct RateLimiter {
    windows: HashMap<String, Vec<Instant>>,
    per_minute: u32,
    per_hour: u32,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            windows: HashMap::new(),
            per_minute: 300,
            per_hour: 5000,
        }
    }

    /// Check whether a client is within limits. Returns `Ok(())` or
    /// `Err(retry_after_secs)` if exceeded.
    pub fn check(&mut self, key: &str) -> Result<(), u64> {
        let now = Instant::now();
        let entries = self.windows.entry(key.to_string()).or_default();

        entries.retain(|ts| now.duration_since(*ts) < Duration::from_secs(3600));

        let last_minute = entries
            .iter()
            .filter(|ts| now.duration_since(**ts) < Duration::from_secs(60))
            .count() as u32;
        if last_minute >= self.per_minute {
            return Err(60);
        }

        if entries.len() as u32 >= self.per_hour {
            return Err(3600);
        }

        entries.push(now);
        Ok(())
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limiter_allows_within_limits() {
        let mut limiter = RateLimiter::new();
        for _ in 0..100 {
            limiter.check("client-a").unwrap();
        }
    }

    #[test]
    fn rate_limiter_blocks_per_minute_burst() {
        let mut limiter = RateLimiter::new();
        limiter.per_minute = 5;
        for _ in 0..5 {
            limiter.check("client-a").unwrap();
        }
        assert_eq!(limiter.check("client-a"), Err(60));
        // Other clients are unaffected
        limiter.check("client-b").unwrap();
    }

    #[test]
    fn rate_limiter_hour_window() {
        let mut limiter = RateLimiter::new();
        limiter.per_minute = 1000;
        limiter.per_hour = 10;
        for _ in 0..10 {
            limiter.check("client-a").unwrap();
        }
        assert_eq!(limiter.check("client-a"), Err(3600));
    }
}
