use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Per-email login brute force limiter.
pub struct LoginRateLimiter {
    /// email -> (failed_count, window_start)
    entries: DashMap<String, (u32, Instant)>,
}

impl LoginRateLimiter {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Check if login attempt is allowed. 5 failures per 15 minutes.
    /// Does NOT increment the counter — call `record_failure()` on invalid password.
    pub fn check(&self, email: &str) -> Result<(), u64> {
        let window = Duration::from_secs(15 * 60);
        let now = Instant::now();

        let entry = self.entries.get(&email.to_lowercase());
        let Some(entry) = entry else {
            return Ok(());
        };

        let (count, start) = entry.value();

        if now.duration_since(*start) > window {
            return Ok(());
        }

        if *count >= 5 {
            let elapsed = now.duration_since(*start).as_secs();
            return Err((15 * 60u64).saturating_sub(elapsed));
        }

        Ok(())
    }

    /// Record a failed login attempt. Increments the counter for the given email.
    pub fn record_failure(&self, email: &str) {
        let window = Duration::from_secs(15 * 60);
        let now = Instant::now();

        let mut entry = self.entries.entry(email.to_lowercase()).or_insert((0, now));
        let (count, start) = entry.value_mut();

        if now.duration_since(*start) > window {
            *count = 1;
            *start = now;
        } else {
            *count += 1;
        }
    }

    pub fn cleanup(&self, max_age: Duration) {
        let now = Instant::now();
        self.entries.retain(|_, (_, start)| now.duration_since(*start) < max_age);
    }
}

/// Per-username reset request limiter. Floods are dropped silently so the
/// response stays identical to the normal path.
pub struct ResetRequestLimiter {
    /// username -> (count, window_start)
    entries: DashMap<String, (u32, Instant)>,
}

impl ResetRequestLimiter {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Check and count a reset request. 3 requests per username per hour.
    pub fn check(&self, username: &str) -> Result<(), u64> {
        let window = Duration::from_secs(60 * 60);
        let now = Instant::now();

        let mut entry = self
            .entries
            .entry(username.to_lowercase())
            .or_insert((0, now));
        let (count, start) = entry.value_mut();

        if now.duration_since(*start) > window {
            *count = 1;
            *start = now;
            return Ok(());
        }

        if *count >= 3 {
            let elapsed = now.duration_since(*start).as_secs();
            return Err((60 * 60u64).saturating_sub(elapsed));
        }

        *count += 1;
        Ok(())
    }

    pub fn cleanup(&self, max_age: Duration) {
        let now = Instant::now();
        self.entries.retain(|_, (_, start)| now.duration_since(*start) < max_age);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_limiter_allows_under_threshold() {
        let limiter = LoginRateLimiter::new();
        for _ in 0..4 {
            limiter.record_failure("a@b.com");
        }
        assert!(limiter.check("a@b.com").is_ok());
    }

    #[test]
    fn login_limiter_blocks_after_five_failures() {
        let limiter = LoginRateLimiter::new();
        for _ in 0..5 {
            limiter.record_failure("a@b.com");
        }
        assert!(limiter.check("a@b.com").is_err());
        // Case-insensitive on email
        assert!(limiter.check("A@B.com").is_err());
    }

    #[test]
    fn reset_limiter_blocks_fourth_request() {
        let limiter = ResetRequestLimiter::new();
        for _ in 0..3 {
            assert!(limiter.check("player_one").is_ok());
        }
        assert!(limiter.check("player_one").is_err());
        assert!(limiter.check("player_two").is_ok());
    }
}
