use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const MAX_ATTEMPTS: usize = 5;
const WINDOW_SECS: u64 = 900; // 15 minutes

/// Failed-login counter per client IP.
#[derive(Clone)]
pub struct RateLimiter {
    attempts: Arc<Mutex<HashMap<IpAddr, Vec<Instant>>>>,
    max_attempts: usize,
    window: Duration,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(MAX_ATTEMPTS, Duration::from_secs(WINDOW_SECS))
    }
}

impl RateLimiter {
    pub fn new(max_attempts: usize, window: Duration) -> Self {
        Self {
            attempts: Arc::new(Mutex::new(HashMap::new())),
            max_attempts,
            window,
        }
    }

    /// Check if the given IP is rate-limited. Returns true if blocked.
    /// Also lazily cleans up stale entries for the checked IP.
    pub fn is_blocked(&self, ip: IpAddr) -> bool {
        let mut map = self.attempts.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        let window = self.window;

        match map.get_mut(&ip) {
            Some(timestamps) => {
                timestamps.retain(|t| now.duration_since(*t) < window);
                timestamps.len() >= self.max_attempts
            }
            None => false,
        }
    }

    /// Record a failed login attempt for the given IP. Addresses whose
    /// attempts have all expired are dropped at the same time.
    pub fn record_failure(&self, ip: IpAddr) {
        let mut map = self.attempts.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        let window = self.window;
        map.retain(|_, timestamps| {
            timestamps.retain(|t| now.duration_since(*t) < window);
            !timestamps.is_empty()
        });
        map.entry(ip).or_default().push(now);
    }

    #[cfg(test)]
    fn tracked_ips(&self) -> usize {
        self.attempts.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Clear all recorded attempts for the given IP (call on successful login).
    pub fn clear(&self, ip: IpAddr) {
        let mut map = self.attempts.lock().unwrap_or_else(|e| e.into_inner());
        map.remove(&ip);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn blocks_after_max_attempts_and_clears() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        let ip = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        let other = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));

        for _ in 0..2 {
            limiter.record_failure(ip);
        }
        assert!(!limiter.is_blocked(ip));
        limiter.record_failure(ip);
        assert!(limiter.is_blocked(ip));
        assert!(!limiter.is_blocked(other));

        limiter.clear(ip);
        assert!(!limiter.is_blocked(ip));
    }

    #[test]
    fn old_attempts_expire() {
        let limiter = RateLimiter::new(1, Duration::from_millis(0));
        let ip = IpAddr::V4(Ipv4Addr::LOCALHOST);
        limiter.record_failure(ip);
        assert!(!limiter.is_blocked(ip));
    }

    #[test]
    fn expired_addresses_are_forgotten() {
        let limiter = RateLimiter::new(5, Duration::from_millis(0));
        for last in 1..=50u8 {
            limiter.record_failure(IpAddr::V4(Ipv4Addr::new(10, 0, 1, last)));
        }
        assert_eq!(limiter.tracked_ips(), 1);

        let kept = RateLimiter::new(5, Duration::from_secs(60));
        for last in 1..=3u8 {
            kept.record_failure(IpAddr::V4(Ipv4Addr::new(10, 0, 1, last)));
        }
        assert_eq!(kept.tracked_ips(), 3);
    }
}
