use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Failed logins allowed per window before an address is locked out.
const MAX_FAILURES: usize = 5;
const WINDOW: Duration = Duration::from_secs(15 * 60);

/// Sliding-window counter of failed logins per client address.
#[derive(Clone)]
pub struct LoginLimiter {
    failures: Arc<Mutex<HashMap<IpAddr, Vec<Instant>>>>,
    max_failures: usize,
    window: Duration,
}

impl Default for LoginLimiter {
    fn default() -> Self {
        Self::with_limits(MAX_FAILURES, WINDOW)
    }
}

impl LoginLimiter {
    pub fn with_limits(max_failures: usize, window: Duration) -> Self {
        Self {
            failures: Arc::new(Mutex::new(HashMap::new())),
            max_failures,
            window,
        }
    }

    /// True when the address has used up its failures for the current window.
    /// Expired entries for the address are dropped on the way.
    pub fn is_blocked(&self, ip: IpAddr) -> bool {
        let mut map = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        let Some(stamps) = map.get_mut(&ip) else {
            return false;
        };
        let window = self.window;
        stamps.retain(|t| t.elapsed() < window);
        if stamps.is_empty() {
            map.remove(&ip);
            return false;
        }
        stamps.len() >= self.max_failures
    }

    pub fn record_failure(&self, ip: IpAddr) {
        let mut map = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        map.entry(ip).or_default().push(Instant::now());
    }

    pub fn clear(&self, ip: IpAddr) {
        let mut map = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        map.remove(&ip);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    const IP: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7));
    const OTHER: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 8));

    #[test]
    fn blocks_after_max_failures() {
        let limiter = LoginLimiter::default();
        for _ in 0..MAX_FAILURES - 1 {
            limiter.record_failure(IP);
        }
        assert!(!limiter.is_blocked(IP));
        limiter.record_failure(IP);
        assert!(limiter.is_blocked(IP));
        assert!(!limiter.is_blocked(OTHER));
    }

    #[test]
    fn clear_resets_the_address() {
        let limiter = LoginLimiter::with_limits(1, WINDOW);
        limiter.record_failure(IP);
        assert!(limiter.is_blocked(IP));
        limiter.clear(IP);
        assert!(!limiter.is_blocked(IP));
    }

    #[test]
    fn failures_expire_with_the_window() {
        let limiter = LoginLimiter::with_limits(1, Duration::from_millis(0));
        limiter.record_failure(IP);
        assert!(!limiter.is_blocked(IP));
    }
}
