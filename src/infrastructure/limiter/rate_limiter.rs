use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};
use dashmap::DashMap;
use parking_lot::Mutex;

/// Number of tracked keys above which idle entries are swept.
const EVICTION_THRESHOLD: usize = 10_000;
/// A sweep runs at most once every this many checks.
const EVICTION_INTERVAL: u64 = 1_000;

/// Sliding window: the previous window's count is weighted by how much of it
/// still overlaps the trailing `window_size`.
#[derive(Debug)]
struct SlidingWindow {
    window_size: Duration,
    limit: u64,
    current_window_start: Instant,
    current_count: u64,
    prev_count: u64,
    last_seen: Instant,
}

impl SlidingWindow {
    fn new(window_size: Duration, limit: u64, now: Instant) -> Self {
        Self {
            window_size,
            limit,
            current_window_start: now,
            current_count: 0,
            prev_count: 0,
            last_seen: now,
        }
    }

    fn allow(&mut self, now: Instant) -> RateDecision {
        self.last_seen = now;
        let mut elapsed = now.duration_since(self.current_window_start);

        if elapsed >= self.window_size {
            // A gap of two or more windows leaves nothing to carry over.
            self.prev_count = if elapsed >= self.window_size * 2 { 0 } else { self.current_count };
            self.current_count = 0;
            self.current_window_start = now;
            elapsed = Duration::ZERO;
        }

        let weight = elapsed.as_secs_f64() / self.window_size.as_secs_f64();
        let effective = (self.prev_count as f64) * (1.0 - weight) + (self.current_count as f64);

        if effective < self.limit as f64 {
            self.current_count += 1;
            let remaining = (self.limit as f64 - effective - 1.0).max(0.0).floor() as u64;
            RateDecision { allowed: true, limit: self.limit, remaining, retry_after: None }
        } else {
            let retry_after = self.window_size.saturating_sub(elapsed).as_secs().max(1);
            RateDecision { allowed: false, limit: self.limit, remaining: 0, retry_after: Some(retry_after) }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u64,
    pub remaining: u64,
    /// Seconds until a retry may succeed; set only when rejected.
    pub retry_after: Option<u64>,
}

type Key = String;

/// Per-client limiter store keyed by client IP.
#[derive(Clone)]
pub struct RateLimiterStore {
    map: Arc<DashMap<Key, Arc<Mutex<SlidingWindow>>>>,
    window_size: Duration,
    limit: u64,
    checks: Arc<AtomicU64>,
}

impl RateLimiterStore {
    pub fn new(limit: u64, window_size: Duration) -> Self {
        Self {
            map: Arc::new(DashMap::new()),
            window_size,
            limit,
            checks: Arc::new(AtomicU64::new(0)),
        }
    }

    fn get_window(&self, key: &str, now: Instant) -> Arc<Mutex<SlidingWindow>> {
        if let Some(existing) = self.map.get(key) {
            return existing.clone();
        }
        self.map
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(SlidingWindow::new(self.window_size, self.limit, now))))
            .clone()
    }

    pub fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> RateDecision {
        let checks = self.checks.fetch_add(1, Ordering::Relaxed);
        if checks % EVICTION_INTERVAL == 0 && self.map.len() > EVICTION_THRESHOLD {
            self.evict_idle(now);
        }

        let window = self.get_window(key, now);
        let mut window = window.lock();
        window.allow(now)
    }

    /// Drops keys idle for longer than two windows; their history no longer counts.
    fn evict_idle(&self, now: Instant) {
        let ttl = self.window_size * 2;
        self.map.retain(|_, window| now.duration_since(window.lock().last_seen) <= ttl);
        tracing::debug!(remaining = self.map.len(), "Evicted idle rate-limit entries");
    }

    pub fn tracked_keys(&self) -> usize {
        self.map.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_after_limit_within_window() {
        let store = RateLimiterStore::new(3, Duration::from_secs(60));
        let now = Instant::now();

        for expected_remaining in [2, 1, 0] {
            let decision = store.check_at("10.0.0.1", now);
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
        }

        let rejected = store.check_at("10.0.0.1", now + Duration::from_secs(1));
        assert!(!rejected.allowed);
        assert_eq!(rejected.retry_after, Some(59));
    }

    #[test]
    fn keys_are_independent() {
        let store = RateLimiterStore::new(1, Duration::from_secs(60));
        let now = Instant::now();
        assert!(store.check_at("a", now).allowed);
        assert!(!store.check_at("a", now).allowed);
        assert!(store.check_at("b", now).allowed);
        assert_eq!(store.tracked_keys(), 2);
    }

    #[test]
    fn previous_window_decays() {
        let store = RateLimiterStore::new(2, Duration::from_secs(10));
        let start = Instant::now();
        assert!(store.check_at("ip", start).allowed);
        assert!(store.check_at("ip", start).allowed);

        // New window: the two earlier hits still weigh fully at its start.
        assert!(!store.check_at("ip", start + Duration::from_secs(10)).allowed);
        // Halfway through, their weight has dropped to one.
        assert!(store.check_at("ip", start + Duration::from_secs(15)).allowed);
        // After a long idle gap nothing carries over.
        let later = start + Duration::from_secs(60);
        assert!(store.check_at("ip", later).allowed);
        assert!(store.check_at("ip", later).allowed);
    }

    #[test]
    fn idle_keys_are_evicted() {
        let store = RateLimiterStore::new(5, Duration::from_secs(1));
        let now = Instant::now();
        store.check_at("old", now);
        store.evict_idle(now + Duration::from_secs(5));
        assert_eq!(store.tracked_keys(), 0);
    }
}
