//! Per-client admission control for the login surface.
//!
//! A sliding window of attempt timestamps is kept per client key. Each
//! check drops entries older than the window, denies once the ceiling is
//! reached, and otherwise records the new attempt. Denied attempts are not
//! recorded; admitted attempts keep their slot even if the request is later
//! cancelled.
//!
//! This is the one piece of shared mutable state in the core. The record
//! map is a `DashMap`, so purge-check-append runs under the entry's shard
//! lock as a single critical section per key while unrelated keys proceed
//! in parallel.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

/// Throttle configuration. The window is 60 seconds in production; it is
/// configurable so tests can exercise aging without waiting a minute.
#[derive(Debug, Clone)]
pub struct AdmissionConfig {
    /// Maximum attempts per key inside the window.
    pub ceiling: u32,
    /// Trailing interval over which attempts are counted.
    pub window: Duration,
    /// Client keys that bypass the throttle entirely (operational callers).
    pub trusted_keys: HashSet<String>,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            // The historical login-guard value; deployments wanting the
            // wider 60/minute ceiling set it in configuration.
            ceiling: 5,
            window: Duration::from_secs(60),
            trusted_keys: HashSet::new(),
        }
    }
}

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    Denied,
}

/// Tracks recent attempt timestamps per client key and rejects attempts
/// beyond the ceiling.
pub struct AdmissionController {
    config: AdmissionConfig,
    attempts: DashMap<String, Vec<Instant>>,
}

impl AdmissionController {
    pub fn new(config: AdmissionConfig) -> Self {
        Self {
            config,
            attempts: DashMap::new(),
        }
    }

    /// Decides one login attempt for `client_key`.
    ///
    /// The entry guard holds the key's shard lock for the whole
    /// purge-check-append sequence, so two simultaneous attempts from the
    /// same origin can never both observe the last free slot.
    pub fn admit(&self, client_key: &str) -> Admission {
        if self.config.trusted_keys.contains(client_key) {
            return Admission::Allowed;
        }

        let now = Instant::now();
        let mut record = self.attempts.entry(client_key.to_string()).or_default();
        record.retain(|at| now.duration_since(*at) < self.config.window);

        if record.len() as u32 >= self.config.ceiling {
            return Admission::Denied;
        }
        record.push(now);
        Admission::Allowed
    }

    /// Drops records whose window has fully drained. Purging already happens
    /// lazily on each check; this only reclaims memory for keys that went
    /// quiet. The binary runs it on an interval.
    pub fn sweep(&self) {
        let now = Instant::now();
        let before = self.attempts.len();
        self.attempts.retain(|_, record| {
            record.retain(|at| now.duration_since(*at) < self.config.window);
            !record.is_empty()
        });
        let removed = before - self.attempts.len();
        if removed > 0 {
            debug!(removed, remaining = self.attempts.len(), "swept idle admission records");
        }
    }

    /// Number of client keys currently holding a record.
    pub fn tracked_keys(&self) -> usize {
        self.attempts.len()
    }
}
