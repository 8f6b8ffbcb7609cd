//! Per-client sliding-window rate limiter.
//!
//! Each identity keeps the timestamps of its admitted requests. A request is
//! admitted while fewer than `limit` timestamps fall inside the trailing
//! `window`; rejected requests are not recorded. The whole
//! prune-check-append sequence runs under a single process-wide lock, so
//! `limit` concurrent callers for the same identity admit exactly `limit`.
//!
//! State is created lazily per identity and only the queried identity is
//! pruned. [`RateLimiter::sweep`] drops idle identities and is only run when a
//! sweep interval is configured.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::utils::client_ip::UNKNOWN_CLIENT;

pub const DEFAULT_LIMIT: usize = 100;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Reject,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        self == Decision::Allow
    }
}

/// Time source for the limiter.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Monotonic system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock for deterministic tests.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(PoisonError::into_inner);
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct RateLimiter<C: Clock = SystemClock> {
    limit: usize,
    window: Duration,
    clock: C,
    requests: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter<SystemClock> {
    /// Creates a limiter admitting `limit` requests per `window` per identity.
    pub fn new(limit: usize, window: Duration) -> Self {
        Self::with_clock(limit, window, SystemClock)
    }
}

impl Default for RateLimiter<SystemClock> {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, DEFAULT_WINDOW)
    }
}

impl<C: Clock> RateLimiter<C> {
    pub fn with_clock(limit: usize, window: Duration, clock: C) -> Self {
        Self {
            limit,
            window,
            clock,
            requests: Mutex::new(HashMap::new()),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Admits or rejects a request for `identity` at the clock's current time.
    pub fn check(&self, identity: &str) -> Decision {
        self.admit(identity, self.clock.now())
    }

    /// Admits or rejects a request for `identity` at `now`.
    ///
    /// Timestamps strictly older than `now - window` are discarded first; a
    /// timestamp exactly on the boundary still counts. An empty identity is
    /// pooled under `"unknown"`.
    pub fn admit(&self, identity: &str, now: Instant) -> Decision {
        let key = if identity.is_empty() {
            UNKNOWN_CLIENT
        } else {
            identity
        };

        let mut requests = self.requests.lock().unwrap_or_else(PoisonError::into_inner);

        let timestamps = requests.entry(key.to_string()).or_default();

        prune(timestamps, now, self.window);

        if timestamps.len() >= self.limit {
            return Decision::Reject;
        }

        timestamps.push_back(now);
        Decision::Allow
    }

    /// Drops every identity with no timestamps left inside the window.
    ///
    /// Returns the number of identities removed.
    pub fn sweep(&self, now: Instant) -> usize {
        let mut requests = self.requests.lock().unwrap_or_else(PoisonError::into_inner);
        let before = requests.len();

        requests.retain(|_, timestamps| {
            prune(timestamps, now, self.window);
            !timestamps.is_empty()
        });

        before - requests.len()
    }

    /// Sweeps at the clock's current time.
    pub fn sweep_now(&self) -> usize {
        self.sweep(self.clock.now())
    }

    /// Number of identities currently tracked.
    pub fn tracked_identities(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

fn prune(timestamps: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    // Early in the process lifetime `now - window` may not be representable;
    // nothing can be older than that.
    let Some(window_start) = now.checked_sub(window) else {
        return;
    };

    while timestamps.front().is_some_and(|&t| t < window_start) {
        timestamps.pop_front();
    }
}
