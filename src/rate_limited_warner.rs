//! Rate limiting for handler failure warnings.
//!
//! A handler that fails on every record (a closed pipe, say) would otherwise
//! produce one warning per log call.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// How often to emit warnings about failing handlers.
pub const WARN_RATE_LIMIT_SECS: u64 = 5;

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Helper that rate limits handler failure warnings.
///
/// The caller increments the failure counter via [`record_failure`]. The
/// next call to [`warn_if_due`] emits a warning using the provided callback
/// if the configured interval has elapsed. [`flush`] emits a warning
/// immediately if any failures occurred since the last emission.
///
/// [`record_failure`]: RateLimitedWarner::record_failure
/// [`warn_if_due`]: RateLimitedWarner::warn_if_due
/// [`flush`]: RateLimitedWarner::flush
pub struct RateLimitedWarner {
    last_warn: AtomicU64,
    failures: AtomicU64,
}

impl Default for RateLimitedWarner {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimitedWarner {
    /// Create a new [`RateLimitedWarner`]. The first warning can be emitted
    /// immediately.
    pub fn new() -> Self {
        Self {
            last_warn: AtomicU64::new(now_secs().saturating_sub(WARN_RATE_LIMIT_SECS)),
            failures: AtomicU64::new(0),
        }
    }

    /// Increment the failure counter.
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Emit a warning if the rate limit interval has elapsed.
    pub fn warn_if_due(&self, mut warn: impl FnMut(u64)) {
        let now = now_secs();
        let prev = self.last_warn.load(Ordering::Relaxed);
        if now.saturating_sub(prev) < WARN_RATE_LIMIT_SECS {
            return;
        }
        // Claim the slot before warning: the warning itself may be logged
        // through a failing handler and re-enter here.
        if self
            .last_warn
            .compare_exchange(prev, now, Ordering::Relaxed, Ordering::Relaxed)
            .is_err()
        {
            return;
        }
        let count = self.failures.swap(0, Ordering::Relaxed);
        if count > 0 {
            warn(count);
        }
    }

    /// Immediately warn about any pending failures.
    pub fn flush(&self, mut warn: impl FnMut(u64)) {
        let count = self.failures.swap(0, Ordering::Relaxed);
        if count > 0 {
            self.last_warn.store(now_secs(), Ordering::Relaxed);
            warn(count);
        }
    }
}
