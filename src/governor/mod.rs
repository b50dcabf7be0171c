//! Outbound call governor for the Gemini text API
//!
//! The provider enforces a burst quota (requests per minute) and a volume
//! quota (requests per day). [`RateGovernor`] paces callers so neither is
//! exceeded, and additionally keeps a minimum spacing between consecutive
//! calls so bursts do not cluster at the minute boundary.
//!
//! A breached daily quota fails fast with [`GovernorError::QuotaExceeded`].
//! The per-minute and spacing limits are enforced by suspending the caller.
//!
//! All state is in memory. Restarting the process starts a fresh quota window.

mod call_log;

pub use call_log::CallLog;

use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

pub const MINUTE: Duration = Duration::from_secs(60);
pub const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Added to per-minute waits so the oldest entry has left the window on wake.
const WINDOW_MARGIN: Duration = Duration::from_millis(100);

/// Ceilings for the downstream provider. Defaults match the Gemini free tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimits {
    pub per_minute: usize,
    pub per_day: usize,
    pub min_spacing: Duration,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            per_minute: 15,
            per_day: 1500,
            min_spacing: Duration::from_millis(4000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GovernorError {
    #[error("Daily API request limit of {limit} requests has been reached. Please try again tomorrow.")]
    QuotaExceeded { limit: usize },
}

/// Usage counts at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitStatus {
    pub requests_last_minute: usize,
    pub requests_last_day: usize,
    pub max_per_minute: usize,
    pub max_per_day: usize,
}

#[derive(Debug, Default)]
struct GovernorState {
    log: CallLog,
    last_call: Option<Instant>,
}

/// Permission to issue exactly one outbound call.
///
/// Holding a permit keeps later callers queued. Pass it to
/// [`RateGovernor::record_call`] once the call is issued; dropping it
/// unrecorded releases the queue without touching the call log.
#[must_use = "a permit should be passed to RateGovernor::record_call"]
pub struct Permit<'a> {
    _admission: tokio::sync::MutexGuard<'a, ()>,
}

/// Paces outbound calls against per-minute, per-day and spacing limits.
///
/// Construct one per process and share it behind an `Arc`.
pub struct RateGovernor {
    limits: RateLimits,
    admission: tokio::sync::Mutex<()>,
    state: Mutex<GovernorState>,
}

impl RateGovernor {
    pub fn new(limits: RateLimits) -> Self {
        Self {
            limits,
            admission: tokio::sync::Mutex::new(()),
            state: Mutex::new(GovernorState::default()),
        }
    }

    pub fn limits(&self) -> RateLimits {
        self.limits
    }

    /// Wait until one call may be issued.
    ///
    /// Callers queue on an admission lock, so the decision for one caller is
    /// complete (and its call recorded) before the next is evaluated. The state
    /// lock is released while sleeping and the limits are re-checked on wake.
    ///
    /// Dropping the returned future abandons the wait without side effects.
    pub async fn await_permission(&self) -> Result<Permit<'_>, GovernorError> {
        let admission = self.admission.lock().await;

        while let Some(wait) = self.required_wait(Instant::now())? {
            sleep(wait).await;
        }

        Ok(Permit {
            _admission: admission,
        })
    }

    /// Mark that the permitted call was issued.
    pub fn record_call(&self, permit: Permit<'_>) {
        let now = Instant::now();
        let status = {
            let mut state = self.lock_state();
            state.log.push(now);
            state.last_call = Some(now);
            self.snapshot(&mut state, now)
        };
        drop(permit);

        info!(
            rpm = status.requests_last_minute,
            max_rpm = status.max_per_minute,
            rpd = status.requests_last_day,
            max_rpd = status.max_per_day,
            "API call recorded"
        );
    }

    /// Current usage counts. Does not wait for queued callers.
    pub fn status(&self) -> RateLimitStatus {
        let now = Instant::now();
        let mut state = self.lock_state();
        self.snapshot(&mut state, now)
    }

    /// How long to sleep before the next call may go out, or `None` if it may
    /// go out now.
    fn required_wait(&self, now: Instant) -> Result<Option<Duration>, GovernorError> {
        let mut state = self.lock_state();
        state.log.evict_older_than(now, DAY);

        let requests_today = state.log.count_within(now, DAY);
        if requests_today >= self.limits.per_day {
            warn!(
                max_requests = self.limits.per_day,
                "Daily API request limit reached, rejecting call"
            );
            return Err(GovernorError::QuotaExceeded {
                limit: self.limits.per_day,
            });
        }

        let mut wait = Duration::ZERO;

        if state.log.count_within(now, MINUTE) >= self.limits.per_minute {
            if let Some(oldest) = state.log.oldest_within(now, MINUTE) {
                let age = now.saturating_duration_since(oldest);
                wait = MINUTE.saturating_sub(age) + WINDOW_MARGIN;
                info!(
                    seconds = wait.as_secs_f64(),
                    "Per-minute limit reached, waiting before next request"
                );
            }
        }

        if let Some(last) = state.last_call {
            let since_last = now.saturating_duration_since(last);
            if since_last < self.limits.min_spacing {
                let remaining = self.limits.min_spacing - since_last;
                debug!(
                    milliseconds = remaining.as_millis() as u64,
                    "Enforcing minimum delay between requests"
                );
                wait = wait.max(remaining);
            }
        }

        Ok((!wait.is_zero()).then_some(wait))
    }

    fn snapshot(&self, state: &mut GovernorState, now: Instant) -> RateLimitStatus {
        state.log.evict_older_than(now, DAY);
        RateLimitStatus {
            requests_last_minute: state.log.count_within(now, MINUTE),
            requests_last_day: state.log.count_within(now, DAY),
            max_per_minute: self.limits.per_minute,
            max_per_day: self.limits.per_day,
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, GovernorState> {
        // The state stays consistent across every critical section, so a
        // poisoned lock is still usable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RateGovernor {
    fn default() -> Self {
        Self::new(RateLimits::default())
    }
}
