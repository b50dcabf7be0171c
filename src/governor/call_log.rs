// Time-ordered log of recorded outbound calls

use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

/// Append-only record of call instants, oldest first.
///
/// An entry belongs to a window of length `w` when its age is strictly
/// less than `w`.
#[derive(Debug, Default)]
pub struct CallLog {
    entries: VecDeque<Instant>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a call instant. Instants must not go backwards.
    pub fn push(&mut self, at: Instant) {
        debug_assert!(
            self.entries.back().map_or(true, |last| *last <= at),
            "call log entries must be non-decreasing"
        );
        self.entries.push_back(at);
    }

    /// Drop every entry whose age at `now` is `horizon` or more.
    pub fn evict_older_than(&mut self, now: Instant, horizon: Duration) {
        while let Some(oldest) = self.entries.front() {
            if now.saturating_duration_since(*oldest) < horizon {
                break;
            }
            self.entries.pop_front();
        }
    }

    /// Number of entries younger than `window`.
    pub fn count_within(&self, now: Instant, window: Duration) -> usize {
        self.entries
            .iter()
            .rev()
            .take_while(|at| now.saturating_duration_since(**at) < window)
            .count()
    }

    /// The oldest entry younger than `window`.
    pub fn oldest_within(&self, now: Instant, window: Duration) -> Option<Instant> {
        self.entries
            .iter()
            .find(|at| now.saturating_duration_since(**at) < window)
            .copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instant> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_at(base: Instant, offsets_ms: &[u64]) -> CallLog {
        let mut log = CallLog::new();
        for ms in offsets_ms {
            log.push(base + Duration::from_millis(*ms));
        }
        log
    }

    #[test]
    fn test_window_counts_exclude_boundary() {
        let base = Instant::now();
        let log = log_at(base, &[0, 30_000, 59_999]);
        let now = base + Duration::from_secs(60);

        // The entry at exactly 60s of age is outside a one-minute window
        assert_eq!(log.count_within(now, Duration::from_secs(60)), 2);
        assert_eq!(
            log.oldest_within(now, Duration::from_secs(60)),
            Some(base + Duration::from_secs(30))
        );
    }

    #[test]
    fn test_evict_keeps_young_entries() {
        let base = Instant::now();
        let mut log = log_at(base, &[0, 1_000, 5_000]);
        let now = base + Duration::from_millis(6_000);

        log.evict_older_than(now, Duration::from_millis(5_000));

        assert_eq!(log.len(), 1);
        assert_eq!(log.iter().next(), Some(&(base + Duration::from_millis(5_000))));
    }

    #[test]
    fn test_empty_log() {
        let mut log = CallLog::new();
        let now = Instant::now();
        log.evict_older_than(now, Duration::from_secs(1));

        assert!(log.is_empty());
        assert_eq!(log.count_within(now, Duration::from_secs(60)), 0);
        assert_eq!(log.oldest_within(now, Duration::from_secs(60)), None);
    }
}
