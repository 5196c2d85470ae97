//! Process-wide counters for pipeline activity.
//!
//! Increments are silent. [`Metrics::flush`] emits every counter in one
//! `tracing::info!` event at a natural boundary (end of a check).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// The counters simcheck tracks. Doubles as the slot index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    /// Checks that entered the pipeline.
    ChecksStarted,
    /// Peer comparisons that produced a result (including degraded zeros).
    PeersCompared,
    /// Oracle failures that fell back to the local scorer.
    OracleFallbacks,
}

impl Counter {
    const COUNT: usize = 3;

    fn name(self) -> &'static str {
        match self {
            Counter::ChecksStarted => "checks_started",
            Counter::PeersCompared => "peers_compared",
            Counter::OracleFallbacks => "oracle_fallbacks",
        }
    }
}

/// Fixed array of atomic slots, one per [`Counter`]. No locking.
pub struct Metrics {
    slots: [AtomicU64; Counter::COUNT],
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            slots: [AtomicU64::new(0), AtomicU64::new(0), AtomicU64::new(0)],
        }
    }

    /// Bump one counter.
    pub fn record(&self, counter: Counter) {
        self.slots[counter as usize].fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = counter.name(), "counter incremented");
    }

    /// Current value of one counter.
    pub fn get(&self, counter: Counter) -> u64 {
        self.slots[counter as usize].load(Ordering::Relaxed)
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            checks_started = self.get(Counter::ChecksStarted),
            peers_compared = self.get(Counter::PeersCompared),
            oracle_fallbacks = self.get(Counter::OracleFallbacks),
        );
    }

    /// Zero every slot (useful in tests).
    pub fn reset(&self) {
        for slot in &self.slots {
            slot.store(0, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_count_independently() {
        let m = Metrics::new();
        assert_eq!(m.get(Counter::ChecksStarted), 0);

        m.record(Counter::ChecksStarted);
        m.record(Counter::ChecksStarted);
        m.record(Counter::PeersCompared);
        m.record(Counter::OracleFallbacks);
        m.record(Counter::OracleFallbacks);
        m.record(Counter::OracleFallbacks);

        assert_eq!(m.get(Counter::ChecksStarted), 2);
        assert_eq!(m.get(Counter::PeersCompared), 1);
        assert_eq!(m.get(Counter::OracleFallbacks), 3);
    }

    #[test]
    fn reset_zeroes_every_slot() {
        let m = Metrics::new();
        m.record(Counter::ChecksStarted);
        m.record(Counter::PeersCompared);
        m.record(Counter::OracleFallbacks);
        m.reset();
        assert_eq!(m.get(Counter::ChecksStarted), 0);
        assert_eq!(m.get(Counter::PeersCompared), 0);
        assert_eq!(m.get(Counter::OracleFallbacks), 0);
    }
}
