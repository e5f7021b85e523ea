//! WAL tuning knobs (spec §4.2's literal constants, made overridable).

use std::time::Duration;

/// Tuning parameters for [`crate::wal::writer::Wal`].
#[derive(Debug, Clone, Copy)]
pub struct WalConfig {
    /// Entries accumulated in the active buffer before `append` swaps
    /// it with the flush buffer on its own (spec: 500).
    pub swap_threshold: usize,

    /// How often the background worker wakes on its own, independent
    /// of the wake signal, to flush whatever has accumulated (spec:
    /// 2ms steady-state durability bound).
    pub flush_interval: Duration,
}

impl Default for WalConfig {
    fn default() -> Self {
        WalConfig {
            swap_threshold: 500,
            flush_interval: Duration::from_millis(2),
        }
    }
}

impl WalConfig {
    /// Default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the swap threshold (builder pattern).
    pub fn with_swap_threshold(mut self, threshold: usize) -> Self {
        self.swap_threshold = threshold;
        self
    }

    /// Override the flush interval (builder pattern).
    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = interval;
        self
    }

    /// A configuration with small thresholds, for fast-running tests.
    pub fn for_testing() -> Self {
        WalConfig {
            swap_threshold: 8,
            flush_interval: Duration::from_millis(1),
        }
    }
}
