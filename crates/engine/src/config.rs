//! Store-level configuration (ambient, not part of any single
//! component letter in spec §4, but threaded through `Store::open`).

use std::path::PathBuf;
use std::time::Duration;

use durakv_durability::WalConfig;

/// Batch size at which the index applier flushes regardless of the
/// idle timer (spec §4.4).
pub const DEFAULT_APPLIER_BATCH: usize = 500;

/// Idle timer after which the applier flushes a partial batch (spec
/// §4.4).
pub const DEFAULT_APPLIER_IDLE: Duration = Duration::from_millis(100);

/// Bounded channel capacity between the foreground write path and the
/// index applier; back-pressures the foreground writer once full
/// (spec §5).
pub const DEFAULT_CHANNEL_CAPACITY: usize = 10_000;

/// Everything `Store::open` needs: where files live, and the tunables
/// for the WAL flusher and the index applier.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the write-ahead log.
    pub wal_path: PathBuf,
    /// Path the snapshot is written to on clean close.
    pub snapshot_path: PathBuf,
    /// WAL flusher tunables (double-buffer swap threshold, tick).
    pub wal: WalConfig,
    /// Applier batch-size flush trigger.
    pub applier_batch: usize,
    /// Applier idle-timer flush trigger.
    pub applier_idle: Duration,
    /// Applier channel capacity.
    pub channel_capacity: usize,
}

impl StoreConfig {
    /// A config pointing at `dir/wal.log` and `dir/snapshot.bin` with
    /// spec-default tunables.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        StoreConfig {
            wal_path: dir.join("wal.log"),
            snapshot_path: dir.join("snapshot.bin"),
            wal: WalConfig::new(),
            applier_batch: DEFAULT_APPLIER_BATCH,
            applier_idle: DEFAULT_APPLIER_IDLE,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    /// Override the WAL path.
    pub fn with_wal_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.wal_path = path.into();
        self
    }

    /// Override the snapshot path.
    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = path.into();
        self
    }

    /// Override the WAL flusher config.
    pub fn with_wal_config(mut self, wal: WalConfig) -> Self {
        self.wal = wal;
        self
    }

    /// Override the applier batch-size trigger.
    pub fn with_applier_batch(mut self, batch: usize) -> Self {
        self.applier_batch = batch;
        self
    }

    /// Override the applier idle-timer trigger.
    pub fn with_applier_idle(mut self, idle: Duration) -> Self {
        self.applier_idle = idle;
        self
    }

    /// A config tuned for fast, low-latency tests: small thresholds,
    /// short ticks, all rooted at `dir`.
    pub fn for_testing(dir: impl Into<PathBuf>) -> Self {
        StoreConfig::new(dir)
            .with_wal_config(WalConfig::for_testing())
            .with_applier_batch(8)
            .with_applier_idle(Duration::from_millis(10))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_derives_paths_from_dir() {
        let cfg = StoreConfig::new("/tmp/store");
        assert_eq!(cfg.wal_path, PathBuf::from("/tmp/store/wal.log"));
        assert_eq!(cfg.snapshot_path, PathBuf::from("/tmp/store/snapshot.bin"));
        assert_eq!(cfg.applier_batch, DEFAULT_APPLIER_BATCH);
    }

    #[test]
    fn builder_overrides_apply() {
        let cfg = StoreConfig::new("/tmp/store").with_applier_batch(10);
        assert_eq!(cfg.applier_batch, 10);
    }
}
