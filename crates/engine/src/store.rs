//! The store (C4/C5 orchestration): open/close, the foreground
//! write/read path, and the transaction buffer. Ties together the WAL
//! (`durakv-durability`), the cache and index (`durakv-storage`), and
//! the background index applier (`crate::applier`).

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;

use durakv_core::error::{Result, StoreError};
use durakv_core::{key, Operation};
use durakv_durability::{Wal, WalConfig};
use durakv_storage::{snapshot, Cache, Index};

use crate::applier::Applier;
use crate::config::StoreConfig;
use crate::recovery;
use crate::state::StoreState;

/// An open store handle. Methods that only read or append take `&self`
/// — every shared field has its own internal lock — so callers that
/// want concurrent access from multiple threads wrap the handle in an
/// `Arc`. [`Store::clear`] is destructive and takes `&mut self`.
pub struct Store {
    state: Arc<Mutex<StoreState>>,
    cache: Cache,
    wal: Option<Wal>,
    wal_path: PathBuf,
    wal_config: WalConfig,
    applier: Option<Applier>,
    applier_capacity: usize,
    applier_batch: usize,
    applier_idle: std::time::Duration,
    snapshot_path: PathBuf,
}

impl Store {
    /// Open (creating if necessary) the WAL and replay it into a fresh
    /// index and cache before starting any background worker (spec
    /// §4.6). The snapshot file is never consulted here (spec §9).
    pub fn open(config: StoreConfig) -> Result<Store> {
        if let Some(parent) = config.wal_path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::OpenFailure {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let ops = durakv_durability::read_all(&config.wal_path).map_err(|err| {
            StoreError::OpenFailure {
                path: config.wal_path.clone(),
                source: std::io::Error::new(std::io::ErrorKind::Other, err.to_string()),
            }
        })?;

        let mut index = Index::new();
        let cache = Cache::new();
        recovery::replay(ops, &mut index, &cache)?;

        let wal = Wal::open(&config.wal_path, config.wal)?;
        let state = Arc::new(Mutex::new(StoreState::new(index)));
        let applier = Applier::spawn(
            state.clone(),
            config.channel_capacity,
            config.applier_batch,
            config.applier_idle,
        );

        Ok(Store {
            state,
            cache,
            wal: Some(wal),
            wal_path: config.wal_path,
            wal_config: config.wal,
            applier: Some(applier),
            applier_capacity: config.channel_capacity,
            applier_batch: config.applier_batch,
            applier_idle: config.applier_idle,
            snapshot_path: config.snapshot_path,
        })
    }

    fn wal(&self) -> &Wal {
        self.wal.as_ref().expect("store used after close")
    }

    fn applier(&self) -> &Applier {
        self.applier.as_ref().expect("store used after close")
    }

    /// Non-transactional set. Returns once the WAL append is buffered
    /// and the cache and applier queue are updated — durability is
    /// established only at the next flush tick or forced flush (spec
    /// §4.4, §9 "per-op non-durability").
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        crate::key_value::validate(key, value)?;

        {
            let mut state = self.state.lock();
            if state.in_tx {
                state
                    .tx_buffer
                    .insert(key.to_string(), Some(value.to_string()));
                return Ok(());
            }
        }

        self.wal().append(&Operation::Set {
            key: key.to_string(),
            value: value.to_string(),
        })?;
        self.cache.insert(key.to_string(), value.to_string());
        self.applier().enqueue(Operation::Set {
            key: key.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    /// Non-transactional delete. A no-op (in terms of visible state)
    /// if `key` was already absent.
    pub fn del(&self, key: &str) -> Result<()> {
        key::validate_key(key)?;

        {
            let mut state = self.state.lock();
            if state.in_tx {
                state.tx_buffer.insert(key.to_string(), None);
                return Ok(());
            }
        }

        self.wal().append(&Operation::Del {
            key: key.to_string(),
        })?;
        self.cache.evict(key);
        self.applier().enqueue(Operation::Del {
            key: key.to_string(),
        });
        Ok(())
    }

    /// Look up `key`: transaction buffer, then cache, then index
    /// (spec §6's `Get` row). Never fails.
    pub fn get(&self, key: &str) -> Option<String> {
        {
            let state = self.state.lock();
            if state.in_tx {
                if let Some(entry) = state.tx_buffer.get(key) {
                    return entry.clone();
                }
            }
        }

        if let Some(value) = self.cache.get(key) {
            return Some(value);
        }

        let found = {
            let state = self.state.lock();
            state.index.get(key).cloned()
        };
        if let Some(value) = &found {
            // Read-through: populate the cache so repeat lookups of a
            // cold key short-circuit the index (spec §4.3).
            self.cache.insert(key.to_string(), value.clone());
        }
        found
    }

    /// Begin a transaction. A no-op (with a logged diagnostic) if one
    /// is already open (spec §4.5).
    pub fn begin(&self) {
        let mut state = self.state.lock();
        if state.in_tx {
            warn!("begin called with a transaction already open, ignoring");
            return;
        }
        state.in_tx = true;
        state.tx_buffer.clear();
    }

    /// Commit the open transaction: append each buffered op to the
    /// WAL, update the cache, enqueue the index op, request an applier
    /// flush, then force the WAL flush so durability is established
    /// before this returns (spec §4.5). A no-op (with a logged
    /// diagnostic) if no transaction is open. Buffer iteration order is
    /// unspecified by the source; entries are applied sorted by key for
    /// determinism.
    pub fn commit(&self) -> Result<()> {
        let buffer = {
            let mut state = self.state.lock();
            if !state.in_tx {
                warn!("commit called with no open transaction, ignoring");
                return Ok(());
            }
            state.in_tx = false;
            std::mem::take(&mut state.tx_buffer)
        };

        let mut entries: Vec<(String, Option<String>)> = buffer.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        for (key, value) in entries {
            match value {
                Some(value) => {
                    self.wal().append(&Operation::Set {
                        key: key.clone(),
                        value: value.clone(),
                    })?;
                    self.cache.insert(key.clone(), value.clone());
                    self.applier().enqueue(Operation::Set { key, value });
                }
                None => {
                    self.wal().append(&Operation::Del { key: key.clone() })?;
                    self.cache.evict(&key);
                    self.applier().enqueue(Operation::Del { key });
                }
            }
        }

        self.applier().request_flush();
        self.wal().force_flush()
    }

    /// Abort the open transaction, discarding buffered writes and
    /// emitting no WAL records. A no-op (with a logged diagnostic) if
    /// no transaction is open.
    pub fn abort(&self) {
        let mut state = self.state.lock();
        if !state.in_tx {
            warn!("abort called with no open transaction, ignoring");
            return;
        }
        state.in_tx = false;
        state.tx_buffer.clear();
    }

    /// A one-line diagnostic summary, for the CLI's `debug` command:
    /// index and cache sizes and whether a transaction is open.
    pub fn debug_summary(&self) -> String {
        let state = self.state.lock();
        format!(
            "index_keys={} cache_keys={} in_transaction={} tx_buffer_keys={}",
            state.index.len(),
            self.cache.len(),
            state.in_tx,
            state.tx_buffer.len()
        )
    }

    /// Force the current WAL batch to fsync without a transaction.
    /// Exposed for callers (and tests) that want a durability point
    /// outside `Begin`/`Commit`.
    pub fn force_flush(&self) -> Result<()> {
        self.wal().force_flush()
    }

    /// Truncate the WAL and snapshot and reset all in-memory state.
    /// Takes `&mut self`: unlike the rest of the API, this replaces the
    /// store's WAL handle outright rather than mutating through a
    /// shared lock.
    pub fn clear(&mut self) -> Result<()> {
        let wal = self.wal.take().expect("store used after close");
        wal.close()?;

        std::fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .create(true)
            .open(&self.wal_path)
            .map_err(|source| StoreError::OpenFailure {
                path: self.wal_path.clone(),
                source,
            })?;
        self.wal = Some(Wal::open(&self.wal_path, self.wal_config)?);

        if let Some(applier) = self.applier.take() {
            applier.close();
        }
        self.cache.clear();
        {
            let mut state = self.state.lock();
            state.in_tx = false;
            state.tx_buffer.clear();
            state.index = Index::new();
        }
        self.applier = Some(Applier::spawn(
            self.state.clone(),
            self.applier_capacity,
            self.applier_batch,
            self.applier_idle,
        ));

        let _ = std::fs::remove_file(&self.snapshot_path);
        Ok(())
    }

    /// Close the store: join the applier, stop the WAL flusher, and
    /// write the snapshot best-effort (spec §4.7). Snapshot failures
    /// are logged and otherwise ignored since recovery never reads the
    /// snapshot.
    pub fn close(mut self) -> Result<()> {
        if let Some(applier) = self.applier.take() {
            applier.close();
        }

        let index_snapshot = {
            let state = self.state.lock();
            state.index.clone()
        };
        if let Err(err) = snapshot::save(&index_snapshot, &self.snapshot_path) {
            warn!(error = %err, "failed to write snapshot on close, ignoring");
        }

        if let Some(wal) = self.wal.take() {
            wal.close()?;
        }
        Ok(())
    }
}
