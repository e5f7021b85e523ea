//! Snapshot persistence (C7).
//!
//! Written on clean `Close` for external backup tooling only; never
//! consulted on `Open` (spec §4.7 and §9's open question — recovery is
//! WAL-only in this implementation). The on-disk format is bincode and
//! private to this crate: nothing outside durakv ever reads it.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use durakv_core::error::{Result, StoreError};

use crate::index::Index;

/// Serialize `index` to `path`. Failure is non-fatal to the caller's
/// durability story (see spec §4.7); callers typically log and ignore
/// an `Err` here rather than propagate it as a close failure.
pub fn save(index: &Index, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|source| StoreError::SnapshotFailure {
        path: path.to_path_buf(),
        source,
    })?;
    bincode::serialize_into(BufWriter::new(file), index.as_map()).map_err(|err| {
        StoreError::SnapshotFailure {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::Other, err),
        }
    })
}

/// Load a previously saved snapshot. Not used by recovery; exposed for
/// backup-restore tooling and for the round-trip property test of
/// spec §8.
pub fn load(path: &Path) -> Result<Index> {
    let file = File::open(path).map_err(|source| StoreError::OpenFailure {
        path: path.to_path_buf(),
        source,
    })?;
    let map: BTreeMap<String, String> = bincode::deserialize_from(BufReader::new(file))
        .map_err(|err| StoreError::OpenFailure {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::Other, err),
        })?;
    Ok(Index::from_map(map))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trips_a_populated_index() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snapshot.bin");

        let mut index = Index::new();
        index.insert("a".into(), "1".into());
        index.insert("b".into(), "2".into());

        save(&index, &path).unwrap();
        let loaded = load(&path).unwrap();

        assert_eq!(loaded.get("a"), Some(&"1".to_string()));
        assert_eq!(loaded.get("b"), Some(&"2".to_string()));
        assert_eq!(loaded.len(), index.len());
    }

    #[test]
    fn round_trips_an_empty_index() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snapshot.bin");
        save(&Index::new(), &path).unwrap();
        let loaded = load(&path).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn load_missing_file_is_an_open_failure() {
        let dir = tempdir().unwrap();
        let err = load(&dir.path().join("missing.bin")).unwrap_err();
        assert_eq!(err.reason_code(), "open_failure");
    }
}
