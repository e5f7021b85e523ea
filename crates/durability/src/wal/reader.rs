//! Recovery-time WAL reader (half of C6).
//!
//! Scans a WAL file from offset 0, yielding one [`Operation`] per
//! parseable line. Per spec §4.6 the WAL is "best-effort to end": an
//! unparseable or truncated trailing line is silently skipped rather
//! than aborting recovery.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use durakv_core::{error::StoreError, Operation};
use thiserror::Error;

/// Error opening the WAL file for a read pass. Distinct from
/// [`StoreError`] because a missing WAL file on first open is expected
/// (there is nothing to replay yet), not a fatal condition.
#[derive(Debug, Error)]
pub enum WalReadError {
    /// The file could not be opened at all (permissions, etc. — not
    /// simply "doesn't exist yet").
    #[error("failed to open WAL for replay: {0}")]
    Open(#[source] io::Error),
}

/// Read every parseable [`Operation`] from the WAL at `path`, in file
/// order. Returns an empty vector if the file does not exist yet.
pub fn read_all(path: &Path) -> Result<Vec<Operation>, WalReadError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(WalReadError::Open(err)),
    };

    let mut ops = Vec::new();
    let mut offset: u64 = 0;
    for line in BufReader::new(file).lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => break, // truncated trailing bytes: best-effort to end
        };
        let line_len = line.len() as u64 + 1; // account for the newline we split on
        if line.is_empty() {
            offset += line_len;
            continue;
        }
        match Operation::parse_line(&line, offset) {
            Ok(op) => ops.push(op),
            Err(StoreError::ReplayMalformed { offset, reason }) => {
                tracing::warn!(offset, reason, "skipping malformed WAL line during replay");
            }
            Err(_) => unreachable!("parse_line only returns ReplayMalformed"),
        }
        offset += line_len;
    }
    Ok(ops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_empty() {
        let dir = tempdir().unwrap();
        let ops = read_all(&dir.path().join("missing.wal")).unwrap();
        assert!(ops.is_empty());
    }

    #[test]
    fn parses_set_and_del_in_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.wal");
        {
            let mut f = File::create(&path).unwrap();
            writeln!(f, "SET\ta\t1").unwrap();
            writeln!(f, "SET\tb\t2").unwrap();
            writeln!(f, "DEL\ta").unwrap();
        }
        let ops = read_all(&path).unwrap();
        assert_eq!(
            ops,
            vec![
                Operation::Set {
                    key: "a".into(),
                    value: "1".into()
                },
                Operation::Set {
                    key: "b".into(),
                    value: "2".into()
                },
                Operation::Del { key: "a".into() },
            ]
        );
    }

    #[test]
    fn skips_malformed_and_truncated_trailing_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.wal");
        {
            let mut f = File::create(&path).unwrap();
            writeln!(f, "SET\ta\t1").unwrap();
            writeln!(f, "GARBAGE LINE").unwrap();
            write!(f, "SET\tb").unwrap(); // truncated, no value, no trailing LF
        }
        let ops = read_all(&path).unwrap();
        assert_eq!(
            ops,
            vec![Operation::Set {
                key: "a".into(),
                value: "1".into()
            }]
        );
    }

    #[test]
    fn blank_lines_are_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.wal");
        {
            let mut f = File::create(&path).unwrap();
            writeln!(f, "SET\ta\t1").unwrap();
            writeln!(f).unwrap();
            writeln!(f, "SET\tb\t2").unwrap();
        }
        let ops = read_all(&path).unwrap();
        assert_eq!(ops.len(), 2);
    }
}
