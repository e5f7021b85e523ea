//! The `Operation` record: the unit shared by the WAL wire format, the
//! applier's work queue, and the transaction buffer's drained entries.
//!
//! Wire format (spec §6):
//!
//! ```text
//! SET<TAB><key><TAB><value><LF>
//! DEL<TAB><key><LF>
//! ```

use crate::error::StoreError;

/// A logical write, as it flows through WAL, cache, and index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Insert-or-replace `key` with `value`.
    Set { key: String, value: String },
    /// Tombstone `key`.
    Del { key: String },
}

impl Operation {
    /// Key this operation applies to.
    pub fn key(&self) -> &str {
        match self {
            Operation::Set { key, .. } => key,
            Operation::Del { key } => key,
        }
    }

    /// Serialize to the newline-terminated WAL line for this record.
    pub fn to_line(&self) -> String {
        match self {
            Operation::Set { key, value } => format!("SET\t{key}\t{value}\n"),
            Operation::Del { key } => format!("DEL\t{key}\n"),
        }
    }

    /// Parse one WAL line (without its trailing newline).
    ///
    /// `offset` is only used to annotate [`StoreError::ReplayMalformed`]
    /// for logging; it does not affect parsing.
    pub fn parse_line(line: &str, offset: u64) -> Result<Operation, StoreError> {
        if let Some(rest) = line.strip_prefix("SET\t") {
            let mut parts = rest.splitn(2, '\t');
            let key = parts.next().unwrap_or("");
            let value = parts.next();
            match value {
                Some(value) if !key.is_empty() => Ok(Operation::Set {
                    key: key.to_string(),
                    value: value.to_string(),
                }),
                _ => Err(StoreError::ReplayMalformed {
                    offset,
                    reason: "SET record missing value field",
                }),
            }
        } else if let Some(key) = line.strip_prefix("DEL\t") {
            if key.is_empty() {
                Err(StoreError::ReplayMalformed {
                    offset,
                    reason: "DEL record missing key field",
                })
            } else {
                Ok(Operation::Del {
                    key: key.to_string(),
                })
            }
        } else {
            Err(StoreError::ReplayMalformed {
                offset,
                reason: "unrecognized record tag",
            })
        }
    }
}
