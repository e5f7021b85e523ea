//! The state guarded by the store mutex (M in spec §5): the
//! in-transaction flag, the transaction buffer, and the index. Index
//! reads and writes anywhere in this crate go through this mutex —
//! a stricter reading of spec §5 than "index guarded only during
//! applier flush", adopted because an index shared between a
//! foreground reader and the background applier needs a lock on every
//! access, not just during flush, to stay memory-safe in Rust.

use std::collections::HashMap;

use durakv_storage::Index;

pub(crate) struct StoreState {
    pub(crate) in_tx: bool,
    pub(crate) tx_buffer: HashMap<String, Option<String>>,
    pub(crate) index: Index,
}

impl StoreState {
    pub(crate) fn new(index: Index) -> Self {
        StoreState {
            in_tx: false,
            tx_buffer: HashMap::new(),
            index,
        }
    }
}
