//! Recovery (C6): replay the WAL directly into the index and cache
//! before any background worker starts, so recovery mutations never
//! race a concurrently running applier or flusher (spec §4.6).

use durakv_core::{error::Result, Operation};
use durakv_storage::{Cache, Index};

/// Apply every operation recorded in `ops` (already parsed by
/// [`durakv_durability::read_all`], with malformed/truncated trailing
/// lines already skipped) to `index` and `cache` in order.
pub(crate) fn replay(ops: Vec<Operation>, index: &mut Index, cache: &Cache) -> Result<()> {
    for op in ops {
        match op {
            Operation::Set { key, value } => {
                index.insert(key.clone(), value.clone());
                cache.insert(key, value);
            }
            Operation::Del { key } => {
                index.delete(&key);
                cache.evict(&key);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_set_then_del_leaves_neither_cache_nor_index_entry() {
        let mut index = Index::new();
        let cache = Cache::new();

        replay(
            vec![
                Operation::Set {
                    key: "k".into(),
                    value: "v".into(),
                },
                Operation::Del { key: "k".into() },
            ],
            &mut index,
            &cache,
        )
        .unwrap();

        assert_eq!(index.get("k"), None);
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn replays_sets_in_order_last_write_wins() {
        let mut index = Index::new();
        let cache = Cache::new();

        replay(
            vec![
                Operation::Set {
                    key: "k".into(),
                    value: "old".into(),
                },
                Operation::Set {
                    key: "k".into(),
                    value: "new".into(),
                },
            ],
            &mut index,
            &cache,
        )
        .unwrap();

        assert_eq!(index.get("k"), Some(&"new".to_string()));
        assert_eq!(cache.get("k"), Some("new".to_string()));
    }
}
