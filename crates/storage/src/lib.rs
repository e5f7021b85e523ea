//! The ordered index (C1), the hot cache (C3), and snapshot
//! persistence (C7).

pub mod cache;
pub mod index;
pub mod snapshot;

pub use cache::Cache;
pub use index::Index;
