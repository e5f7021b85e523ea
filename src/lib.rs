//! Facade crate: re-exports the public surface of the workspace so
//! downstream consumers depend on a single `durakv` crate rather than
//! reaching into individual workspace members.

pub use durakv_core::error::{Result, StoreError};
pub use durakv_engine::{Store, StoreConfig};
