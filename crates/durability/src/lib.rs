//! The write-ahead log: C2 (double-buffered writer) and half of C6
//! (the line reader recovery replays from).

pub mod wal;

pub use wal::config::WalConfig;
pub use wal::reader::{read_all, WalReadError};
pub use wal::writer::Wal;
