//! WAL submodules: configuration, the double-buffered writer, and the
//! recovery-time line reader.

pub mod config;
pub mod reader;
pub mod writer;
