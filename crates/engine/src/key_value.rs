//! Input validation for the foreground API, delegating to the
//! per-field rules in `durakv-core` (spec §3's caller preconditions on
//! TAB/LF in keys and values).

use durakv_core::error::Result;
use durakv_core::{key, value as value_mod};

/// Validate a `(key, value)` pair before it enters the write pipeline.
pub(crate) fn validate(key: &str, value: &str) -> Result<()> {
    key::validate_key(key)?;
    value_mod::validate_value(value)?;
    Ok(())
}
