//! Value validation.
//!
//! Per spec §3, a value may be empty but MUST NOT contain a newline,
//! since the WAL framing in §6 is line-based.

use crate::error::StoreError;

/// Validate a value for use with `Set`.
pub fn validate_value(value: &str) -> Result<(), StoreError> {
    if value.contains('\n') {
        return Err(StoreError::InvalidInput {
            field: "value",
            reason: "value must not contain a newline",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_value_is_valid() {
        assert!(validate_value("").is_ok());
    }

    #[test]
    fn rejects_newline() {
        assert!(validate_value("a\nb").is_err());
    }

    #[test]
    fn tab_is_allowed_in_values() {
        // Only the value's own field is delimited by the trailing TAB;
        // a TAB inside the value text is fine since SplitN(3) is used.
        assert!(validate_value("a\tb").is_ok());
    }
}
