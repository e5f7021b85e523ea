//! Key validation.
//!
//! Per spec §3, a key is an opaque non-empty byte string compared
//! lexicographically; keys containing the WAL field separator (TAB) or
//! line terminator (LF) are "out of contract" for the caller. We
//! validate both at the API boundary rather than trusting callers,
//! since a TAB/LF in a key would silently corrupt WAL framing.

use crate::error::StoreError;

/// Validate a key for use with `Set`/`Get`/`Del`.
pub fn validate_key(key: &str) -> Result<(), StoreError> {
    if key.is_empty() {
        return Err(StoreError::InvalidInput {
            field: "key",
            reason: "key must not be empty",
        });
    }
    if key.contains('\t') {
        return Err(StoreError::InvalidInput {
            field: "key",
            reason: "key must not contain a TAB byte",
        });
    }
    if key.contains('\n') {
        return Err(StoreError::InvalidInput {
            field: "key",
            reason: "key must not contain a newline",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_keys() {
        assert!(validate_key("a").is_ok());
        assert!(validate_key("user:123").is_ok());
        assert!(validate_key("  spaces  ").is_ok());
    }

    #[test]
    fn rejects_empty() {
        assert!(validate_key("").is_err());
    }

    #[test]
    fn rejects_tab() {
        assert!(validate_key("a\tb").is_err());
    }

    #[test]
    fn rejects_newline() {
        assert!(validate_key("a\nb").is_err());
    }
}
