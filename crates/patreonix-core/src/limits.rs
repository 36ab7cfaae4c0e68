//! Field limits enforced by the on-chain program.
//!
//! The program rejects oversized fields with `ContentTooLong`; checking them
//! client-side avoids paying for a transaction that is bound to fail.
//! Lengths are in bytes, matching the program's `String::len` checks.

use crate::errors::{PatreonixError, PatreonixResult};

pub const MAX_NAME_LEN: usize = 64;
pub const MAX_EMAIL_LEN: usize = 64;
pub const MAX_BIO_LEN: usize = 256;
pub const MAX_AVATAR_LEN: usize = 256;

pub const MAX_TITLE_LEN: usize = 64;
pub const MAX_DESCRIPTION_LEN: usize = 256;
pub const MAX_CONTENT_LEN: usize = 1024;

pub const MAX_COMMENT_LEN: usize = 256;
pub const MAX_COMMENTS: usize = 10;

pub(crate) fn check_len(field: &str, value: &str, max: usize) -> PatreonixResult<()> {
    if value.len() > max {
        return Err(PatreonixError::invalid_input(format!(
            "{field} must be at most {max} bytes, got {}",
            value.len()
        )));
    }
    Ok(())
}

pub(crate) fn check_non_empty(field: &str, value: &str) -> PatreonixResult<()> {
    if value.is_empty() {
        return Err(PatreonixError::invalid_input(format!("{field} must not be empty")));
    }
    Ok(())
}

pub(crate) fn check_opt_len(field: &str, value: Option<&str>, max: usize) -> PatreonixResult<()> {
    match value {
        Some(v) => check_len(field, v, max),
        None => Ok(()),
    }
}
