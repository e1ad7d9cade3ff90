//! Canonical time utilities — strict, no fallbacks.
//!
//! Entities carry `chrono::DateTime<Utc>` timestamps directly; this module
//! exists for the rarer case (log correlation, dedup seeds) where a raw
//! epoch value is needed. Delegates to `jive-utils` and folds clock failure
//! into the domain `Error` instead of silently returning 0.

use crate::error::Error;

/// Returns the current Unix timestamp in seconds.
///
/// # Errors
///
/// Returns an error if the system clock is before the Unix epoch (extremely
/// rare, but we refuse to silently return 0).
pub fn epoch_secs() -> Result<u64, Error> {
    jive_utils::time::epoch_secs()
        .map_err(|e| Error::internal(format!("system clock is before Unix epoch: {e}")))
}
