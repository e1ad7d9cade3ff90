//! Raw Unix-epoch helpers. Infallible in practice (the clock is never
//! before 1970 on any real system) but surfaced as `Result` so callers in
//! `jive-domain` can fold failures into the domain `Error` type rather than
//! panicking.

use std::time::{SystemTime, SystemTimeError, UNIX_EPOCH};

/// Current Unix timestamp in whole seconds.
///
/// # Errors
///
/// Returns [`SystemTimeError`] if the system clock reports a time before
/// the Unix epoch.
pub fn epoch_secs() -> Result<u64, SystemTimeError> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}
