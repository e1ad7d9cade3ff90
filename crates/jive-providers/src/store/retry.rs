//! Write retry policy for the in-memory Store (spec §4.1 failure model):
//! exponential backoff, base 1 s, factor 2, max 3 attempts. Reads never
//! retry.

use std::future::Future;

use jive_domain::error::{Error, Result};

use crate::constants::{STORE_WRITE_MAX_ATTEMPTS, STORE_WRITE_RETRY_BASE_MS, STORE_WRITE_RETRY_FACTOR};

/// Run `write` up to [`STORE_WRITE_MAX_ATTEMPTS`] times with exponential
/// backoff between attempts, surfacing the last error as [`Error::StoreIo`].
///
/// The in-memory backend itself cannot fail transiently, so this mostly
/// exists to keep the retry contract real for a future persistent backend
/// (see [`crate::store::sqlite`]) that shares this helper.
pub(super) async fn retry_write<F, Fut, T>(mut write: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut delay_ms = STORE_WRITE_RETRY_BASE_MS;
    let mut last_error = None;
    for attempt in 1..=STORE_WRITE_MAX_ATTEMPTS {
        match write().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                tracing::warn!(attempt, %error, "store write failed, retrying");
                last_error = Some(error);
                if attempt < STORE_WRITE_MAX_ATTEMPTS {
                    tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
                    delay_ms *= u64::from(STORE_WRITE_RETRY_FACTOR);
                }
            }
        }
    }
    Err(last_error.unwrap_or_else(|| Error::store("store write retry budget exhausted")))
}
