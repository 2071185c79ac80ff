//! Wall-clock timestamp helpers

#![cfg(feature = "std")]

use std::time::{SystemTime, UNIX_EPOCH};

/// Converts a wall-clock instant into the milliseconds-since-epoch timestamp used by
/// [`UsidMillis`](crate::UsidMillis).
///
/// # Panics
///
/// Panics if the instant is earlier than the Unix epoch.
///
/// # Examples
///
/// ```rust
/// use std::time::SystemTime;
/// use usid::{unix_ts_ms, UsidMillis};
///
/// let id = UsidMillis::must_new(unix_ts_ms(SystemTime::now()), None);
/// ```
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
pub fn unix_ts_ms(at: SystemTime) -> u64 {
    at.duration_since(UNIX_EPOCH)
        .expect("clock may have gone backwards")
        .as_millis() as u64
}

/// Converts a wall-clock instant into the nanoseconds-since-epoch timestamp used by
/// [`UsidNanos`](crate::UsidNanos).
///
/// # Panics
///
/// Panics if the instant is earlier than the Unix epoch.
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
pub fn unix_ts_ns(at: SystemTime) -> u64 {
    at.duration_since(UNIX_EPOCH)
        .expect("clock may have gone backwards")
        .as_nanos() as u64
}
