//! # usid: Unique Sortable Identifiers for Rust
//!
//! `usid` generates fixed-width binary identifiers whose most significant bytes encode the
//! moment of creation, so identifiers sort lexicographically in creation order as raw bytes
//! and as hexadecimal strings alike.
//!
//! ```rust
//! let id = usid::usid();
//!
//! println!("{}", id); // e.g., "018f2e8a1c4bf2a09e44d31c77216d3f"
//! println!("{:?}", id.as_bytes()); // as 16-byte big-endian array
//! ```
//!
//! Two widths are available:
//!
//! ```text
//! UsidMillis (16 bytes)                UsidNanos (18 bytes)
//! +--------------+----------------+    +----------------+----------------+
//! | unix_ts_ms   |    entropy     |    |   unix_ts_ns   |    entropy     |
//! |   6 bytes    |    10 bytes    |    |    8 bytes     |    10 bytes    |
//! +--------------+----------------+    +----------------+----------------+
//! ```
//!
//! The timestamp is an unsigned big-endian Unix timestamp (milliseconds or nanoseconds); the
//! trailing ten bytes are filled from an [`EntropySource`]. [`usid()`] and [`usid_ns()`] stamp
//! the current wall clock and draw entropy from a process-wide lock-protected source, while
//! [`Usid::new`] accepts an explicit timestamp and source for full control:
//!
//! ```rust
//! use std::time::SystemTime;
//! use usid::{unix_ts_ms, SecureEntropy, UsidMillis};
//!
//! let id = UsidMillis::new(unix_ts_ms(SystemTime::now()), Some(&mut SecureEntropy))?;
//! # Ok::<(), usid::Error>(())
//! ```
//!
//! Four sources cover the usual trade-offs: [`FastRng`] (fastest, single-threaded),
//! [`LockedRng`] (shareable across threads), [`SecureEntropy`] (cryptographically secure), and
//! [`MachineEntropy`] (process identity plus an atomic counter, no per-call randomness).
//!
//! ## Crate features
//!
//! Default features:
//!
//! - `global_gen` enables the [`usid()`] and [`usid_ns()`] entry points backed by the
//!   process-wide entropy source (implies `std`).
//! - `std` integrates the library with the Rust standard library and enables the concrete
//!   entropy sources and the wall-clock helpers; disable default features for `no_std` support
//!   (the identifier type and its codec remain fully available).
//!
//! Optional features:
//!
//! - `serde` enables the serialization and deserialization of [`Usid`] objects, as hexadecimal
//!   strings for human-readable formats and as raw bytes otherwise.

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod id;
pub use id::{Error, ParseError, Usid, UsidMillis, UsidNanos};

mod entropy;
pub use entropy::EntropySource;
#[cfg(feature = "std")]
pub use entropy::{FastRng, LockedRng, MachineEntropy, SecureEntropy};

mod clock;
#[cfg(feature = "std")]
pub use clock::{unix_ts_ms, unix_ts_ns};

mod global_gen;
#[cfg(feature = "global_gen")]
pub use global_gen::{usid, usid_ns};
