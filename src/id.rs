#[cfg(not(feature = "std"))]
use core as std;

use std::{fmt, ops, str};

use crate::EntropySource;

/// The number of entropy bytes carried by every identifier width.
pub(crate) const ENTROPY_LEN: usize = 10;

/// Represents a Unique Sortable Identifier.
///
/// A USID is a fixed-width byte array whose leading `TS_LEN` bytes encode a big-endian unsigned
/// Unix timestamp and whose trailing ten bytes carry entropy. Because the timestamp occupies the
/// most significant bytes, byte-wise lexicographic comparison of two identifiers orders them by
/// creation time; the derived [`Ord`] impl provides exactly that order.
///
/// The two supported widths are available as the [`UsidMillis`] and [`UsidNanos`] aliases. Other
/// `LEN`/`TS_LEN` combinations are rejected at compile time.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct Usid<const LEN: usize, const TS_LEN: usize>([u8; LEN]);

/// A 16-byte USID carrying a 6-byte millisecond-resolution timestamp.
pub type UsidMillis = Usid<16, 6>;

/// An 18-byte USID carrying an 8-byte nanosecond-resolution timestamp.
pub type UsidNanos = Usid<18, 8>;

impl<const LEN: usize, const TS_LEN: usize> Usid<LEN, TS_LEN> {
    const LAYOUT: () = assert!(
        TS_LEN + ENTROPY_LEN == LEN && TS_LEN <= 8,
        "unsupported identifier layout"
    );

    /// The number of entropy bytes in an identifier.
    pub const ENTROPY_LEN: usize = ENTROPY_LEN;

    /// The largest timestamp representable in the `TS_LEN`-byte timestamp field.
    pub const MAX_TIMESTAMP: u64 = if TS_LEN >= 8 {
        u64::MAX
    } else {
        (1 << (TS_LEN * 8)) - 1
    };

    /// The smallest identifier (all bits zero).
    pub const MIN: Self = Self([0x00; LEN]);

    /// The largest identifier (all bits one).
    pub const MAX: Self = Self([0xff; LEN]);

    /// Creates an identifier with the given Unix timestamp and an optional entropy source.
    ///
    /// The timestamp is written into the leading `TS_LEN` bytes as a big-endian unsigned integer.
    /// If an entropy source is supplied, the trailing ten bytes are filled from it; otherwise they
    /// remain zero. Use [`unix_ts_ms`](crate::unix_ts_ms) or [`unix_ts_ns`](crate::unix_ts_ns) to
    /// obtain a timestamp from the wall clock.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TimeTooLarge`] if the timestamp exceeds [`Self::MAX_TIMESTAMP`], or
    /// [`Error::Entropy`] if the entropy source fails while filling the entropy field.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::time::SystemTime;
    /// use usid::{unix_ts_ms, SecureEntropy, UsidMillis};
    ///
    /// let id = UsidMillis::new(unix_ts_ms(SystemTime::now()), Some(&mut SecureEntropy))?;
    /// println!("{}", id); // e.g., "018f2e8a1c4bf2a09e44d31c77216d3f"
    /// # Ok::<(), usid::Error>(())
    /// ```
    pub fn new(timestamp: u64, entropy: Option<&mut dyn EntropySource>) -> Result<Self, Error> {
        let _ = Self::LAYOUT;
        let mut id = Self([0u8; LEN]);
        id.set_timestamp(timestamp)?;
        if let Some(source) = entropy {
            source.fill(&mut id.0[TS_LEN..]).map_err(Error::Entropy)?;
        }
        Ok(id)
    }

    /// Creates an identifier like [`Usid::new`], panicking on failure.
    ///
    /// Intended for call sites that have independently proven the inputs valid (e.g., a
    /// pre-clamped timestamp and an infallible entropy source).
    ///
    /// # Panics
    ///
    /// Panics if [`Usid::new`] would return an error.
    pub fn must_new(timestamp: u64, entropy: Option<&mut dyn EntropySource>) -> Self {
        match Self::new(timestamp, entropy) {
            Ok(id) => id,
            Err(err) => panic!("usid: could not create identifier: {}", err),
        }
    }

    /// Returns the Unix timestamp encoded in the leading `TS_LEN` bytes.
    pub const fn timestamp(&self) -> u64 {
        let _ = Self::LAYOUT;
        let mut timestamp = 0u64;
        let mut i = 0;
        while i < TS_LEN {
            timestamp = timestamp << 8 | self.0[i] as u64;
            i += 1;
        }
        timestamp
    }

    /// Sets the timestamp field to the given Unix timestamp, leaving the entropy field untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TimeTooLarge`] if the timestamp exceeds [`Self::MAX_TIMESTAMP`]; the
    /// identifier is left unchanged in that case.
    pub fn set_timestamp(&mut self, timestamp: u64) -> Result<(), Error> {
        let _ = Self::LAYOUT;
        if timestamp > Self::MAX_TIMESTAMP {
            return Err(Error::TimeTooLarge);
        }
        self.0[..TS_LEN].copy_from_slice(&timestamp.to_be_bytes()[8 - TS_LEN..]);
        Ok(())
    }

    /// Returns a copy of the ten-byte entropy field.
    pub fn entropy(&self) -> [u8; ENTROPY_LEN] {
        let mut bytes = [0u8; ENTROPY_LEN];
        bytes.copy_from_slice(&self.0[TS_LEN..]);
        bytes
    }

    /// Overwrites the entropy field with the given bytes, leaving the timestamp field untouched.
    pub fn set_entropy(&mut self, bytes: [u8; ENTROPY_LEN]) {
        self.0[TS_LEN..].copy_from_slice(&bytes);
    }

    /// Returns a reference to the underlying byte array.
    pub const fn as_bytes(&self) -> &[u8; LEN] {
        &self.0
    }

    /// Writes the lowercase hexadecimal rendering into `buffer`, which must hold `2 * LEN` bytes.
    fn write_hex(&self, buffer: &mut [u8]) {
        const DIGITS: &[u8; 16] = b"0123456789abcdef";

        let mut buf_iter = buffer.iter_mut();
        for e in self.0 {
            *buf_iter.next().unwrap() = DIGITS[(e >> 4) as usize];
            *buf_iter.next().unwrap() = DIGITS[(e & 15) as usize];
        }
    }
}

impl UsidMillis {
    /// Returns the 32-digit hexadecimal representation stored in a stack-allocated structure that
    /// can be dereferenced as `str` and [`Display`](fmt::Display)ed.
    ///
    /// This method is primarily for `no_std` environments where heap-allocated string types are
    /// not readily available. Use the [`fmt::Display`] trait usually.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use usid::UsidMillis;
    ///
    /// let x = "0123456789ab0f0e0d0c0b0a09080706".parse::<UsidMillis>()?;
    /// let y = x.encode();
    /// assert_eq!(&y as &str, "0123456789ab0f0e0d0c0b0a09080706");
    /// # Ok::<(), usid::ParseError>(())
    /// ```
    pub fn encode(&self) -> impl ops::Deref<Target = str> + fmt::Display {
        let mut buffer = [0u8; 32];
        self.write_hex(&mut buffer);
        HexStr(buffer)
    }
}

impl UsidNanos {
    /// Returns the 36-digit hexadecimal representation stored in a stack-allocated structure that
    /// can be dereferenced as `str` and [`Display`](fmt::Display)ed.
    ///
    /// This method is primarily for `no_std` environments where heap-allocated string types are
    /// not readily available. Use the [`fmt::Display`] trait usually.
    pub fn encode(&self) -> impl ops::Deref<Target = str> + fmt::Display {
        let mut buffer = [0u8; 36];
        self.write_hex(&mut buffer);
        HexStr(buffer)
    }
}

impl<const LEN: usize, const TS_LEN: usize> Default for Usid<LEN, TS_LEN> {
    fn default() -> Self {
        Self([0u8; LEN])
    }
}

impl<const LEN: usize, const TS_LEN: usize> fmt::Display for Usid<LEN, TS_LEN> {
    /// Returns the fixed-length lowercase hexadecimal representation (`2 * LEN` digits, no
    /// separators).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for e in self.0 {
            write!(f, "{:02x}", e)?;
        }
        Ok(())
    }
}

impl<const LEN: usize, const TS_LEN: usize> str::FromStr for Usid<LEN, TS_LEN> {
    type Err = ParseError;

    /// Creates an object from the `2 * LEN`-digit hexadecimal representation.
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        const ERR: ParseError = ParseError {};
        let mut dst = [0u8; LEN];
        let mut iter = src.chars();
        for e in dst.iter_mut() {
            let hi = iter.next().ok_or(ERR)?.to_digit(16).ok_or(ERR)? as u8;
            let lo = iter.next().ok_or(ERR)?.to_digit(16).ok_or(ERR)? as u8;
            *e = (hi << 4) | lo;
        }
        if iter.next().is_none() {
            Ok(Self(dst))
        } else {
            Err(ERR)
        }
    }
}

impl<const LEN: usize, const TS_LEN: usize> From<Usid<LEN, TS_LEN>> for [u8; LEN] {
    fn from(src: Usid<LEN, TS_LEN>) -> Self {
        src.0
    }
}

impl<const LEN: usize, const TS_LEN: usize> From<[u8; LEN]> for Usid<LEN, TS_LEN> {
    fn from(src: [u8; LEN]) -> Self {
        Self(src)
    }
}

impl<const LEN: usize, const TS_LEN: usize> AsRef<[u8]> for Usid<LEN, TS_LEN> {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<UsidMillis> for u128 {
    fn from(src: UsidMillis) -> Self {
        Self::from_be_bytes(src.0)
    }
}

impl From<u128> for UsidMillis {
    fn from(src: u128) -> Self {
        Self(src.to_be_bytes())
    }
}

/// Concrete return type of [`UsidMillis::encode`] and [`UsidNanos::encode`] containing the
/// stack-allocated hexadecimal representation.
struct HexStr<const N: usize>([u8; N]);

impl<const N: usize> ops::Deref for HexStr<N> {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        debug_assert!(self.0.is_ascii());
        unsafe { str::from_utf8_unchecked(&self.0) }
    }
}

impl<const N: usize> fmt::Display for HexStr<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self)
    }
}

/// Error creating an identifier or mutating its timestamp field.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// The timestamp exceeds the maximum value representable in the timestamp field.
    TimeTooLarge,

    /// The entropy source failed while filling the entropy field.
    ///
    /// The underlying error is propagated verbatim; any retry policy belongs to the caller.
    Entropy(rand::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TimeTooLarge => f.write_str("timestamp too large for timestamp field"),
            Self::Entropy(err) => write!(f, "entropy source failed: {}", err),
        }
    }
}

/// Error parsing an invalid string representation of USID.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ParseError {}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid string representation")
    }
}

#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
mod std_ext {
    use super::{Error, ParseError, Usid};

    impl<const LEN: usize, const TS_LEN: usize> From<Usid<LEN, TS_LEN>> for String {
        fn from(src: Usid<LEN, TS_LEN>) -> Self {
            src.to_string()
        }
    }

    impl<const LEN: usize, const TS_LEN: usize> TryFrom<String> for Usid<LEN, TS_LEN> {
        type Error = ParseError;

        fn try_from(src: String) -> Result<Self, Self::Error> {
            src.parse()
        }
    }

    impl std::error::Error for ParseError {}

    impl std::error::Error for Error {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            match self {
                Error::TimeTooLarge => None,
                Error::Entropy(err) => Some(err),
            }
        }
    }
}

#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
mod serde_support {
    use super::{fmt, Usid};
    use serde::{de, Deserializer, Serializer};

    impl<const LEN: usize, const TS_LEN: usize> serde::Serialize for Usid<LEN, TS_LEN> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            if serializer.is_human_readable() {
                serializer.collect_str(self)
            } else {
                serializer.serialize_bytes(self.as_bytes())
            }
        }
    }

    impl<'de, const LEN: usize, const TS_LEN: usize> serde::Deserialize<'de> for Usid<LEN, TS_LEN> {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            if deserializer.is_human_readable() {
                deserializer.deserialize_str(VisitorImpl)
            } else {
                deserializer.deserialize_bytes(VisitorImpl)
            }
        }
    }

    struct VisitorImpl<const LEN: usize, const TS_LEN: usize>;

    impl<'de, const LEN: usize, const TS_LEN: usize> de::Visitor<'de> for VisitorImpl<LEN, TS_LEN> {
        type Value = Usid<LEN, TS_LEN>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(formatter, "a USID representation")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            value.parse::<Self::Value>().map_err(de::Error::custom)
        }

        fn visit_bytes<E: de::Error>(self, value: &[u8]) -> Result<Self::Value, E> {
            <[u8; LEN]>::try_from(value)
                .map(Self::Value::from)
                .map_err(de::Error::custom)
        }
    }

}
