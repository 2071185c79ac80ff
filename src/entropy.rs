//! Entropy sources for filling the entropy field of identifiers.

#[cfg(feature = "std")]
mod locked;
#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
pub use locked::LockedRng;


/// A byte-stream capability used to fill the entropy field of identifiers.
///
/// Implementations fill a caller-supplied buffer on demand, any number of times, with the goal
/// that consecutive fills from the same instance do not repeat. That non-repetition is a
/// collision-avoidance property verified by sampling tests, not a cryptographic guarantee;
/// only `SecureEntropy` produces unpredictable bytes.
pub trait EntropySource {
    /// Fills `dest` with entropy bytes.
    ///
    /// # Errors
    ///
    /// Returns the underlying generator's error if fresh bytes cannot be produced. Of the
    /// sources in this crate, only `SecureEntropy` can fail in practice, when the platform
    /// randomness facility is unavailable.
    fn fill(&mut self, dest: &mut [u8]) -> Result<(), rand::Error>;
}

/// Returns a seed for the time-seeded pseudo-random sources.
#[cfg(feature = "std")]
pub(crate) fn time_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock may have gone backwards")
        .as_nanos() as u64
}

/// A fast, insecure entropy source backed by a time-seeded pseudo-random generator.
///
/// This source is the cheapest way to fill identifiers from a single thread. It holds its
/// generator state inline and therefore requires exclusive (`&mut`) access; to share one
/// source across threads, use [`LockedRng`] instead.
#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
#[derive(Clone, Debug)]
pub struct FastRng {
    rng: rand::rngs::SmallRng,
}

#[cfg(feature = "std")]
impl FastRng {
    /// Creates a source seeded from the current time.
    pub fn new() -> Self {
        Self::with_seed(time_seed())
    }

    /// Creates a source with a fixed seed, producing a reproducible byte stream.
    pub fn with_seed(seed: u64) -> Self {
        use rand::SeedableRng;
        Self {
            rng: rand::rngs::SmallRng::seed_from_u64(seed),
        }
    }
}

#[cfg(feature = "std")]
impl Default for FastRng {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl EntropySource for FastRng {
    fn fill(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        rand::RngCore::fill_bytes(&mut self.rng, dest);
        Ok(())
    }
}

/// A cryptographically secure entropy source backed by the platform randomness facility.
///
/// This is a zero-sized delegate to [`rand::rngs::OsRng`] and is safe to use from any number
/// of threads by that facility's own contract. It is the only source in this crate whose
/// output is unpredictable, and the only one that can fail.
#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
#[derive(Clone, Copy, Default, Debug)]
pub struct SecureEntropy;

#[cfg(feature = "std")]
impl EntropySource for SecureEntropy {
    fn fill(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        rand::RngCore::try_fill_bytes(&mut rand::rngs::OsRng, dest)
    }
}

#[cfg(feature = "std")]
impl EntropySource for &SecureEntropy {
    fn fill(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        rand::RngCore::try_fill_bytes(&mut rand::rngs::OsRng, dest)
    }
}

/// An entropy source combining process identity and an atomic counter instead of randomness.
///
/// Each fill writes a 2-byte big-endian process-identity prefix followed by a fresh value of a
/// process-wide counter as 8 little-endian bytes. The counter is incremented atomically on
/// every fill and starts at a random offset drawn once per process, so values are unique
/// within a process for its lifetime and unlikely to collide across processes. No random
/// source is consulted per call.
#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
#[derive(Clone, Copy, Default, Debug)]
pub struct MachineEntropy;

#[cfg(feature = "std")]
mod machine {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::OnceLock;

    use super::{EntropySource, MachineEntropy};

    /// One process-identity prefix plus one counter value.
    const BLOCK_LEN: usize = 10;

    /// Returns the process-wide counter, seeding it with a random offset on first use.
    fn counter() -> &'static AtomicU64 {
        static COUNTER: OnceLock<AtomicU64> = OnceLock::new();
        COUNTER.get_or_init(|| {
            let mut seed = [0u8; 8];
            rand::RngCore::try_fill_bytes(&mut rand::rngs::OsRng, &mut seed)
                .expect("usid: could not seed machine entropy counter");
            AtomicU64::new(u64::from_le_bytes(seed))
        })
    }

    fn fill_blocks(dest: &mut [u8]) {
        let pid = (std::process::id() & 0xffff) as u16;
        for block in dest.chunks_mut(BLOCK_LEN) {
            // a fetch_add is a single read-modify-write, so no two fills can observe the
            // same counter value
            let n = counter().fetch_add(1, Ordering::Relaxed).wrapping_add(1);

            let mut bytes = [0u8; BLOCK_LEN];
            bytes[..2].copy_from_slice(&pid.to_be_bytes());
            bytes[2..].copy_from_slice(&n.to_le_bytes());
            block.copy_from_slice(&bytes[..block.len()]);
        }
    }

    impl EntropySource for MachineEntropy {
        fn fill(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            fill_blocks(dest);
            Ok(())
        }
    }

    impl EntropySource for &MachineEntropy {
        fn fill(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            fill_blocks(dest);
            Ok(())
        }
    }
}
