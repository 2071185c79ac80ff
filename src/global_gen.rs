//! Default entropy source and entry point functions.

#![cfg(feature = "global_gen")]
#![cfg_attr(docsrs, doc(cfg(feature = "global_gen")))]

use std::sync;
use std::time::SystemTime;

use crate::{unix_ts_ms, unix_ts_ns, UsidMillis, UsidNanos};
use inner::GlobalSource;

/// Returns the process-wide entropy source, creating one if none exists.
fn global_source() -> &'static GlobalSource {
    static G: sync::OnceLock<GlobalSource> = sync::OnceLock::new();
    G.get_or_init(Default::default)
}

/// Generates a millisecond-resolution USID stamped with the current wall clock.
///
/// This function fills the entropy field from a process-wide lock-protected source, so it may
/// be called from any number of threads; concurrent callers serialize only on the brief draw
/// from the shared generator, not on identifier construction as a whole. On Unix, it rebuilds
/// the source when the process ID changes (i.e., upon process forks) to prevent collisions
/// across processes.
///
/// # Examples
///
/// ```rust
/// let id = usid::usid();
/// println!("{}", id); // e.g., "018f2e8a1c4bf2a09e44d31c77216d3f"
/// println!("{:?}", id.as_bytes()); // as 16-byte big-endian array
///
/// let id_string: String = usid::usid().to_string();
/// ```
pub fn usid() -> UsidMillis {
    let mut source = global_source().get();
    UsidMillis::must_new(unix_ts_ms(SystemTime::now()), Some(&mut source))
}

/// Generates a nanosecond-resolution USID stamped with the current wall clock.
///
/// Like [`usid`], this function fills the entropy field from the process-wide lock-protected
/// source.
///
/// # Examples
///
/// ```rust
/// let id = usid::usid_ns();
/// println!("{}", id); // e.g., "17d12e5b71e9ff4a62a0f2a09e44d31c7721"
/// ```
pub fn usid_ns() -> UsidNanos {
    let mut source = global_source().get();
    UsidNanos::must_new(unix_ts_ns(SystemTime::now()), Some(&mut source))
}

mod inner {
    #[cfg(unix)]
    use std::sync::atomic::{AtomicU32, Ordering};

    use rand::rngs::adapter::ReseedingRng;
    use rand::rngs::OsRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Core;

    use crate::LockedRng;

    /// The random number generator behind the process-wide source.
    ///
    /// The global source currently employs [`ChaCha12Core`] with a [`ReseedingRng`] wrapper to
    /// emulate the strategy used by [`rand::rngs::ThreadRng`].
    type GlobalRng = ReseedingRng<ChaCha12Core, OsRng>;

    fn fresh_rng() -> GlobalRng {
        let core = ChaCha12Core::from_rng(OsRng)
            .expect("usid: could not initialize global entropy source");
        ReseedingRng::new(core, 1024 * 64, OsRng)
    }

    /// A thin wrapper to reset the state when the process ID changes (i.e., upon Unix forks).
    pub struct GlobalSource {
        #[cfg(unix)]
        pid: AtomicU32,
        source: LockedRng<GlobalRng>,
    }

    impl Default for GlobalSource {
        fn default() -> Self {
            Self {
                #[cfg(unix)]
                pid: AtomicU32::new(std::process::id()),
                source: LockedRng::with_rng(fresh_rng()),
            }
        }
    }

    impl GlobalSource {
        /// Returns the shared source handle, replacing the generator on Unix if the process ID
        /// has changed.
        pub fn get(&self) -> &LockedRng<GlobalRng> {
            #[cfg(unix)]
            {
                let pid = std::process::id();
                if self.pid.load(Ordering::Relaxed) != pid {
                    // racing callers may install two fresh generators; either one is usable
                    self.source.reset(fresh_rng());
                    self.pid.store(pid, Ordering::Relaxed);
                }
            }
            &self.source
        }
    }
}

#[cfg(test)]
mod tests_ms {
    use super::usid;

    const N_SAMPLES: usize = 100_000;
    thread_local!(static SAMPLES: Vec<String> = (0..N_SAMPLES).map(|_| usid().into()).collect());

    /// Generates canonical string
    #[test]
    fn generates_canonical_string() {
        let re = regex::Regex::new(r"^[0-9a-f]{32}$").unwrap();
        SAMPLES.with(|samples| {
            for e in samples {
                assert!(re.is_match(e));
            }
        });
    }

    /// Generates 100k identifiers without collision
    #[test]
    fn generates_100k_identifiers_without_collision() {
        use std::collections::HashSet;
        SAMPLES.with(|samples| {
            let s: HashSet<&String> = samples.iter().collect();
            assert_eq!(s.len(), N_SAMPLES);
        });
    }

    /// Encodes up-to-date timestamp
    #[test]
    fn encodes_up_to_date_timestamp() {
        use std::time;
        for _ in 0..10_000 {
            let ts_now = (time::SystemTime::now()
                .duration_since(time::UNIX_EPOCH)
                .expect("clock may have gone backwards")
                .as_millis()) as i64;
            let timestamp = usid().timestamp() as i64;
            assert!((ts_now - timestamp).abs() < 16);
        }
    }

    /// Generates no colliding identifiers under multithreading
    #[test]
    fn generates_no_colliding_identifiers_under_multithreading(
    ) -> Result<(), Box<dyn std::error::Error>> {
        use std::{collections::HashSet, sync::mpsc, thread};

        let (tx, rx) = mpsc::channel();
        for _ in 0..4 {
            let tx = tx.clone();
            thread::Builder::new()
                .spawn(move || {
                    for _ in 0..10_000 {
                        tx.send(usid()).unwrap();
                    }
                })
                .map_err(|err| format!("failed to spawn thread: {:?}", err))?;
        }
        drop(tx);

        let mut s = HashSet::new();
        while let Ok(e) = rx.recv() {
            s.insert(e);
        }

        assert_eq!(s.len(), 4 * 10_000);
        Ok(())
    }
}

#[cfg(test)]
mod tests_ns {
    use super::usid_ns;

    const N_SAMPLES: usize = 10_000;
    thread_local!(
        static SAMPLES: Vec<String> = (0..N_SAMPLES).map(|_| usid_ns().into()).collect()
    );

    /// Generates canonical string
    #[test]
    fn generates_canonical_string() {
        let re = regex::Regex::new(r"^[0-9a-f]{36}$").unwrap();
        SAMPLES.with(|samples| {
            for e in samples {
                assert!(re.is_match(e));
            }
        });
    }

    /// Generates 10k identifiers without collision
    #[test]
    fn generates_10k_identifiers_without_collision() {
        use std::collections::HashSet;
        SAMPLES.with(|samples| {
            let s: HashSet<&String> = samples.iter().collect();
            assert_eq!(s.len(), N_SAMPLES);
        });
    }

    /// Encodes up-to-date timestamp
    #[test]
    fn encodes_up_to_date_timestamp() {
        use std::time;
        for _ in 0..1_000 {
            let ts_now = (time::SystemTime::now()
                .duration_since(time::UNIX_EPOCH)
                .expect("clock may have gone backwards")
                .as_nanos()) as i64;
            let timestamp = usid_ns().timestamp() as i64;
            // allow a generous second of skew between the two clock reads
            assert!((ts_now - timestamp).abs() < 1_000_000_000);
        }
    }
}
