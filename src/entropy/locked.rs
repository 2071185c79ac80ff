//! A thread-safe byte stream over a non-thread-safe generator.

use std::sync::Mutex;

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

use super::{time_seed, EntropySource};

/// A lock-protected entropy source wrapping a non-thread-safe pseudo-random generator.
///
/// Any [`RngCore`] generator can be wrapped; the default is a time-seeded
/// [`SmallRng`]. The wrapper keeps a small read-ahead buffer: one 63-bit draw from the inner
/// generator is consumed a byte at a time, so up to seven output bytes share a single
/// generator call. The draw, the buffer, and the inner generator are all guarded by a mutex
/// scoped to the fill call, which means concurrent callers serialize only on the generator,
/// not on identifier construction as a whole.
///
/// The source also implements [`EntropySource`] for shared references, so a single instance
/// can fill buffers from any number of threads:
///
/// ```rust
/// use std::thread;
/// use usid::{EntropySource, LockedRng};
///
/// let source = LockedRng::new();
/// thread::scope(|s| {
///     for _ in 0..4 {
///         let mut source = &source;
///         s.spawn(move || {
///             let mut buffer = [0u8; 10];
///             source.fill(&mut buffer).unwrap();
///         });
///     }
/// });
/// ```
#[derive(Debug)]
pub struct LockedRng<R = SmallRng> {
    inner: Mutex<Inner<R>>,
}

#[derive(Debug)]
struct Inner<R> {
    rng: R,

    /// Remaining bytes of the last 63-bit draw, consumed from the low end.
    read_val: u64,

    /// Number of usable bytes left in `read_val` (0 to 7).
    read_pos: u8,
}

impl LockedRng<SmallRng> {
    /// Creates a source wrapping a time-seeded [`SmallRng`].
    pub fn new() -> Self {
        Self::with_rng(SmallRng::seed_from_u64(time_seed()))
    }
}

impl Default for LockedRng<SmallRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore> LockedRng<R> {
    /// Creates a source wrapping the given generator.
    pub fn with_rng(rng: R) -> Self {
        Self {
            inner: Mutex::new(Inner {
                rng,
                read_val: 0,
                read_pos: 0,
            }),
        }
    }

    /// Replaces the wrapped generator, discarding any bytes buffered from the old one.
    pub(crate) fn reset(&self, rng: R) {
        let mut inner = self
            .inner
            .lock()
            .expect("usid: could not lock entropy source");
        inner.rng = rng;
        inner.read_val = 0;
        inner.read_pos = 0;
    }
}

impl<R: RngCore> Inner<R> {
    fn read(&mut self, dest: &mut [u8]) {
        for e in dest.iter_mut() {
            if self.read_pos == 0 {
                self.read_val = self.rng.next_u64() >> 1;
                self.read_pos = 7;
            }
            *e = self.read_val as u8;
            self.read_val >>= 8;
            self.read_pos -= 1;
        }
    }
}

impl<R: RngCore> EntropySource for LockedRng<R> {
    fn fill(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        (&*self).fill(dest)
    }
}

impl<R: RngCore> EntropySource for &LockedRng<R> {
    fn fill(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner
            .lock()
            .expect("usid: could not lock entropy source")
            .read(dest);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::LockedRng;
    use crate::EntropySource;
    use rand::rngs::mock::StepRng;

    /// Consumes one 63-bit draw a byte at a time from the low end
    #[test]
    fn consumes_63_bit_draw_a_byte_at_a_time() {
        // 0x0102030405060708 >> 1 == 0x0081018202830384
        let mut source = LockedRng::with_rng(StepRng::new(0x0102_0304_0506_0708, 2));

        let mut buffer = [0u8; 7];
        source.fill(&mut buffer).unwrap();
        assert_eq!(buffer, [0x84, 0x03, 0x83, 0x02, 0x82, 0x01, 0x81]);

        // the next draw is 0x010203040506070a >> 1 == 0x0081018202830385
        source.fill(&mut buffer).unwrap();
        assert_eq!(buffer, [0x85, 0x03, 0x83, 0x02, 0x82, 0x01, 0x81]);
    }

    /// Preserves the read-ahead buffer across fill calls
    #[test]
    fn preserves_read_ahead_buffer_across_fill_calls() {
        let mut whole = LockedRng::with_rng(StepRng::new(0x0102_0304_0506_0708, 2));
        let mut split = LockedRng::with_rng(StepRng::new(0x0102_0304_0506_0708, 2));

        let mut expected = [0u8; 14];
        whole.fill(&mut expected).unwrap();

        let mut actual = [0u8; 14];
        split.fill(&mut actual[..3]).unwrap();
        split.fill(&mut actual[3..10]).unwrap();
        split.fill(&mut actual[10..]).unwrap();
        assert_eq!(actual, expected);
    }

    /// Discards buffered bytes when the generator is replaced
    #[test]
    fn discards_buffered_bytes_when_generator_is_replaced() {
        let mut source = LockedRng::with_rng(StepRng::new(0x0102_0304_0506_0708, 2));

        let mut buffer = [0u8; 3];
        source.fill(&mut buffer).unwrap();
        assert_eq!(buffer, [0x84, 0x03, 0x83]);

        // the fresh generator starts a new draw instead of continuing the old one
        source.reset(StepRng::new(0x0102_0304_0506_0708, 2));
        source.fill(&mut buffer).unwrap();
        assert_eq!(buffer, [0x84, 0x03, 0x83]);
    }

    /// Fills through shared references without disturbing the byte stream
    #[test]
    fn fills_through_shared_references() {
        let source = LockedRng::with_rng(StepRng::new(0x0102_0304_0506_0708, 2));
        let mut a = &source;
        let mut b = &source;

        let mut buffer = [0u8; 3];
        a.fill(&mut buffer).unwrap();
        assert_eq!(buffer, [0x84, 0x03, 0x83]);
        b.fill(&mut buffer).unwrap();
        assert_eq!(buffer, [0x02, 0x82, 0x01]);
    }
}
