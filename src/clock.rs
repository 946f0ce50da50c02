//! Monotonic timestamp source for decoded samples.
//!
//! `Instant` is monotonic and MT-safe on all supported platforms; the anchor
//! is fixed at first use so every timestamp in a session shares one origin.

use std::sync::OnceLock;
use std::time::Instant;

static EPOCH: OnceLock<Instant> = OnceLock::new();

/// Nanoseconds elapsed since the first call in this process.
///
/// Decoders stamp each emitted [`Sample`](crate::types::Sample) with this
/// value at decode time.
pub fn monotonic_ns() -> u64 {
    EPOCH.get_or_init(Instant::now).elapsed().as_nanos() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_are_monotonic() {
        let a = monotonic_ns();
        let b = monotonic_ns();
        assert!(b >= a);
    }
}
