//! Stream throughput accounting.
//!
//! The transports report how many bytes they moved; the UI polls once per
//! interval and shows bytes/second. Counters reset on every reading so each
//! figure covers exactly one interval.

use std::time::{Duration, Instant};

/// RX/TX rates in bytes per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rates {
    pub rx_bytes_per_s: f64,
    pub tx_bytes_per_s: f64,
}

/// Interval-based Δbytes/Δtime accumulator.
pub struct Throughput {
    interval: Duration,
    last: Instant,
    bytes_rx: u64,
    bytes_tx: u64,
}

impl Throughput {
    /// Accumulator reporting once per `interval`.
    pub fn new(interval: Duration) -> Throughput {
        Throughput {
            interval,
            last: Instant::now(),
            bytes_rx: 0,
            bytes_tx: 0,
        }
    }

    pub fn record_rx(&mut self, bytes: usize) {
        self.bytes_rx += bytes as u64;
    }

    pub fn record_tx(&mut self, bytes: usize) {
        self.bytes_tx += bytes as u64;
    }

    /// A reading when the interval has elapsed, `None` otherwise.
    pub fn poll(&mut self) -> Option<Rates> {
        if self.last.elapsed() < self.interval {
            return None;
        }
        Some(self.sample())
    }

    /// Force a reading over the elapsed time and reset the counters.
    pub fn sample(&mut self) -> Rates {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last).as_secs_f64();
        self.last = now;
        let rates = if elapsed > 0.0 {
            Rates {
                rx_bytes_per_s: self.bytes_rx as f64 / elapsed,
                tx_bytes_per_s: self.bytes_tx as f64 / elapsed,
            }
        } else {
            Rates {
                rx_bytes_per_s: 0.0,
                tx_bytes_per_s: 0.0,
            }
        };
        self.bytes_rx = 0;
        self.bytes_tx = 0;
        rates
    }
}

impl Default for Throughput {
    fn default() -> Self {
        Throughput::new(Duration::from_secs(1))
    }
}
