// serialui-core: telemetry ingest for serial / BLE byte streams

pub mod binary;
pub mod clock;
pub mod codec;
pub mod ring;
pub mod stats;
pub mod text;
pub mod types;

// ─────────────────────────────────────────────────────────────────────────────
// Top-level convenience re-exports for the most common API entry points.
// ─────────────────────────────────────────────────────────────────────────────

/// Binary stream decoder: COBS frames → typed samples.
pub use binary::BinaryDecoder;
/// Per-frame error classification of the binary pipeline.
pub use binary::FrameError;
/// Shared tag → (name, decoder) table.
pub use binary::registry::TypeRegistry;

/// Arduino-Serial-Plotter-style text decoder (sample-list API).
pub use text::TextDecoder;
/// Text decoder variant producing a dense f64 matrix with a stable column map.
pub use text::TextMatrixDecoder;
/// Text parse failure (strict mode only).
pub use text::ParseError;

/// Bounded 2-D circular store backing the live plot.
pub use ring::RingBuffer;
pub use ring::RingError;

/// Base-N integer codec with fixed digit width.
pub use codec::base::BaseCodec;
/// Printable-ASCII variant of [`BaseCodec`] (190-character alphabet).
pub use codec::base::PrintableCodec;
/// IMA ADPCM mono/stereo audio codec.
pub use codec::adpcm::AdpcmCodec;

/// Decoded telemetry unit.
pub use types::{Mat, Payload, Sample, Scalar, Vector};

/// RX/TX throughput accumulator.
pub use stats::Throughput;
