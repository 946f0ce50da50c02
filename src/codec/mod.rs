//! Byte-level codecs used by the stream decoders.
//!
//! Everything here is a pure transformation: no I/O, no shared state, no
//! blocking. The binary decoder composes these; they are also usable on
//! their own (e.g. the printable codec for terminal-safe transport).

pub mod adpcm;
pub mod base;
pub mod cobs;
pub mod dct;
pub mod rle;
pub mod tamp;
