//! Binary telemetry stream decoding.
//!
//! Raw bytes arrive in arbitrary chunks; frames are `0x00`-terminated COBS
//! packets whose first decoded byte selects a typed decoder from the shared
//! registry. Compressed wrapper tags (zlib, tamp) expand into further COBS
//! frames and re-enter the pipeline recursively; the extension tag defers to
//! a secondary tag byte. Anything malformed is logged and skipped; one bad
//! frame never interrupts the stream.

pub mod registry;

mod image;

use core::fmt;
use std::io::Read;

use crate::codec::adpcm::AdpcmCodec;
use crate::codec::cobs::{self, CobsError};
use crate::codec::dct::Dct8;
use crate::codec::tamp;
use crate::types::{Payload, Sample, Scalar, Vector};
use self::registry::{TagKind, TypeRegistry};

/// End-of-packet marker, fixed by the COBS framing.
pub const EOP: u8 = 0x00;

/// Compressed wrappers may nest this deep before their frames are dropped.
const MAX_RECURSION: usize = 3;

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Why a frame failed to decode. Per-frame: logged, skipped, never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// COBS unstuffing failed.
    Framing(CobsError),
    /// A zlib or tamp wrapper body did not decompress.
    Decompression(String),
    /// The typed body did not match its registry classification.
    TypeDecode(TypeDecodeError),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::Framing(e) => write!(f, "framing: {e}"),
            FrameError::Decompression(e) => write!(f, "decompression: {e}"),
            FrameError::TypeDecode(e) => write!(f, "type decode: {e}"),
        }
    }
}

impl std::error::Error for FrameError {}

impl From<CobsError> for FrameError {
    fn from(e: CobsError) -> Self {
        FrameError::Framing(e)
    }
}

impl From<TypeDecodeError> for FrameError {
    fn from(e: TypeDecodeError) -> Self {
        FrameError::TypeDecode(e)
    }
}

/// Typed-body decode failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDecodeError {
    /// Body was empty where at least one element is required.
    Empty { tag: u8 },
    /// Body length is not a non-zero multiple of element size × arity.
    Length { tag: u8, len: usize, unit: usize },
    /// Body shorter than a required fixed-size prefix.
    Truncated { tag: u8, need: usize, got: usize },
    /// Image geometry does not divide exactly.
    Geometry { tag: u8, detail: &'static str },
    /// Text body is not valid UTF-8.
    Utf8 { tag: u8 },
}

impl fmt::Display for TypeDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDecodeError::Empty { tag } => write!(f, "tag {tag}: empty body"),
            TypeDecodeError::Length { tag, len, unit } => {
                write!(f, "tag {tag}: body length {len} is not a multiple of {unit}")
            }
            TypeDecodeError::Truncated { tag, need, got } => {
                write!(f, "tag {tag}: need at least {need} bytes, got {got}")
            }
            TypeDecodeError::Geometry { tag, detail } => write!(f, "tag {tag}: {detail}"),
            TypeDecodeError::Utf8 { tag } => write!(f, "tag {tag}: body is not valid UTF-8"),
        }
    }
}

impl std::error::Error for TypeDecodeError {}

// ─────────────────────────────────────────────────────────────────────────────
// BinaryDecoder
// ─────────────────────────────────────────────────────────────────────────────

/// COBS-framed binary stream decoder.
///
/// Owns the cross-chunk packet accumulator and the codec state needed by
/// audio and image tags. One instance per connection; not for concurrent
/// use from multiple threads.
pub struct BinaryDecoder {
    partial_packet: Vec<u8>,
    registry: &'static TypeRegistry,
    mono_adpcm8: AdpcmCodec,
    mono_adpcm16: AdpcmCodec,
    stereo_adpcm8: AdpcmCodec,
    stereo_adpcm16: AdpcmCodec,
    dct: Dct8,
}

impl BinaryDecoder {
    pub fn new() -> BinaryDecoder {
        BinaryDecoder::with_registry(TypeRegistry::standard())
    }

    /// Decoder over a caller-shared registry.
    pub fn with_registry(registry: &'static TypeRegistry) -> BinaryDecoder {
        // the four fixed layouts are always valid configurations
        let adpcm = |ch, width| AdpcmCodec::new(ch, width).unwrap_or_else(|_| unreachable!());
        BinaryDecoder {
            partial_packet: Vec::new(),
            registry,
            mono_adpcm8: adpcm(1, 8),
            mono_adpcm16: adpcm(1, 16),
            stereo_adpcm8: adpcm(2, 8),
            stereo_adpcm16: adpcm(2, 16),
            dct: Dct8::new(),
        }
    }

    /// Bytes currently buffered waiting for an end-of-packet marker.
    pub fn pending(&self) -> usize {
        self.partial_packet.len()
    }

    /// Decode every completed frame in `new_data` (plus whatever was
    /// buffered). Samples come out in byte-stream order; frames from a
    /// compressed wrapper flatten into the list where the wrapper closed.
    pub fn process(&mut self, new_data: &[u8]) -> Vec<Sample> {
        let mut samples = Vec::new();
        if new_data.is_empty() {
            return samples;
        }
        self.partial_packet.extend_from_slice(new_data);

        let mut buffer = std::mem::take(&mut self.partial_packet);
        let tail_start = match buffer.iter().rposition(|&b| b == EOP) {
            Some(last_eop) => last_eop + 1,
            None => {
                // no complete frame yet
                self.partial_packet = buffer;
                return samples;
            }
        };
        self.partial_packet = buffer.split_off(tail_start);

        for frame in buffer.split(|&b| b == EOP) {
            if frame.is_empty() {
                continue;
            }
            if let Err(e) = self.handle_frame(frame, 0, &mut samples) {
                log::warn!("dropping frame: {e}");
            }
        }
        samples
    }

    /// Unstuff and dispatch one complete frame.
    fn handle_frame(
        &self,
        frame: &[u8],
        depth: usize,
        out: &mut Vec<Sample>,
    ) -> Result<(), FrameError> {
        let decoded = cobs::decode(frame)?;
        let Some((&tag, body)) = decoded.split_first() else {
            log::warn!("empty decoded packet");
            return Ok(());
        };

        match self.registry.entry(tag).kind {
            TagKind::ZlibWrapper => {
                let inner = inflate_zlib(body)?;
                self.process_nested(&inner, depth, out);
            }
            TagKind::TampWrapper => {
                let inner = tamp::decompress(body)
                    .map_err(|e| FrameError::Decompression(e.to_string()))?;
                self.process_nested(&inner, depth, out);
            }
            TagKind::Extension => {
                let Some((&secondary, ext_body)) = body.split_first() else {
                    log::warn!("extension frame without a secondary tag");
                    return Ok(());
                };
                if ext_body.is_empty() || secondary >= 250 {
                    log::warn!("unknown extension {secondary}, dropping");
                    return Ok(());
                }
                self.dispatch(secondary, ext_body, out)?;
            }
            _ => self.dispatch(tag, body, out)?,
        }
        Ok(())
    }

    /// Re-frame and decode the expansion of a compressed wrapper. The inner
    /// stream uses a scratch accumulator: it never mixes with the outer
    /// partial packet, and an unterminated inner tail is dropped.
    fn process_nested(&self, inner: &[u8], depth: usize, out: &mut Vec<Sample>) {
        if depth + 1 >= MAX_RECURSION {
            log::warn!("compressed frames nested deeper than {MAX_RECURSION}, dropping");
            return;
        }
        let complete = match inner.iter().rposition(|&b| b == EOP) {
            Some(last_eop) => &inner[..last_eop],
            None => {
                log::warn!("compressed wrapper held no complete frame");
                return;
            }
        };
        if inner.len() > complete.len() + 1 {
            log::debug!(
                "dropping {} unterminated bytes inside compressed wrapper",
                inner.len() - complete.len() - 1
            );
        }
        for frame in complete.split(|&b| b == EOP) {
            if frame.is_empty() {
                continue;
            }
            if let Err(e) = self.handle_frame(frame, depth + 1, out) {
                log::warn!("dropping nested frame: {e}");
            }
        }
    }

    /// Decode a typed body and append the resulting sample.
    fn dispatch(&self, tag: u8, body: &[u8], out: &mut Vec<Sample>) -> Result<(), FrameError> {
        let entry = self.registry.entry(tag);
        let payload = match entry.kind {
            TagKind::Unassigned | TagKind::Reserved => {
                log::debug!("unassigned tag {tag}, dropping frame");
                return Ok(());
            }
            TagKind::Utf8Text => decode_text(tag, body)?,
            TagKind::Bool => decode_bool(tag, body)?,
            TagKind::Bytes => decode_bytes(tag, body)?,
            TagKind::Numeric { kind, arity, scale } => {
                registry::decode_numeric(tag, kind, arity, scale, body)?
            }
            TagKind::AudioRaw { wide, stereo } => decode_audio_raw(tag, wide, stereo, body)?,
            TagKind::AudioAdpcm { wide, stereo } => {
                let codec = match (wide, stereo) {
                    (false, false) => &self.mono_adpcm8,
                    (false, true) => &self.stereo_adpcm8,
                    (true, false) => &self.mono_adpcm16,
                    (true, true) => &self.stereo_adpcm16,
                };
                let pcm = codec.decode(body);
                if stereo {
                    Payload::AudioStereo16(pcm)
                } else {
                    Payload::AudioMono16(pcm)
                }
            }
            TagKind::ImageGray8 => Payload::ImageGray8(image::decode_gray8(tag, body)?),
            TagKind::ImagePalette8 => Payload::ImageRgb8(image::decode_palette8(tag, body)?),
            TagKind::ImageRgb8 => Payload::ImageRgb8(image::decode_rgb8(tag, body)?),
            TagKind::ImageRgba8 => Payload::ImageRgba8(image::decode_rgba8(tag, body)?),
            TagKind::ImageGray8Dct => {
                Payload::ImageGray8(image::decode_gray8_dct(tag, body, &self.dct)?)
            }
            TagKind::ImageRgb8Dct => {
                Payload::ImageRgb8(image::decode_rgb8_dct(tag, body, &self.dct)?)
            }
            // wrappers and extensions are resolved in handle_frame
            TagKind::ZlibWrapper | TagKind::TampWrapper | TagKind::Extension => {
                log::debug!("wrapper tag {tag} via extension path, dropping");
                return Ok(());
            }
        };
        out.push(Sample::new(tag, entry.name, payload));
        Ok(())
    }
}

impl Default for BinaryDecoder {
    fn default() -> Self {
        BinaryDecoder::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Simple typed bodies
// ─────────────────────────────────────────────────────────────────────────────

fn inflate_zlib(body: &[u8]) -> Result<Vec<u8>, FrameError> {
    let mut out = Vec::new();
    flate2::read::ZlibDecoder::new(body)
        .read_to_end(&mut out)
        .map_err(|e| FrameError::Decompression(e.to_string()))?;
    Ok(out)
}

/// Tag 0: NUL-separated UTF-8 strings.
fn decode_text(tag: u8, body: &[u8]) -> Result<Payload, TypeDecodeError> {
    let mut strings = Vec::new();
    for part in body.split(|&b| b == 0) {
        if part.is_empty() {
            continue;
        }
        let s = std::str::from_utf8(part).map_err(|_| TypeDecodeError::Utf8 { tag })?;
        strings.push(s.to_owned());
    }
    Ok(Payload::Text(strings))
}

fn decode_bool(tag: u8, body: &[u8]) -> Result<Payload, TypeDecodeError> {
    match body.len() {
        0 => Err(TypeDecodeError::Empty { tag }),
        1 => Ok(Payload::Scalar(Scalar::Bool(body[0] != 0))),
        _ => Ok(Payload::Vector(Vector::Bool(
            body.iter().map(|&b| b != 0).collect(),
        ))),
    }
}

fn decode_bytes(tag: u8, body: &[u8]) -> Result<Payload, TypeDecodeError> {
    match body.len() {
        0 => Err(TypeDecodeError::Empty { tag }),
        1 => Ok(Payload::Scalar(Scalar::U8(body[0]))),
        _ => Ok(Payload::Bytes(body.to_vec())),
    }
}

/// Raw PCM audio (tags 200–203).
fn decode_audio_raw(
    tag: u8,
    wide: bool,
    stereo: bool,
    body: &[u8],
) -> Result<Payload, TypeDecodeError> {
    let sample_size = if wide { 2 } else { 1 };
    let unit = sample_size * if stereo { 2 } else { 1 };
    if body.is_empty() {
        return Err(TypeDecodeError::Empty { tag });
    }
    if body.len() % unit != 0 {
        return Err(TypeDecodeError::Length {
            tag,
            len: body.len(),
            unit,
        });
    }
    Ok(if wide {
        let pcm: Vec<i16> = body
            .chunks_exact(2)
            .map(|p| i16::from_le_bytes([p[0], p[1]]))
            .collect();
        if stereo {
            Payload::AudioStereo16(pcm)
        } else {
            Payload::AudioMono16(pcm)
        }
    } else {
        let pcm: Vec<i8> = body.iter().map(|&b| b as i8).collect();
        if stereo {
            Payload::AudioStereo8(pcm)
        } else {
            Payload::AudioMono8(pcm)
        }
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
