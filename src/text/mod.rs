//! Arduino-Serial-Plotter-style text stream decoding.
//!
//! Lines carry labeled or unlabeled scalars/vectors:
//!
//! ```text
//! Voltage: 12, 11.8, 11.6
//! 0.23 0.01 0.45, 35.5
//! ```
//!
//! Channels are separated by commas or semicolons, vector elements by
//! whitespace, labels match `[A-Za-z_][A-Za-z0-9_]*:`. Two decoders share
//! one tokenizer: [`TextDecoder`] emits per-channel [`Sample`]s for the
//! generic pipeline, [`TextMatrixDecoder`] builds a dense `(rows × cols)`
//! f64 matrix with a stable column map for plotting.

mod matrix;
mod parse;

pub use self::matrix::TextMatrixDecoder;
pub use self::parse::ParseError;

use self::parse::Tokenizer;
use crate::types::{Payload, Sample, Vector};

/// Tag used for samples produced by the text path (f32/f64 float family).
pub const TEXT_SAMPLE_TAG: u8 = 10;

// ─────────────────────────────────────────────────────────────────────────────
// Options
// ─────────────────────────────────────────────────────────────────────────────

/// Text decoder configuration.
#[derive(Debug, Clone)]
pub struct TextOptions {
    /// End-of-line byte sequence. Empty means no framing: every processed
    /// chunk is one line.
    pub eol: Vec<u8>,
    /// Parse `label:` introducers.
    pub labels: bool,
    /// Abort a batch on the first malformed token instead of recording NaN.
    pub strict: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        TextOptions {
            eol: b"\n".to_vec(),
            labels: true,
            strict: false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Line framing shared by both text decoders
// ─────────────────────────────────────────────────────────────────────────────

/// Append `new_data` and drain completed lines; the unterminated tail stays
/// in `buffer` for the next call. An empty `eol` drains the whole buffer as
/// a single line.
fn split_lines(buffer: &mut Vec<u8>, new_data: &[u8], eol: &[u8]) -> Vec<Vec<u8>> {
    buffer.extend_from_slice(new_data);
    if eol.is_empty() {
        let line = std::mem::take(buffer);
        return if line.is_empty() { Vec::new() } else { vec![line] };
    }
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i + eol.len() <= buffer.len() {
        if &buffer[i..i + eol.len()] == eol {
            lines.push(buffer[start..i].to_vec());
            i += eol.len();
            start = i;
        } else {
            i += 1;
        }
    }
    buffer.drain(..start);
    lines
}

// ─────────────────────────────────────────────────────────────────────────────
// TextDecoder
// ─────────────────────────────────────────────────────────────────────────────

/// Line-framed text decoder emitting one [`Sample`] per channel.
pub struct TextDecoder {
    opts: TextOptions,
    partial_line: Vec<u8>,
    tokenizer: Tokenizer,
}

impl TextDecoder {
    pub fn new() -> TextDecoder {
        TextDecoder::with_options(TextOptions::default())
    }

    pub fn with_options(opts: TextOptions) -> TextDecoder {
        TextDecoder {
            opts,
            partial_line: Vec::new(),
            tokenizer: Tokenizer::new(),
        }
    }

    /// Bytes currently buffered waiting for a line terminator.
    pub fn pending(&self) -> usize {
        self.partial_line.len()
    }

    /// Decode every completed line in `new_data` (plus whatever was
    /// buffered) into tag-10 samples. Channel order follows the byte stream.
    pub fn process(&mut self, new_data: &[u8]) -> Result<Vec<Sample>, ParseError> {
        if new_data.is_empty() {
            return Ok(Vec::new());
        }
        let lines = split_lines(&mut self.partial_line, new_data, &self.opts.eol);

        let mut samples = Vec::new();
        for (idx, raw) in lines.iter().enumerate() {
            let line_no = idx + 1;
            let line = decode_line(raw, self.opts.strict, line_no)?;
            if line.trim().is_empty() {
                continue;
            }
            let channels =
                self.tokenizer
                    .parse_line(&line, self.opts.labels, self.opts.strict, line_no)?;
            for ch in channels {
                samples.push(Sample::new(
                    TEXT_SAMPLE_TAG,
                    ch.name,
                    Payload::Vector(Vector::F64(ch.values)),
                ));
            }
        }
        Ok(samples)
    }
}

impl Default for TextDecoder {
    fn default() -> Self {
        TextDecoder::new()
    }
}

/// UTF-8 decode one line. Lossy when lenient, an error when strict.
fn decode_line(raw: &[u8], strict: bool, line_no: usize) -> Result<String, ParseError> {
    match std::str::from_utf8(raw) {
        Ok(s) => Ok(s.to_owned()),
        Err(_) if strict => Err(ParseError::Utf8 { line: line_no }),
        Err(_) => Ok(String::from_utf8_lossy(raw).into_owned()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
