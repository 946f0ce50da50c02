//! Base-N digit codecs.
//!
//! [`BaseCodec`] maps an unsigned big-endian integer of a fixed byte width
//! onto a fixed number of digits in base `B` (2 ≤ B ≤ 255). The digit count
//! for a width `L` is the smallest `D` with `B^D ≥ 2^(8L)`, so the mapping is
//! a bijection over the representable range and output length is independent
//! of the value. [`PrintableCodec`] is the same construction over a
//! 190-character printable alphabet (code points 32–126 and 161–255), useful
//! when binary data must survive a text terminal.
//!
//! All arithmetic is long division / multiply-add on byte limbs; no floating
//! point log is involved, so digit counts are exact for every width.

use core::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseError {
    /// Base outside 2..=255 at construction.
    Config(u16),
    /// A digit ≥ base was found while decoding.
    InvalidDigit { digit: u8, base: u8 },
    /// A character outside the printable alphabet was found while decoding.
    InvalidChar(char),
    /// The decoded value does not fit in the requested byte width.
    Overflow { width: usize },
}

impl fmt::Display for BaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseError::Config(base) => write!(f, "base must be in 2..=255, got {base}"),
            BaseError::InvalidDigit { digit, base } => {
                write!(f, "digit {digit} is not valid in base {base}")
            }
            BaseError::InvalidChar(c) => write!(f, "character {c:?} is not in the alphabet"),
            BaseError::Overflow { width } => {
                write!(f, "decoded value exceeds {width} bytes")
            }
        }
    }
}

impl std::error::Error for BaseError {}

// ─────────────────────────────────────────────────────────────────────────────
// Limb arithmetic helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Divide the big-endian byte integer in `num` by `base` in place; returns
/// the remainder.
fn div_rem_in_place(num: &mut [u8], base: u8) -> u8 {
    let mut rem: u32 = 0;
    for byte in num.iter_mut() {
        let cur = (rem << 8) | *byte as u32;
        *byte = (cur / base as u32) as u8;
        rem = cur % base as u32;
    }
    rem as u8
}

fn is_zero(num: &[u8]) -> bool {
    num.iter().all(|&b| b == 0)
}

/// `acc = acc * base + digit` on a big-endian byte integer of fixed width.
/// Errors when the result no longer fits.
fn mul_add_in_place(acc: &mut [u8], base: u8, digit: u8) -> Result<(), BaseError> {
    let mut carry: u32 = digit as u32;
    for byte in acc.iter_mut().rev() {
        let cur = *byte as u32 * base as u32 + carry;
        *byte = (cur & 0xFF) as u8;
        carry = cur >> 8;
    }
    if carry != 0 {
        return Err(BaseError::Overflow { width: acc.len() });
    }
    Ok(())
}

/// Smallest `D` with `base^D ≥ 2^(8 * width)`: the digit count of the
/// largest `width`-byte value.
fn digits_for_width(base: u8, width: usize) -> usize {
    if width == 0 {
        return 0;
    }
    let mut max = vec![0xFFu8; width];
    let mut digits = 0;
    while !is_zero(&max) {
        div_rem_in_place(&mut max, base);
        digits += 1;
    }
    digits
}

// ─────────────────────────────────────────────────────────────────────────────
// BaseCodec
// ─────────────────────────────────────────────────────────────────────────────

/// Fixed-width integer ↔ base-N digit codec. Digits are bytes in `[0, base)`.
pub struct BaseCodec {
    base: u8,
    // Digit counts for the common widths 1, 2, 4, 8, 16.
    digit_cache: [(usize, usize); 5],
}

const CACHED_WIDTHS: [usize; 5] = [1, 2, 4, 8, 16];

impl BaseCodec {
    pub fn new(base: u16) -> Result<BaseCodec, BaseError> {
        if !(2..=255).contains(&base) {
            return Err(BaseError::Config(base));
        }
        let base = base as u8;
        let mut digit_cache = [(0usize, 0usize); 5];
        for (slot, &w) in digit_cache.iter_mut().zip(CACHED_WIDTHS.iter()) {
            *slot = (w, digits_for_width(base, w));
        }
        Ok(BaseCodec { base, digit_cache })
    }

    pub fn base(&self) -> u8 {
        self.base
    }

    /// Number of digits produced for a `width`-byte input.
    pub fn digits(&self, width: usize) -> usize {
        for &(w, d) in &self.digit_cache {
            if w == width {
                return d;
            }
        }
        digits_for_width(self.base, width)
    }

    /// Encode `data` (big-endian integer) into exactly `digits(width)`
    /// digits, left-padded with the zero digit. Empty input encodes to an
    /// empty output.
    pub fn encode(&self, data: &[u8], width: usize) -> Vec<u8> {
        if data.is_empty() {
            return Vec::new();
        }
        let ndigits = self.digits(width);
        let mut value = data.to_vec();
        let mut out = vec![0u8; ndigits];
        for slot in out.iter_mut().rev() {
            if is_zero(&value) {
                break;
            }
            *slot = div_rem_in_place(&mut value, self.base);
        }
        out
    }

    /// Decode digits back into a big-endian integer of exactly `width`
    /// bytes. Empty input decodes to an empty output.
    pub fn decode(&self, digits: &[u8], width: usize) -> Result<Vec<u8>, BaseError> {
        if digits.is_empty() {
            return Ok(Vec::new());
        }
        let mut out = vec![0u8; width];
        for &d in digits {
            if d >= self.base {
                return Err(BaseError::InvalidDigit {
                    digit: d,
                    base: self.base,
                });
            }
            mul_add_in_place(&mut out, self.base, d)?;
        }
        Ok(out)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PrintableCodec
// ─────────────────────────────────────────────────────────────────────────────

/// Binary ↔ printable string codec over the 190-character alphabet of
/// code points 32–126 and 161–255 (control characters excluded).
pub struct PrintableCodec {
    inner: BaseCodec,
}

/// Alphabet size: 95 printable ASCII + 95 extended characters.
pub const PRINTABLE_BASE: u16 = 190;

fn digit_to_char(d: u8) -> char {
    let cp = if d < 95 { 32 + d as u32 } else { 161 + (d - 95) as u32 };
    char::from_u32(cp).unwrap_or('\u{FFFD}')
}

fn char_to_digit(c: char) -> Result<u8, BaseError> {
    match c as u32 {
        cp @ 32..=126 => Ok((cp - 32) as u8),
        cp @ 161..=255 => Ok((cp - 161 + 95) as u8),
        _ => Err(BaseError::InvalidChar(c)),
    }
}

impl PrintableCodec {
    pub fn new() -> PrintableCodec {
        // 190 is always a valid base
        let inner = BaseCodec::new(PRINTABLE_BASE).unwrap_or_else(|_| unreachable!());
        PrintableCodec { inner }
    }

    /// Number of characters produced for a `width`-byte input.
    pub fn digits(&self, width: usize) -> usize {
        self.inner.digits(width)
    }

    /// The full alphabet in digit order.
    pub fn alphabet(&self) -> String {
        (0..PRINTABLE_BASE as u8).map(digit_to_char).collect()
    }

    pub fn encode(&self, data: &[u8], width: usize) -> String {
        self.inner
            .encode(data, width)
            .into_iter()
            .map(digit_to_char)
            .collect()
    }

    pub fn decode(&self, encoded: &str, width: usize) -> Result<Vec<u8>, BaseError> {
        let digits: Vec<u8> = encoded
            .chars()
            .map(char_to_digit)
            .collect::<Result<_, _>>()?;
        self.inner.decode(&digits, width)
    }
}

impl Default for PrintableCodec {
    fn default() -> Self {
        PrintableCodec::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
