//! Image body decoders (tags 220–225).
//!
//! Every image body starts with a little-endian u16 line count; the
//! remainder is pixel data whose width must divide exactly. A remainder is
//! a decode error, never a ragged image. The DCT variants carry
//! run-length-encoded 8×8 coefficient blocks laid out row-major; color DCT
//! splits the coefficient stream into three equal planes.

use byteorder::{ByteOrder, LittleEndian};

use super::TypeDecodeError;
use crate::codec::dct::{Dct8, BLOCK};
use crate::codec::rle;
use crate::types::Image;

/// Split the u16 line-count header from the pixel data.
fn split_header(tag: u8, body: &[u8]) -> Result<(usize, &[u8]), TypeDecodeError> {
    if body.len() < 2 {
        return Err(TypeDecodeError::Truncated {
            tag,
            need: 2,
            got: body.len(),
        });
    }
    let lines = LittleEndian::read_u16(&body[..2]) as usize;
    if lines == 0 {
        return Err(TypeDecodeError::Geometry {
            tag,
            detail: "zero line count",
        });
    }
    Ok((lines, &body[2..]))
}

/// Pixel columns from a byte count that must divide into `lines` rows of
/// `channels`-byte pixels.
fn columns(tag: u8, data_len: usize, lines: usize, channels: usize) -> Result<usize, TypeDecodeError> {
    let row_unit = lines * channels;
    if data_len == 0 || data_len % row_unit != 0 {
        return Err(TypeDecodeError::Geometry {
            tag,
            detail: "pixel count is not a multiple of the line count",
        });
    }
    Ok(data_len / row_unit)
}

pub(super) fn decode_gray8(tag: u8, body: &[u8]) -> Result<Image, TypeDecodeError> {
    let (lines, data) = split_header(tag, body)?;
    let cols = columns(tag, data.len(), lines, 1)?;
    Ok(Image::new(lines, cols, 1, data.to_vec()))
}

/// 8-bit paletted image: 256 RGB triplets follow the header, then one
/// palette index per pixel. Expands to interleaved RGB.
pub(super) fn decode_palette8(tag: u8, body: &[u8]) -> Result<Image, TypeDecodeError> {
    const PALETTE_LEN: usize = 256 * 3;
    let (lines, data) = split_header(tag, body)?;
    if data.len() < PALETTE_LEN {
        return Err(TypeDecodeError::Truncated {
            tag,
            need: PALETTE_LEN + 2,
            got: body.len(),
        });
    }
    let (palette, indices) = data.split_at(PALETTE_LEN);
    let cols = columns(tag, indices.len(), lines, 1)?;
    let mut rgb = Vec::with_capacity(indices.len() * 3);
    for &idx in indices {
        let at = idx as usize * 3;
        rgb.extend_from_slice(&palette[at..at + 3]);
    }
    Ok(Image::new(lines, cols, 3, rgb))
}

pub(super) fn decode_rgb8(tag: u8, body: &[u8]) -> Result<Image, TypeDecodeError> {
    let (lines, data) = split_header(tag, body)?;
    let cols = columns(tag, data.len(), lines, 3)?;
    Ok(Image::new(lines, cols, 3, data.to_vec()))
}

pub(super) fn decode_rgba8(tag: u8, body: &[u8]) -> Result<Image, TypeDecodeError> {
    let (lines, data) = split_header(tag, body)?;
    let cols = columns(tag, data.len(), lines, 4)?;
    Ok(Image::new(lines, cols, 4, data.to_vec()))
}

// ─────────────────────────────────────────────────────────────────────────────
// DCT-compressed variants
// ─────────────────────────────────────────────────────────────────────────────

pub(super) fn decode_gray8_dct(
    tag: u8,
    body: &[u8],
    dct: &Dct8,
) -> Result<Image, TypeDecodeError> {
    let (lines, data) = split_header(tag, body)?;
    let coeffs = expand_coefficients(tag, data)?;
    let plane = reconstruct_plane(tag, &coeffs, lines, dct)?;
    let cols = plane.len() / lines;
    Ok(Image::new(lines, cols, 1, plane))
}

pub(super) fn decode_rgb8_dct(tag: u8, body: &[u8], dct: &Dct8) -> Result<Image, TypeDecodeError> {
    let (lines, data) = split_header(tag, body)?;
    let coeffs = expand_coefficients(tag, data)?;
    if coeffs.len() % 3 != 0 {
        return Err(TypeDecodeError::Geometry {
            tag,
            detail: "coefficient stream does not split into three planes",
        });
    }
    let third = coeffs.len() / 3;
    let r = reconstruct_plane(tag, &coeffs[..third], lines, dct)?;
    let g = reconstruct_plane(tag, &coeffs[third..2 * third], lines, dct)?;
    let b = reconstruct_plane(tag, &coeffs[2 * third..], lines, dct)?;

    let cols = r.len() / lines;
    let mut rgb = Vec::with_capacity(r.len() * 3);
    for i in 0..r.len() {
        rgb.push(r[i]);
        rgb.push(g[i]);
        rgb.push(b[i]);
    }
    Ok(Image::new(lines, cols, 3, rgb))
}

/// RLE-expand the coefficient stream; each byte widens to one i16
/// coefficient.
fn expand_coefficients(tag: u8, data: &[u8]) -> Result<Vec<i16>, TypeDecodeError> {
    let bytes = rle::decode(data).map_err(|_| TypeDecodeError::Geometry {
        tag,
        detail: "run-length data is not whole (value, count) pairs",
    })?;
    Ok(bytes.into_iter().map(|b| b as i16).collect())
}

/// Inverse-transform a coefficient stream into one `lines`-high plane of
/// rounded, clamped pixels. Blocks fill each band of 8 pixel rows left to
/// right.
fn reconstruct_plane(
    tag: u8,
    coeffs: &[i16],
    lines: usize,
    dct: &Dct8,
) -> Result<Vec<u8>, TypeDecodeError> {
    let num_blocks = coeffs.len() / (BLOCK * BLOCK);
    if lines % BLOCK != 0 {
        return Err(TypeDecodeError::Geometry {
            tag,
            detail: "line count is not a multiple of the DCT block size",
        });
    }
    let block_rows = lines / BLOCK;
    if num_blocks == 0 || num_blocks % block_rows != 0 {
        return Err(TypeDecodeError::Geometry {
            tag,
            detail: "block count does not fill the image height",
        });
    }
    let blocks_per_row = num_blocks / block_rows;
    let width = blocks_per_row * BLOCK;

    let mut plane = vec![0u8; lines * width];
    for (b, chunk) in coeffs
        .chunks_exact(BLOCK * BLOCK)
        .take(num_blocks)
        .enumerate()
    {
        let mut block = [0.0f64; BLOCK * BLOCK];
        for (dst, &c) in block.iter_mut().zip(chunk.iter()) {
            *dst = c as f64;
        }
        let pixels = dct.inverse(&block);

        let block_r = b / blocks_per_row;
        let block_c = b % blocks_per_row;
        for r in 0..BLOCK {
            let row = block_r * BLOCK + r;
            let col0 = block_c * BLOCK;
            for c in 0..BLOCK {
                plane[row * width + col0 + c] = clamp_pixel(pixels[r * BLOCK + c]);
            }
        }
    }
    Ok(plane)
}

fn clamp_pixel(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn with_header(lines: u16, data: &[u8]) -> Vec<u8> {
        let mut body = lines.to_le_bytes().to_vec();
        body.extend_from_slice(data);
        body
    }

    #[test]
    fn gray8_shape_from_header() {
        let body = with_header(3, &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
        let img = decode_gray8(220, &body).unwrap();
        assert_eq!((img.rows, img.cols, img.channels), (3, 4, 1));
        assert_eq!(img.row(1), &[4, 5, 6, 7]);
    }

    #[test]
    fn gray8_rejects_ragged_geometry() {
        let body = with_header(3, &[0; 10]); // 10 % 3 != 0
        assert!(matches!(
            decode_gray8(220, &body),
            Err(TypeDecodeError::Geometry { tag: 220, .. })
        ));
        assert!(matches!(
            decode_gray8(220, &[0x02]),
            Err(TypeDecodeError::Truncated { tag: 220, .. })
        ));
        let body = with_header(0, &[1, 2]);
        assert!(matches!(
            decode_gray8(220, &body),
            Err(TypeDecodeError::Geometry { tag: 220, .. })
        ));
    }

    #[test]
    fn palette_expands_indices_to_rgb() {
        let mut palette = vec![0u8; 768];
        palette[3] = 10; // index 1 → (10, 20, 30)
        palette[4] = 20;
        palette[5] = 30;
        palette[6] = 40; // index 2 → (40, 50, 60)
        palette[7] = 50;
        palette[8] = 60;
        let mut data = palette;
        data.extend_from_slice(&[1, 2, 1, 2]); // 2 lines × 2 px
        let body = with_header(2, &data);
        let img = decode_palette8(221, &body).unwrap();
        assert_eq!((img.rows, img.cols, img.channels), (2, 2, 3));
        assert_eq!(img.row(0), &[10, 20, 30, 40, 50, 60]);
    }

    #[test]
    fn palette_requires_full_table() {
        let body = with_header(1, &[0u8; 100]);
        assert!(matches!(
            decode_palette8(221, &body),
            Err(TypeDecodeError::Truncated { tag: 221, .. })
        ));
    }

    #[test]
    fn rgb_and_rgba_pixel_widths() {
        let body = with_header(2, &[7u8; 2 * 3 * 3]);
        let img = decode_rgb8(222, &body).unwrap();
        assert_eq!((img.rows, img.cols, img.channels), (2, 3, 3));

        let body = with_header(2, &[7u8; 2 * 3 * 4]);
        let img = decode_rgba8(223, &body).unwrap();
        assert_eq!((img.rows, img.cols, img.channels), (2, 3, 4));

        let body = with_header(2, &[7u8; 10]);
        assert!(decode_rgb8(222, &body).is_err());
    }

    #[test]
    fn dct_round_trip_flat_block() {
        // forward-transform a flat 8×8 block, RLE the rounded coefficients,
        // and expect the decoder to reproduce the flat block
        let dct = Dct8::new();
        let block = [16.0f64; 64];
        let coeffs = dct.forward(&block); // DC = 128, everything else 0
        let coeff_bytes: Vec<u8> = coeffs.iter().map(|&c| c.round() as u8).collect();
        let body = with_header(8, &rle::encode(&coeff_bytes));
        let img = decode_gray8_dct(224, &body, &dct).unwrap();
        assert_eq!((img.rows, img.cols, img.channels), (8, 8, 1));
        assert!(img.data.iter().all(|&p| p == 16));
    }

    #[test]
    fn dct_geometry_checks() {
        let dct = Dct8::new();
        // height not a multiple of the block size
        let body = with_header(6, &rle::encode(&[0u8; 64]));
        assert!(matches!(
            decode_gray8_dct(224, &body, &dct),
            Err(TypeDecodeError::Geometry { .. })
        ));
        // 3 blocks over 16 lines (2 block rows) is ragged
        let body = with_header(16, &rle::encode(&[0u8; 3 * 64]));
        assert!(matches!(
            decode_gray8_dct(224, &body, &dct),
            Err(TypeDecodeError::Geometry { .. })
        ));
    }

    #[test]
    fn color_dct_splits_three_planes() {
        let dct = Dct8::new();
        // three flat planes of zeros: 3 × 64 zero coefficients
        let body = with_header(8, &rle::encode(&[0u8; 3 * 64]));
        let img = decode_rgb8_dct(225, &body, &dct).unwrap();
        assert_eq!((img.rows, img.cols, img.channels), (8, 8, 3));
        assert!(img.data.iter().all(|&p| p == 0));
    }
}
