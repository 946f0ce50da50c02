//! 8×8 orthonormal DCT-II transform pair.
//!
//! The compressed image tags carry run-length-encoded DCT coefficients in
//! 8×8 blocks; reconstruction applies the inverse transform per block. The
//! forward direction is used by senders and by the image tests. Both passes
//! are separable row/column products against a precomputed basis.

/// Transform block edge length.
pub const BLOCK: usize = 8;

/// Precomputed orthonormal 8-point DCT basis.
///
/// `basis[k][n] = a_k · cos(π (2n + 1) k / 16)` with `a_0 = √(1/8)` and
/// `a_k = √(2/8)` otherwise, so forward and inverse are transposes of each
/// other.
pub struct Dct8 {
    basis: [[f64; BLOCK]; BLOCK],
}

impl Dct8 {
    pub fn new() -> Dct8 {
        let mut basis = [[0.0; BLOCK]; BLOCK];
        let n = BLOCK as f64;
        for (k, row) in basis.iter_mut().enumerate() {
            let scale = if k == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
            for (i, cell) in row.iter_mut().enumerate() {
                let angle = core::f64::consts::PI * (2.0 * i as f64 + 1.0) * k as f64 / (2.0 * n);
                *cell = scale * angle.cos();
            }
        }
        Dct8 { basis }
    }

    /// Forward 2-D DCT-II of a row-major 8×8 block.
    pub fn forward(&self, block: &[f64; BLOCK * BLOCK]) -> [f64; BLOCK * BLOCK] {
        // rows then columns: Y = C · X · Cᵀ
        let rows = self.apply_rows(block, false);
        self.apply_cols(&rows, false)
    }

    /// Inverse 2-D DCT (DCT-III) of a row-major 8×8 coefficient block.
    pub fn inverse(&self, block: &[f64; BLOCK * BLOCK]) -> [f64; BLOCK * BLOCK] {
        // X = Cᵀ · Y · C
        let rows = self.apply_rows(block, true);
        self.apply_cols(&rows, true)
    }

    fn apply_rows(&self, src: &[f64; BLOCK * BLOCK], transpose: bool) -> [f64; BLOCK * BLOCK] {
        let mut out = [0.0; BLOCK * BLOCK];
        for r in 0..BLOCK {
            for k in 0..BLOCK {
                let mut acc = 0.0;
                for i in 0..BLOCK {
                    let c = if transpose { self.basis[i][k] } else { self.basis[k][i] };
                    acc += c * src[r * BLOCK + i];
                }
                out[r * BLOCK + k] = acc;
            }
        }
        out
    }

    fn apply_cols(&self, src: &[f64; BLOCK * BLOCK], transpose: bool) -> [f64; BLOCK * BLOCK] {
        let mut out = [0.0; BLOCK * BLOCK];
        for c in 0..BLOCK {
            for k in 0..BLOCK {
                let mut acc = 0.0;
                for i in 0..BLOCK {
                    let b = if transpose { self.basis[i][k] } else { self.basis[k][i] };
                    acc += b * src[i * BLOCK + c];
                }
                out[k * BLOCK + c] = acc;
            }
        }
        out
    }
}

impl Default for Dct8 {
    fn default() -> Self {
        Dct8::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn max_abs_diff(a: &[f64], b: &[f64]) -> f64 {
        a.iter()
            .zip(b.iter())
            .map(|(&x, &y)| (x - y).abs())
            .fold(0.0, f64::max)
    }

    #[test]
    fn inverse_undoes_forward() {
        let dct = Dct8::new();
        let mut block = [0.0; 64];
        for (i, cell) in block.iter_mut().enumerate() {
            *cell = ((i * 37) % 256) as f64;
        }
        let coeffs = dct.forward(&block);
        let back = dct.inverse(&coeffs);
        assert!(max_abs_diff(&block, &back) < 1e-9);
    }

    #[test]
    fn constant_block_concentrates_in_dc() {
        let dct = Dct8::new();
        let block = [100.0; 64];
        let coeffs = dct.forward(&block);
        // DC = 8 * 100 for the orthonormal scaling
        assert!((coeffs[0] - 800.0).abs() < 1e-9);
        assert!(coeffs[1..].iter().all(|&c| c.abs() < 1e-9));
    }

    #[test]
    fn transform_is_orthonormal() {
        // Parseval: energy is preserved
        let dct = Dct8::new();
        let mut block = [0.0; 64];
        for (i, cell) in block.iter_mut().enumerate() {
            *cell = (i as f64 * 0.7).sin() * 50.0;
        }
        let coeffs = dct.forward(&block);
        let e_in: f64 = block.iter().map(|&x| x * x).sum();
        let e_out: f64 = coeffs.iter().map(|&x| x * x).sum();
        assert!((e_in - e_out).abs() / e_in < 1e-12);
    }
}
