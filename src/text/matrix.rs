//! Dense-matrix variant of the text decoder.
//!
//! Each parsed line contributes `max(channel lengths)` rows; every channel
//! owns one column, discovered on first sight and never renumbered for the
//! decoder lifetime. Shorter channels are NaN-padded. The output of one
//! `process` call is the batch's rows at the current column width, ready to
//! push into the plot ring buffer.

use indexmap::IndexMap;

use super::parse::{ParseError, Tokenizer};
use super::{decode_line, split_lines, TextOptions};
use crate::types::Mat;

/// Line-framed text decoder producing a `(rows × cols)` f64 matrix with a
/// stable `column name → column index` map.
pub struct TextMatrixDecoder {
    opts: TextOptions,
    partial_line: Vec<u8>,
    tokenizer: Tokenizer,
    columns: IndexMap<String, usize>,
}

impl TextMatrixDecoder {
    pub fn new() -> TextMatrixDecoder {
        TextMatrixDecoder::with_options(TextOptions::default())
    }

    pub fn with_options(opts: TextOptions) -> TextMatrixDecoder {
        TextMatrixDecoder {
            opts,
            partial_line: Vec::new(),
            tokenizer: Tokenizer::new(),
            columns: IndexMap::new(),
        }
    }

    /// Insertion-ordered column map. Indices are assigned on first sight and
    /// never reused.
    pub fn columns(&self) -> &IndexMap<String, usize> {
        &self.columns
    }

    /// Bytes currently buffered waiting for a line terminator.
    pub fn pending(&self) -> usize {
        self.partial_line.len()
    }

    /// Decode every completed line into matrix rows. Rows parsed before a
    /// new column appeared are NaN-padded to the final batch width.
    pub fn process(&mut self, new_data: &[u8]) -> Result<Mat, ParseError> {
        if new_data.is_empty() {
            return Ok(Mat::empty(self.columns.len()));
        }
        let lines = split_lines(&mut self.partial_line, new_data, &self.opts.eol);

        let mut rows: Vec<Vec<f64>> = Vec::new();
        for (idx, raw) in lines.iter().enumerate() {
            let line_no = idx + 1;
            let line = decode_line(raw, self.opts.strict, line_no)?;
            if line.trim().is_empty() {
                continue;
            }
            let channels =
                self.tokenizer
                    .parse_line(&line, self.opts.labels, self.opts.strict, line_no)?;
            if channels.is_empty() {
                continue;
            }

            // column assignment, then row fan-out down the element index
            let mut placed: Vec<(usize, &[f64])> = Vec::with_capacity(channels.len());
            let mut line_rows = 0usize;
            for ch in &channels {
                let next = self.columns.len();
                let col = *self.columns.entry(ch.name.clone()).or_insert(next);
                placed.push((col, &ch.values));
                line_rows = line_rows.max(ch.values.len());
            }
            for r in 0..line_rows {
                let mut row = vec![f64::NAN; self.columns.len()];
                for &(col, values) in &placed {
                    if let Some(&v) = values.get(r) {
                        row[col] = v;
                    }
                }
                rows.push(row);
            }
        }

        // pad earlier rows to the final width of this batch
        let cols = self.columns.len();
        let mut data = Vec::with_capacity(rows.len() * cols);
        let nrows = rows.len();
        for mut row in rows {
            row.resize(cols, f64::NAN);
            data.extend_from_slice(&row);
        }
        Ok(Mat::from_vec(nrows, cols, data))
    }
}

impl Default for TextMatrixDecoder {
    fn default() -> Self {
        TextMatrixDecoder::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_row(m: &Mat, r: usize, expected: &[f64]) {
        let row = m.row(r);
        assert_eq!(row.len(), expected.len(), "row {r} width");
        for (c, (&got, &want)) in row.iter().zip(expected.iter()).enumerate() {
            if want.is_nan() {
                assert!(got.is_nan(), "row {r} col {c}: expected NaN, got {got}");
            } else {
                assert_eq!(got, want, "row {r} col {c}");
            }
        }
    }

    #[test]
    fn vectors_fan_out_down_rows() {
        let mut dec = TextMatrixDecoder::with_options(TextOptions {
            labels: false,
            ..TextOptions::default()
        });
        let m = dec.process(b"1 2 3, 4 5 6\n10 20, 30 40 50\n").unwrap();
        assert_eq!((m.rows(), m.cols()), (6, 2));
        assert_row(&m, 0, &[1.0, 4.0]);
        assert_row(&m, 1, &[2.0, 5.0]);
        assert_row(&m, 2, &[3.0, 6.0]);
        assert_row(&m, 3, &[10.0, 30.0]);
        assert_row(&m, 4, &[20.0, 40.0]);
        assert_row(&m, 5, &[f64::NAN, 50.0]);
        // stable auto-assigned column names
        assert_eq!(dec.columns().get_index(0).unwrap().0, "V1");
        assert_eq!(dec.columns().get_index(1).unwrap().0, "V2");
    }

    #[test]
    fn labeled_channels_own_named_columns() {
        let mut dec = TextMatrixDecoder::new();
        let m = dec.process(b"T: 21.5, H: 40\nT: 21.6, H: 41\n").unwrap();
        assert_eq!((m.rows(), m.cols()), (2, 2));
        assert_eq!(dec.columns()["T"], 0);
        assert_eq!(dec.columns()["H"], 1);
        assert_row(&m, 0, &[21.5, 40.0]);
        assert_row(&m, 1, &[21.6, 41.0]);
    }

    #[test]
    fn late_columns_pad_earlier_rows() {
        let mut dec = TextMatrixDecoder::new();
        let m = dec.process(b"A: 1\nA: 2, B: 9\n").unwrap();
        assert_eq!((m.rows(), m.cols()), (2, 2));
        assert_row(&m, 0, &[1.0, f64::NAN]);
        assert_row(&m, 1, &[2.0, 9.0]);
    }

    #[test]
    fn column_map_is_stable_across_calls() {
        let mut dec = TextMatrixDecoder::new();
        dec.process(b"A: 1, B: 2\n").unwrap();
        let m = dec.process(b"B: 3\n").unwrap();
        // B keeps column 1; column 0 exists but has no data this batch
        assert_eq!((m.rows(), m.cols()), (1, 2));
        assert_row(&m, 0, &[f64::NAN, 3.0]);
        assert_eq!(dec.columns()["A"], 0);
        assert_eq!(dec.columns()["B"], 1);
    }

    #[test]
    fn chunking_preserves_matrix_and_columns() {
        let stream = b"1 2 3, 4 5 6\n10 20, 30 40 50\nX: 7\n";
        let mut whole = TextMatrixDecoder::with_options(TextOptions {
            labels: true,
            ..TextOptions::default()
        });
        let full = whole.process(stream).unwrap();
        let full_cols: Vec<String> = whole.columns().keys().cloned().collect();

        for chunk in [1usize, 2, 4, 9] {
            let mut dec = TextMatrixDecoder::new();
            let mut rows: Vec<Vec<f64>> = Vec::new();
            for piece in stream.chunks(chunk) {
                let m = dec.process(piece).unwrap();
                for r in 0..m.rows() {
                    rows.push(m.row(r).to_vec());
                }
            }
            let cols: Vec<String> = dec.columns().keys().cloned().collect();
            assert_eq!(cols, full_cols, "chunk size {chunk}");
            assert_eq!(rows.len(), full.rows(), "chunk size {chunk}");
            for (r, row) in rows.iter().enumerate() {
                let mut padded = row.clone();
                padded.resize(full.cols(), f64::NAN);
                for (c, v) in padded.iter().enumerate() {
                    let want = full.get(r, c);
                    assert!(
                        (v.is_nan() && want.is_nan()) || *v == want,
                        "chunk {chunk} row {r} col {c}: {v} vs {want}"
                    );
                }
            }
        }
    }

    #[test]
    fn strict_mode_propagates_errors() {
        let mut dec = TextMatrixDecoder::with_options(TextOptions {
            strict: true,
            ..TextOptions::default()
        });
        assert!(dec.process(b"1 2\n3 oops\n").is_err());
    }
}
