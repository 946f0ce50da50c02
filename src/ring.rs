//! Bounded 2-D circular store for live plotting.
//!
//! Fixed-capacity float64 buffer that keeps the most recent rows. Columns
//! (channels) and rows grow on demand; readout is always chronological
//! (oldest → newest) and returns an owned copy, so a render thread can take a
//! snapshot without holding the writer.
//!
//! Invariants:
//! - unoccupied cells and unused trailing columns are NaN;
//! - `oldest == latest − rows_valid + 1` whenever `rows_valid > 0`;
//! - a wrapped valid region reads out as a two-slice concatenation.

use core::fmt;

use crate::types::Mat;

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Ring buffer failure modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RingError {
    /// Invalid construction parameters (both dimensions must be ≥ 1).
    Config(&'static str),
    /// Allocation failure while growing. Fatal to this buffer instance.
    Capacity { requested_cells: usize },
}

impl fmt::Display for RingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RingError::Config(msg) => write!(f, "invalid ring configuration: {msg}"),
            RingError::Capacity { requested_cells } => {
                write!(f, "allocation of {requested_cells} cells failed")
            }
        }
    }
}

impl std::error::Error for RingError {}

// ─────────────────────────────────────────────────────────────────────────────
// RingBuffer
// ─────────────────────────────────────────────────────────────────────────────

/// Column-expanding circular buffer of f64 rows.
pub struct RingBuffer {
    data: Vec<f64>, // nrows * ncols, row-major
    nrows: usize,   // allocated rows
    ncols: usize,   // allocated columns
    head: usize,    // next insertion row
    row_entries: usize,
    col_entries: usize,
    oldest: u64, // monotonic sample index of the oldest valid row (1-based)
    latest: u64, // monotonic sample index of the newest valid row
}

impl RingBuffer {
    /// Create a buffer with `nrows × ncols` capacity, all cells NaN.
    pub fn new(nrows: usize, ncols: usize) -> Result<RingBuffer, RingError> {
        if nrows == 0 || ncols == 0 {
            return Err(RingError::Config("nrows and ncols must be > 0"));
        }
        Ok(RingBuffer {
            data: alloc_nan(nrows * ncols)?,
            nrows,
            ncols,
            head: 0,
            row_entries: 0,
            col_entries: 0,
            oldest: 0,
            latest: 0,
        })
    }

    /// Append rows oldest-first, wrapping and growing as needed.
    ///
    /// - more columns than allocated → column growth by
    ///   `max(ncols/2, needed)`, existing data preserved, new cells NaN;
    /// - more rows than allocated → row growth by `max(nrows/2, needed)`,
    ///   existing rows preserved in chronological order;
    /// - a batch exactly filling the buffer overwrites it wholesale;
    /// - otherwise rows are written at `head` with wraparound, and trailing
    ///   columns the batch did not cover are reset to NaN so stale values
    ///   from earlier epochs cannot survive.
    pub fn push(&mut self, batch: &Mat) -> Result<(), RingError> {
        let brows = batch.rows();
        let bcols = batch.cols();
        if brows == 0 || bcols == 0 {
            return Ok(());
        }

        // 1 Expand columns if necessary.
        if bcols > self.ncols {
            let add = (self.ncols / 2).max(bcols - self.ncols);
            self.grow_cols(self.ncols + add)?;
        }

        // 2 Expand rows if necessary.
        if brows > self.nrows {
            let add = (self.nrows / 2).max(brows - self.nrows);
            self.grow_rows(self.nrows + add)?;
        }

        let ncols = self.ncols;
        let nrows = self.nrows;

        // 3 Batch exactly fills the buffer: overwrite wholesale.
        if brows == nrows {
            for r in 0..nrows {
                let src = batch.row(r);
                let dst = &mut self.data[r * ncols..r * ncols + bcols];
                dst.copy_from_slice(&src[..bcols]);
                if bcols < self.col_entries {
                    self.data[r * ncols + bcols..r * ncols + self.col_entries].fill(f64::NAN);
                }
            }
            self.head = 0;
            self.row_entries = nrows;
            self.col_entries = self.col_entries.max(bcols);
            self.latest += brows as u64;
            self.oldest = self.latest - self.row_entries as u64 + 1;
            return Ok(());
        }

        // 4 Write at head with wraparound.
        for r in 0..brows {
            let dst_row = (self.head + r) % nrows;
            let base = dst_row * ncols;
            self.data[base..base + bcols].copy_from_slice(batch.row(r));
            if bcols < self.col_entries {
                self.data[base + bcols..base + self.col_entries].fill(f64::NAN);
            }
        }

        // 5 Update head and counters.
        self.head = (self.head + brows) % nrows;
        self.row_entries = (self.row_entries + brows).min(nrows);
        self.col_entries = self.col_entries.max(bcols);
        self.latest += brows as u64;
        self.oldest = self.latest - self.row_entries as u64 + 1;
        Ok(())
    }

    /// Reset all cells to NaN and zero every counter.
    pub fn clear(&mut self) {
        self.data.fill(f64::NAN);
        self.head = 0;
        self.row_entries = 0;
        self.col_entries = 0;
        self.oldest = 0;
        self.latest = 0;
    }

    /// The newest `n` valid rows, oldest → newest.
    pub fn last(&self, n: usize) -> Mat {
        if n == 0 || self.row_entries == 0 || self.col_entries == 0 {
            return Mat::empty(self.col_entries);
        }
        let n = n.min(self.row_entries);
        let start = (self.head + self.nrows - n) % self.nrows;
        self.copy_rows(start, n)
    }

    /// The oldest `n` valid rows, oldest → newest.
    pub fn first(&self, n: usize) -> Mat {
        if n == 0 || self.row_entries == 0 || self.col_entries == 0 {
            return Mat::empty(self.col_entries);
        }
        let n = n.min(self.row_entries);
        let start = (self.head + self.nrows - self.row_entries) % self.nrows;
        self.copy_rows(start, n)
    }

    /// All valid rows, oldest → newest.
    pub fn data(&self) -> Mat {
        if self.row_entries == 0 || self.col_entries == 0 {
            return Mat::empty(self.col_entries);
        }
        let start = (self.head + self.nrows - self.row_entries) % self.nrows;
        self.copy_rows(start, self.row_entries)
    }

    /// `(rows_valid, cols_valid)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.row_entries, self.col_entries)
    }

    /// `(rows_cap, cols_cap)`.
    pub fn capacity(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    /// `(oldest, latest)` monotonic sample indices. Both zero while empty.
    pub fn counter(&self) -> (u64, u64) {
        (self.oldest, self.latest)
    }

    // Copy `n` rows beginning at physical row `start`, wrapping at nrows.
    fn copy_rows(&self, start: usize, n: usize) -> Mat {
        let cols = self.col_entries;
        let mut out = Vec::with_capacity(n * cols);
        for i in 0..n {
            let src = (start + i) % self.nrows;
            let base = src * self.ncols;
            out.extend_from_slice(&self.data[base..base + cols]);
        }
        Mat::from_vec(n, cols, out)
    }

    fn grow_cols(&mut self, new_cols: usize) -> Result<(), RingError> {
        let mut grown = alloc_nan(self.nrows * new_cols)?;
        for r in 0..self.nrows {
            grown[r * new_cols..r * new_cols + self.ncols]
                .copy_from_slice(&self.data[r * self.ncols..(r + 1) * self.ncols]);
        }
        self.data = grown;
        self.ncols = new_cols;
        Ok(())
    }

    // Row growth linearizes the valid region to the start of the new
    // allocation; a wrapped region would otherwise straddle the fresh NaN
    // rows and break chronological readout.
    fn grow_rows(&mut self, new_rows: usize) -> Result<(), RingError> {
        let mut grown = alloc_nan(new_rows * self.ncols)?;
        let start = (self.head + self.nrows - self.row_entries) % self.nrows;
        for i in 0..self.row_entries {
            let src = (start + i) % self.nrows;
            grown[i * self.ncols..(i + 1) * self.ncols]
                .copy_from_slice(&self.data[src * self.ncols..(src + 1) * self.ncols]);
        }
        self.data = grown;
        self.nrows = new_rows;
        self.head = self.row_entries;
        Ok(())
    }
}

fn alloc_nan(cells: usize) -> Result<Vec<f64>, RingError> {
    let mut v: Vec<f64> = Vec::new();
    v.try_reserve_exact(cells).map_err(|_| RingError::Capacity {
        requested_cells: cells,
    })?;
    v.resize(cells, f64::NAN);
    Ok(v)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
