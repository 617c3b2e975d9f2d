//! Grid layout of a monitor's work area.
//!
//! A [`GridSpec`] holds the interior divider lines of one monitor as
//! fractions of its work area: row dividers relative to the work-area height
//! (measured from its top edge), column dividers relative to its width
//! (measured from its left edge).  [`GridSpec::cells`] resolves those
//! fractions into the [`Cell`] rectangles that windows are snapped to.
//!
//! # Cell numbering
//!
//! Cells are numbered from `1` in row-major order starting at the top-left:
//! indices increase to the right across a row, then wrap to the start of the
//! next row down.  For a 2×2 grid:
//!
//! ```text
//! +---+---+
//! | 1 | 2 |
//! +---+---+
//! | 3 | 4 |
//! +---+---+
//! ```
//!
//! Window-manager coordinates grow downward, so "top" is the smallest `y`.

use crate::geometry::Rectangle;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Slack added before truncating a fractional divider to whole pixels, so a
/// fraction derived from an integer pixel maps back to that same pixel.
const PIXEL_EPSILON: f64 = 1e-6;

/// Which family of divider lines an operation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Horizontal lines separating rows (`y` positions).
    Row,
    /// Vertical lines separating columns (`x` positions).
    Column,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Row => write!(f, "row"),
            Axis::Column => write!(f, "column"),
        }
    }
}

/// Errors produced when building or editing a [`GridSpec`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    #[error("divider fraction {0} is outside the open interval (0, 1)")]
    OutOfRange(f64),
    #[error("duplicate divider at fraction {0}")]
    Duplicate(f64),
    #[error("no {axis} divider at index {index}")]
    DividerIndex { axis: Axis, index: usize },
}

/// One resolved grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    /// 1-based, row-major from the top-left.
    pub index: usize,
    /// Cell bounds in the monitor's work-area coordinates.
    pub rect: Rectangle,
}

/// Display information for one cell: where to draw its number and how much
/// of the work area it covers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellLabel {
    pub index: usize,
    pub center: (f64, f64),
    /// Cell width as a percentage of the work-area width.
    pub width_percent: f64,
    /// Cell height as a percentage of the work-area height.
    pub height_percent: f64,
}

impl CellLabel {
    /// Size caption such as `"50.00x33.33"`.
    pub fn percent_text(&self) -> String {
        format!("{:.2}x{:.2}", self.width_percent, self.height_percent)
    }
}

/// Interior divider positions of one monitor's grid.
///
/// Both lists are sorted ascending, contain distinct values, and every value
/// lies strictly inside `(0, 1)`.  A `GridSpec` with `R` row fractions and `C`
/// column fractions describes `(R + 1) × (C + 1)` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSpec {
    rows: Vec<f64>,
    cols: Vec<f64>,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self::single()
    }
}

impl GridSpec {
    /// A 1×1 grid: one cell covering the whole work area.
    pub fn single() -> Self {
        Self {
            rows: Vec::new(),
            cols: Vec::new(),
        }
    }

    /// Build a grid from raw fractions.
    ///
    /// The input does not need to be sorted, but every value must lie inside
    /// `(0, 1)` and no value may repeat.
    pub fn new(mut rows: Vec<f64>, mut cols: Vec<f64>) -> Result<Self, GridError> {
        validate(&mut rows)?;
        validate(&mut cols)?;
        Ok(Self { rows, cols })
    }

    /// An evenly divided `rows × cols` grid for `work`.
    ///
    /// Counts below `1` are clamped to `1`, and counts above the number of
    /// whole pixels along an axis are clamped to that number.  Divider `k`
    /// of `n` is placed at the whole pixel `trunc(k / n · extent)` from the
    /// work-area origin so it lands where a window edge can actually go.
    pub fn uniform(rows: usize, cols: usize, work: &Rectangle) -> Self {
        let rows = clamp_count(Axis::Row, rows, work.height());
        let cols = clamp_count(Axis::Column, cols, work.width());
        let even = |n: usize| -> Vec<f64> { (1..n).map(|k| k as f64 / n as f64).collect() };

        let rows = snap_all(&even(rows), work.height());
        let cols = snap_all(&even(cols), work.width());

        // At most one divider per pixel, so the snapped positions stay
        // strictly increasing inside (0, 1).
        debug_assert!(is_valid(&rows) && is_valid(&cols));
        Self { rows, cols }
    }

    /// Rebuild a grid from stored fractions for `work`, snapping every
    /// divider to a whole pixel first.
    pub fn from_fractions(
        rows: &[f64],
        cols: &[f64],
        work: &Rectangle,
    ) -> Result<Self, GridError> {
        Self::new(snap_all(rows, work.height()), snap_all(cols, work.width()))
    }

    //  Accessors

    /// Number of rows (at least 1).
    pub fn rows(&self) -> usize {
        self.rows.len() + 1
    }

    /// Number of columns (at least 1).
    pub fn cols(&self) -> usize {
        self.cols.len() + 1
    }

    pub fn cell_count(&self) -> usize {
        self.rows() * self.cols()
    }

    /// Row divider fractions, ascending.
    pub fn row_fractions(&self) -> &[f64] {
        &self.rows
    }

    /// Column divider fractions, ascending.
    pub fn col_fractions(&self) -> &[f64] {
        &self.cols
    }

    /// Absolute positions of the dividers along `axis` within `work`.
    pub fn divider_positions(&self, axis: Axis, work: &Rectangle) -> Vec<f64> {
        match axis {
            Axis::Row => self.rows.iter().map(|f| work.top() + f * work.height()).collect(),
            Axis::Column => self
                .cols
                .iter()
                .map(|f| work.left() + f * work.width())
                .collect(),
        }
    }

    //  Editing

    /// Drag divider `index` of `axis` to the absolute coordinate `position`.
    ///
    /// The position is truncated to a whole pixel and converted back to a
    /// fraction.  Dividers are re-sorted afterwards, so dragging one past a
    /// neighbour swaps their order.  On error nothing changes.
    pub fn move_divider(
        &mut self,
        axis: Axis,
        index: usize,
        position: f64,
        work: &Rectangle,
    ) -> Result<(), GridError> {
        let (lines, origin, extent) = match axis {
            Axis::Row => (&self.rows, work.top(), work.height()),
            Axis::Column => (&self.cols, work.left(), work.width()),
        };
        if index >= lines.len() {
            return Err(GridError::DividerIndex { axis, index });
        }
        let fraction = if extent > 0.0 {
            (position.trunc() - origin) / extent
        } else {
            f64::NAN
        };

        let mut updated = lines.clone();
        updated[index] = fraction;
        validate(&mut updated)?;

        match axis {
            Axis::Row => self.rows = updated,
            Axis::Column => self.cols = updated,
        }
        Ok(())
    }

    //  Partitioning

    /// Resolve every cell of this grid inside `work`.
    ///
    /// Rows are enumerated top to bottom (outer), columns left to right
    /// (inner).  The resulting rectangles tile `work` with no gaps and no
    /// overlap: adjacent cells share exactly one edge coordinate.
    pub fn cells(&self, work: &Rectangle) -> Vec<Cell> {
        let row_edges = edges(work.top(), work.height(), work.bottom(), &self.rows);
        let col_edges = edges(work.left(), work.width(), work.right(), &self.cols);

        let mut cells = Vec::with_capacity(self.cell_count());
        for band in row_edges.windows(2) {
            let (top, bottom) = (band[0], band[1]);
            for span in col_edges.windows(2) {
                let (left, right) = (span[0], span[1]);
                cells.push(Cell {
                    index: cells.len() + 1,
                    rect: Rectangle::new(left, right, top, bottom),
                });
            }
        }
        cells
    }

    /// Resolve the single cell `index`, or `None` if the grid has no such
    /// cell.
    pub fn cell(&self, work: &Rectangle, index: usize) -> Option<Cell> {
        if index == 0 || index > self.cell_count() {
            return None;
        }
        self.cells(work).into_iter().nth(index - 1)
    }

    /// Label data for every cell, in the same order as [`cells`](Self::cells).
    pub fn labels(&self, work: &Rectangle) -> Vec<CellLabel> {
        let percent = |extent: f64, total: f64| {
            if total > 0.0 {
                extent / total * 100.0
            } else {
                0.0
            }
        };
        self.cells(work)
            .into_iter()
            .map(|cell| CellLabel {
                index: cell.index,
                center: cell.rect.center(),
                width_percent: percent(cell.rect.width(), work.width()),
                height_percent: percent(cell.rect.height(), work.height()),
            })
            .collect()
    }
}

//  Helpers

/// Sort `lines` and check the `(0, 1)`, no-duplicates invariant.
fn validate(lines: &mut [f64]) -> Result<(), GridError> {
    if let Some(bad) = lines.iter().find(|f| !(**f > 0.0 && **f < 1.0)) {
        return Err(GridError::OutOfRange(*bad));
    }
    lines.sort_by(|a, b| a.total_cmp(b));
    if let Some(pair) = lines.windows(2).find(|pair| pair[0] == pair[1]) {
        return Err(GridError::Duplicate(pair[0]));
    }
    Ok(())
}

fn is_valid(lines: &[f64]) -> bool {
    lines.iter().all(|f| *f > 0.0 && *f < 1.0) && lines.windows(2).all(|p| p[0] < p[1])
}

/// Clamp a requested cell count to `1..=` whole pixels of `extent`.
fn clamp_count(axis: Axis, count: usize, extent: f64) -> usize {
    let pixels = (extent.max(0.0) as usize).max(1);
    let clamped = count.clamp(1, pixels);
    if clamped != count {
        warn!("{} count {} clamped to {}", axis, count, clamped);
    }
    clamped
}

/// Snap a fraction of `extent` down to the nearest whole pixel.
fn snap(fraction: f64, extent: f64) -> f64 {
    if extent < 1.0 {
        return fraction;
    }
    (fraction * extent + PIXEL_EPSILON).trunc() / extent
}

fn snap_all(fractions: &[f64], extent: f64) -> Vec<f64> {
    fractions.iter().map(|f| snap(*f, extent)).collect()
}

/// `[start, start + f·extent..., end]`
fn edges(start: f64, extent: f64, end: f64, fractions: &[f64]) -> Vec<f64> {
    std::iter::once(start)
        .chain(fractions.iter().map(|f| start + f * extent))
        .chain(std::iter::once(end))
        .collect()
}

//  Tests
