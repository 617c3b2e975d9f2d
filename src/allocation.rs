//! Window-to-cell assignments for one monitor grid.
//!
//! An [`AllocationTable`] maps each cell index to the set of window names
//! assigned to it.  A window belongs to at most one cell at a time: choosing
//! it for a new cell takes it away from the old one.  When the live window
//! list changes, [`refresh`](AllocationTable::refresh) drops assignments to
//! windows that no longer exist.

use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllocationTable {
    /// Number of cells in the grid this table belongs to.
    cell_count: usize,
    /// `cell index -> selected window names`.  Cells with no selection have
    /// no entry.
    selections: BTreeMap<usize, BTreeSet<String>>,
    /// Union of every selection.
    allocated: BTreeSet<String>,
    /// Windows known to be alive as of the last refresh.
    live: BTreeSet<String>,
}

impl AllocationTable {
    /// An empty table for a grid of `cell_count` cells.
    pub fn new(cell_count: usize) -> Self {
        Self {
            cell_count,
            ..Default::default()
        }
    }

    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    /// Drop every selection and resize the table for a new grid.
    ///
    /// Cell numbers are reassigned whenever the grid shape changes, so old
    /// assignments carry no meaning afterwards.  The live window list is
    /// kept.
    pub fn reset(&mut self, cell_count: usize) {
        debug!(
            "resetting allocations: {} -> {} cells",
            self.cell_count, cell_count
        );
        self.cell_count = cell_count;
        self.selections.clear();
        self.allocated.clear();
    }

    /// Replace the full selection of `cell` with `windows`.
    ///
    /// Windows currently held by another cell move to `cell`.  An index
    /// outside `1..=cell_count` is ignored and `false` is returned.
    pub fn select<I, S>(&mut self, cell: usize, windows: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if cell == 0 || cell > self.cell_count {
            warn!(
                "ignoring selection for cell {} (grid has {} cells)",
                cell, self.cell_count
            );
            return false;
        }
        let chosen: BTreeSet<String> = windows.into_iter().map(Into::into).collect();

        for (other, held) in self.selections.iter_mut() {
            if *other != cell {
                held.retain(|w| !chosen.contains(w));
            }
        }
        if chosen.is_empty() {
            self.selections.remove(&cell);
        } else {
            self.selections.insert(cell, chosen);
        }
        self.selections.retain(|_, held| !held.is_empty());
        self.recompute_allocated();
        true
    }

    /// Replace the live window list.
    ///
    /// Selections of windows that are no longer alive are dropped.  Returns
    /// `true` if any selection changed.
    pub fn refresh<I, S>(&mut self, live: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.live = live.into_iter().map(Into::into).collect();
        let before = self.allocated.len();
        for held in self.selections.values_mut() {
            held.retain(|w| self.live.contains(w));
        }
        self.selections.retain(|_, held| !held.is_empty());
        self.recompute_allocated();
        let dropped = before - self.allocated.len();
        if dropped > 0 {
            debug!("dropped {} closed window(s) from allocations", dropped);
        }
        dropped > 0
    }

    /// Windows selected for `cell`, sorted.
    pub fn selected(&self, cell: usize) -> Vec<&str> {
        self.selections
            .get(&cell)
            .map(|held| held.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Every window selected in any cell.
    pub fn allocated(&self) -> &BTreeSet<String> {
        &self.allocated
    }

    /// Live windows that no cell holds.
    pub fn unallocated(&self) -> Vec<&str> {
        self.live
            .difference(&self.allocated)
            .map(String::as_str)
            .collect()
    }

    /// Candidates to offer for `cell`: what it already holds plus anything
    /// no other cell holds, sorted.
    pub fn available_for(&self, cell: usize) -> Vec<&str> {
        let mut names: BTreeSet<&str> = self.unallocated().into_iter().collect();
        names.extend(self.selected(cell));
        names.into_iter().collect()
    }

    /// Non-empty selections in cell order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &BTreeSet<String>)> {
        self.selections.iter().map(|(cell, held)| (*cell, held))
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    fn recompute_allocated(&mut self) {
        self.allocated = self.selections.values().flatten().cloned().collect();
    }
}

//  Tests
