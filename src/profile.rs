//! Per-monitor grid state and profiles.
//!
//! A [`Profile`] is one complete layout for the attached monitors: for each
//! monitor it holds a [`MonitorProfileState`] combining the grid shape and
//! the window assignments of that monitor.  A session can hold several
//! profiles (tabs) and snap any of them.

use crate::allocation::AllocationTable;
use crate::geometry::{Monitor, Rectangle};
use crate::grid::{Axis, Cell, CellLabel, GridError, GridSpec};
use crate::store::{MonitorLayout, SavedProfile};
use log::{debug, info, warn};

/// Grid and window assignments of one monitor within one profile.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorProfileState {
    monitor: Monitor,
    grid: GridSpec,
    allocations: AllocationTable,
}

impl MonitorProfileState {
    /// A 1×1 grid with no assignments.
    pub fn new(monitor: Monitor) -> Self {
        let grid = GridSpec::single();
        let allocations = AllocationTable::new(grid.cell_count());
        Self {
            monitor,
            grid,
            allocations,
        }
    }

    pub fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    pub fn allocations(&self) -> &AllocationTable {
        &self.allocations
    }

    pub fn allocations_mut(&mut self) -> &mut AllocationTable {
        &mut self.allocations
    }

    /// Replace the grid with an even `rows × cols` grid.
    ///
    /// Counts below 1 are clamped.  All window assignments are cleared
    /// because cells are renumbered.
    pub fn set_grid_size(&mut self, rows: usize, cols: usize) {
        self.grid = GridSpec::uniform(rows, cols, &self.monitor.work);
        self.allocations.reset(self.grid.cell_count());
        info!(
            "{}: grid set to {}x{}",
            self.monitor.name,
            self.grid.rows(),
            self.grid.cols()
        );
    }

    /// Drag one divider.  Assignments are kept since the cell count does not
    /// change.
    pub fn move_divider(
        &mut self,
        axis: Axis,
        index: usize,
        position: f64,
    ) -> Result<(), GridError> {
        self.grid.move_divider(axis, index, position, &self.monitor.work)?;
        debug!(
            "{}: {} divider {} moved to {}",
            self.monitor.name, axis, index, position
        );
        Ok(())
    }

    /// Install `grid`, clearing assignments only if the cell count changes.
    pub fn set_grid(&mut self, grid: GridSpec) {
        let changed = grid.cell_count() != self.grid.cell_count();
        self.grid = grid;
        if changed {
            self.allocations.reset(self.grid.cell_count());
        }
    }

    pub fn cells(&self) -> Vec<Cell> {
        self.grid.cells(&self.monitor.work)
    }

    pub fn cell(&self, index: usize) -> Option<Cell> {
        self.grid.cell(&self.monitor.work, index)
    }

    pub fn labels(&self) -> Vec<CellLabel> {
        self.grid.labels(&self.monitor.work)
    }

    /// Divider geometry in its stored form.
    pub fn to_layout(&self) -> MonitorLayout {
        MonitorLayout {
            xlines: self.grid.col_fractions().to_vec(),
            ylines: self.grid.row_fractions().to_vec(),
        }
    }

    /// Restore divider geometry from its stored form, snapping every line to
    /// a whole pixel of this monitor.
    pub fn apply_layout(&mut self, layout: &MonitorLayout) -> Result<(), GridError> {
        let grid = GridSpec::from_fractions(&layout.ylines, &layout.xlines, &self.monitor.work)?;
        self.set_grid(grid);
        Ok(())
    }
}

/// One window to move during a snap.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapTarget {
    pub monitor: String,
    pub cell: usize,
    pub window: String,
    pub rect: Rectangle,
}

/// A layout for every attached monitor.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    states: Vec<MonitorProfileState>,
}

impl Profile {
    /// A default profile: a 1×1 grid on every monitor.
    pub fn new(monitors: &[Monitor]) -> Self {
        Self {
            states: monitors.iter().cloned().map(MonitorProfileState::new).collect(),
        }
    }

    /// Monitor states in monitor enumeration order.
    pub fn states(&self) -> &[MonitorProfileState] {
        &self.states
    }

    pub fn state(&self, monitor_id: &str) -> Option<&MonitorProfileState> {
        self.states.iter().find(|s| s.monitor.id == monitor_id)
    }

    pub fn state_mut(&mut self, monitor_id: &str) -> Option<&mut MonitorProfileState> {
        self.states.iter_mut().find(|s| s.monitor.id == monitor_id)
    }

    /// Propagate a new live window list to every monitor.
    pub fn refresh_windows(&mut self, live: &[String]) -> bool {
        let mut changed = false;
        for state in &mut self.states {
            changed |= state.allocations.refresh(live.iter().cloned());
        }
        changed
    }

    /// Every assigned window paired with the rectangle of its cell.
    ///
    /// Assignments to cells the grid no longer has are skipped.
    pub fn snap_targets(&self) -> Vec<SnapTarget> {
        let mut targets = Vec::new();
        for state in &self.states {
            let cells = state.cells();
            for (index, windows) in state.allocations.iter() {
                let Some(cell) = cells.get(index.wrapping_sub(1)) else {
                    debug!("{}: skipping unknown cell {}", state.monitor.name, index);
                    continue;
                };
                targets.extend(windows.iter().map(|w| SnapTarget {
                    monitor: state.monitor.id.clone(),
                    cell: index,
                    window: w.clone(),
                    rect: cell.rect,
                }));
            }
        }
        targets
    }

    /// Divider geometry of every monitor, keyed by monitor id.
    pub fn to_saved(&self) -> SavedProfile {
        self.states
            .iter()
            .map(|s| (s.monitor.id.clone(), s.to_layout()))
            .collect()
    }

    /// Apply stored geometry.
    ///
    /// Layouts for monitors that are not attached, and layouts that fail
    /// validation, are skipped with a warning.  Returns how many monitors
    /// were updated.
    pub fn apply_saved(&mut self, saved: &SavedProfile) -> usize {
        let mut applied = 0;
        for (monitor_id, layout) in saved {
            let Some(state) = self.state_mut(monitor_id) else {
                warn!("saved layout for unknown monitor {}, skipping", monitor_id);
                continue;
            };
            match state.apply_layout(layout) {
                Ok(()) => applied += 1,
                Err(e) => warn!("invalid saved layout for monitor {}: {}", monitor_id, e),
            }
        }
        applied
    }
}

//  Tests
