//! Commands and types used throughout winsnap.
//!
//! This module defines the vocabulary that all components share:
//! [`Command`] describes every action the [`Session`](crate::session::Session)
//! can perform, and [`WindowHandle`] / [`WindowInfo`] describe the live
//! windows a [`WindowManager`](crate::traits::WindowManager) reports.
//!
//! Commands are plain serde types so any front end can drive the session by
//! sending one JSON value per line (see [`ipc`](crate::ipc)).

use crate::grid::Axis;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque OS window handle.
///
/// On Windows this is the raw `HWND` value; other backends pick any stable
/// integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowHandle(pub isize);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// A movable top-level window as enumerated by the window manager.
///
/// `app` is the owning application's name (e.g. `"explorer.exe"`), not the
/// window title, which changes with application state.  The
/// [`WindowRegistry`](crate::registry::WindowRegistry) turns these into
/// unique display names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowInfo {
    pub app: String,
    pub handle: WindowHandle,
}

/// Every action the session can perform.
///
/// `profile` is the 0-based position of a profile (tab) in the session;
/// `monitor` is a [`Monitor::id`](crate::geometry::Monitor::id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Replace a monitor's grid with an even `rows × cols` grid.  Clears
    /// every window assignment on that monitor.
    SetGrid {
        profile: usize,
        monitor: String,
        rows: usize,
        cols: usize,
    },

    /// Drag one divider line to an absolute pixel coordinate.
    MoveDivider {
        profile: usize,
        monitor: String,
        axis: Axis,
        index: usize,
        position: f64,
    },

    /// Replace the set of windows assigned to `cell`.
    Select {
        profile: usize,
        monitor: String,
        cell: usize,
        windows: Vec<String>,
    },

    /// Re-enumerate live windows and drop assignments to closed ones.
    RefreshWindows,

    /// Move every assigned window of a profile into its cell.
    Snap { profile: usize },

    /// Persist all profiles for the current monitor set.
    Save,

    /// Replace all profiles with the ones saved for the current monitor set.
    Load,

    /// Append a new default profile.
    AddProfile,

    /// Remove a profile.  The last remaining profile cannot be removed.
    RemoveProfile { profile: usize },

    /// Log a summary of every profile, grid and assignment.
    Status,
}
