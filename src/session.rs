//! The orchestrator that ties monitors, profiles, live windows and the
//! profile store together.
//!
//! [`Session`] owns every piece of engine state and reacts to [`Command`]s
//! by updating it and issuing placement calls through the
//! [`WindowManager`] trait.  It is the only writer; front ends talk to it
//! through [`handle`](Session::handle) or its typed methods.

use crate::command::Command;
use crate::geometry::Monitor;
use crate::grid::{Axis, GridError};
use crate::placement::WindowMover;
use crate::profile::{MonitorProfileState, Profile};
use crate::registry::WindowRegistry;
use crate::store::{ProfileStore, StoreError};
use crate::traits::WindowManager;
use log::{debug, info, warn};
use std::fmt::Write as _;

/// Possible errors from the session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The window manager returned an error.
    #[error("window manager error: {0}")]
    WindowManager(String),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("grid error: {0}")]
    Grid(#[from] GridError),
    #[error("no profile {0}")]
    UnknownProfile(usize),
    #[error("no monitor {0}")]
    UnknownMonitor(String),
    #[error("cannot remove the last profile")]
    LastProfile,
}

/// A window that could not be snapped.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapFailure {
    pub window: String,
    pub reason: String,
}

/// Outcome of [`Session::snap`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapReport {
    /// Windows that were placed, in the order they were moved.
    pub moved: Vec<String>,
    pub failures: Vec<SnapFailure>,
}

/// Engine state for the attached monitors.
///
/// The session is generic over any [`WindowManager`] implementation, so the
/// same logic drives the Win32 backend and the in-memory one.
///
/// # Typical usage
///
/// ```ignore
/// let mut session = Session::new(wm, ProfileStore::open(path)?)?;
/// session.refresh_windows()?;
/// session.set_grid_size(0, "MON-1", 2, 2)?;
/// session.select_windows_for_cell(0, "MON-1", 1, vec!["code.exe".into()])?;
/// session.snap(0)?;
/// ```
pub struct Session<W: WindowManager> {
    wm: W,
    monitors: Vec<Monitor>,
    profiles: Vec<Profile>,
    registry: WindowRegistry,
    store: ProfileStore,
    identity: String,
    refresh_before_snap: bool,
}

impl<W: WindowManager> Session<W> {
    /// Create a session for the monitors `wm` reports.
    ///
    /// Starts with a single default profile (1×1 grid per monitor) and no
    /// known windows.  Call [`refresh_windows`](Self::refresh_windows) and
    /// [`load`](Self::load) to populate it.
    pub fn new(wm: W, mut store: ProfileStore) -> Result<Self, SessionError> {
        let monitors = wm.monitors().map_err(wm_err)?;
        let ids: Vec<&str> = monitors.iter().map(|m| m.id.as_str()).collect();
        let identity = store.monitor_set_identity(&ids);
        info!(
            "{} monitor(s), monitor set {}",
            monitors.len(),
            identity
        );
        for m in &monitors {
            debug!("{} ({}): work area {}", m, m.id, m.work);
        }
        let profiles = vec![Profile::new(&monitors)];
        Ok(Self {
            wm,
            monitors,
            profiles,
            registry: WindowRegistry::new(),
            store,
            identity,
            refresh_before_snap: true,
        })
    }

    /// Whether [`snap`](Self::snap) re-enumerates windows first.
    pub fn set_refresh_before_snap(&mut self, refresh: bool) {
        self.refresh_before_snap = refresh;
    }

    pub fn wm(&self) -> &W {
        &self.wm
    }

    pub fn monitors(&self) -> &[Monitor] {
        &self.monitors
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn profile(&self, profile: usize) -> Result<&Profile, SessionError> {
        self.profiles
            .get(profile)
            .ok_or(SessionError::UnknownProfile(profile))
    }

    pub fn registry(&self) -> &WindowRegistry {
        &self.registry
    }

    /// Identity of the attached monitor set in the store.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Process a single [`Command`].
    pub fn handle(&mut self, cmd: Command) -> Result<(), SessionError> {
        match cmd {
            Command::SetGrid {
                profile,
                monitor,
                rows,
                cols,
            } => self.set_grid_size(profile, &monitor, rows, cols)?,

            Command::MoveDivider {
                profile,
                monitor,
                axis,
                index,
                position,
            } => self.move_divider(profile, &monitor, axis, index, position)?,

            Command::Select {
                profile,
                monitor,
                cell,
                windows,
            } => {
                self.select_windows_for_cell(profile, &monitor, cell, windows)?;
            }

            Command::RefreshWindows => {
                self.refresh_windows()?;
            }

            Command::Snap { profile } => {
                let report = self.snap(profile)?;
                info!(
                    "snapped profile {}: {} moved, {} failed",
                    profile,
                    report.moved.len(),
                    report.failures.len()
                );
            }

            Command::Save => self.save()?,

            Command::Load => {
                self.load()?;
            }

            Command::AddProfile => {
                self.add_profile();
            }

            Command::RemoveProfile { profile } => self.remove_profile(profile)?,

            Command::Status => info!("status:\n{}", self.status()),
        }
        Ok(())
    }

    /// Replace a monitor's grid with an even `rows × cols` grid.  Clears
    /// that monitor's assignments.
    pub fn set_grid_size(
        &mut self,
        profile: usize,
        monitor: &str,
        rows: usize,
        cols: usize,
    ) -> Result<(), SessionError> {
        self.state_mut(profile, monitor)?.set_grid_size(rows, cols);
        Ok(())
    }

    /// Drag a divider to an absolute pixel coordinate.
    pub fn move_divider(
        &mut self,
        profile: usize,
        monitor: &str,
        axis: Axis,
        index: usize,
        position: f64,
    ) -> Result<(), SessionError> {
        self.state_mut(profile, monitor)?
            .move_divider(axis, index, position)?;
        Ok(())
    }

    /// Replace the windows assigned to `cell`.
    ///
    /// Names the registry does not know are dropped with a warning.  Returns
    /// `false` if `cell` does not exist on the monitor's grid, in which case
    /// nothing changes.
    pub fn select_windows_for_cell(
        &mut self,
        profile: usize,
        monitor: &str,
        cell: usize,
        windows: Vec<String>,
    ) -> Result<bool, SessionError> {
        let (known, unknown): (Vec<String>, Vec<String>) = windows
            .into_iter()
            .partition(|w| self.registry.handle(w).is_some());
        if !unknown.is_empty() {
            warn!("ignoring unknown window(s): {}", unknown.join(", "));
        }
        let state = self.state_mut(profile, monitor)?;
        let selected = state.allocations_mut().select(cell, known);
        if selected {
            info!(
                "profile {} {} cell {}: {:?}",
                profile,
                monitor,
                cell,
                state.allocations().selected(cell)
            );
        }
        Ok(selected)
    }

    /// Re-enumerate live windows and drop assignments to closed ones in
    /// every profile.  Returns `true` if anything changed.
    pub fn refresh_windows(&mut self) -> Result<bool, SessionError> {
        let changed = self.registry.refresh(&self.wm).map_err(wm_err)?;
        let names = self.live_names();
        let mut dropped = false;
        for profile in &mut self.profiles {
            dropped |= profile.refresh_windows(&names);
        }
        debug!("{} live window(s)", names.len());
        Ok(changed || dropped)
    }

    /// Move every assigned window of `profile` into its cell.
    ///
    /// Each window is attempted independently: a failure is logged and
    /// reported, and the remaining windows are still moved.
    pub fn snap(&mut self, profile: usize) -> Result<SnapReport, SessionError> {
        if self.refresh_before_snap {
            self.refresh_windows()?;
        }
        let targets = self.profile(profile)?.snap_targets();
        info!("snapping {} window(s) of profile {}", targets.len(), profile);

        let mover = WindowMover::new(&self.wm);
        let mut report = SnapReport::default();
        for target in targets {
            let Some(handle) = self.registry.handle(&target.window) else {
                warn!("{} is no longer open", target.window);
                report.failures.push(SnapFailure {
                    window: target.window,
                    reason: "window is no longer open".into(),
                });
                continue;
            };
            match mover.move_window(handle, &target.rect) {
                Ok(placement) => {
                    debug!(
                        "{} -> {} cell {} at {:?}",
                        target.window, target.monitor, target.cell, placement
                    );
                    report.moved.push(target.window);
                }
                Err(e) => {
                    warn!("{}: {}", target.window, e);
                    report.failures.push(SnapFailure {
                        window: target.window,
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok(report)
    }

    /// Persist the divider geometry of every profile for the attached
    /// monitor set.
    pub fn save(&mut self) -> Result<(), SessionError> {
        let saved = self.profiles.iter().map(Profile::to_saved).collect();
        self.store.save(&self.identity, saved)?;
        Ok(())
    }

    /// Replace all profiles with the ones saved for the attached monitor
    /// set.
    ///
    /// If nothing is saved the current profiles are kept.  Window
    /// assignments are not persisted, so loaded profiles start empty.
    /// Returns the number of profiles loaded.
    pub fn load(&mut self) -> Result<usize, SessionError> {
        let Some(saved) = self.store.load(&self.identity) else {
            info!("nothing saved for monitor set {}", self.identity);
            return Ok(0);
        };
        let profiles: Vec<Profile> = saved
            .iter()
            .map(|s| {
                let mut profile = self.fresh_profile();
                profile.apply_saved(s);
                profile
            })
            .collect();
        info!("loaded {} profile(s)", profiles.len());
        self.profiles = profiles;
        Ok(self.profiles.len())
    }

    /// Append a default profile and return its index.
    pub fn add_profile(&mut self) -> usize {
        let profile = self.fresh_profile();
        self.profiles.push(profile);
        info!("added profile {}", self.profiles.len() - 1);
        self.profiles.len() - 1
    }

    /// Remove a profile.  At least one profile always remains.
    pub fn remove_profile(&mut self, profile: usize) -> Result<(), SessionError> {
        if profile >= self.profiles.len() {
            return Err(SessionError::UnknownProfile(profile));
        }
        if self.profiles.len() == 1 {
            return Err(SessionError::LastProfile);
        }
        self.profiles.remove(profile);
        info!("removed profile {}", profile);
        Ok(())
    }

    /// Human-readable summary of every profile.
    pub fn status(&self) -> String {
        let mut out = String::new();
        for (i, profile) in self.profiles.iter().enumerate() {
            let _ = writeln!(out, "profile {}", i);
            for state in profile.states() {
                let grid = state.grid();
                let _ = writeln!(
                    out,
                    "  {} ({}): {}x{}",
                    state.monitor(),
                    state.monitor().id,
                    grid.rows(),
                    grid.cols()
                );
                for label in state.labels() {
                    let _ = writeln!(
                        out,
                        "    cell {} [{}]: {}",
                        label.index,
                        label.percent_text(),
                        state.allocations().selected(label.index).join(", ")
                    );
                }
                let _ = writeln!(
                    out,
                    "    unassigned: {}",
                    state.allocations().unallocated().join(", ")
                );
            }
        }
        out
    }

    fn state_mut(
        &mut self,
        profile: usize,
        monitor: &str,
    ) -> Result<&mut MonitorProfileState, SessionError> {
        self.profiles
            .get_mut(profile)
            .ok_or(SessionError::UnknownProfile(profile))?
            .state_mut(monitor)
            .ok_or_else(|| SessionError::UnknownMonitor(monitor.to_string()))
    }

    fn live_names(&self) -> Vec<String> {
        self.registry.names().map(str::to_owned).collect()
    }

    /// A default profile that already knows the live windows.
    fn fresh_profile(&self) -> Profile {
        let mut profile = Profile::new(&self.monitors);
        profile.refresh_windows(&self.live_names());
        profile
    }
}

fn wm_err(e: impl std::error::Error) -> SessionError {
    SessionError::WindowManager(e.to_string())
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{WindowHandle, WindowInfo};
    use crate::geometry::Rectangle;
    use crate::headless::HeadlessWm;
    use crate::placement::BorderOffsets;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU32, Ordering};

    static TEST_ID: AtomicU32 = AtomicU32::new(0);

    fn tmp_store_path() -> PathBuf {
        let id = TEST_ID.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir()
            .join(format!("winsnap-session-test-{}-{}", std::process::id(), id))
            .join("profiles.json")
    }

    fn monitors() -> Vec<Monitor> {
        vec![
            Monitor {
                area: Rectangle::new(0.0, 1920.0, 0.0, 1080.0),
                work: Rectangle::new(0.0, 1920.0, 0.0, 1040.0),
                is_primary: true,
                name: "DISPLAY1".into(),
                id: "MON-A".into(),
            },
            Monitor {
                area: Rectangle::new(1920.0, 3840.0, 0.0, 1080.0),
                work: Rectangle::new(1920.0, 3840.0, 0.0, 1080.0),
                is_primary: false,
                name: "DISPLAY2".into(),
                id: "MON-B".into(),
            },
        ]
    }

    fn border() -> BorderOffsets {
        BorderOffsets {
            left: 7.0,
            right: 7.0,
            top: 0.0,
            bottom: 7.0,
        }
    }

    /// A session with `code.exe`, `slack.exe` and two `explorer.exe`
    /// windows open and already enumerated.
    fn session() -> (Session<HeadlessWm>, Vec<WindowHandle>) {
        let wm = HeadlessWm::new(monitors());
        let start = Rectangle::new(100.0, 500.0, 100.0, 400.0);
        let handles = ["code.exe", "slack.exe", "explorer.exe", "explorer.exe"]
            .iter()
            .map(|app| wm.open_window(app, start, border()))
            .collect();
        let mut s = Session::new(wm, ProfileStore::in_memory()).unwrap();
        s.refresh_windows().unwrap();
        (s, handles)
    }

    #[test]
    fn new_session_has_one_default_profile() {
        let (s, _) = session();
        assert_eq!(s.profiles().len(), 1);
        assert_eq!(s.monitors().len(), 2);
        assert!(s
            .profile(0)
            .unwrap()
            .states()
            .iter()
            .all(|st| st.grid().cell_count() == 1));
        assert_eq!(
            s.registry().names().collect::<Vec<_>>(),
            vec!["code.exe", "explorer.exe - 1", "explorer.exe - 2", "slack.exe"]
        );
    }

    #[test]
    fn snap_places_visible_frames_on_cells() {
        let (mut s, handles) = session();
        s.set_grid_size(0, "MON-A", 2, 2).unwrap();
        s.select_windows_for_cell(0, "MON-A", 2, vec!["code.exe".into()])
            .unwrap();
        s.select_windows_for_cell(0, "MON-B", 1, vec!["slack.exe".into()])
            .unwrap();

        let report = s.snap(0).unwrap();
        assert_eq!(report.moved.len(), 2);
        assert!(report.failures.is_empty());
        assert_eq!(
            s.wm().visible_frame(handles[0]).unwrap(),
            Rectangle::new(960.0, 1920.0, 0.0, 520.0)
        );
        assert_eq!(
            s.wm().visible_frame(handles[1]).unwrap(),
            monitors()[1].work
        );
    }

    #[test]
    fn one_failed_window_does_not_stop_the_others() {
        let (mut s, handles) = session();
        s.set_refresh_before_snap(false);
        s.set_grid_size(0, "MON-A", 1, 2).unwrap();
        s.select_windows_for_cell(0, "MON-A", 1, vec!["code.exe".into()])
            .unwrap();
        s.select_windows_for_cell(0, "MON-A", 2, vec!["slack.exe".into()])
            .unwrap();
        s.wm().close_window(handles[0]);

        let report = s.snap(0).unwrap();
        assert_eq!(report.moved, vec!["slack.exe"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].window, "code.exe");
        assert_eq!(
            s.wm().visible_frame(handles[1]).unwrap(),
            Rectangle::new(960.0, 1920.0, 0.0, 1040.0)
        );
    }

    #[test]
    fn refresh_before_snap_drops_closed_windows() {
        let (mut s, handles) = session();
        s.select_windows_for_cell(0, "MON-A", 1, vec!["code.exe".into(), "slack.exe".into()])
            .unwrap();
        s.wm().close_window(handles[1]);

        let report = s.snap(0).unwrap();
        assert_eq!(report.moved, vec!["code.exe"]);
        assert!(report.failures.is_empty());
        let state = s.profile(0).unwrap().state("MON-A").unwrap();
        assert_eq!(state.allocations().selected(1), vec!["code.exe"]);
    }

    #[test]
    fn unknown_windows_are_not_selected() {
        let (mut s, _) = session();
        s.select_windows_for_cell(0, "MON-A", 1, vec!["code.exe".into(), "ghost.exe".into()])
            .unwrap();
        let state = s.profile(0).unwrap().state("MON-A").unwrap();
        assert_eq!(state.allocations().selected(1), vec!["code.exe"]);
    }

    #[test]
    fn out_of_range_cell_is_ignored() {
        let (mut s, _) = session();
        let selected = s
            .select_windows_for_cell(0, "MON-A", 2, vec!["code.exe".into()])
            .unwrap();
        assert!(!selected);
        assert!(s.profile(0).unwrap().state("MON-A").unwrap().allocations().is_empty());
    }

    #[test]
    fn unknown_profile_and_monitor_are_errors() {
        let (mut s, _) = session();
        assert!(matches!(
            s.set_grid_size(3, "MON-A", 2, 2),
            Err(SessionError::UnknownProfile(3))
        ));
        assert!(matches!(
            s.set_grid_size(0, "MON-Z", 2, 2),
            Err(SessionError::UnknownMonitor(_))
        ));
        assert!(matches!(s.snap(1), Err(SessionError::UnknownProfile(1))));
    }

    #[test]
    fn invalid_divider_move_is_reported() {
        let (mut s, _) = session();
        s.set_grid_size(0, "MON-A", 1, 3).unwrap();
        let err = s
            .move_divider(0, "MON-A", Axis::Column, 0, 5000.0)
            .unwrap_err();
        assert!(matches!(err, SessionError::Grid(_)));
        s.move_divider(0, "MON-A", Axis::Column, 0, 480.0).unwrap();
        let cell = s.profile(0).unwrap().state("MON-A").unwrap().cell(1).unwrap();
        assert_eq!(cell.rect.right(), 480.0);
    }

    #[test]
    fn oversized_grid_command_is_clamped() {
        let (mut s, _) = session();
        let cmd: Command = serde_json::from_str(
            r#"{"SetGrid":{"profile":0,"monitor":"MON-A","rows":18446744073709551615,"cols":1}}"#,
        )
        .unwrap();
        s.handle(cmd).unwrap();
        let grid = s.profile(0).unwrap().state("MON-A").unwrap().grid();
        assert_eq!(grid.rows(), 1040);
        assert_eq!(grid.cols(), 1);
    }

    #[test]
    fn profiles_are_independent() {
        let (mut s, _) = session();
        assert_eq!(s.add_profile(), 1);
        s.set_grid_size(1, "MON-B", 3, 1).unwrap();
        s.select_windows_for_cell(1, "MON-B", 3, vec!["code.exe".into()])
            .unwrap();
        s.select_windows_for_cell(0, "MON-A", 1, vec!["code.exe".into()])
            .unwrap();

        assert_eq!(s.profile(0).unwrap().state("MON-B").unwrap().grid().cell_count(), 1);
        assert_eq!(
            s.profile(1).unwrap().state("MON-B").unwrap().allocations().selected(3),
            vec!["code.exe"]
        );
        // A new profile already knows the live windows.
        assert_eq!(
            s.profile(1).unwrap().state("MON-A").unwrap().allocations().unallocated().len(),
            4
        );
    }

    #[test]
    fn last_profile_cannot_be_removed() {
        let (mut s, _) = session();
        assert!(matches!(s.remove_profile(0), Err(SessionError::LastProfile)));
        s.add_profile();
        assert!(matches!(s.remove_profile(2), Err(SessionError::UnknownProfile(2))));
        s.remove_profile(0).unwrap();
        assert_eq!(s.profiles().len(), 1);
    }

    #[test]
    fn load_without_saved_profiles_keeps_current() {
        let (mut s, _) = session();
        s.set_grid_size(0, "MON-A", 2, 2).unwrap();
        assert_eq!(s.load().unwrap(), 0);
        assert_eq!(s.profiles().len(), 1);
        assert_eq!(s.profile(0).unwrap().state("MON-A").unwrap().grid().cell_count(), 4);
    }

    #[test]
    fn save_and_load_across_sessions() {
        let path = tmp_store_path();
        let identity = {
            let store = ProfileStore::open(&path).unwrap();
            let mut s = Session::new(HeadlessWm::new(monitors()), store).unwrap();
            s.set_grid_size(0, "MON-A", 2, 3).unwrap();
            s.move_divider(0, "MON-A", Axis::Row, 0, 260.0).unwrap();
            s.add_profile();
            s.set_grid_size(1, "MON-B", 1, 4).unwrap();
            s.save().unwrap();
            s.identity().to_string()
        };

        // Monitors enumerated in a different order map to the same set.
        let mut reversed = monitors();
        reversed.reverse();
        let mut s = Session::new(HeadlessWm::new(reversed), ProfileStore::open(&path).unwrap())
            .unwrap();
        assert_eq!(s.identity(), identity);
        assert_eq!(s.load().unwrap(), 2);

        let a = s.profile(0).unwrap().state("MON-A").unwrap();
        assert_eq!((a.grid().rows(), a.grid().cols()), (2, 3));
        assert_eq!(a.cell(1).unwrap().rect.bottom(), 260.0);
        let b = s.profile(1).unwrap().state("MON-B").unwrap();
        assert_eq!((b.grid().rows(), b.grid().cols()), (1, 4));
        assert!(b.allocations().is_empty());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn handle_dispatches_commands() {
        let (mut s, _) = session();
        let cmds: Vec<Command> = [
            r#"{"SetGrid":{"profile":0,"monitor":"MON-A","rows":1,"cols":2}}"#,
            r#"{"Select":{"profile":0,"monitor":"MON-A","cell":2,"windows":["explorer.exe - 2"]}}"#,
            r#""AddProfile""#,
            r#"{"RemoveProfile":{"profile":1}}"#,
            r#""Status""#,
            r#""Save""#,
        ]
        .iter()
        .map(|j| serde_json::from_str(j).unwrap())
        .collect();
        for cmd in cmds {
            s.handle(cmd).unwrap();
        }
        assert_eq!(s.profiles().len(), 1);
        let state = s.profile(0).unwrap().state("MON-A").unwrap();
        assert_eq!(state.allocations().selected(2), vec!["explorer.exe - 2"]);
        assert!(s.status().contains("cell 2 [50.00x100.00]: explorer.exe - 2"));
    }

    //  Failing window manager

    /// Window manager on which every call fails.
    #[derive(Debug, Default)]
    struct BrokenWm;

    #[derive(Debug, thiserror::Error)]
    #[error("broken")]
    struct BrokenErr;

    impl WindowManager for BrokenWm {
        type Error = BrokenErr;

        fn monitors(&self) -> Result<Vec<Monitor>, BrokenErr> {
            Err(BrokenErr)
        }

        fn windows(&self) -> Result<Vec<WindowInfo>, BrokenErr> {
            Err(BrokenErr)
        }

        fn window_bounds(&self, _: WindowHandle) -> Result<Rectangle, BrokenErr> {
            Err(BrokenErr)
        }

        fn visible_frame(&self, _: WindowHandle) -> Result<Rectangle, BrokenErr> {
            Err(BrokenErr)
        }

        fn restore(&self, _: WindowHandle) -> Result<(), BrokenErr> {
            Err(BrokenErr)
        }

        fn set_position(&self, _: WindowHandle, _: i32, _: i32) -> Result<(), BrokenErr> {
            Err(BrokenErr)
        }

        fn set_size(&self, _: WindowHandle, _: i32, _: i32) -> Result<(), BrokenErr> {
            Err(BrokenErr)
        }
    }

    #[test]
    fn monitor_query_failure_is_a_window_manager_error() {
        let err = Session::new(BrokenWm, ProfileStore::in_memory())
            .err()
            .unwrap();
        assert!(matches!(err, SessionError::WindowManager(ref m) if m == "broken"));
    }
}
