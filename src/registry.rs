//! The set of live windows known to a session.
//!
//! Windows are identified by a display name derived from their application
//! (`"code.exe"`), because titles change with application state.  When an
//! application owns several windows each gets a counter suffix
//! (`"explorer.exe - 1"`, `"explorer.exe - 2"`), numbered in handle order so
//! the same windows get the same names on every enumeration.

use crate::command::{WindowHandle, WindowInfo};
use crate::traits::WindowManager;
use log::{debug, warn};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowRegistry {
    windows: BTreeMap<String, WindowHandle>,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry directly from enumerated windows.
    pub fn from_windows(windows: impl IntoIterator<Item = WindowInfo>) -> Self {
        Self {
            windows: disambiguate(windows),
        }
    }

    /// Re-enumerate windows through `wm`.
    ///
    /// Returns `true` if the set of names or any handle changed.
    pub fn refresh<W: WindowManager>(&mut self, wm: &W) -> Result<bool, W::Error> {
        let windows = disambiguate(wm.windows()?);
        if windows == self.windows {
            return Ok(false);
        }
        debug!("live windows changed: {:?}", windows.keys().collect::<Vec<_>>());
        self.windows = windows;
        Ok(true)
    }

    pub fn handle(&self, name: &str) -> Option<WindowHandle> {
        self.windows.get(name).copied()
    }

    /// Every window name, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.windows.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

/// Give every window a unique name.
///
/// A lone window of an application is named after the application; several
/// windows of the same application are suffixed ` - 1`, ` - 2`, … in
/// ascending handle order.  Lone windows claim their names first; a suffix
/// that would repeat one of them is skipped.
pub fn disambiguate(
    windows: impl IntoIterator<Item = WindowInfo>,
) -> BTreeMap<String, WindowHandle> {
    let mut by_app: BTreeMap<String, Vec<WindowHandle>> = BTreeMap::new();
    for w in windows {
        by_app.entry(w.app).or_default().push(w.handle);
    }
    for handles in by_app.values_mut() {
        handles.sort();
        handles.dedup();
    }

    let mut names = BTreeMap::new();
    for (app, handles) in by_app.iter().filter(|(_, h)| h.len() == 1) {
        names.insert(app.clone(), handles[0]);
    }
    for (app, handles) in by_app.iter().filter(|(_, h)| h.len() > 1) {
        let mut n = 1;
        for handle in handles {
            let mut name = format!("{} - {}", app, n);
            while names.contains_key(&name) {
                warn!("window name {} already taken, skipping", name);
                n += 1;
                name = format!("{} - {}", app, n);
            }
            names.insert(name, *handle);
            n += 1;
        }
    }
    names
}
