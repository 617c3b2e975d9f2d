//! Saved layouts, keyed by the set of attached monitors.
//!
//! A layout tuned for one combination of monitors rarely suits another, so
//! every distinct *set* of monitor ids gets its own generated identity and
//! its own list of saved profiles.  The whole store is a single JSON
//! document:
//!
//! ```json
//! {
//!   "monitor_sets": { "6f1c…": ["MONITOR\\GSM5B7F", "MONITOR\\DEL40F4"] },
//!   "6f1c…": [
//!     { "MONITOR\\GSM5B7F": { "xlines": [0.5], "ylines": [] },
//!       "MONITOR\\DEL40F4": { "xlines": [], "ylines": [0.25, 0.75] } }
//!   ]
//! }
//! ```
//!
//! `xlines` are the vertical divider lines (column boundaries) as fractions
//! of the work-area width; `ylines` are the horizontal ones (row boundaries)
//! as fractions of the work-area height.  Only divider geometry is stored;
//! window assignments are not.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Stored divider geometry of one monitor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonitorLayout {
    /// Column divider fractions, ascending.
    #[serde(default)]
    pub xlines: Vec<f64>,
    /// Row divider fractions, ascending.
    #[serde(default)]
    pub ylines: Vec<f64>,
}

/// One saved profile: `monitor id -> layout`.
pub type SavedProfile = BTreeMap<String, MonitorLayout>;

/// On-disk document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct StoreDocument {
    /// `identity -> monitor ids`
    #[serde(default)]
    monitor_sets: BTreeMap<String, Vec<String>>,
    /// `identity -> saved profiles`, stored as top-level keys.
    #[serde(flatten)]
    layouts: BTreeMap<String, Vec<SavedProfile>>,
}

/// Errors from reading or writing the store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {}", .path.display(), .source)]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to write {}: {}", .path.display(), .source)]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to encode store: {0}")]
    Encode(#[from] serde_json::Error),
}

/// The persisted collection of saved profiles.
///
/// All mutations happen in memory; [`save`](ProfileStore::save) writes the
/// whole document back.
#[derive(Debug, Clone, Default)]
pub struct ProfileStore {
    path: Option<PathBuf>,
    document: StoreDocument,
}

impl ProfileStore {
    /// Open the store at `path`.
    ///
    /// A missing file yields an empty store; the file and its parent
    /// directory are created on the first save.  A file that exists but
    /// cannot be parsed is an error; it is never silently replaced.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            info!("no saved profiles at {}, starting empty", path.display());
            return Ok(Self {
                path: Some(path),
                document: StoreDocument::default(),
            });
        }
        let contents = std::fs::read_to_string(&path).map_err(|source| StoreError::Read {
            path: path.clone(),
            source,
        })?;
        let document: StoreDocument =
            serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
                path: path.clone(),
                source,
            })?;
        info!(
            "loaded {} monitor set(s) from {}",
            document.monitor_sets.len(),
            path.display()
        );
        Ok(Self {
            path: Some(path),
            document,
        })
    }

    /// A store that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Identity of the monitor set made of `monitor_ids`.
    ///
    /// Ids are compared as a set, so enumeration order never matters and a
    /// subset or superset of a known set is a different set.  An unknown set
    /// is given a fresh identity, recorded in the document and written with
    /// the next save.
    pub fn monitor_set_identity<S: AsRef<str>>(&mut self, monitor_ids: &[S]) -> String {
        let current: BTreeSet<&str> = monitor_ids.iter().map(AsRef::as_ref).collect();
        let existing = self.document.monitor_sets.iter().find(|(_, ids)| {
            ids.iter().map(String::as_str).collect::<BTreeSet<_>>() == current
        });
        if let Some((identity, _)) = existing {
            debug!("found existing monitor set {}", identity);
            return identity.clone();
        }

        let identity = uuid::Uuid::new_v4().to_string();
        self.document.monitor_sets.insert(
            identity.clone(),
            current.into_iter().map(str::to_owned).collect(),
        );
        info!("created new monitor set {}", identity);
        identity
    }

    /// Monitor ids recorded for `identity`, sorted.
    pub fn monitor_set(&self, identity: &str) -> Option<&[String]> {
        self.document.monitor_sets.get(identity).map(Vec::as_slice)
    }

    /// Replace the saved profiles of `identity` and write the document.
    pub fn save(&mut self, identity: &str, profiles: Vec<SavedProfile>) -> Result<(), StoreError> {
        info!("saving {} profile(s) for monitor set {}", profiles.len(), identity);
        self.document.layouts.insert(identity.to_string(), profiles);
        self.write()
    }

    /// Saved profiles of `identity`, or `None` if nothing was saved.
    ///
    /// An empty saved list is reported as `None` too: either way the caller
    /// keeps its single default profile.
    pub fn load(&self, identity: &str) -> Option<&[SavedProfile]> {
        match self.document.layouts.get(identity) {
            Some(profiles) if !profiles.is_empty() => Some(profiles.as_slice()),
            _ => {
                debug!("no saved profiles for monitor set {}", identity);
                None
            }
        }
    }

    /// Write the whole document, replacing the file atomically.
    fn write(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&self.document)?;
        let write_err = |source| StoreError::Write {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(write_err)?;
        std::fs::rename(&tmp, path).map_err(write_err)?;
        debug!("wrote {}", path.display());
        Ok(())
    }
}

//  Tests
