//! **winsnap**: split each monitor into a grid and snap windows into its
//! cells.
//!
//! Every monitor's work area is divided by movable row and column dividers.
//! Live application windows are assigned to cells, and a snap moves each
//! window so its *visible* frame exactly covers its cell, compensating for
//! the invisible resize borders modern desktops add.  Divider layouts are
//! saved per combination of attached monitors.
//!
//! # Architecture
//!
//! The crate is organised around two core traits:
//!
//! * [`traits::WindowManager`] abstracts monitor and window enumeration and
//!   raw window placement so the layout logic is not coupled to any
//!   specific desktop.
//! * [`traits::CommandSource`] abstracts the transport that delivers
//!   user intent, so the main loop is not coupled to any specific front end.
//!
//! [`session::Session`] owns the engine state and applies commands.
//! Concrete backends live in `win32` (Windows only) and [`headless`]
//! (in-memory); [`ipc`] reads JSON commands line by line.

pub mod allocation;
pub mod command;
pub mod config;
pub mod geometry;
pub mod grid;
pub mod headless;
pub mod ipc;
pub mod placement;
pub mod profile;
pub mod registry;
pub mod session;
pub mod store;
pub mod traits;
#[cfg(windows)]
pub mod win32;
