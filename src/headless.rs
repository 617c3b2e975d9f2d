//! In-memory [`WindowManager`] used off Windows and in tests.
//!
//! Monitors are fixed at construction.  Windows live in a table and honour
//! placement calls exactly, with a configurable invisible border so the
//! border compensation in [`placement`](crate::placement) is exercised the
//! same way a real desktop would exercise it.

use crate::command::{WindowHandle, WindowInfo};
use crate::geometry::{Monitor, Rectangle};
use crate::placement::BorderOffsets;
use crate::traits::WindowManager;
use log::debug;
use std::cell::RefCell;
use std::collections::BTreeMap;

/// One simulated top-level window.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessWindow {
    pub app: String,
    /// Positioning rectangle, invisible border included.
    pub bounds: Rectangle,
    /// Invisible border on each side.
    pub border: BorderOffsets,
    pub maximized: bool,
}

impl HeadlessWindow {
    /// The frame a user would see.
    pub fn visible(&self) -> Rectangle {
        Rectangle::new(
            self.bounds.left() + self.border.left,
            self.bounds.right() - self.border.right,
            self.bounds.top() + self.border.top,
            self.bounds.bottom() - self.border.bottom,
        )
    }
}

#[derive(Debug, thiserror::Error)]
#[error("headless: {0}")]
pub struct HeadlessWmError(String);

#[derive(Debug, Default)]
pub struct HeadlessWm {
    monitors: Vec<Monitor>,
    windows: RefCell<BTreeMap<WindowHandle, HeadlessWindow>>,
    next_handle: RefCell<isize>,
}

impl HeadlessWm {
    pub fn new(monitors: Vec<Monitor>) -> Self {
        Self {
            monitors,
            windows: RefCell::new(BTreeMap::new()),
            next_handle: RefCell::new(0x100),
        }
    }

    /// A single 1920×1080 primary monitor with a 40 px taskbar at the
    /// bottom.
    pub fn single_monitor() -> Self {
        Self::new(vec![Monitor {
            area: Rectangle::new(0.0, 1920.0, 0.0, 1080.0),
            work: Rectangle::new(0.0, 1920.0, 0.0, 1040.0),
            is_primary: true,
            name: "HEADLESS-1".into(),
            id: "HEADLESS-1".into(),
        }])
    }

    /// Open a window of `app` whose visible frame is `visible`.
    pub fn open_window(
        &self,
        app: &str,
        visible: Rectangle,
        border: BorderOffsets,
    ) -> WindowHandle {
        let mut next = self.next_handle.borrow_mut();
        let handle = WindowHandle(*next);
        *next += 1;
        let bounds = Rectangle::new(
            visible.left() - border.left,
            visible.right() + border.right,
            visible.top() - border.top,
            visible.bottom() + border.bottom,
        );
        self.windows.borrow_mut().insert(
            handle,
            HeadlessWindow {
                app: app.into(),
                bounds,
                border,
                maximized: false,
            },
        );
        debug!("headless: opened {} as {}", app, handle);
        handle
    }

    pub fn close_window(&self, handle: WindowHandle) -> bool {
        self.windows.borrow_mut().remove(&handle).is_some()
    }

    pub fn maximize(&self, handle: WindowHandle) {
        if let Some(w) = self.windows.borrow_mut().get_mut(&handle) {
            w.maximized = true;
        }
    }

    pub fn window(&self, handle: WindowHandle) -> Option<HeadlessWindow> {
        self.windows.borrow().get(&handle).cloned()
    }

    fn with_window<T>(
        &self,
        handle: WindowHandle,
        f: impl FnOnce(&mut HeadlessWindow) -> T,
    ) -> Result<T, HeadlessWmError> {
        self.windows
            .borrow_mut()
            .get_mut(&handle)
            .map(f)
            .ok_or_else(|| HeadlessWmError(format!("no window {}", handle)))
    }
}

impl WindowManager for HeadlessWm {
    type Error = HeadlessWmError;

    fn monitors(&self) -> Result<Vec<Monitor>, HeadlessWmError> {
        Ok(self.monitors.clone())
    }

    fn windows(&self) -> Result<Vec<WindowInfo>, HeadlessWmError> {
        Ok(self
            .windows
            .borrow()
            .iter()
            .map(|(handle, w)| WindowInfo {
                app: w.app.clone(),
                handle: *handle,
            })
            .collect())
    }

    fn window_bounds(&self, window: WindowHandle) -> Result<Rectangle, HeadlessWmError> {
        self.with_window(window, |w| w.bounds)
    }

    fn visible_frame(&self, window: WindowHandle) -> Result<Rectangle, HeadlessWmError> {
        self.with_window(window, |w| w.visible())
    }

    fn restore(&self, window: WindowHandle) -> Result<(), HeadlessWmError> {
        self.with_window(window, |w| w.maximized = false)
    }

    fn set_position(&self, window: WindowHandle, x: i32, y: i32) -> Result<(), HeadlessWmError> {
        self.with_window(window, |w| {
            if w.maximized {
                return Err(HeadlessWmError(format!("window {} is maximized", window)));
            }
            let (x, y) = (f64::from(x), f64::from(y));
            w.bounds = Rectangle::new(x, x + w.bounds.width(), y, y + w.bounds.height());
            Ok(())
        })?
    }

    fn set_size(
        &self,
        window: WindowHandle,
        width: i32,
        height: i32,
    ) -> Result<(), HeadlessWmError> {
        self.with_window(window, |w| {
            let (left, top) = (w.bounds.left(), w.bounds.top());
            w.bounds = Rectangle::new(left, left + f64::from(width), top, top + f64::from(height));
        })
    }
}

//  Tests
