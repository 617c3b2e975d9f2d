//! Accurate window placement.
//!
//! Top-level windows on modern desktops carry an invisible resize border:
//! the rectangle a window is positioned by is larger than the frame the
//! user actually sees, by an amount that varies per window and per theme.
//! Placing a window at a cell's rectangle naively leaves visible gaps.
//!
//! [`BorderOffsets`] measures that invisible border and [`Placement`] turns
//! a desired *visible* rectangle into the raw position and size calls that
//! produce it.  [`WindowMover`] runs the full sequence against a
//! [`WindowManager`].

use crate::command::WindowHandle;
use crate::geometry::Rectangle;
use crate::traits::WindowManager;
use log::debug;
use std::fmt;

/// Invisible border widths of one window, in pixels.  Never negative.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BorderOffsets {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl BorderOffsets {
    /// Offsets between a window's true bounds and its visible frame: the
    /// absolute difference of each pair of corresponding edges.
    pub fn between(bounds: &Rectangle, visible: &Rectangle) -> Self {
        Self {
            left: (bounds.left() - visible.left()).abs(),
            right: (bounds.right() - visible.right()).abs(),
            top: (bounds.top() - visible.top()).abs(),
            bottom: (bounds.bottom() - visible.bottom()).abs(),
        }
    }

    /// Query both rectangles of `window` and measure its border.
    pub fn query<W: WindowManager>(wm: &W, window: WindowHandle) -> Result<Self, W::Error> {
        let bounds = wm.window_bounds(window)?;
        let visible = wm.visible_frame(window)?;
        Ok(Self::between(&bounds, &visible))
    }
}

/// The raw position and size that make a window's visible frame cover a
/// target rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Placement {
    /// Compensate `target` for `borders`.
    ///
    /// The target is truncated to whole pixels first; the border is then
    /// added back on every side so that only the visible frame lands on
    /// the target.
    pub fn compensated(target: &Rectangle, borders: &BorderOffsets) -> Self {
        let (x, y, width, height) = target.to_pixels();
        Self {
            x: x - borders.left as i32,
            y: y - borders.top as i32,
            width: width + borders.left as i32 + borders.right as i32,
            height: height + borders.top as i32 + borders.bottom as i32,
        }
    }
}

/// The step of a move that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveStep {
    MeasureBorders,
    Restore,
    Position,
    Resize,
}

impl fmt::Display for MoveStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveStep::MeasureBorders => write!(f, "measuring borders"),
            MoveStep::Restore => write!(f, "restoring"),
            MoveStep::Position => write!(f, "positioning"),
            MoveStep::Resize => write!(f, "resizing"),
        }
    }
}

/// A failed [`WindowMover::move_window`] call.
#[derive(Debug, thiserror::Error)]
#[error("{step} window {window} failed: {message}")]
pub struct MoveError {
    pub window: WindowHandle,
    pub step: MoveStep,
    pub message: String,
}

/// Moves windows so their visible frame matches a target rectangle.
///
/// Borrowing the window manager keeps the mover cheap to create per snap.
pub struct WindowMover<'a, W: WindowManager> {
    wm: &'a W,
}

impl<'a, W: WindowManager> WindowMover<'a, W> {
    pub fn new(wm: &'a W) -> Self {
        Self { wm }
    }

    /// Place `window` so its visible frame covers `target`.
    ///
    /// The sequence is fixed: measure the border, restore the window (a
    /// maximized window ignores position changes), set the position only,
    /// then set the size only.  Separate position and size calls are needed
    /// because some applications do not honour a combined move-and-resize.
    /// The first failing step aborts this window; nothing is retried.
    pub fn move_window(
        &self,
        window: WindowHandle,
        target: &Rectangle,
    ) -> Result<Placement, MoveError> {
        let fail = |step: MoveStep| {
            move |e: W::Error| MoveError {
                window,
                step,
                message: e.to_string(),
            }
        };

        let borders =
            BorderOffsets::query(self.wm, window).map_err(fail(MoveStep::MeasureBorders))?;
        let placement = Placement::compensated(target, &borders);
        debug!(
            "window {}: target {}, borders {:?}, placing at {:?}",
            window, target, borders, placement
        );

        self.wm.restore(window).map_err(fail(MoveStep::Restore))?;
        self.wm
            .set_position(window, placement.x, placement.y)
            .map_err(fail(MoveStep::Position))?;
        self.wm
            .set_size(window, placement.width, placement.height)
            .map_err(fail(MoveStep::Resize))?;
        Ok(placement)
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::WindowInfo;
    use crate::geometry::Monitor;
    use std::cell::RefCell;

    /// Window manager whose single window has a fixed invisible border and
    /// which records placement calls in order.
    #[derive(Debug, Default)]
    struct BorderedWm {
        bounds: Option<Rectangle>,
        visible: Option<Rectangle>,
        fail_restore: bool,
        calls: RefCell<Vec<String>>,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("bordered error")]
    struct BorderedErr;

    impl BorderedWm {
        /// Border of 2 px left/right, 0 px top, 4 px bottom.
        fn with_borders() -> Self {
            Self {
                bounds: Some(Rectangle::new(498.0, 702.0, 300.0, 504.0)),
                visible: Some(Rectangle::new(500.0, 700.0, 300.0, 500.0)),
                ..Default::default()
            }
        }
    }

    impl WindowManager for BorderedWm {
        type Error = BorderedErr;

        fn monitors(&self) -> Result<Vec<Monitor>, BorderedErr> {
            Ok(Vec::new())
        }

        fn windows(&self) -> Result<Vec<WindowInfo>, BorderedErr> {
            Ok(Vec::new())
        }

        fn window_bounds(&self, _: WindowHandle) -> Result<Rectangle, BorderedErr> {
            self.calls.borrow_mut().push("bounds".into());
            self.bounds.ok_or(BorderedErr)
        }

        fn visible_frame(&self, _: WindowHandle) -> Result<Rectangle, BorderedErr> {
            self.calls.borrow_mut().push("frame".into());
            self.visible.ok_or(BorderedErr)
        }

        fn restore(&self, _: WindowHandle) -> Result<(), BorderedErr> {
            if self.fail_restore {
                return Err(BorderedErr);
            }
            self.calls.borrow_mut().push("restore".into());
            Ok(())
        }

        fn set_position(&self, _: WindowHandle, x: i32, y: i32) -> Result<(), BorderedErr> {
            self.calls.borrow_mut().push(format!("position {} {}", x, y));
            Ok(())
        }

        fn set_size(&self, _: WindowHandle, w: i32, h: i32) -> Result<(), BorderedErr> {
            self.calls.borrow_mut().push(format!("size {} {}", w, h));
            Ok(())
        }
    }

    #[test]
    fn offsets_are_absolute_edge_differences() {
        let bounds = Rectangle::new(90.0, 310.0, 100.0, 307.0);
        let visible = Rectangle::new(97.0, 303.0, 100.0, 300.0);
        let b = BorderOffsets::between(&bounds, &visible);
        assert_eq!(
            b,
            BorderOffsets {
                left: 7.0,
                right: 7.0,
                top: 0.0,
                bottom: 7.0
            }
        );
        // Order of arguments does not produce negative offsets.
        assert_eq!(BorderOffsets::between(&visible, &bounds), b);
    }

    #[test]
    fn compensation_adds_borders_back() {
        let borders = BorderOffsets {
            left: 2.0,
            right: 2.0,
            top: 0.0,
            bottom: 4.0,
        };
        let target = Rectangle::new(100.0, 300.0, 100.0, 300.0);
        assert_eq!(
            Placement::compensated(&target, &borders),
            Placement {
                x: 98,
                y: 100,
                width: 204,
                height: 204
            }
        );
    }

    #[test]
    fn zero_borders_place_exactly() {
        let target = Rectangle::new(960.0, 1920.0, 0.0, 540.0);
        assert_eq!(
            Placement::compensated(&target, &BorderOffsets::default()),
            Placement {
                x: 960,
                y: 0,
                width: 960,
                height: 540
            }
        );
    }

    #[test]
    fn move_restores_then_positions_then_resizes() {
        let wm = BorderedWm::with_borders();
        let mover = WindowMover::new(&wm);
        let target = Rectangle::new(100.0, 300.0, 100.0, 300.0);
        let placement = mover.move_window(WindowHandle(1), &target).unwrap();
        assert_eq!(placement.x, 98);
        assert_eq!(
            *wm.calls.borrow(),
            vec![
                "bounds".to_string(),
                "frame".to_string(),
                "restore".to_string(),
                "position 98 100".to_string(),
                "size 204 204".to_string(),
            ]
        );
    }

    #[test]
    fn failed_restore_stops_before_moving() {
        let wm = BorderedWm {
            fail_restore: true,
            ..BorderedWm::with_borders()
        };
        let err = WindowMover::new(&wm)
            .move_window(WindowHandle(3), &Rectangle::new(0.0, 10.0, 0.0, 10.0))
            .unwrap_err();
        assert_eq!(err.step, MoveStep::Restore);
        assert_eq!(err.window, WindowHandle(3));
        assert!(!wm.calls.borrow().iter().any(|c| c.starts_with("position")));
    }

    #[test]
    fn unmeasurable_window_is_not_touched() {
        let wm = BorderedWm::default();
        let err = WindowMover::new(&wm)
            .move_window(WindowHandle(9), &Rectangle::new(0.0, 10.0, 0.0, 10.0))
            .unwrap_err();
        assert_eq!(err.step, MoveStep::MeasureBorders);
        assert_eq!(*wm.calls.borrow(), vec!["bounds".to_string()]);
    }
}
