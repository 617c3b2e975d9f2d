//! Core traits that decouple winsnap from any specific window system or
//! transport mechanism.
//!
//! Every concrete backend (Win32, the headless backend, a test harness, …)
//! implements one of these traits.  The [`Session`](crate::session::Session)
//! only depends on these abstractions.

use crate::command::{Command, WindowHandle, WindowInfo};
use crate::geometry::{Monitor, Rectangle};
use std::sync::mpsc;

/// Abstraction over the operating system's window manager: monitor
/// enumeration, live-window enumeration and raw window placement.
///
/// An implementation might call the Win32 API, or it might be an in-memory
/// stub used in tests.
///
/// The placement primitives are deliberately low level.  Compensating for
/// invisible borders and sequencing restore → move → resize is the job of
/// [`WindowMover`](crate::placement::WindowMover), not of the backend.
pub trait WindowManager {
    /// The error type produced by this window manager.
    type Error: std::error::Error + Send + 'static;

    /// Return every attached monitor.
    fn monitors(&self) -> Result<Vec<Monitor>, Self::Error>;

    /// Return every movable top-level window.
    ///
    /// Shell windows (desktop, taskbar) must be excluded.  Windows are
    /// reported with their application name; disambiguation of several
    /// windows of the same application is handled by the caller.
    fn windows(&self) -> Result<Vec<WindowInfo>, Self::Error>;

    /// The window's true positioning rectangle, invisible borders included.
    fn window_bounds(&self, window: WindowHandle) -> Result<Rectangle, Self::Error>;

    /// The visible frame as composited on screen, invisible borders
    /// excluded.
    fn visible_frame(&self, window: WindowHandle) -> Result<Rectangle, Self::Error>;

    /// Bring the window out of the maximized or minimized state.
    fn restore(&self, window: WindowHandle) -> Result<(), Self::Error>;

    /// Move the window's top-left corner without touching its size.
    fn set_position(&self, window: WindowHandle, x: i32, y: i32) -> Result<(), Self::Error>;

    /// Resize the window without touching its position.
    fn set_size(&self, window: WindowHandle, width: i32, height: i32) -> Result<(), Self::Error>;
}

//  Command Source

/// A source of [`Command`]s.
///
/// Implementations read from some transport (standard input, a pipe, an
/// in-memory buffer, …) and forward parsed commands into the provided
/// [`mpsc::Sender`].
///
/// # Contract
///
/// * [`run`](CommandSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each received command must be sent through `sink` exactly once.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait CommandSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start reading and forward every incoming [`Command`] into `sink`.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    //  Mock WindowManager

    /// A test double that records every placement call made to it.
    #[derive(Debug, Default)]
    struct MockWm {
        calls: RefCell<Vec<String>>,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("mock error")]
    struct MockError;

    impl WindowManager for MockWm {
        type Error = MockError;

        fn monitors(&self) -> Result<Vec<Monitor>, MockError> {
            let rect = Rectangle::new(0.0, 1920.0, 0.0, 1080.0);
            Ok(vec![Monitor {
                area: rect,
                work: rect,
                is_primary: true,
                name: "MOCK-1".into(),
                id: "mock-1".into(),
            }])
        }

        fn windows(&self) -> Result<Vec<WindowInfo>, MockError> {
            Ok(vec![WindowInfo {
                app: "mock.exe".into(),
                handle: WindowHandle(1),
            }])
        }

        fn window_bounds(&self, _: WindowHandle) -> Result<Rectangle, MockError> {
            Ok(Rectangle::new(0.0, 100.0, 0.0, 100.0))
        }

        fn visible_frame(&self, _: WindowHandle) -> Result<Rectangle, MockError> {
            Ok(Rectangle::new(0.0, 100.0, 0.0, 100.0))
        }

        fn restore(&self, w: WindowHandle) -> Result<(), MockError> {
            self.calls.borrow_mut().push(format!("restore {}", w.0));
            Ok(())
        }

        fn set_position(&self, w: WindowHandle, x: i32, y: i32) -> Result<(), MockError> {
            self.calls
                .borrow_mut()
                .push(format!("position {} {} {}", w.0, x, y));
            Ok(())
        }

        fn set_size(&self, _: WindowHandle, _: i32, _: i32) -> Result<(), MockError> {
            Err(MockError)
        }
    }

    #[test]
    fn mock_wm_records_calls() {
        let wm = MockWm::default();
        wm.restore(WindowHandle(7)).unwrap();
        wm.set_position(WindowHandle(7), 10, 20).unwrap();
        assert!(wm.set_size(WindowHandle(7), 1, 1).is_err());
        assert_eq!(
            *wm.calls.borrow(),
            vec!["restore 7".to_string(), "position 7 10 20".to_string()]
        );
    }

    //  Mock CommandSource

    /// A test double that emits a fixed sequence of commands.
    struct MockSource {
        commands: Vec<Command>,
    }

    impl CommandSource for MockSource {
        type Error = MockError;

        fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), MockError> {
            for cmd in self.commands.drain(..) {
                let _ = sink.send(cmd);
            }
            Ok(())
        }
    }

    #[test]
    fn mock_source_emits_commands() {
        let mut src = MockSource {
            commands: vec![Command::Save, Command::Snap { profile: 0 }],
        };
        let (tx, rx) = mpsc::channel();
        src.run(tx).unwrap();
        let cmds: Vec<Command> = rx.try_iter().collect();
        assert_eq!(cmds, vec![Command::Save, Command::Snap { profile: 0 }]);
    }
}
