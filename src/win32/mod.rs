//! Windows desktop backend.
//!
//! This module provides the concrete
//! [`WindowManager`](crate::traits::WindowManager) for Windows, built on the
//! Win32 and DWM APIs.
//!
//! Nothing outside this module should reference Win32 directly.

pub mod wm;
