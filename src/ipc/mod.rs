//! Line-oriented command input.
//!
//! Front ends (a settings window, a hotkey helper, a shell script piping
//! into standard input) drive winsnap by writing newline-delimited JSON
//! commands.

pub mod listener;
