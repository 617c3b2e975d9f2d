//! Line-reading [`CommandSource`] implementation.
//!
//! Reads any buffered byte stream (standard input in the binary, an
//! in-memory cursor in tests) and parses each line as a JSON-encoded
//! [`Command`].
//!
//! # Wire format
//!
//! Every message is a single line of JSON followed by `\n`:
//!
//! ```json
//! {"SetGrid":{"profile":0,"monitor":"MON-1","rows":2,"cols":2}}
//! {"Select":{"profile":0,"monitor":"MON-1","cell":1,"windows":["code.exe"]}}
//! {"Snap":{"profile":0}}
//! "Save"
//! ```

use crate::command::Command;
use crate::traits::CommandSource;
use log::{debug, error, info};
use std::io::BufRead;
use std::sync::mpsc;

/// A [`CommandSource`] that reads newline-delimited JSON commands from a
/// buffered reader until end of input.
///
/// Blank lines are skipped and malformed lines are logged and dropped; a
/// bad line never stops the listener.
pub struct LineListener<R> {
    reader: R,
    name: String,
}

/// Errors produced by the line listener.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl<R: BufRead + Send> LineListener<R> {
    /// Wrap `reader`.  `name` only appears in log messages.
    pub fn new(name: impl Into<String>, reader: R) -> Self {
        Self {
            reader,
            name: name.into(),
        }
    }
}

impl LineListener<std::io::BufReader<std::io::Stdin>> {
    /// A listener on the process's standard input.
    pub fn stdin() -> Self {
        Self::new("stdin", std::io::BufReader::new(std::io::stdin()))
    }
}

impl<R: BufRead + Send> CommandSource for LineListener<R> {
    type Error = SourceError;

    /// Read until end of input or until `sink` is closed.
    ///
    /// This method **blocks**.  Run it on a dedicated thread.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error> {
        info!("reading commands from {}", self.name);
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                info!("{} closed", self.name);
                return Ok(());
            }
            let text = line.trim();
            if text.is_empty() {
                continue;
            }
            match serde_json::from_str::<Command>(text) {
                Ok(cmd) => {
                    debug!("received {:?}", cmd);
                    if sink.send(cmd).is_err() {
                        info!("sink closed, shutting down");
                        return Ok(());
                    }
                }
                Err(e) => error!("bad command: {} ({})", text, e),
            }
        }
    }
}

//  Tests
