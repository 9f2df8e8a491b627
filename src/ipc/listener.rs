//! Unix-socket [`EventSource`] implementation.
//!
//! Binds a Unix stream socket and accepts one client at a time.  Each line
//! a client sends is parsed as one JSON [`Command`]; lines that fail to parse
//! are logged and skipped without dropping the connection.

use crate::command::Command;
use crate::traits::EventSource;
use log::{debug, error, info, warn};
use std::io::{BufRead, BufReader};
use std::os::unix::net::UnixListener;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

/// An [`EventSource`] that reads JSON commands from a Unix socket.
pub struct UnixSocketListener {
    path: PathBuf,
}

/// Errors produced by the Unix socket listener.
#[derive(Debug, thiserror::Error)]
pub enum UnixSocketError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Whether the sink is still accepting commands.
#[derive(Debug, PartialEq, Eq)]
enum Forward {
    Open,
    SinkClosed,
}

/// Forward every parsable line of `reader` into `sink`.
fn forward_lines(reader: impl BufRead, sink: &mpsc::Sender<Command>) -> Forward {
    for line in reader.lines() {
        let text = match line {
            Ok(text) => text,
            Err(e) => {
                error!("read error: {}", e);
                break;
            }
        };
        if text.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Command>(&text) {
            Ok(cmd) => {
                debug!("received {:?}", cmd);
                if sink.send(cmd).is_err() {
                    return Forward::SinkClosed;
                }
            }
            Err(e) => warn!("bad command {:?}: {}", text, e),
        }
    }
    Forward::Open
}

impl UnixSocketListener {
    /// Create a listener for `path`.
    ///
    /// The socket file is created when [`run`](EventSource::run) is called,
    /// replacing a stale one if present.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The filesystem path of the socket.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventSource for UnixSocketListener {
    type Error = UnixSocketError;

    /// Bind the socket and serve clients until the sink is dropped.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error> {
        let _ = std::fs::remove_file(&self.path);
        let listener = UnixListener::bind(&self.path)?;
        info!("listening on {}", self.path.display());

        for stream in listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    error!("accept error: {}", e);
                    continue;
                }
            };
            debug!("client connected");
            if forward_lines(BufReader::new(stream), &sink) == Forward::SinkClosed {
                info!("sink closed, shutting down");
                let _ = std::fs::remove_file(&self.path);
                return Ok(());
            }
            debug!("client disconnected");
        }
        Ok(())
    }
}

//  Tests
