//! Termination signals as an [`EventSource`].
//!
//! SIGINT, SIGTERM and SIGHUP would otherwise kill the daemon without
//! running the session's unload hook, leaving the attached windows tiled
//! and open.  [`TerminationSignals`] turns the first of them into a
//! [`Command::Unload`] instead.

use crate::command::Command;
use crate::traits::EventSource;
use log::info;
use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use std::sync::mpsc;

/// Forwards the first termination signal as [`Command::Unload`].
pub struct TerminationSignals {
    signals: Signals,
}

impl TerminationSignals {
    /// Install the handlers.  From here on the signals no longer terminate
    /// the process by themselves.
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            signals: Signals::new([SIGINT, SIGTERM, SIGHUP])?,
        })
    }
}

impl EventSource for TerminationSignals {
    type Error = std::io::Error;

    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error> {
        if let Some(signal) = self.signals.forever().next() {
            info!("signal {} received, unloading", signal);
            let _ = sink.send(Command::Unload);
        }
        Ok(())
    }
}
