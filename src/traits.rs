//! Core traits that decouple the session from any specific window manager or
//! event transport.
//!
//! The [`Session`](crate::session::Session) only talks to a [`WindowHost`];
//! events reach it through whatever [`EventSource`]s the binary spawns.

use crate::command::Command;
use crate::model::{Bounds, Rect, WindowId, WindowState};
use std::sync::mpsc;

/// What to write to a single host window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryUpdate {
    /// Only change the window's state.  Used for minimized windows, whose
    /// pixel geometry hosts either ignore or reject.
    State(WindowState),
    /// Move and resize the window.
    Geometry { rect: Rect, state: WindowState },
}

impl From<Bounds> for GeometryUpdate {
    fn from(bounds: Bounds) -> Self {
        match bounds {
            Bounds::Placed {
                rect,
                state: WindowState::Normal,
            } => GeometryUpdate::Geometry {
                rect,
                state: WindowState::Normal,
            },
            other => GeometryUpdate::State(other.state()),
        }
    }
}

/// Event streams a session can listen to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    GeometryChanged,
    Removed,
}

/// Abstraction over the windowing system that owns the attached windows.
///
/// Every write is best-effort: the session logs and discards errors and
/// keeps its own model as the source of truth.  Writes for different
/// windows are issued from parallel threads, hence the `Sync` bound.
pub trait WindowHost: Sync {
    /// The error type produced by this host.
    type Error: std::error::Error + Send + 'static;

    /// Apply `update` to the window `id`.
    fn update_window_geometry(&self, id: WindowId, update: GeometryUpdate) -> Result<(), Self::Error>;

    /// Close the window `id`.
    fn close_window(&self, id: WindowId) -> Result<(), Self::Error>;

    /// Start delivering events for `topic`.
    ///
    /// Hosts whose event sources run unconditionally can leave the default;
    /// the session ignores events for topics it is not subscribed to.
    fn subscribe(&self, _topic: Topic) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Stop delivering events for `topic`.
    fn unsubscribe(&self, _topic: Topic) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// A source of [`Command`]s.
///
/// Implementations listen on some transport (a Unix socket, a poll of the
/// compositor's client list, an in-memory channel) and forward every
/// command into the provided [`mpsc::Sender`].
///
/// # Contract
///
/// * [`run`](EventSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait EventSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`Command`] into `sink`.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error>;
}
