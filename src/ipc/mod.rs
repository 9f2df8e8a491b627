//! Command socket.
//!
//! Whatever launches the attached windows (a script, a browser helper, a
//! key-bind) connects to the socket and sends newline-delimited JSON
//! [`Command`](crate::command::Command)s: `Initialize`, `Terminate`, and
//! host events for windows the Hyprland watcher cannot see.

pub mod listener;
