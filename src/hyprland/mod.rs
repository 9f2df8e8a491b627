//! Hyprland-specific implementations.
//!
//! This module provides concrete backends for the
//! [`WindowHost`](crate::traits::WindowHost) and
//! [`EventSource`](crate::traits::EventSource) traits, powered by
//! Hyprland's IPC socket ([`socket::CommandSocket`]).
//!
//! Nothing outside this module should reference Hyprland directly.

pub mod host;
pub mod socket;
pub mod watch;

use serde::{Deserialize, Serialize};

/// Workspace minimized windows are parked on.  Hyprland has no minimize, a
/// special workspace is the usual stand-in.
pub const DEFAULT_MINIMIZED_WORKSPACE: &str = "special:minimized";

/// Hyprland backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HyprlandConfig {
    /// How often the client list is polled for geometry changes (ms).
    pub poll_interval_ms: u64,
    /// Workspace that stands in for the minimized state.
    pub minimized_workspace: String,
}

impl Default for HyprlandConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            minimized_workspace: DEFAULT_MINIMIZED_WORKSPACE.into(),
        }
    }
}
