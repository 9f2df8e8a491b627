//! Turns Hyprland's client list into geometry events.
//!
//! Hyprland's event socket announces closes and workspace moves but not
//! pixel geometry, so [`HyprlandWatcher`] polls `j/clients` instead and
//! diffs each poll against the previous one:
//!
//! | Change between polls                    | Command emitted              |
//! |-----------------------------------------|------------------------------|
//! | `at`, `size` or workspace state changed | [`Command::GeometryChanged`] |
//! | address no longer listed                | [`Command::Removed`]         |
//! | new address                             | nothing                      |
//!
//! A poll that overlapped a session write in any way (the pass was running
//! when the poll started, when it returned, or ran entirely in between) is
//! folded into the snapshot and not forwarded, so the session never sees its
//! own writes come back half-applied.

use super::socket::{HyprlandIpc, HyprlandIpcError};
use super::HyprlandConfig;
use crate::command::Command;
use crate::model::{parse_window_id, ObservedState, ObservedWindow, WindowId};
use crate::sync::InFlight;
use crate::traits::EventSource;
use log::{debug, info, warn};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::mpsc;
use std::time::Duration;

/// Error from the Hyprland client watcher.
#[derive(Debug, thiserror::Error)]
#[error("hyprland watch error: {0}")]
pub struct HyprlandWatchError(#[from] HyprlandIpcError);

/// Subset of one object in the array returned by `j/clients`.
#[derive(Deserialize)]
struct ClientJson {
    address: String,
    at: [i32; 2],
    size: [i32; 2],
    workspace: WorkspaceJson,
}

#[derive(Deserialize)]
struct WorkspaceJson {
    name: String,
}

/// Client geometry keyed by window id.
pub(crate) type Snapshot = BTreeMap<WindowId, ObservedWindow>;

/// Key the `j/clients` response by window id.
///
/// Clients on `minimized_workspace` report [`ObservedState::Minimized`].
/// Entries with an unparsable address are skipped.
fn snapshot_of(clients: Vec<ClientJson>, minimized_workspace: &str) -> Snapshot {
    let mut snapshot = Snapshot::new();
    for client in clients {
        let Some(id) = parse_window_id(&client.address) else {
            warn!("skipping client with address {:?}", client.address);
            continue;
        };
        let state = if client.workspace.name == minimized_workspace {
            ObservedState::Minimized
        } else {
            ObservedState::Normal
        };
        snapshot.insert(
            id,
            ObservedWindow {
                id,
                top: client.at[1],
                left: client.at[0],
                width: client.size[0],
                height: client.size[1],
                state,
            },
        );
    }
    snapshot
}

/// Commands describing what changed from `previous` to `current`.
pub(crate) fn diff(previous: &Snapshot, current: &Snapshot) -> Vec<Command> {
    let mut commands = Vec::new();
    for (id, now) in current {
        if let Some(before) = previous.get(id) {
            if before != now {
                commands.push(Command::GeometryChanged(*now));
            }
        }
    }
    for id in previous.keys() {
        if !current.contains_key(id) {
            commands.push(Command::Removed { id: *id });
        }
    }
    commands
}

/// An [`EventSource`] that polls Hyprland's client list.
pub struct HyprlandWatcher<I> {
    ipc: I,
    config: HyprlandConfig,
    in_flight: InFlight,
}

impl<I: HyprlandIpc> HyprlandWatcher<I> {
    /// `in_flight` is the session's busy flag (see
    /// [`Session::in_flight`](crate::session::Session::in_flight)).
    pub fn new(ipc: I, config: HyprlandConfig, in_flight: InFlight) -> Self {
        Self {
            ipc,
            config,
            in_flight,
        }
    }

    fn poll(&self) -> Result<Snapshot, HyprlandIpcError> {
        let clients: Vec<ClientJson> = self.ipc.query("clients")?;
        Ok(snapshot_of(clients, &self.config.minimized_workspace))
    }

    /// Poll once, forward what changed since `previous` and make the poll
    /// the new `previous`.
    ///
    /// A failed poll is logged and leaves `previous` alone.  Errs only when
    /// the sink is gone.
    fn step(&self, previous: &mut Snapshot, sink: &mpsc::Sender<Command>) -> Result<(), mpsc::SendError<Command>> {
        let epoch = self.in_flight.epoch();
        let current = match self.poll() {
            Ok(current) => current,
            Err(e) => {
                warn!("poll failed, retrying: {}", e);
                return Ok(());
            }
        };
        if self.in_flight.quiet_since(epoch) {
            for cmd in diff(previous, &current) {
                debug!("observed {:?}", cmd);
                sink.send(cmd)?;
            }
        } else {
            debug!("poll overlapped a sync, dropped");
        }
        *previous = current;
        Ok(())
    }
}

impl<I: HyprlandIpc> EventSource for HyprlandWatcher<I> {
    type Error = HyprlandWatchError;

    /// Poll until the sink is dropped.  Only the first poll is fatal.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error> {
        let interval = Duration::from_millis(self.config.poll_interval_ms.max(1));
        let mut previous = self.poll()?;
        info!(
            "watching {} Hyprland client(s) every {}ms",
            previous.len(),
            interval.as_millis()
        );

        loop {
            std::thread::sleep(interval);
            if self.step(&mut previous, &sink).is_err() {
                info!("sink closed, shutting down");
                return Ok(());
            }
        }
    }
}

//  Tests
