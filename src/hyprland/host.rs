//! [`WindowHost`] implementation backed by Hyprland IPC.
//!
//! Every write is a handful of dispatches sent through a [`HyprlandIpc`],
//! normally a [`CommandSocket`](super::socket::CommandSocket).  Each request
//! opens its own connection, so concurrent writes from the session's sync
//! threads never share a stream.

use super::socket::{HyprlandIpc, HyprlandIpcError};
use crate::model::{WindowId, WindowState};
use crate::traits::{GeometryUpdate, WindowHost};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

/// Hyprland-backed window host.
///
/// Attached windows are made floating so they can be placed to the pixel.
/// Minimizing parks a window on [`minimized_workspace`](Self::minimized_workspace);
/// the next geometry write brings it back to the active workspace.
pub struct HyprlandHost<I> {
    ipc: I,
    minimized_workspace: String,
    /// Windows known to sit on the minimized workspace.  Only changed after
    /// the move succeeded, so a failed move is retried by the next pass.
    parked: Mutex<HashSet<WindowId>>,
}

impl<I: HyprlandIpc> HyprlandHost<I> {
    /// Create a host that talks through `ipc`.  No request is sent yet.
    pub fn new(ipc: I, minimized_workspace: impl Into<String>) -> Self {
        Self {
            ipc,
            minimized_workspace: minimized_workspace.into(),
            parked: Mutex::new(HashSet::new()),
        }
    }

    pub fn minimized_workspace(&self) -> &str {
        &self.minimized_workspace
    }

    fn parked(&self) -> MutexGuard<'_, HashSet<WindowId>> {
        match self.parked.lock() {
            Ok(set) => set,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn is_parked(&self, id: WindowId) -> bool {
        self.parked().contains(&id)
    }

    fn park(&self, id: WindowId) -> Result<(), HyprlandIpcError> {
        if self.is_parked(id) {
            return Ok(());
        }
        self.ipc.dispatch(&park_dispatch(id, &self.minimized_workspace))?;
        self.parked().insert(id);
        Ok(())
    }

    fn unpark(&self, id: WindowId) -> Result<(), HyprlandIpcError> {
        if !self.is_parked(id) {
            return Ok(());
        }
        let active: ActiveWorkspaceJson = self.ipc.query("activeworkspace")?;
        self.ipc.dispatch(&unpark_dispatch(id, active.id))?;
        self.parked().remove(&id);
        Ok(())
    }
}

//  Dispatch builders

/// Hyprland window selector for `id`.
fn selector(id: WindowId) -> String {
    format!("address:{}", id)
}

fn park_dispatch(id: WindowId, workspace: &str) -> String {
    format!("movetoworkspacesilent {},{}", workspace, selector(id))
}

fn unpark_dispatch(id: WindowId, workspace_id: i64) -> String {
    format!("movetoworkspacesilent {},{}", workspace_id, selector(id))
}

/// Dispatches that place `id` at `(left, top)` with size `width × height`.
fn place_dispatches(id: WindowId, left: i32, top: i32, width: i32, height: i32) -> [String; 3] {
    [
        format!("setfloating {}", selector(id)),
        format!("resizewindowpixel exact {} {},{}", width, height, selector(id)),
        format!("movewindowpixel exact {} {},{}", left, top, selector(id)),
    ]
}

/// Subset of the JSON object returned by `j/activeworkspace`.
#[derive(Deserialize)]
struct ActiveWorkspaceJson {
    id: i64,
}

//  WindowHost implementation

impl<I: HyprlandIpc> WindowHost for HyprlandHost<I> {
    type Error = HyprlandIpcError;

    fn update_window_geometry(&self, id: WindowId, update: GeometryUpdate) -> Result<(), Self::Error> {
        match update {
            GeometryUpdate::State(WindowState::Minimized) => self.park(id),
            GeometryUpdate::State(WindowState::Normal) => self.unpark(id),
            GeometryUpdate::Geometry { rect, .. } => {
                self.unpark(id)?;
                for dispatch in place_dispatches(id, rect.left, rect.top, rect.width, rect.height) {
                    self.ipc.dispatch(&dispatch)?;
                }
                Ok(())
            }
        }
    }

    fn close_window(&self, id: WindowId) -> Result<(), Self::Error> {
        self.ipc.dispatch(&format!("closewindow {}", selector(id)))?;
        self.parked().remove(&id);
        Ok(())
    }
}
