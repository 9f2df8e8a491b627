//! Messages that drive a session.
//!
//! Every [`EventSource`](crate::traits::EventSource) produces [`Command`]s and
//! the [`Session`](crate::session::Session) consumes them.  The same enum is
//! the wire format of the command socket, one JSON value per line:
//!
//! ```json
//! {"Initialize":{"container":{"top":0,"left":0,"width":1600,"height":900},"windows":[{"id":"0x5a1","widthFraction":1,"isPrimary":true,"type":"normal"}]}}
//! {"GeometryChanged":{"id":"0x5a1","top":0,"left":40,"width":800,"height":900,"state":"normal"}}
//! {"Removed":{"id":"0x5a2"}}
//! {"SetHidden":{"id":"0x5a2","hidden":true}}
//! {"Terminate":{"closePrimary":true}}
//! "Unload"
//! ```

use crate::model::{ObservedWindow, SessionConfig, TerminateOptions, WindowId};
use serde::{Deserialize, Serialize};

/// Everything a session reacts to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Start a new session, replacing the active one if any.
    Initialize(SessionConfig),

    /// End the active session.
    Terminate(TerminateOptions),

    /// The host reports new geometry for a window.
    GeometryChanged(ObservedWindow),

    /// The host reports that a window was closed.
    Removed { id: WindowId },

    /// Hide or show an attached window.  Hidden windows are minimized and
    /// their share of the container goes to the visible ones.
    SetHidden { id: WindowId, hidden: bool },

    /// The process is going away.
    Unload,
}
