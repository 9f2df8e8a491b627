//! **hyprattach**: keeps a group of windows tiled side by side.
//!
//! A *session* attaches an ordered list of windows to one virtual
//! container.  Every visible window gets a share of the container's width
//! proportional to its weight, and all of them share its top, height and
//! state.  When the user drags, resizes, minimizes or closes any one window,
//! the session works out what was meant (moving the group, resizing it from
//! an outer edge, or moving the edge between two neighbours) and lays the
//! whole group out again.
//!
//! # Architecture
//!
//! * [`layout`]: the pure bounds calculation.
//! * [`reconcile`]: classifies an observed geometry change and folds it
//!   into the model.
//! * [`session`]: lifecycle, event handlers and the synchronization pass.
//! * [`traits::WindowHost`] / [`traits::EventSource`]: the seams to the
//!   windowing system and event transports.
//!
//! Concrete implementations live in [`hyprland`] (Hyprland IPC) and
//! [`ipc`] (Unix-socket command listener).  [`signals`] turns SIGINT and
//! SIGTERM into an orderly unload.

pub mod command;
pub mod config;
pub mod hyprland;
pub mod ipc;
pub mod layout;
pub mod model;
pub mod reconcile;
pub mod session;
pub mod signals;
pub mod sync;
pub mod traits;
