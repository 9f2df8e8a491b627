//! The attached-windows session.
//!
//! [`Session`] owns the container, the ordered window entries and the
//! listener registrations, and reacts to [`Command`]s by updating the model,
//! recomputing bounds and pushing them to the [`WindowHost`].
//!
//! ```text
//! event ─▶ reconcile ─▶ calculate_bounds ─▶ sync_positions ─▶ host
//!   ▲                                                          │
//!   └────────────── dropped while InFlight is held ◀───────────┘
//! ```

use crate::command::Command;
use crate::layout::calculate_bounds;
use crate::model::{
    Container, ObservedWindow, SessionConfig, SurvivingWindow, TerminateOptions, WindowEntry,
    WindowId,
};
use crate::reconcile::apply_geometry_change;
use crate::sync::{self, InFlight};
use crate::traits::{Topic, WindowHost};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::mpsc;

/// Reasons [`Session::initialize`] rejects a configuration.
///
/// No session state is touched when one of these is returned.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum InitializeError {
    #[error("no primary window: exactly one window must set isPrimary")]
    NoPrimaryWindow,
    #[error("{0} primary windows: exactly one window must set isPrimary")]
    MultiplePrimaryWindows(usize),
    #[error("window {id} has invalid widthFraction {fraction}")]
    InvalidWidthFraction { id: WindowId, fraction: f64 },
    #[error("window {0} is listed more than once")]
    DuplicateWindow(WindowId),
}

/// Callback fired with a snapshot of each non-primary window that the host
/// closed.
pub type RemoveCallback = Box<dyn FnMut(&WindowEntry) + Send>;

/// One attached-windows session.
///
/// Generic over any [`WindowHost`], so the tiling logic can be driven by
/// Hyprland or by a recording mock in tests.
///
/// # Typical usage
///
/// ```ignore
/// let mut session = Session::new(HyprlandHost::new(CommandSocket::from_env()?, "special:minimized"));
/// session.initialize(config)?;
/// session.run(rx);
/// ```
pub struct Session<H: WindowHost> {
    host: H,
    container: Option<Container>,
    windows: Vec<WindowEntry>,
    in_flight: InFlight,
    listeners: HashSet<Topic>,
    unload_armed: bool,
    on_remove: Option<RemoveCallback>,
}

impl<H: WindowHost> Session<H> {
    /// Create an idle session.  Nothing is tiled until
    /// [`initialize`](Self::initialize) succeeds.
    pub fn new(host: H) -> Self {
        Self {
            host,
            container: None,
            windows: Vec::new(),
            in_flight: InFlight::new(),
            listeners: HashSet::new(),
            unload_armed: false,
            on_remove: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Handle on the busy flag, for event sources that must not report the
    /// session's own writes.
    pub fn in_flight(&self) -> InFlight {
        self.in_flight.clone()
    }

    /// Register the callback fired after a non-primary window is removed.
    pub fn set_on_remove(&mut self, callback: impl FnMut(&WindowEntry) + Send + 'static) {
        self.on_remove = Some(Box::new(callback));
    }

    pub fn is_active(&self) -> bool {
        !self.windows.is_empty()
    }

    pub fn container(&self) -> Option<&Container> {
        self.container.as_ref()
    }

    /// Attached windows in left-to-right order.
    pub fn windows(&self) -> &[WindowEntry] {
        &self.windows
    }

    pub fn is_subscribed(&self, topic: Topic) -> bool {
        self.listeners.contains(&topic)
    }

    /// Process a single [`Command`].
    ///
    /// Only `Initialize` can fail; host failures are never reported.
    pub fn handle(&mut self, cmd: Command) -> Result<(), InitializeError> {
        match cmd {
            Command::Initialize(config) => self.initialize(config)?,
            Command::Terminate(options) => {
                let surviving = self.terminate(options);
                info!("terminated, {} window(s) left open", surviving.len());
            }
            Command::GeometryChanged(observed) => self.on_geometry_changed(observed),
            Command::Removed { id } => self.on_removed(id),
            Command::SetHidden { id, hidden } => self.set_hidden(id, hidden),
            Command::Unload => self.on_unload(),
        }
        Ok(())
    }

    /// Handle commands until `Unload` arrives or every sender is gone.
    ///
    /// Either way the unload hook has run when this returns.
    pub fn run(&mut self, commands: mpsc::Receiver<Command>) {
        for cmd in commands {
            let unload = matches!(cmd, Command::Unload);
            if let Err(e) = self.handle(cmd) {
                warn!("command rejected: {}", e);
            }
            if unload {
                return;
            }
        }
        debug!("all event sources closed");
        self.on_unload();
    }

    //  Lifecycle

    /// Start tiling `config`, terminating the active session first.
    pub fn initialize(&mut self, config: SessionConfig) -> Result<(), InitializeError> {
        validate(&config)?;
        if self.is_active() {
            info!("initialize: replacing active session");
            self.terminate(TerminateOptions::default());
        }

        info!(
            "initialize: {} window(s) in {}x{} at ({}, {})",
            config.windows.len(),
            config.container.width,
            config.container.height,
            config.container.left,
            config.container.top
        );
        self.container = Some(config.container);
        self.windows = config.windows.into_iter().map(WindowEntry::from).collect();

        self.recalculate();
        // A two-window session would otherwise collapse straight away.
        self.sync_positions(true);

        self.subscribe(Topic::GeometryChanged);
        self.subscribe(Topic::Removed);
        self.unload_armed = true;
        Ok(())
    }

    /// End the session and return the windows that were left open.
    ///
    /// Listeners are dropped before anything is closed so the closes caused
    /// here are not handled as removals.  When the primary is kept it is
    /// laid out alone over the whole container before the model is cleared.
    pub fn terminate(&mut self, options: TerminateOptions) -> Vec<SurvivingWindow> {
        self.unsubscribe(Topic::GeometryChanged);
        self.unsubscribe(Topic::Removed);
        self.unload_armed = false;

        let (to_close, kept): (Vec<&WindowEntry>, Vec<&WindowEntry>) =
            self.windows.iter().partition(|w| {
                (w.is_primary && options.close_primary) || (!w.is_primary && options.close_windows)
            });
        let close_ids: Vec<WindowId> = to_close.iter().map(|w| w.id).collect();
        let surviving: Vec<SurvivingWindow> = kept
            .iter()
            .map(|w| SurvivingWindow {
                id: w.id,
                is_primary: w.is_primary,
            })
            .collect();

        if !close_ids.is_empty() {
            debug!("terminate: closing {} window(s)", close_ids.len());
            sync::close_all(&self.host, &close_ids);
        }

        if !options.close_primary {
            if let Some(index) = self.windows.iter().position(|w| w.is_primary) {
                let primary = self.windows.swap_remove(index);
                self.windows = vec![primary];
                self.recalculate();
                self.sync_positions(true);
            }
        }

        self.windows.clear();
        self.container = None;
        surviving
    }

    /// Run the one-time unload hook, if the session armed it.
    pub fn on_unload(&mut self) {
        if self.unload_armed {
            info!("unload: terminating session");
            self.terminate(TerminateOptions::default());
        }
    }

    fn subscribe(&mut self, topic: Topic) {
        if !self.listeners.insert(topic) {
            return;
        }
        if let Err(e) = self.host.subscribe(topic) {
            debug!("subscribe {:?} failed (ignored): {}", topic, e);
        }
    }

    fn unsubscribe(&mut self, topic: Topic) {
        if !self.listeners.remove(&topic) {
            return;
        }
        if let Err(e) = self.host.unsubscribe(topic) {
            debug!("unsubscribe {:?} failed (ignored): {}", topic, e);
        }
    }

    //  Layout

    /// Recompute every entry's bounds from the container.
    pub fn recalculate(&mut self) {
        if let Some(container) = &self.container {
            calculate_bounds(container, &mut self.windows);
        }
    }

    /// Push every entry's bounds to the host.
    ///
    /// Returns `false` without doing anything when another pass holds the
    /// busy flag.  Unless `ignore_check` is set, a session left with fewer
    /// than two windows is terminated afterwards.
    pub fn sync_positions(&mut self, ignore_check: bool) -> bool {
        let Some(guard) = self.in_flight.try_acquire() else {
            debug!("sync already in flight, dropped");
            return false;
        };
        sync::apply_all(&self.host, &self.windows);
        drop(guard);

        if !ignore_check {
            match self.windows.len() {
                0 => {
                    info!("no attached windows left, terminating");
                    self.terminate(TerminateOptions::default());
                }
                1 => {
                    info!("single attached window left, terminating");
                    self.terminate(TerminateOptions {
                        close_primary: false,
                        ..TerminateOptions::default()
                    });
                }
                _ => {}
            }
        }
        true
    }

    /// Hide or show the window `id`, then re-tile.
    pub fn set_hidden(&mut self, id: WindowId, hidden: bool) {
        let Some(window) = self.windows.iter_mut().find(|w| w.id == id) else {
            debug!("set_hidden: unknown window {}", id);
            return;
        };
        if window.is_hidden == hidden {
            return;
        }
        window.is_hidden = hidden;
        self.recalculate();
        self.sync_positions(false);
    }

    //  Event handlers

    /// React to the host reporting new geometry for a window.
    pub fn on_geometry_changed(&mut self, observed: ObservedWindow) {
        if !self.is_subscribed(Topic::GeometryChanged) {
            return;
        }
        if self.in_flight.is_busy() {
            debug!("geometry of {} changed during sync, ignored", observed.id);
            return;
        }
        let Some(index) = self.windows.iter().position(|w| w.id == observed.id) else {
            return;
        };
        let Some(container) = self.container.as_mut() else {
            return;
        };

        let outcome = apply_geometry_change(container, &mut self.windows, index, &observed);
        debug!(
            "geometry of {}: shifted by {}, resize {:?}",
            observed.id, outcome.shifted_by, outcome.resize
        );

        self.recalculate();
        self.sync_positions(false);
    }

    /// React to the host reporting that a window was closed.
    pub fn on_removed(&mut self, id: WindowId) {
        if !self.is_subscribed(Topic::Removed) {
            return;
        }
        if self.in_flight.is_busy() {
            warn!("window {} removed during sync, ignored", id);
            return;
        }
        let Some(index) = self.windows.iter().position(|w| w.id == id) else {
            return;
        };

        if self.windows[index].is_primary {
            info!("primary window {} closed, terminating", id);
            self.terminate(TerminateOptions::default());
            return;
        }

        let removed = self.windows.remove(index);
        info!("window {} closed", id);
        self.recalculate();
        self.sync_positions(false);

        if let Some(callback) = self.on_remove.as_mut() {
            callback(&removed);
        }
    }
}

impl<H: WindowHost> Drop for Session<H> {
    fn drop(&mut self) {
        self.on_unload();
    }
}

/// Check a configuration before any state is touched.
fn validate(config: &SessionConfig) -> Result<(), InitializeError> {
    match config.windows.iter().filter(|w| w.is_primary).count() {
        0 => return Err(InitializeError::NoPrimaryWindow),
        1 => {}
        n => return Err(InitializeError::MultiplePrimaryWindows(n)),
    }
    let mut seen = HashSet::new();
    for window in &config.windows {
        if !(window.width_fraction.is_finite() && window.width_fraction > 0.0) {
            return Err(InitializeError::InvalidWidthFraction {
                id: window.id,
                fraction: window.width_fraction,
            });
        }
        if !seen.insert(window.id) {
            return Err(InitializeError::DuplicateWindow(window.id));
        }
    }
    Ok(())
}

//  Tests
