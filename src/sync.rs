//! Writing the model back to the host.
//!
//! [`InFlight`] is the busy marker that keeps the session from reacting to
//! its own writes.  It is advisory: a caller that finds it taken drops its
//! work instead of waiting.  Clones share the same flag, so an event source
//! on another thread can check it before forwarding observations.

use crate::model::{WindowEntry, WindowId};
use crate::traits::{GeometryUpdate, WindowHost};
use log::debug;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

#[derive(Debug, Default)]
struct Flag {
    busy: AtomicBool,
    /// Number of passes started so far.
    passes: AtomicU64,
}

/// Shared "a synchronization pass is writing to the host" flag.
#[derive(Debug, Clone, Default)]
pub struct InFlight(Arc<Flag>);

/// What [`InFlight`] looked like at one instant.  See
/// [`InFlight::quiet_since`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Epoch {
    busy: bool,
    passes: u64,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.0.busy.load(Ordering::Acquire)
    }

    /// Take the flag if it is free.  Never blocks.
    pub fn try_acquire(&self) -> Option<InFlightGuard> {
        self.0
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        self.0.passes.fetch_add(1, Ordering::AcqRel);
        Some(InFlightGuard {
            flag: Arc::clone(&self.0),
        })
    }

    /// Snapshot the flag before reading host state.
    pub fn epoch(&self) -> Epoch {
        // Read the counter first: a pass that starts in between is then
        // seen either as busy now or as a changed counter later.
        let passes = self.0.passes.load(Ordering::Acquire);
        Epoch {
            busy: self.is_busy(),
            passes,
        }
    }

    /// True if no pass was running at `epoch`, none is running now and none
    /// ran in between.  Host state read inside that window contains no
    /// half-applied writes of ours.
    pub fn quiet_since(&self, epoch: Epoch) -> bool {
        !epoch.busy && !self.is_busy() && self.0.passes.load(Ordering::Acquire) == epoch.passes
    }
}

/// Releases the [`InFlight`] flag when dropped.
#[derive(Debug)]
pub struct InFlightGuard {
    flag: Arc<Flag>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.busy.store(false, Ordering::Release);
    }
}

/// Push every entry's bounds to the host, one thread per window.
///
/// Failures are logged and dropped.
pub(crate) fn apply_all<H: WindowHost>(host: &H, windows: &[WindowEntry]) {
    thread::scope(|s| {
        for window in windows {
            let id = window.id;
            let update = GeometryUpdate::from(window.bounds);
            s.spawn(move || {
                if let Err(e) = host.update_window_geometry(id, update) {
                    debug!("update of {} failed (ignored): {}", id, e);
                }
            });
        }
    });
}

/// Close every window in `ids`, one thread per window.
pub(crate) fn close_all<H: WindowHost>(host: &H, ids: &[WindowId]) {
    thread::scope(|s| {
        for &id in ids {
            s.spawn(move || {
                if let Err(e) = host.close_window(id) {
                    debug!("close of {} failed (ignored): {}", id, e);
                }
            });
        }
    });
}
