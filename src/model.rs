//! Data model shared by every component of a session.
//!
//! A session is a [`Container`] (the virtual rectangle the group is tiled
//! into) plus an ordered list of [`WindowEntry`]s.  Entry order is the
//! left-to-right tiling order.  Each entry's [`Bounds`] is derived by
//! [`calculate_bounds`](crate::layout::calculate_bounds) and is never
//! treated as authoritative.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Minimum width of a [`WindowType::Normal`] window, in pixels.
pub const NORMAL_MIN_WIDTH: i32 = 525;

/// Minimum width of a [`WindowType::Popup`] window, in pixels.
pub const POPUP_MIN_WIDTH: i32 = 200;

/// Opaque host window handle.
///
/// Hyprland identifies clients by a 64-bit address, printed as
/// `0x55d1c2a8e3f0`.  On the wire the id may be a plain JSON number, a
/// `"0x…"` hex string or a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// Parse `"0x1a2b"` (hex) or `"6699"` (decimal).
pub(crate) fn parse_window_id(s: &str) -> Option<WindowId> {
    let s = s.trim();
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok().map(WindowId),
        None => s.parse::<u64>().ok().map(WindowId),
    }
}

impl Serialize for WindowId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> Deserialize<'de> for WindowId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Visitor;
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = WindowId;
            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "non-negative integer, \"0x…\" hex string or decimal string")
            }
            fn visit_u64<E>(self, n: u64) -> Result<WindowId, E> {
                Ok(WindowId(n))
            }
            fn visit_i64<E>(self, n: i64) -> Result<WindowId, E>
            where
                E: DeError,
            {
                u64::try_from(n)
                    .map(WindowId)
                    .map_err(|_| DeError::custom(format!("window id must not be negative: {}", n)))
            }
            fn visit_str<E>(self, s: &str) -> Result<WindowId, E>
            where
                E: DeError,
            {
                parse_window_id(s).ok_or_else(|| DeError::custom(format!("invalid window id: {:?}", s)))
            }
        }
        deserializer.deserialize_any(V)
    }
}

/// Display state shared by the whole container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowState {
    #[default]
    Normal,
    Minimized,
}

/// A window state as reported by the host.
///
/// Hosts know more states than the container does; everything that is not
/// `minimized` collapses to [`WindowState::Normal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObservedState {
    Normal,
    Minimized,
    Maximized,
    Fullscreen,
    #[serde(other)]
    Other,
}

impl ObservedState {
    pub fn normalize(self) -> WindowState {
        match self {
            ObservedState::Minimized => WindowState::Minimized,
            _ => WindowState::Normal,
        }
    }
}

impl From<WindowState> for ObservedState {
    fn from(state: WindowState) -> Self {
        match state {
            WindowState::Normal => ObservedState::Normal,
            WindowState::Minimized => ObservedState::Minimized,
        }
    }
}

/// Window flavour; determines the minimum pixel width it is laid out with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowType {
    #[default]
    Normal,
    Popup,
}

impl WindowType {
    pub const fn minimum_width(self) -> i32 {
        match self {
            WindowType::Normal => NORMAL_MIN_WIDTH,
            WindowType::Popup => POPUP_MIN_WIDTH,
        }
    }
}

/// Pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub top: i32,
    pub left: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// X coordinate one past the right edge.
    pub fn right(&self) -> i32 {
        self.left + self.width
    }
}

/// The virtual rectangle every attached window is tiled within.
///
/// `top`, `height` and `state` are shared by all visible windows; `left` and
/// `width` span the whole group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Container {
    pub top: i32,
    pub left: i32,
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub state: WindowState,
}

/// Derived geometry of one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bounds {
    /// Hidden entry: only a state is pushed to the host, no pixels.
    Minimized,
    /// Visible entry with its slice of the container.
    Placed { rect: Rect, state: WindowState },
}

impl Bounds {
    pub fn state(&self) -> WindowState {
        match self {
            Bounds::Minimized => WindowState::Minimized,
            Bounds::Placed { state, .. } => *state,
        }
    }

    pub fn rect(&self) -> Option<Rect> {
        match self {
            Bounds::Minimized => None,
            Bounds::Placed { rect, .. } => Some(*rect),
        }
    }
}

/// One window as supplied by the caller in a [`SessionConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowConfig {
    pub id: WindowId,
    /// Arbitrary caller payload, handed back in removal callbacks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<serde_json::Value>,
    pub width_fraction: f64,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(rename = "type", default)]
    pub kind: WindowType,
}

/// Everything [`Session::initialize`](crate::session::Session::initialize)
/// needs to start tiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub container: Container,
    pub windows: Vec<WindowConfig>,
}

/// One attached window tracked by a running session.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowEntry {
    pub id: WindowId,
    pub name: Option<serde_json::Value>,
    /// Relative weight among visible entries.  Does not need to sum to 1.
    pub width_fraction: f64,
    pub is_primary: bool,
    pub is_hidden: bool,
    pub kind: WindowType,
    /// Cache of the last layout pass.
    pub bounds: Bounds,
}

impl From<WindowConfig> for WindowEntry {
    fn from(cfg: WindowConfig) -> Self {
        Self {
            id: cfg.id,
            name: cfg.name,
            width_fraction: cfg.width_fraction,
            is_primary: cfg.is_primary,
            is_hidden: cfg.is_hidden,
            kind: cfg.kind,
            bounds: Bounds::Minimized,
        }
    }
}

/// Geometry of a window as observed by the host after an external change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservedWindow {
    pub id: WindowId,
    pub top: i32,
    pub left: i32,
    pub width: i32,
    pub height: i32,
    pub state: ObservedState,
}

/// Options for [`Session::terminate`](crate::session::Session::terminate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TerminateOptions {
    /// Close every non-primary window.
    pub close_windows: bool,
    /// Close the primary window as well.
    pub close_primary: bool,
}

impl Default for TerminateOptions {
    fn default() -> Self {
        Self {
            close_windows: true,
            close_primary: false,
        }
    }
}

/// A window left open by a terminate call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurvivingWindow {
    pub id: WindowId,
    pub is_primary: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_id_accepts_number_hex_and_decimal() {
        let a: WindowId = serde_json::from_str("42").unwrap();
        let b: WindowId = serde_json::from_str(r#""0x2a""#).unwrap();
        let c: WindowId = serde_json::from_str(r#""42""#).unwrap();
        assert_eq!(a, WindowId(42));
        assert_eq!(b, WindowId(42));
        assert_eq!(c, WindowId(42));
        assert!(serde_json::from_str::<WindowId>(r#""nope""#).is_err());
        assert!(serde_json::from_str::<WindowId>("-1").is_err());
    }

    #[test]
    fn window_id_displays_as_hex_address() {
        assert_eq!(WindowId(0x55d1c2a8).to_string(), "0x55d1c2a8");
    }

    #[test]
    fn observed_state_normalizes_everything_but_minimized() {
        assert_eq!(ObservedState::Minimized.normalize(), WindowState::Minimized);
        assert_eq!(ObservedState::Normal.normalize(), WindowState::Normal);
        assert_eq!(ObservedState::Maximized.normalize(), WindowState::Normal);
        assert_eq!(ObservedState::Fullscreen.normalize(), WindowState::Normal);
        let odd: ObservedState = serde_json::from_str(r#""docked""#).unwrap();
        assert_eq!(odd, ObservedState::Other);
        assert_eq!(odd.normalize(), WindowState::Normal);
    }

    #[test]
    fn minimum_widths() {
        assert_eq!(WindowType::Normal.minimum_width(), 525);
        assert_eq!(WindowType::Popup.minimum_width(), 200);
    }

    #[test]
    fn session_config_uses_camel_case_fields() {
        let json = r#"{
            "container": { "top": 0, "left": 0, "width": 1000, "height": 800, "state": "normal" },
            "windows": [
                { "id": 1, "widthFraction": 1, "isPrimary": true, "type": "normal", "name": { "tab": 3 } },
                { "id": "0x2", "widthFraction": 0.5, "isHidden": true, "type": "popup" }
            ]
        }"#;
        let cfg: SessionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.container.width, 1000);
        assert_eq!(cfg.windows.len(), 2);
        assert!(cfg.windows[0].is_primary);
        assert!(!cfg.windows[0].is_hidden);
        assert_eq!(cfg.windows[0].name, Some(serde_json::json!({ "tab": 3 })));
        assert_eq!(cfg.windows[1].id, WindowId(2));
        assert!(cfg.windows[1].is_hidden);
        assert_eq!(cfg.windows[1].kind, WindowType::Popup);
    }

    #[test]
    fn terminate_options_default_closes_attached_but_not_primary() {
        let opts: TerminateOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, TerminateOptions::default());
        assert!(opts.close_windows);
        assert!(!opts.close_primary);
        let opts: TerminateOptions = serde_json::from_str(r#"{ "closePrimary": true }"#).unwrap();
        assert!(opts.close_windows);
        assert!(opts.close_primary);
    }
}
