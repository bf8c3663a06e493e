//! Per-monitor presence detection.
//!
//! A monitor counts as "present" when the cursor is inside its rectangle or
//! the foreground window substantially covers it (fullscreen video, games).
//! The test is a pure function of current OS pointer/window state supplied
//! through [`ActivitySource`]; platforms without a usable foreground-window
//! API degrade to cursor-only detection.

use crate::geometry::Rect;
use thiserror::Error;

/// Fraction of a monitor's area the foreground window must cover to count
/// as activity on that monitor.
const COVERAGE_THRESHOLD: f64 = 0.95;

/// Errors from the OS-level probe primitives.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("display server connection failed: {0}")]
    ConnectionFailed(String),
}

/// OS primitives consumed by the presence test.
pub trait ActivitySource {
    /// Global cursor position, `None` when the pointer cannot be queried.
    fn cursor_position(&self) -> Option<(i32, i32)>;

    /// Bounds of the current foreground window, `None` when there is no
    /// focused window or the platform lacks the capability.
    fn foreground_window_bounds(&self) -> Option<Rect>;
}

/// Whether the user is present on the monitor described by `rect`.
pub fn is_present(source: &dyn ActivitySource, rect: &Rect) -> bool {
    if let Some((x, y)) = source.cursor_position() {
        if rect.contains(x, y) {
            return true;
        }
    }

    if let Some(window) = source.foreground_window_bounds() {
        if covers(&window, rect) {
            return true;
        }
    }

    false
}

/// Fullscreen/borderless heuristic: overlap area divided by monitor area.
fn covers(window: &Rect, monitor: &Rect) -> bool {
    let monitor_area = monitor.area().max(1);
    #[allow(clippy::cast_precision_loss)]
    let ratio = window.intersection_area(monitor) as f64 / monitor_area as f64;
    ratio >= COVERAGE_THRESHOLD
}
