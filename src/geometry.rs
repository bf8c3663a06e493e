//! Display geometry primitives and the display enumeration seam.

use tracing::debug;

/// On-screen rectangle in global desktop coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Rectangle used when a display index points outside the enumeration.
pub const FALLBACK_RECT: Rect = Rect {
    x: 0,
    y: 0,
    width: 800,
    height: 600,
};

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i64 {
        i64::from(self.x) + i64::from(self.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i64 {
        i64::from(self.y) + i64::from(self.height)
    }

    /// Point containment, half-open on the right and bottom edges.
    pub fn contains(&self, px: i32, py: i32) -> bool {
        i64::from(px) >= i64::from(self.x)
            && i64::from(px) < self.right()
            && i64::from(py) >= i64::from(self.y)
            && i64::from(py) < self.bottom()
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Area of the overlap between two rectangles, zero when disjoint.
    pub fn intersection_area(&self, other: &Rect) -> u64 {
        let left = i64::from(self.x).max(i64::from(other.x));
        let top = i64::from(self.y).max(i64::from(other.y));
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        let width = (right - left).max(0);
        let height = (bottom - top).max(0);
        width.unsigned_abs() * height.unsigned_abs()
    }
}

/// Source of per-display rectangles.
///
/// The enumeration is index-stable within a session and re-queried only on
/// explicit geometry refreshes, never continuously.
pub trait GeometryProvider {
    /// Current display rectangles, in enumeration order.
    fn list_displays(&self) -> Vec<Rect>;
}

/// Rectangle for `display_index`, falling back to [`FALLBACK_RECT`] when the
/// index is out of range. An unplugged or remapped display must never crash
/// the polling loop.
pub fn display_rect(provider: &dyn GeometryProvider, display_index: usize) -> Rect {
    match provider.list_displays().get(display_index) {
        Some(rect) => *rect,
        None => {
            debug!(
                "Display index {} out of range, using fallback rectangle",
                display_index
            );
            FALLBACK_RECT
        }
    }
}
