//! Software dimming overlay seam.
//!
//! The controller drives an always-on-top, input-transparent, alpha-blended
//! surface through [`OverlaySurface`] and never touches windowing APIs
//! directly. [`NullOverlay`] is the sink used when no compositor
//! integration is wired up; it keeps the full state observable for logs
//! and tests.

use crate::geometry::Rect;
use std::str::FromStr;
use thiserror::Error;
use tracing::trace;

/// Overlay fill color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

#[derive(Error, Debug)]
#[error("invalid overlay color {0:?}, expected #rrggbb")]
pub struct ColorParseError(pub String);

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError(s.to_string()))?;
        if hex.len() != 6 {
            return Err(ColorParseError(s.to_string()));
        }
        let value =
            u32::from_str_radix(hex, 16).map_err(|_| ColorParseError(s.to_string()))?;
        Ok(Self {
            r: (value >> 16) as u8,
            g: (value >> 8) as u8,
            b: value as u8,
        })
    }
}

/// Per-monitor software dimming surface.
///
/// Implementations must render always-on-top, click-through and
/// alpha-blended; the controller sets opacity every fade tick and hides the
/// surface whenever it converges to transparent (an invisible but mapped
/// surface still costs compositor work).
pub trait OverlaySurface {
    fn set_opacity(&mut self, opacity: f64);
    fn show(&mut self);
    fn hide(&mut self);
    fn resize(&mut self, rect: Rect);
    fn set_color(&mut self, color: Color);
}

/// State-tracking sink with no on-screen rendering.
#[derive(Debug, Default)]
pub struct NullOverlay {
    pub opacity: f64,
    pub visible: bool,
    pub rect: Option<Rect>,
    pub color: Color,
}

impl OverlaySurface for NullOverlay {
    fn set_opacity(&mut self, opacity: f64) {
        trace!("overlay opacity {:.3}", opacity);
        self.opacity = opacity;
    }

    fn show(&mut self) {
        trace!("overlay show");
        self.visible = true;
    }

    fn hide(&mut self) {
        trace!("overlay hide");
        self.visible = false;
    }

    fn resize(&mut self, rect: Rect) {
        trace!("overlay resize to {:?}", rect);
        self.rect = Some(rect);
    }

    fn set_color(&mut self, color: Color) {
        trace!("overlay color {:?}", color);
        self.color = color;
    }
}
