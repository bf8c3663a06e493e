//! X11 backend: RandR monitor enumeration plus pointer and active-window
//! queries over a single shared connection.

use tracing::debug;
use x11rb::connection::Connection;
use x11rb::protocol::randr::ConnectionExt as RandrConnectionExt;
use x11rb::protocol::xproto::{AtomEnum, ConnectionExt as XprotoConnectionExt, Window};
use x11rb::rust_connection::RustConnection;

use crate::activity::{ActivitySource, ProbeError};
use crate::geometry::{GeometryProvider, Rect};

pub struct X11Backend {
    conn: RustConnection,
    root: Window,
    net_active_window: u32,
}

impl X11Backend {
    /// Connect to the display named by `$DISPLAY`.
    pub fn connect() -> Result<Self, ProbeError> {
        let (conn, screen_num) =
            x11rb::connect(None).map_err(|e| ProbeError::ConnectionFailed(e.to_string()))?;
        let root = conn.setup().roots[screen_num].root;
        let net_active_window = conn
            .intern_atom(false, b"_NET_ACTIVE_WINDOW")
            .map_err(|e| ProbeError::ConnectionFailed(e.to_string()))?
            .reply()
            .map_err(|e| ProbeError::ConnectionFailed(e.to_string()))?
            .atom;
        Ok(Self {
            conn,
            root,
            net_active_window,
        })
    }

    /// EWMH active window, if the window manager publishes one.
    fn active_window(&self) -> Option<Window> {
        let reply = self
            .conn
            .get_property(
                false,
                self.root,
                self.net_active_window,
                AtomEnum::WINDOW,
                0,
                1,
            )
            .ok()?
            .reply()
            .ok()?;
        let window = reply.value32()?.next()?;
        if window == x11rb::NONE {
            None
        } else {
            Some(window)
        }
    }
}

impl GeometryProvider for X11Backend {
    fn list_displays(&self) -> Vec<Rect> {
        let cookie = match self.conn.randr_get_monitors(self.root, true) {
            Ok(cookie) => cookie,
            Err(e) => {
                debug!("RandR monitor query failed: {}", e);
                return Vec::new();
            }
        };
        let reply = match cookie.reply() {
            Ok(reply) => reply,
            Err(e) => {
                debug!("RandR monitor reply failed: {}", e);
                return Vec::new();
            }
        };
        reply
            .monitors
            .iter()
            .map(|monitor| {
                Rect::new(
                    i32::from(monitor.x),
                    i32::from(monitor.y),
                    u32::from(monitor.width),
                    u32::from(monitor.height),
                )
            })
            .collect()
    }
}

impl ActivitySource for X11Backend {
    fn cursor_position(&self) -> Option<(i32, i32)> {
        let reply = self.conn.query_pointer(self.root).ok()?.reply().ok()?;
        Some((i32::from(reply.root_x), i32::from(reply.root_y)))
    }

    fn foreground_window_bounds(&self) -> Option<Rect> {
        let window = self.active_window()?;
        let geometry = self.conn.get_geometry(window).ok()?.reply().ok()?;
        // The window's own origin is frame-relative; translate to root
        // coordinates for comparison against monitor rectangles.
        let origin = self
            .conn
            .translate_coordinates(window, self.root, 0, 0)
            .ok()?
            .reply()
            .ok()?;
        Some(Rect::new(
            i32::from(origin.dst_x),
            i32::from(origin.dst_y),
            u32::from(geometry.width),
            u32::from(geometry.height),
        ))
    }
}
