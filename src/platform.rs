//! Desktop platform backends.
//!
//! A backend supplies the two read-only probes the controllers need:
//! display geometry enumeration ([`crate::geometry::GeometryProvider`]) and
//! activity signals ([`crate::activity::ActivitySource`]). Backends are
//! polled, never event-driven, so a flaky connection degrades to "no
//! signal" instead of wedging the daemon.

mod x11;

pub use x11::X11Backend;
