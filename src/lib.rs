//! Core library for monitor-napd.
//!
//! Per-monitor activity detection, the dim/restore state machine, and the
//! dual-channel fade engine (DDC/CI hardware luminance plus a software
//! overlay scrim). The binary wires these up to the X11 backend and a
//! single-threaded timer loop; UI/tray layers consume the command surface
//! exposed by [`set::ControllerSet`] and [`controller::MonitorController`].

pub mod activity;
pub mod channel;
pub mod config;
pub mod controller;
pub mod fade;
pub mod geometry;
pub mod overlay;
pub mod platform;
pub mod set;
