//! Fleet coordination across every monitor controller.
//!
//! The set owns the shared [`GlobalConfig`] and the pause timer, and fans
//! commands out to each [`MonitorController`]. Awake mode and pause are the
//! two global overrides: pause is awake mode with an expiry, and any manual
//! awake toggle cancels a pending expiry so the user's explicit choice wins.

use std::time::{Duration, Instant};

use tracing::info;

use crate::config::GlobalConfig;
use crate::controller::{ControllerStatus, MonitorController};

pub struct ControllerSet {
    controllers: Vec<MonitorController>,
    global: GlobalConfig,

    /// When set, awake mode turns itself back off at this instant.
    pause_until: Option<Instant>,
}

impl ControllerSet {
    pub fn new(controllers: Vec<MonitorController>, global: GlobalConfig) -> Self {
        Self {
            controllers,
            global,
            pause_until: None,
        }
    }

    pub fn global(&self) -> &GlobalConfig {
        &self.global
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    /// One 1 Hz poll across the fleet. Expires the pause timer before the
    /// per-monitor ticks so controllers see the post-expiry awake state.
    pub fn tick_all(&mut self, now: Instant) {
        if let Some(until) = self.pause_until {
            if now >= until {
                info!("Pause expired, resuming dimming");
                self.pause_until = None;
                self.apply_awake(false, now);
            }
        }
        for controller in &mut self.controllers {
            controller.tick(&self.global, now);
        }
    }

    /// Apply due fade steps; returns the earliest pending deadline.
    pub fn advance_all(&mut self, now: Instant) -> Option<Instant> {
        let mut deadline = None;
        for controller in &mut self.controllers {
            if let Some(due) = controller.advance(&self.global, now) {
                deadline = Some(deadline.map_or(due, |d: Instant| d.min(due)));
            }
        }
        deadline
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        let mut deadline = None;
        for controller in &self.controllers {
            if let Some(due) = controller.next_deadline() {
                deadline = Some(deadline.map_or(due, |d: Instant| d.min(due)));
            }
        }
        deadline
    }

    /// Manual awake toggle. Always cancels a pending pause expiry: an
    /// explicit toggle supersedes the timer in both directions.
    pub fn set_awake_mode(&mut self, awake: bool, now: Instant) {
        self.pause_until = None;
        self.apply_awake(awake, now);
    }

    /// Enable awake mode for a bounded interval, after which dimming
    /// resumes on its own. Zero minutes is treated as one.
    pub fn pause_for(&mut self, minutes: u64, now: Instant) {
        let minutes = minutes.max(1);
        info!("Pausing dimming for {} minute(s)", minutes);
        self.apply_awake(true, now);
        self.pause_until = Some(now + Duration::from_secs(minutes * 60));
    }

    /// Cut a pause (or plain awake mode) short and resume dimming.
    pub fn resume_now(&mut self, now: Instant) {
        self.set_awake_mode(false, now);
    }

    pub fn pause_remaining(&self, now: Instant) -> Option<Duration> {
        self.pause_until
            .map(|until| until.saturating_duration_since(now))
    }

    fn apply_awake(&mut self, awake: bool, now: Instant) {
        if self.global.awake_mode == awake {
            return;
        }
        self.global.awake_mode = awake;
        info!("Awake mode {}", if awake { "on" } else { "off" });
        if !awake {
            // Grant a full idle interval from re-enable instead of dimming
            // instantly on stale timers.
            for controller in &mut self.controllers {
                controller.reset_idle(now);
            }
        }
    }

    pub fn dim_all(&mut self, now: Instant) {
        for controller in &mut self.controllers {
            controller.dim_now(&self.global, now);
        }
    }

    pub fn restore_all(&mut self, now: Instant) {
        for controller in &mut self.controllers {
            controller.restore_now(now);
        }
    }

    pub fn refresh_geometries(&mut self) {
        for controller in &mut self.controllers {
            controller.refresh_geometry();
        }
    }

    /// Flash every overlay so ordinals can be matched to physical displays.
    pub fn identify_all(&mut self, duration: Duration, opacity: f64, now: Instant) {
        for controller in &mut self.controllers {
            controller.identify(&self.global, duration, opacity, now);
        }
    }

    pub fn set_inactivity_limit(&mut self, seconds: u64) {
        self.global.set_inactivity_limit(seconds);
    }

    pub fn set_fade_duration(&mut self, seconds: f64) {
        self.global.set_fade_duration(seconds);
    }

    pub fn set_fade_steps(&mut self, steps: u32) {
        self.global.set_fade_steps(steps);
    }

    pub fn controller_mut(&mut self, monitor_index: usize) -> Option<&mut MonitorController> {
        self.controllers
            .iter_mut()
            .find(|c| c.monitor_index() == monitor_index)
    }

    pub fn statuses(&self) -> Vec<ControllerStatus> {
        self.controllers
            .iter()
            .map(MonitorController::status)
            .collect()
    }

    /// Leave every display exactly as found: full brightness restore and
    /// all overlays hidden.
    pub fn shutdown(&mut self, now: Instant) {
        info!("Shutting down, restoring all monitors");
        self.restore_all(now);
    }
}
