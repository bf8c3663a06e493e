//! Per-monitor dim/restore state machine and command surface.
//!
//! Each controller owns one display's runtime state: idle tracking, the
//! Active/Dimmed state machine, the two fade slots (hardware luminance and
//! overlay opacity), and the cached pre-dim brightness used as the restore
//! target. It is polled at 1 Hz by the controller set and advanced between
//! polls whenever a fade step comes due. All hardware failures are logged
//! and degrade to "brightness unknown"; nothing here may abort a tick.

use std::sync::Arc;
use std::sync::MutexGuard;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::activity::{self, ActivitySource};
use crate::channel::{self, HardwareBrightnessChannel, SharedChannel};
use crate::config::{GlobalConfig, MonitorConfig};
use crate::fade::{self, Fade, Profile};
use crate::geometry::{self, GeometryProvider, Rect};
use crate::overlay::OverlaySurface;

/// Luminance assumed when neither a fresh read nor a cached original exists.
const DEFAULT_LUMINANCE: u16 = 100;

/// Opacity below which a converged overlay is hidden outright.
const HIDE_EPSILON: f64 = 0.01;

/// Dimming state of one monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimState {
    Active,
    Dimmed,
}

/// Read-only view of a controller for status display.
#[derive(Debug, Clone)]
pub struct ControllerStatus {
    pub monitor_index: usize,
    pub dim_state: DimState,
    pub last_active: Instant,
    pub geometry: Rect,
}

/// Controller for one monitor's activity detection and dimming.
pub struct MonitorController {
    cfg: MonitorConfig,
    geometry: Rect,
    dim_state: DimState,
    last_active: Instant,

    /// Last successfully read pre-dim luminance; `None` means unknown, in
    /// which case restore leaves the hardware untouched.
    original_brightness: Option<u16>,

    /// Occupied while a hardware fade is in flight; at most one at a time.
    hardware_fade: Option<Fade>,
    overlay_fade: Option<Fade>,

    /// Deadline at which an identify flash fades back out.
    identify_reset_at: Option<Instant>,

    /// Shadow of the last opacity applied to the overlay, used as the
    /// start of the next overlay fade.
    overlay_opacity: f64,

    channel: SharedChannel,
    overlay: Box<dyn OverlaySurface + Send>,
    geometry_provider: Arc<dyn GeometryProvider + Send + Sync>,
    activity: Arc<dyn ActivitySource + Send + Sync>,
}

impl MonitorController {
    pub fn new(
        mut cfg: MonitorConfig,
        channel: SharedChannel,
        mut overlay: Box<dyn OverlaySurface + Send>,
        geometry_provider: Arc<dyn GeometryProvider + Send + Sync>,
        activity: Arc<dyn ActivitySource + Send + Sync>,
        now: Instant,
    ) -> Self {
        cfg.sanitize();

        let geometry = geometry::display_rect(&*geometry_provider, cfg.display_index);
        let original_brightness = probe_brightness(&channel, cfg.hardware_index);

        overlay.resize(geometry);
        overlay.set_color(cfg.color());
        overlay.set_opacity(0.0);
        overlay.hide();

        info!(
            "monitor {}: display {} (hardware {}), geometry {:?}, brightness {:?}",
            cfg.monitor_index, cfg.display_index, cfg.hardware_index, geometry, original_brightness
        );

        Self {
            cfg,
            geometry,
            dim_state: DimState::Active,
            last_active: now,
            original_brightness,
            hardware_fade: None,
            overlay_fade: None,
            identify_reset_at: None,
            overlay_opacity: 0.0,
            channel,
            overlay,
            geometry_provider,
            activity,
        }
    }

    pub fn monitor_index(&self) -> usize {
        self.cfg.monitor_index
    }

    pub fn dim_state(&self) -> DimState {
        self.dim_state
    }

    pub fn original_brightness(&self) -> Option<u16> {
        self.original_brightness
    }

    pub fn status(&self) -> ControllerStatus {
        ControllerStatus {
            monitor_index: self.cfg.monitor_index,
            dim_state: self.dim_state,
            last_active: self.last_active,
            geometry: self.geometry,
        }
    }

    /// Reset the idle timer without touching anything else.
    pub fn reset_idle(&mut self, now: Instant) {
        self.last_active = now;
    }

    /// One 1 Hz poll: refresh idle tracking and fire state transitions.
    pub fn tick(&mut self, global: &GlobalConfig, now: Instant) {
        if global.awake_mode {
            if self.dim_state == DimState::Dimmed {
                self.restore_now(now);
            }
            return;
        }

        if activity::is_present(&*self.activity, &self.geometry) {
            self.last_active = now;
            if self.dim_state == DimState::Dimmed {
                self.restore_now(now);
            }
        } else if self.dim_state == DimState::Active
            && now.duration_since(self.last_active)
                >= Duration::from_secs(global.inactivity_limit_seconds)
        {
            self.dim_now(global, now);
        }
    }

    /// Force-enter the dimmed state, starting fades on both enabled
    /// channels. No-op while already dimmed.
    pub fn dim_now(&mut self, global: &GlobalConfig, now: Instant) {
        if self.dim_state == DimState::Dimmed {
            return;
        }
        self.dim_state = DimState::Dimmed;
        debug!("monitor {}: dimming", self.cfg.monitor_index);

        if self.cfg.software_dimming_enabled {
            let target = self.cfg.software_dim_level.clamp(0.0, 1.0);
            self.overlay.show();
            self.overlay_fade = Some(Fade::new(
                Profile::Dim,
                self.overlay_opacity,
                target,
                global.fade_steps,
                global.fade_duration_seconds,
                now,
            ));
        }

        if self.cfg.hardware_dimming_enabled {
            self.start_hardware_dim(global, now);
        }
    }

    fn start_hardware_dim(&mut self, global: &GlobalConfig, now: Instant) {
        if self.hardware_fade.is_some() {
            debug!(
                "monitor {}: hardware fade already in flight, skipping",
                self.cfg.monitor_index
            );
            return;
        }

        // Fresh read each dim: tolerates the user changing brightness
        // out-of-band between dims. A successful pre-dim read also becomes
        // the new restore target.
        let start = match lock_channel(&self.channel).read_luminance(self.cfg.hardware_index) {
            Ok(value) => {
                self.original_brightness = Some(value);
                value
            }
            Err(e) => {
                warn!(
                    "monitor {}: luminance read failed ({}), using last known",
                    self.cfg.monitor_index, e
                );
                self.original_brightness.unwrap_or(DEFAULT_LUMINANCE)
            }
        };

        let target = fade::hardware_dim_target(start, self.cfg.hardware_dim_level);
        self.hardware_fade = Some(Fade::new(
            Profile::Dim,
            f64::from(start),
            f64::from(target),
            global.fade_steps,
            global.fade_duration_seconds,
            now,
        ));
    }

    /// Force-enter the active state with an instant, non-faded restore on
    /// both channels. Cancels any in-flight fade and resets the idle timer.
    pub fn restore_now(&mut self, now: Instant) {
        let was_dimmed = self.dim_state == DimState::Dimmed;
        self.hardware_fade = None;
        self.overlay_fade = None;
        self.identify_reset_at = None;

        if was_dimmed {
            if let Some(original) = self.original_brightness {
                if let Err(e) =
                    lock_channel(&self.channel).set_luminance(self.cfg.hardware_index, original)
                {
                    warn!(
                        "monitor {}: brightness restore failed: {}",
                        self.cfg.monitor_index, e
                    );
                }
            }
            debug!("monitor {}: restored", self.cfg.monitor_index);
        }

        self.set_overlay_opacity(0.0);
        self.overlay.hide();
        self.dim_state = DimState::Active;
        self.last_active = now;
    }

    /// Apply any due fade step and expire a pending identify flash.
    /// Returns the next pending deadline, if any.
    pub fn advance(&mut self, global: &GlobalConfig, now: Instant) -> Option<Instant> {
        if let Some(reset_at) = self.identify_reset_at {
            if now >= reset_at {
                self.identify_reset_at = None;
                // Fade back out on the fast profile so the flash stays snappy.
                self.overlay_fade = Some(Fade::new(
                    Profile::Restore,
                    self.overlay_opacity,
                    0.0,
                    global.fade_steps,
                    global.fade_duration_seconds,
                    now,
                ));
            }
        }

        let mut hardware_done = false;
        let mut hardware_value = None;
        if let Some(fade) = &mut self.hardware_fade {
            if fade.due(now) {
                let (value, done) = fade.tick();
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                {
                    hardware_value = Some(value.round().clamp(0.0, 100.0) as u16);
                }
                hardware_done = done;
            }
        }
        if let Some(value) = hardware_value {
            if let Err(e) =
                lock_channel(&self.channel).set_luminance(self.cfg.hardware_index, value)
            {
                warn!(
                    "monitor {}: fade write failed, dropping fade: {}",
                    self.cfg.monitor_index, e
                );
                hardware_done = true;
            }
        }
        if hardware_done {
            self.hardware_fade = None;
        }

        let mut overlay_done = false;
        let mut overlay_step = None;
        if let Some(fade) = &mut self.overlay_fade {
            if fade.due(now) {
                let (value, done) = fade.tick();
                overlay_step = Some((value, fade.target()));
                overlay_done = done;
            }
        }
        if let Some((value, target)) = overlay_step {
            self.set_overlay_opacity(value.clamp(0.0, 1.0));
            if overlay_done {
                self.overlay_fade = None;
                if target < HIDE_EPSILON {
                    self.overlay.hide();
                }
            }
        }

        self.next_deadline()
    }

    /// Earliest pending fade step or identify expiry.
    pub fn next_deadline(&self) -> Option<Instant> {
        let mut deadline = self.identify_reset_at;
        let dues = [
            self.hardware_fade.as_ref().map(Fade::next_due),
            self.overlay_fade.as_ref().map(Fade::next_due),
        ];
        for due in dues.into_iter().flatten() {
            deadline = Some(deadline.map_or(due, |d| d.min(due)));
        }
        deadline
    }

    /// Flash the overlay so the user can match ordinals to physical
    /// displays. Runs independently of the dim state and never alters it.
    pub fn identify(
        &mut self,
        global: &GlobalConfig,
        duration: Duration,
        opacity: f64,
        now: Instant,
    ) {
        debug!("monitor {}: identify", self.cfg.monitor_index);
        self.overlay.show();
        self.overlay_fade = Some(Fade::new(
            Profile::Dim,
            self.overlay_opacity,
            opacity.clamp(0.0, 1.0),
            global.fade_steps,
            global.fade_duration_seconds,
            now,
        ));
        self.identify_reset_at = Some(now + duration);
    }

    /// Remap display and hardware indices, re-probing brightness and
    /// geometry. Negative indices are clamped to zero; a failed probe
    /// leaves the original brightness unknown, which is not fatal.
    pub fn set_indices(&mut self, display_index: i32, hardware_index: i32) {
        self.cfg.display_index = usize::try_from(display_index.max(0)).unwrap_or(0);
        self.cfg.hardware_index = usize::try_from(hardware_index.max(0)).unwrap_or(0);
        info!(
            "monitor {}: remapped to display {} (hardware {})",
            self.cfg.monitor_index, self.cfg.display_index, self.cfg.hardware_index
        );
        self.original_brightness = probe_brightness(&self.channel, self.cfg.hardware_index);
        self.refresh_geometry();
    }

    /// Re-query the display rectangle; reposition the overlay only when it
    /// actually changed, to avoid needless churn.
    pub fn refresh_geometry(&mut self) {
        let rect = geometry::display_rect(&*self.geometry_provider, self.cfg.display_index);
        if rect != self.geometry {
            debug!(
                "monitor {}: geometry changed to {:?}",
                self.cfg.monitor_index, rect
            );
            self.geometry = rect;
            self.overlay.resize(rect);
        }
    }

    /// Undo any hardware dimming in effect and stop using the channel.
    pub fn disable_hardware(&mut self) {
        self.hardware_fade = None;
        if self.dim_state == DimState::Dimmed {
            if let Some(original) = self.original_brightness {
                if let Err(e) =
                    lock_channel(&self.channel).set_luminance(self.cfg.hardware_index, original)
                {
                    warn!(
                        "monitor {}: brightness restore failed: {}",
                        self.cfg.monitor_index, e
                    );
                }
            }
        }
        self.cfg.hardware_dimming_enabled = false;
        info!("monitor {}: hardware dimming disabled", self.cfg.monitor_index);
    }

    /// Undo any software dimming in effect and stop using the overlay.
    pub fn disable_software(&mut self) {
        self.overlay_fade = None;
        self.identify_reset_at = None;
        if self.dim_state == DimState::Dimmed {
            self.set_overlay_opacity(0.0);
            self.overlay.hide();
        }
        self.cfg.software_dimming_enabled = false;
        info!("monitor {}: software dimming disabled", self.cfg.monitor_index);
    }

    fn set_overlay_opacity(&mut self, opacity: f64) {
        self.overlay_opacity = opacity;
        self.overlay.set_opacity(opacity);
    }
}

fn lock_channel(
    channel: &SharedChannel,
) -> MutexGuard<'_, dyn HardwareBrightnessChannel + Send + 'static> {
    channel::lock(channel)
}

fn probe_brightness(channel: &SharedChannel, index: usize) -> Option<u16> {
    match lock_channel(channel).read_luminance(index) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Brightness probe failed on hardware index {}: {}", index, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{ChannelError, shared};
    use crate::overlay::Color;
    use std::sync::Mutex;

    /// In-memory luminance store standing in for DDC hardware.
    struct FakeChannel {
        luminance: Vec<u16>,
    }

    impl HardwareBrightnessChannel for FakeChannel {
        fn len(&self) -> usize {
            self.luminance.len()
        }

        fn read_luminance(&mut self, index: usize) -> Result<u16, ChannelError> {
            self.luminance
                .get(index)
                .copied()
                .ok_or(ChannelError::OutOfRange(index))
        }

        fn set_luminance(&mut self, index: usize, value: u16) -> Result<(), ChannelError> {
            match self.luminance.get_mut(index) {
                Some(slot) => {
                    *slot = value;
                    Ok(())
                }
                None => Err(ChannelError::OutOfRange(index)),
            }
        }
    }

    #[derive(Default)]
    struct FakeActivity {
        cursor: Mutex<Option<(i32, i32)>>,
    }

    impl FakeActivity {
        fn set_cursor(&self, cursor: Option<(i32, i32)>) {
            *self.cursor.lock().unwrap() = cursor;
        }
    }

    impl ActivitySource for FakeActivity {
        fn cursor_position(&self) -> Option<(i32, i32)> {
            *self.cursor.lock().unwrap()
        }

        fn foreground_window_bounds(&self) -> Option<Rect> {
            None
        }
    }

    struct FakeGeometry {
        rects: Mutex<Vec<Rect>>,
    }

    impl FakeGeometry {
        fn set_rects(&self, rects: Vec<Rect>) {
            *self.rects.lock().unwrap() = rects;
        }
    }

    impl GeometryProvider for FakeGeometry {
        fn list_displays(&self) -> Vec<Rect> {
            self.rects.lock().unwrap().clone()
        }
    }

    #[derive(Debug, Default, Clone)]
    struct OverlayState {
        opacity: f64,
        visible: bool,
        rect: Option<Rect>,
    }

    struct RecordingOverlay(Arc<Mutex<OverlayState>>);

    impl OverlaySurface for RecordingOverlay {
        fn set_opacity(&mut self, opacity: f64) {
            self.0.lock().unwrap().opacity = opacity;
        }

        fn show(&mut self) {
            self.0.lock().unwrap().visible = true;
        }

        fn hide(&mut self) {
            self.0.lock().unwrap().visible = false;
        }

        fn resize(&mut self, rect: Rect) {
            self.0.lock().unwrap().rect = Some(rect);
        }

        fn set_color(&mut self, _color: Color) {}
    }

    struct Harness {
        controller: MonitorController,
        global: GlobalConfig,
        activity: Arc<FakeActivity>,
        geometry: Arc<FakeGeometry>,
        channel: SharedChannel,
        overlay: Arc<Mutex<OverlayState>>,
        t0: Instant,
    }

    fn harness_with(luminance: Vec<u16>) -> Harness {
        let t0 = Instant::now();
        let global = GlobalConfig::default();
        let channel = shared(FakeChannel { luminance });
        let activity = Arc::new(FakeActivity::default());
        let geometry = Arc::new(FakeGeometry {
            rects: Mutex::new(vec![Rect::new(0, 0, 1920, 1080)]),
        });
        let overlay = Arc::new(Mutex::new(OverlayState::default()));
        let controller = MonitorController::new(
            MonitorConfig::default(),
            channel.clone(),
            Box::new(RecordingOverlay(overlay.clone())),
            geometry.clone(),
            activity.clone(),
            t0,
        );
        Harness {
            controller,
            global,
            activity,
            geometry,
            channel,
            overlay,
            t0,
        }
    }

    fn harness() -> Harness {
        harness_with(vec![100])
    }

    impl Harness {
        fn luminance(&self) -> u16 {
            channel::lock(&self.channel).read_luminance(0).unwrap()
        }

        fn overlay_state(&self) -> OverlayState {
            self.overlay.lock().unwrap().clone()
        }

        /// Step through enough fade ticks to drain every pending fade.
        fn drain_fades(&mut self, from: Instant) {
            let mut now = from;
            for _ in 0..200 {
                now += Duration::from_millis(50);
                if self.controller.advance(&self.global, now).is_none() {
                    return;
                }
            }
            panic!("fades failed to drain");
        }
    }

    #[test]
    fn test_initial_state_probes_brightness() {
        let h = harness();
        assert_eq!(h.controller.dim_state(), DimState::Active);
        assert_eq!(h.controller.original_brightness(), Some(100));
        assert_eq!(h.overlay_state().rect, Some(Rect::new(0, 0, 1920, 1080)));
        assert!(!h.overlay_state().visible);
    }

    #[test]
    fn test_dims_after_inactivity_limit() {
        let mut h = harness();
        h.activity.set_cursor(Some((5000, 5000)));

        // One second shy of the limit: still active.
        h.controller.tick(&h.global, h.t0 + Duration::from_secs(9));
        assert_eq!(h.controller.dim_state(), DimState::Active);

        h.controller.tick(&h.global, h.t0 + Duration::from_secs(11));
        assert_eq!(h.controller.dim_state(), DimState::Dimmed);
        assert!(h.overlay_state().visible);

        h.drain_fades(h.t0 + Duration::from_secs(11));
        // Level 30 from 100 -> 70; overlay at 0.5.
        assert_eq!(h.luminance(), 70);
        assert!((h.overlay_state().opacity - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_presence_refreshes_idle_timer() {
        let mut h = harness();
        h.activity.set_cursor(Some((10, 10)));
        for s in 1..30 {
            h.controller.tick(&h.global, h.t0 + Duration::from_secs(s));
        }
        assert_eq!(h.controller.dim_state(), DimState::Active);
    }

    #[test]
    fn test_cursor_return_restores_within_one_tick() {
        let mut h = harness();
        h.activity.set_cursor(None);
        h.controller.tick(&h.global, h.t0 + Duration::from_secs(11));
        h.drain_fades(h.t0 + Duration::from_secs(11));
        assert_eq!(h.luminance(), 70);

        h.activity.set_cursor(Some((100, 100)));
        h.controller.tick(&h.global, h.t0 + Duration::from_secs(12));
        assert_eq!(h.controller.dim_state(), DimState::Active);
        // Instant restore: no fade ticks needed.
        assert_eq!(h.luminance(), 100);
        assert!(!h.overlay_state().visible);
        assert!(h.overlay_state().opacity.abs() < 1e-9);
    }

    #[test]
    fn test_dim_restore_round_trip() {
        let mut h = harness();
        let t = h.t0 + Duration::from_secs(1);
        h.controller.dim_now(&h.global, t);
        h.controller.restore_now(t);
        assert_eq!(h.luminance(), 100);
        assert!(h.overlay_state().opacity.abs() < 1e-9);
        assert!(!h.overlay_state().visible);
        assert_eq!(h.controller.dim_state(), DimState::Active);
        assert!(h.controller.next_deadline().is_none());
    }

    #[test]
    fn test_dim_now_is_idempotent() {
        let mut h = harness();
        let t = h.t0 + Duration::from_secs(1);
        h.controller.dim_now(&h.global, t);
        let deadline = h.controller.next_deadline();
        h.controller.dim_now(&h.global, t + Duration::from_millis(10));
        assert_eq!(h.controller.next_deadline(), deadline);
    }

    #[test]
    fn test_awake_mode_restores_within_one_tick() {
        let mut h = harness();
        h.controller.dim_now(&h.global, h.t0);
        h.drain_fades(h.t0);
        assert_eq!(h.luminance(), 70);

        h.global.awake_mode = true;
        h.controller.tick(&h.global, h.t0 + Duration::from_secs(1));
        assert_eq!(h.controller.dim_state(), DimState::Active);
        assert_eq!(h.luminance(), 100);

        // Stays active no matter how stale the idle timer gets.
        h.controller.tick(&h.global, h.t0 + Duration::from_secs(3600));
        assert_eq!(h.controller.dim_state(), DimState::Active);
    }

    #[test]
    fn test_fresh_read_updates_restore_target() {
        let mut h = harness();
        // User changed brightness out-of-band since startup.
        channel::lock(&h.channel).set_luminance(0, 80).unwrap();

        h.controller.dim_now(&h.global, h.t0);
        h.drain_fades(h.t0);
        assert_eq!(h.luminance(), 56); // round(80 * 0.7)

        h.controller.restore_now(h.t0 + Duration::from_secs(1));
        assert_eq!(h.luminance(), 80);
    }

    #[test]
    fn test_hardware_failure_degrades_to_software_only() {
        let mut h = harness_with(vec![]);
        assert_eq!(h.controller.original_brightness(), None);

        h.controller.dim_now(&h.global, h.t0);
        assert_eq!(h.controller.dim_state(), DimState::Dimmed);
        h.drain_fades(h.t0);
        assert!((h.overlay_state().opacity - 0.5).abs() < 1e-9);

        // Restore with unknown brightness leaves hardware untouched.
        h.controller.restore_now(h.t0 + Duration::from_secs(1));
        assert_eq!(h.controller.dim_state(), DimState::Active);
    }

    #[test]
    fn test_restore_cancels_in_flight_fade() {
        let mut h = harness();
        h.controller.dim_now(&h.global, h.t0);
        // One fade step only (50ms interval at default config).
        h.controller
            .advance(&h.global, h.t0 + Duration::from_millis(50));
        let mid = h.luminance();
        assert!(mid < 100 && mid > 70);

        h.controller.restore_now(h.t0 + Duration::from_millis(60));
        assert_eq!(h.luminance(), 100);
        // No stale continuation may re-apply an old target.
        assert!(h.controller.next_deadline().is_none());
        h.drain_fades(h.t0 + Duration::from_millis(60));
        assert_eq!(h.luminance(), 100);
    }

    #[test]
    fn test_set_indices_clamps_negative() {
        let mut h = harness();
        h.controller.set_indices(-5, -3);
        let status = h.controller.status();
        assert_eq!(status.geometry, Rect::new(0, 0, 1920, 1080));
        assert_eq!(h.controller.original_brightness(), Some(100));
    }

    #[test]
    fn test_set_indices_probe_failure_not_fatal() {
        let mut h = harness();
        h.controller.set_indices(0, 9);
        assert_eq!(h.controller.original_brightness(), None);
    }

    #[test]
    fn test_refresh_geometry_moves_overlay_on_change() {
        let mut h = harness();
        h.controller.refresh_geometry();
        assert_eq!(h.overlay_state().rect, Some(Rect::new(0, 0, 1920, 1080)));

        h.geometry.set_rects(vec![Rect::new(100, 0, 2560, 1440)]);
        h.controller.refresh_geometry();
        assert_eq!(h.overlay_state().rect, Some(Rect::new(100, 0, 2560, 1440)));
    }

    #[test]
    fn test_identify_flashes_and_fades_back() {
        let mut h = harness();
        h.controller
            .identify(&h.global, Duration::from_secs(2), 0.6, h.t0);
        assert!(h.overlay_state().visible);
        assert_eq!(h.controller.dim_state(), DimState::Active);

        // Fade up to the flash opacity.
        let mut now = h.t0;
        for _ in 0..15 {
            now += Duration::from_millis(50);
            h.controller.advance(&h.global, now);
        }
        assert!((h.overlay_state().opacity - 0.6).abs() < 1e-9);

        // Past the flash deadline the overlay fades back out and hides.
        h.drain_fades(h.t0 + Duration::from_secs(2));
        assert!(h.overlay_state().opacity.abs() < 1e-9);
        assert!(!h.overlay_state().visible);
        assert_eq!(h.controller.dim_state(), DimState::Active);
    }

    #[test]
    fn test_disable_hardware_while_dimmed() {
        let mut h = harness();
        h.controller.dim_now(&h.global, h.t0);
        h.drain_fades(h.t0);
        assert_eq!(h.luminance(), 70);

        h.controller.disable_hardware();
        assert_eq!(h.luminance(), 100);

        // Subsequent dims no longer touch the hardware.
        h.controller.restore_now(h.t0 + Duration::from_secs(1));
        h.controller.dim_now(&h.global, h.t0 + Duration::from_secs(2));
        h.drain_fades(h.t0 + Duration::from_secs(2));
        assert_eq!(h.luminance(), 100);
        assert!((h.overlay_state().opacity - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_disable_software_while_dimmed() {
        let mut h = harness();
        h.controller.dim_now(&h.global, h.t0);
        h.drain_fades(h.t0);
        assert!(h.overlay_state().visible);

        h.controller.disable_software();
        assert!(!h.overlay_state().visible);
        assert!(h.overlay_state().opacity.abs() < 1e-9);

        h.controller.restore_now(h.t0 + Duration::from_secs(1));
        h.controller.dim_now(&h.global, h.t0 + Duration::from_secs(2));
        assert!(!h.overlay_state().visible);
    }
}
