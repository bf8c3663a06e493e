//! Step-wise fade engine for brightness and opacity transitions.
//!
//! A fade is an explicit state struct advanced one [`Fade::tick`] per due
//! instant, which makes it resumable and cancelable by simply dropping it.
//! Dim-down fades run at the configured duration and step count; restore
//! fades are compressed so waking up feels instantaneous while dimming
//! stays gradual.

use std::time::{Duration, Instant};

/// Restore fades run at this fraction of the configured dim duration.
const RESTORE_SPEEDUP: f64 = 0.05;

/// Floor for the compressed restore duration, in seconds.
const RESTORE_MIN_SECONDS: f64 = 0.01;

/// Restore fades never use more steps than this.
const RESTORE_MAX_STEPS: u32 = 3;

/// Hardware dim target for a percent-reduction `level` applied to `start`,
/// clamped to the DDC luminance range.
pub fn hardware_dim_target(start: u16, level: u8) -> u16 {
    let level = f64::from(level.min(100));
    let target = (f64::from(start) * (1.0 - level / 100.0)).round();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        target.clamp(0.0, 100.0) as u16
    }
}

/// Speed profile for a fade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Gradual transition at the configured duration and step count.
    Dim,
    /// Compressed transition: at most [`RESTORE_MAX_STEPS`] steps over
    /// `max(0.01, duration * 0.05)` seconds.
    Restore,
}

/// In-flight interpolation of a bounded numeric value.
///
/// Values monotonically approach `target`; the final applied value is
/// clamped to exactly `target`, and the fade terminates within
/// `total_steps` ticks regardless of floating-point rounding.
#[derive(Debug)]
pub struct Fade {
    start: f64,
    target: f64,
    step_size: f64,
    current_step: u32,
    total_steps: u32,
    interval: Duration,
    next_due: Instant,
}

impl Fade {
    pub fn new(
        profile: Profile,
        start: f64,
        target: f64,
        steps: u32,
        duration_seconds: f64,
        now: Instant,
    ) -> Self {
        let (steps, duration_seconds) = match profile {
            Profile::Dim => (steps.max(1), duration_seconds.max(0.0)),
            Profile::Restore => (
                steps.clamp(1, RESTORE_MAX_STEPS),
                (duration_seconds * RESTORE_SPEEDUP).max(RESTORE_MIN_SECONDS),
            ),
        };
        let interval = Duration::from_secs_f64(duration_seconds / f64::from(steps))
            .max(Duration::from_millis(1));
        Self {
            start,
            target,
            step_size: (target - start) / f64::from(steps),
            current_step: 0,
            total_steps: steps,
            interval,
            next_due: now + interval,
        }
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn total_steps(&self) -> u32 {
        self.total_steps
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Instant at which the next step should be applied.
    pub fn next_due(&self) -> Instant {
        self.next_due
    }

    pub fn due(&self, now: Instant) -> bool {
        now >= self.next_due
    }

    /// Advance one step. Returns the value to apply and whether the fade
    /// completed. Completion clamps to exactly `target`: either the step
    /// would overshoot, or the step budget is exhausted.
    pub fn tick(&mut self) -> (f64, bool) {
        self.current_step += 1;
        self.next_due += self.interval;

        let value = self.step_size.mul_add(f64::from(self.current_step), self.start);
        let overshot = (self.step_size >= 0.0 && value >= self.target)
            || (self.step_size < 0.0 && value <= self.target);

        if overshot || self.current_step >= self.total_steps {
            (self.target, true)
        } else {
            (value, false)
        }
    }
}
