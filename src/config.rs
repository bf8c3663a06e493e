//! Configuration loading, defaults and clamped setters.
//!
//! The file is read once at startup; runtime mutations happen through
//! setters that clamp out-of-range values at the boundary so invalid
//! levels or timings never reach the state machine. Persisting changes
//! back to disk belongs to the settings UI, not the daemon core.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

use crate::overlay::Color;

/// Settings shared by every monitor controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Seconds without activity before a monitor dims (>= 1).
    pub inactivity_limit_seconds: u64,

    /// Total dim fade duration in seconds (> 0).
    pub fade_duration_seconds: f64,

    /// Number of discrete fade steps (>= 1).
    pub fade_steps: u32,

    /// Global override: while true, nothing may stay dimmed.
    pub awake_mode: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            inactivity_limit_seconds: 10,
            fade_duration_seconds: 0.5,
            fade_steps: 10,
            awake_mode: false,
        }
    }
}

impl GlobalConfig {
    /// Clamp out-of-range values loaded from disk.
    pub fn sanitize(&mut self) {
        if self.inactivity_limit_seconds < 1 {
            warn!("inactivity_limit_seconds below 1, clamping");
            self.inactivity_limit_seconds = 1;
        }
        if self.fade_duration_seconds <= 0.0 || self.fade_duration_seconds.is_nan() {
            warn!(
                "fade_duration_seconds {} not positive, using default",
                self.fade_duration_seconds
            );
            self.fade_duration_seconds = Self::default().fade_duration_seconds;
        }
        if self.fade_steps < 1 {
            warn!("fade_steps below 1, clamping");
            self.fade_steps = 1;
        }
    }

    pub fn set_inactivity_limit(&mut self, seconds: u64) {
        self.inactivity_limit_seconds = seconds.max(1);
    }

    pub fn set_fade_duration(&mut self, seconds: f64) {
        if seconds > 0.0 {
            self.fade_duration_seconds = seconds;
        } else {
            warn!("Rejecting non-positive fade duration {}", seconds);
        }
    }

    pub fn set_fade_steps(&mut self, steps: u32) {
        self.fade_steps = steps.max(1);
    }
}

/// Per-monitor settings.
///
/// `display_index` and `hardware_index` are independent: the display
/// enumeration and the DDC enumeration are not guaranteed to agree in
/// order, so the user can remap either one separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Stable user-facing ordinal, never changed after creation.
    pub monitor_index: usize,

    /// Index into the display geometry enumeration.
    pub display_index: usize,

    /// Index into the hardware brightness enumeration.
    pub hardware_index: usize,

    pub hardware_dimming_enabled: bool,
    pub software_dimming_enabled: bool,

    /// Percent reduction applied to the current luminance, 1..=100.
    pub hardware_dim_level: u8,

    /// Target overlay opacity, 0.0..=1.0.
    pub software_dim_level: f64,

    /// Overlay fill color as `#rrggbb`.
    pub overlay_color: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            monitor_index: 0,
            display_index: 0,
            hardware_index: 0,
            hardware_dimming_enabled: true,
            software_dimming_enabled: true,
            hardware_dim_level: 30,
            software_dim_level: 0.5,
            overlay_color: "#000000".to_string(),
        }
    }
}

impl MonitorConfig {
    /// Default entry for an auto-enumerated display, with all indices
    /// pointing at the same ordinal.
    pub fn for_display(index: usize) -> Self {
        Self {
            monitor_index: index,
            display_index: index,
            hardware_index: index,
            ..Self::default()
        }
    }

    /// Clamp out-of-range levels loaded from disk.
    pub fn sanitize(&mut self) {
        if !(1..=100).contains(&self.hardware_dim_level) {
            warn!(
                "monitor {}: hardware_dim_level {} out of range, clamping",
                self.monitor_index, self.hardware_dim_level
            );
            self.hardware_dim_level = self.hardware_dim_level.clamp(1, 100);
        }
        if !(0.0..=1.0).contains(&self.software_dim_level) {
            warn!(
                "monitor {}: software_dim_level {} out of range, clamping",
                self.monitor_index, self.software_dim_level
            );
            self.software_dim_level = if self.software_dim_level.is_nan() {
                Self::default().software_dim_level
            } else {
                self.software_dim_level.clamp(0.0, 1.0)
            };
        }
    }

    /// Parsed overlay color, falling back to black on a malformed value.
    pub fn color(&self) -> Color {
        self.overlay_color.parse().unwrap_or_else(|e| {
            warn!("monitor {}: {}, using black", self.monitor_index, e);
            Color::BLACK
        })
    }
}

/// Complete daemon configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub global: GlobalConfig,
    pub monitors: Vec<MonitorConfig>,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.sanitize();
        Ok(config)
    }

    /// Load configuration from the default path, or return defaults if not found.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(p) = path {
            return Self::load(p);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let default_path = config_dir.join("monitor-napd").join("config.toml");
            if default_path.exists() {
                return Self::load(&default_path);
            }
        }

        Ok(Self::default())
    }

    fn sanitize(&mut self) {
        self.global.sanitize();
        for monitor in &mut self.monitors {
            monitor.sanitize();
        }
    }
}
