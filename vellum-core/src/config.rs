//! Editor tunables.
//!
//! Every threshold, handle size and tiling limit the core uses lives in
//! [`EditorConfig`]. All fields default, so a partial JSON object is a valid
//! configuration:
//!
//! ```
//! use vellum_core::EditorConfig;
//!
//! let config = EditorConfig::from_json(r#"{ "clickThresholdPx": 8 }"#).unwrap();
//! assert!((config.click_threshold_px - 8.0).abs() < f64::EPSILON);
//! assert_eq!(config.max_tiles, 16);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CanvasError, CanvasResult};
use crate::mapper::ZOOM_EPSILON;

/// Configuration for the editing core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Pointer travel (screen px, per axis) separating a click from a drag.
    pub click_threshold_px: f64,
    /// Per-frame clamp applied to raw pan deltas (screen px).
    pub pan_clamp_px: f64,
    /// Number of recent pan deltas averaged per axis.
    pub pan_smoothing_window: usize,
    /// Size of overlay handles (canvas units).
    pub handle_size_px: f64,
    /// Length of the rotation grip arm above the overlay (canvas units).
    pub rotation_arm_px: f64,
    /// Extra tolerance around path bounds for hit-testing (canvas units).
    pub path_hit_tolerance_px: f64,
    /// Radius for picking path anchors and handles (screen px).
    pub point_hit_radius_px: f64,
    /// Handle lengths below this skip symmetric mirroring.
    pub mirror_epsilon: f64,
    /// Zoom floor.
    pub min_zoom: f64,
    /// Zoom ceiling.
    pub max_zoom: f64,
    /// Multiplicative zoom applied per wheel notch.
    pub wheel_zoom_step: f64,
    /// Starting tile edge length (canvas units).
    pub base_tile_size: f64,
    /// Hard ceiling for tile edge length (canvas units).
    pub max_tile_size: f64,
    /// Maximum number of tiles covering the viewport.
    pub max_tiles: usize,
    /// How many doublings a previously used tile size may sit above the
    /// freshly computed one before it is abandoned.
    pub tile_hysteresis_steps: u32,
    /// Delay before a zoom-triggered tile recompute fires (ms).
    pub zoom_debounce_ms: u64,
    /// Smallest displayed size a resize may produce (canvas units).
    pub min_displayed_size: f64,
    /// Rotation snap increment while shift is held (degrees).
    pub rotation_snap_degrees: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            click_threshold_px: 5.0,
            pan_clamp_px: 200.0,
            pan_smoothing_window: 3,
            handle_size_px: 8.0,
            rotation_arm_px: 24.0,
            path_hit_tolerance_px: 2.0,
            point_hit_radius_px: 6.0,
            mirror_epsilon: 0.001,
            min_zoom: 0.0001,
            max_zoom: 64.0,
            wheel_zoom_step: 1.1,
            base_tile_size: 512.0,
            max_tile_size: 16384.0,
            max_tiles: 16,
            tile_hysteresis_steps: 1,
            zoom_debounce_ms: 50,
            min_displayed_size: 1.0,
            rotation_snap_degrees: 15.0,
        }
    }
}

impl EditorConfig {
    /// Parse a configuration from JSON and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value is out of range.
    pub fn from_json(json: &str) -> CanvasResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is malformed, or holds
    /// out-of-range values.
    pub fn from_file(path: impl AsRef<Path>) -> CanvasResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        tracing::debug!("Loaded editor config from {}", path.as_ref().display());
        Self::from_json(&text)
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> CanvasResult<()> {
        let positive = [
            ("clickThresholdPx", self.click_threshold_px),
            ("panClampPx", self.pan_clamp_px),
            ("handleSizePx", self.handle_size_px),
            ("pointHitRadiusPx", self.point_hit_radius_px),
            ("mirrorEpsilon", self.mirror_epsilon),
            ("minZoom", self.min_zoom),
            ("maxZoom", self.max_zoom),
            ("baseTileSize", self.base_tile_size),
            ("maxTileSize", self.max_tile_size),
            ("minDisplayedSize", self.min_displayed_size),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(CanvasError::InvalidConfig(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        if !self.rotation_arm_px.is_finite() || self.rotation_arm_px < 0.0 {
            return Err(CanvasError::InvalidConfig(
                "rotationArmPx must not be negative".to_string(),
            ));
        }
        if !self.path_hit_tolerance_px.is_finite() || self.path_hit_tolerance_px < 0.0 {
            return Err(CanvasError::InvalidConfig(
                "pathHitTolerancePx must not be negative".to_string(),
            ));
        }
        if self.pan_smoothing_window == 0 {
            return Err(CanvasError::InvalidConfig(
                "panSmoothingWindow must be at least 1".to_string(),
            ));
        }
        if self.max_tiles == 0 {
            return Err(CanvasError::InvalidConfig(
                "maxTiles must be at least 1".to_string(),
            ));
        }
        if self.min_zoom >= self.max_zoom {
            return Err(CanvasError::InvalidConfig(format!(
                "minZoom ({}) must be below maxZoom ({})",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.max_zoom <= ZOOM_EPSILON {
            return Err(CanvasError::InvalidConfig(format!(
                "maxZoom ({}) must exceed the zoom floor {ZOOM_EPSILON}",
                self.max_zoom
            )));
        }
        if self.base_tile_size > self.max_tile_size {
            return Err(CanvasError::InvalidConfig(format!(
                "baseTileSize ({}) exceeds maxTileSize ({})",
                self.base_tile_size, self.max_tile_size
            )));
        }
        if !self.wheel_zoom_step.is_finite() || self.wheel_zoom_step <= 1.0 {
            return Err(CanvasError::InvalidConfig(
                "wheelZoomStep must be greater than 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The zoom debounce window as a [`Duration`].
    #[must_use]
    pub const fn zoom_debounce(&self) -> Duration {
        Duration::from_millis(self.zoom_debounce_ms)
    }
}
