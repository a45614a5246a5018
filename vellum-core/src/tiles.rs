//! Adaptive render tiling.
//!
//! The visible canvas area is partitioned into square tiles whose size
//! doubles until the tile count fits under a cap, so the renderer never
//! holds more than `max_tiles` draw targets at any zoom. A previously used
//! larger size is kept (hysteresis) while it still fits, and recomputes
//! caused only by zooming are debounced.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::geometry::Point;
use crate::mapper::Viewport;

/// A square render region in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    /// Center x.
    pub center_x: f64,
    /// Center y.
    pub center_y: f64,
    /// Edge length.
    pub size: f64,
}

impl Tile {
    /// Tile center.
    #[must_use]
    pub const fn center(&self) -> Point {
        Point::new(self.center_x, self.center_y)
    }
}

/// Tiling limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilingConfig {
    /// Starting edge length.
    pub base_size: f64,
    /// Hard ceiling for the edge length.
    pub max_size: f64,
    /// Maximum number of tiles emitted.
    pub max_tiles: usize,
    /// Doublings a previous size may sit above the new one and still be kept.
    pub hysteresis_steps: u32,
}

impl Default for TilingConfig {
    fn default() -> Self {
        Self::from(&EditorConfig::default())
    }
}

impl From<&EditorConfig> for TilingConfig {
    fn from(config: &EditorConfig) -> Self {
        Self {
            base_size: config.base_tile_size,
            max_size: config.max_tile_size,
            max_tiles: config.max_tiles,
            hysteresis_steps: config.tile_hysteresis_steps,
        }
    }
}

/// Worst-case number of tiles of edge `size` covering an arbitrarily
/// aligned `width` x `height` region.
#[must_use]
pub fn tile_count(width: f64, height: f64, size: f64) -> f64 {
    ((width / size).ceil() + 1.0) * ((height / size).ceil() + 1.0)
}

/// Smallest power-of-two multiple of `base_size` (capped at `max_size`)
/// whose worst-case tile count fits under `max_tiles`.
#[must_use]
pub fn tile_size_for(width: f64, height: f64, config: &TilingConfig) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let cap = config.max_tiles as f64;
    let mut size = config.base_size;
    while tile_count(width, height, size) > cap && size < config.max_size {
        size = (size * 2.0).min(config.max_size);
    }
    size
}

/// Whether the viewport can be tiled at all.
fn is_tileable(viewport: &Viewport) -> bool {
    viewport.has_area()
        && viewport.zoom.is_finite()
        && viewport.offset_x.is_finite()
        && viewport.offset_y.is_finite()
}

/// Largest tile grid index, in tile units from the canvas origin.
/// Keeps index arithmetic far from `i64` overflow.
#[allow(clippy::cast_precision_loss)]
const MAX_GRID_INDEX: f64 = (1_i64 << 52) as f64;

/// Tiles of edge `size` overlapping the visible canvas rectangle, in
/// row-major order. When even that exceeds `max_tiles`, only the tiles
/// nearest the view center are kept.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn compute_tiles(viewport: &Viewport, size: f64, max_tiles: usize) -> Vec<Tile> {
    if !is_tileable(viewport) || !size.is_finite() || size <= 0.0 {
        return Vec::new();
    }
    let visible = viewport.visible_canvas_rect();
    let extent = [visible.x, visible.y, visible.right(), visible.bottom()];
    if extent.iter().any(|edge| !(edge / size).is_finite() || (edge / size).abs() > MAX_GRID_INDEX) {
        tracing::debug!("Visible area {visible:?} is beyond the tile grid");
        return Vec::new();
    }
    let first_x = (visible.x / size).floor() as i64;
    let first_y = (visible.y / size).floor() as i64;
    let last_x = ((visible.right() / size).ceil() as i64 - 1).max(first_x);
    let last_y = ((visible.bottom() / size).ceil() as i64 - 1).max(first_y);

    let tile_at = |ix: i64, iy: i64| {
        #[allow(clippy::cast_precision_loss)]
        let (fx, fy) = (ix as f64, iy as f64);
        Tile {
            center_x: (fx + 0.5) * size,
            center_y: (fy + 0.5) * size,
            size,
        }
    };

    let columns = last_x - first_x + 1;
    let rows = last_y - first_y + 1;
    if columns.saturating_mul(rows) <= max_tiles as i64 {
        return (first_y..=last_y)
            .flat_map(|iy| (first_x..=last_x).map(move |ix| (ix, iy)))
            .map(|(ix, iy)| tile_at(ix, iy))
            .collect();
    }

    // Over the cap even at the largest size: keep the ring around the center.
    tracing::debug!("Visible area needs {columns}x{rows} tiles, keeping the nearest {max_tiles}");
    let center = visible.center();
    let cx = (center.x / size).floor() as i64;
    let cy = (center.y / size).floor() as i64;
    let reach = (max_tiles as i64).max(1);
    let mut candidates: Vec<(i64, i64)> = ((cy - reach).max(first_y)..=(cy + reach).min(last_y))
        .flat_map(|iy| ((cx - reach).max(first_x)..=(cx + reach).min(last_x)).map(move |ix| (ix, iy)))
        .collect();
    candidates.sort_by(|a, b| {
        let da = tile_at(a.0, a.1).center().distance_to(center);
        let db = tile_at(b.0, b.1).center().distance_to(center);
        da.total_cmp(&db)
    });
    candidates.truncate(max_tiles);
    candidates.sort_by_key(|&(ix, iy)| (iy, ix));
    candidates.into_iter().map(|(ix, iy)| tile_at(ix, iy)).collect()
}

/// A restartable single-shot deadline.
///
/// Time is passed in by the caller, which keeps the debounce deterministic
/// under a virtual clock.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    /// Create an idle debouncer.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// (Re)start the timer from `now`.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Drop any pending deadline.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Pending deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether a deadline is pending.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Consume the deadline if it has passed.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Keeps the current tile set and decides when to rebuild it.
#[derive(Debug, Clone)]
pub struct TileManager {
    config: TilingConfig,
    tile_size: Option<f64>,
    tiles: Vec<Tile>,
    debounce: Debouncer,
    pending: Option<Viewport>,
}

impl TileManager {
    /// Create a manager with no tiles yet.
    #[must_use]
    pub const fn new(config: TilingConfig, debounce: Duration) -> Self {
        Self {
            config,
            tile_size: None,
            tiles: Vec::new(),
            debounce: Debouncer::new(debounce),
            pending: None,
        }
    }

    /// Create a manager from editor configuration.
    #[must_use]
    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(TilingConfig::from(config), config.zoom_debounce())
    }

    /// Current tiles.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Edge length of the current tiles.
    #[must_use]
    pub const fn tile_size(&self) -> Option<f64> {
        self.tile_size
    }

    /// When a debounced recompute will fire.
    #[must_use]
    pub const fn next_deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    /// Rebuild immediately (viewport size or offset changed). Cancels any
    /// pending zoom recompute, which this one supersedes.
    pub fn viewport_changed(&mut self, viewport: &Viewport) -> &[Tile] {
        self.debounce.cancel();
        self.pending = None;
        self.recompute(viewport);
        &self.tiles
    }

    /// Schedule a rebuild after the debounce delay. Only the viewport from
    /// the last call before the deadline is used.
    pub fn zoom_changed(&mut self, viewport: &Viewport, now: Instant) {
        self.pending = Some(*viewport);
        self.debounce.schedule(now);
    }

    /// Run a due debounced rebuild, returning the new tiles if one ran.
    pub fn poll(&mut self, now: Instant) -> Option<&[Tile]> {
        if !self.debounce.fire_if_due(now) {
            return None;
        }
        let viewport = self.pending.take()?;
        self.recompute(&viewport);
        Some(&self.tiles)
    }

    fn recompute(&mut self, viewport: &Viewport) {
        if !is_tileable(viewport) {
            tracing::debug!("Viewport {viewport:?} cannot be tiled");
            self.tiles.clear();
            return;
        }
        let visible = viewport.visible_canvas_rect();
        let computed = tile_size_for(visible.width, visible.height, &self.config);
        let size = match self.tile_size {
            Some(previous) if self.keeps_previous(previous, computed, visible.width, visible.height) => previous,
            _ => computed,
        };
        if self.tile_size != Some(size) {
            tracing::debug!("Tile size {size} for zoom {}", viewport.zoom);
        }
        self.tile_size = Some(size);
        self.tiles = compute_tiles(viewport, size, self.config.max_tiles);
    }

    fn keeps_previous(&self, previous: f64, computed: f64, width: f64, height: f64) -> bool {
        #[allow(clippy::cast_precision_loss)]
        let cap = self.config.max_tiles as f64;
        let ceiling = computed * f64::from(2_u32.saturating_pow(self.config.hysteresis_steps));
        previous > computed && previous <= ceiling && tile_count(width, height, previous) <= cap
    }
}
