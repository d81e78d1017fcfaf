//! Grid ↔ pixel coordinate transforms.
//!
//! The two axes follow different rules:
//!
//! - **Horizontal** is responsive. One unit is a fixed fraction of the
//!   canvas container's width (2% by default), so converting needs a width
//!   reading from the host. Readings are cached per `(canvas, axis)` and the
//!   cache never expires on its own: the host must call
//!   [`CoordinateEngine::clear_grid_size_cache`] whenever a container width
//!   may have changed.
//! - **Vertical** is fixed at 20 pixels per unit for every canvas and needs
//!   no cache.
//!
//! All rounding is half-away-from-zero (`f64::round`) in both directions, so
//! converting an exact unit boundary to pixels and back yields the same
//! unit. Arbitrary pixel values snap to the nearest unit.
//!
//! Pixel results are `i64`: any `i32` unit count times the unit size fits,
//! so large inputs from the host never overflow.

use crate::config::GridConfig;
use crate::id::CanvasId;
use crate::locator::{ContainerHandle, ElementLocator, ElementResolver};
use crate::model::{Axis, GridPosition, LayoutRect};
use crate::outcome::{Conversion, DegradeReason, UnitSize};
use kurbo::{Point, Rect};
use std::collections::HashMap;

/// Converts between grid units and pixels for every canvas.
pub struct CoordinateEngine<R: ElementResolver> {
    config: GridConfig,
    locator: ElementLocator<R>,
    sizes: HashMap<(CanvasId, Axis), f64>,
}

impl<R: ElementResolver> CoordinateEngine<R> {
    pub fn new(resolver: R, config: GridConfig) -> Self {
        Self {
            config,
            locator: ElementLocator::new(resolver),
            sizes: HashMap::new(),
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn locator(&self) -> &ElementLocator<R> {
        &self.locator
    }

    pub fn locator_mut(&mut self) -> &mut ElementLocator<R> {
        &mut self.locator
    }

    // ─── Unit sizes ──────────────────────────────────────────────────────

    /// Pixels per horizontal unit for `canvas`.
    ///
    /// Served from the cache unless `force_recalc` is set or there is no
    /// entry yet; a fresh measurement replaces the cached value. An
    /// unresolvable container reads as 0 and leaves the cache untouched, so
    /// the next call measures again.
    pub fn horizontal_unit_size(&mut self, canvas: CanvasId, force_recalc: bool) -> UnitSize {
        let key = (canvas, Axis::Horizontal);
        if !force_recalc && let Some(&px) = self.sizes.get(&key) {
            return UnitSize::Cached(px);
        }

        let Some(container) = self.locator.resolve(canvas.as_str()) else {
            log::debug!("grid size: container {canvas} not resolvable");
            return UnitSize::Unresolved;
        };

        let px = container.content_width() * self.config.horizontal_unit_ratio;
        log::debug!("grid size: {canvas} = {px}px per unit");
        self.sizes.insert(key, px);
        UnitSize::Measured(px)
    }

    /// Pixels per vertical unit. Identical for every canvas.
    pub fn vertical_unit_size(&self) -> i32 {
        self.config.vertical_unit_px
    }

    /// Drop all cached unit sizes. Call on any event that may change a
    /// container's width.
    pub fn clear_grid_size_cache(&mut self) {
        log::debug!("grid size cache cleared ({} entries)", self.sizes.len());
        self.sizes.clear();
    }

    /// Drop the cached unit sizes of a single canvas.
    pub fn invalidate_canvas(&mut self, canvas: CanvasId) {
        self.sizes.retain(|(id, _), _| *id != canvas);
    }

    // ─── Conversions ─────────────────────────────────────────────────────

    /// `round(units * unit_size)`. Degrades to 0 without a usable width.
    pub fn grid_to_pixels_x(&mut self, units: i32, canvas: CanvasId) -> Conversion<i64> {
        self.scale_x(i64::from(units), canvas)
    }

    /// `units * 20`, exactly.
    pub fn grid_to_pixels_y(&self, units: i32) -> i64 {
        self.scale_y(i64::from(units))
    }

    fn scale_x(&mut self, units: i64, canvas: CanvasId) -> Conversion<i64> {
        let size = self.horizontal_unit_size(canvas, false);
        match degrade_reason(size) {
            Some(reason) => Conversion::Degraded(0, reason),
            None => Conversion::Exact((units as f64 * size.px()).round() as i64),
        }
    }

    fn scale_y(&self, units: i64) -> i64 {
        units * i64::from(self.config.vertical_unit_px)
    }

    /// `round(pixels / unit_size)`. Degrades to 0 instead of dividing by a
    /// zero unit size.
    pub fn pixels_to_grid_x(&mut self, pixels: f64, canvas: CanvasId) -> Conversion<i32> {
        let size = self.horizontal_unit_size(canvas, false);
        match degrade_reason(size) {
            Some(reason) => Conversion::Degraded(0, reason),
            None => Conversion::Exact((pixels / size.px()).round() as i32),
        }
    }

    /// `round(pixels / 20)`.
    pub fn pixels_to_grid_y(&self, pixels: f64) -> i32 {
        (pixels / f64::from(self.config.vertical_unit_px)).round() as i32
    }

    // ─── Geometry helpers ────────────────────────────────────────────────

    /// Snap a container-relative pixel point to the nearest grid position.
    /// Degrades with `x = 0` when the horizontal axis cannot be measured; the
    /// vertical axis is always exact.
    pub fn snap_point(&mut self, point: Point, canvas: CanvasId) -> Conversion<GridPosition> {
        let x = self.pixels_to_grid_x(point.x, canvas);
        let pos = GridPosition::new(x.value(), self.pixels_to_grid_y(point.y));
        match x.degrade_reason() {
            Some(reason) => Conversion::Degraded(pos, reason),
            None => Conversion::Exact(pos),
        }
    }

    /// Pixel rectangle of a layout, relative to the canvas container.
    pub fn layout_pixel_rect(&mut self, rect: &LayoutRect, canvas: CanvasId) -> Conversion<Rect> {
        // Far edges are summed in i64 so `x + w` cannot overflow.
        let x0 = self.scale_x(i64::from(rect.x), canvas);
        let x1 = self.scale_x(i64::from(rect.x) + i64::from(rect.w), canvas);
        let y0 = self.scale_y(i64::from(rect.y));
        let y1 = self.scale_y(i64::from(rect.y) + i64::from(rect.h));
        let px = Rect::new(
            x0.value() as f64,
            y0 as f64,
            x1.value() as f64,
            y1 as f64,
        );
        match x0.degrade_reason() {
            Some(reason) => Conversion::Degraded(px, reason),
            None => Conversion::Exact(px),
        }
    }
}

fn degrade_reason(size: UnitSize) -> Option<DegradeReason> {
    match size {
        UnitSize::Unresolved => Some(DegradeReason::ContainerUnresolved),
        _ if size.px() == 0.0 => Some(DegradeReason::ZeroWidth),
        _ => None,
    }
}
