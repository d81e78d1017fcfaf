//! Drag-and-drop sessions.
//!
//! A session starts on pointer-down over an item and tracks a snapped grid
//! preview while the pointer moves. Nothing in the store changes until the
//! drop; a cancelled session leaves no trace in the store or the history.
//!
//! The recorded move carries the index the item held in its source canvas
//! at the moment it left, so undo puts it back in the same slot.

use gd_core::id::{CanvasId, ItemId};
use gd_core::model::GridPosition;
use gd_core::{CoordinateEngine, ElementResolver, Point, Vec2};

/// An in-progress drag of one item.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub item: ItemId,
    pub source_canvas: CanvasId,
    pub source_index: usize,
    /// Desktop position when the drag started.
    pub origin: GridPosition,
    /// Pointer offset from the item's top-left corner, in pixels.
    grab_offset: Vec2,
    target_canvas: CanvasId,
    preview: GridPosition,
}

impl DragSession {
    /// Start dragging `item` from `source_canvas`, grabbed at `pointer`
    /// (container-relative pixels).
    pub fn begin<R: ElementResolver>(
        engine: &mut CoordinateEngine<R>,
        item: ItemId,
        source_canvas: CanvasId,
        source_index: usize,
        origin: GridPosition,
        pointer: Point,
    ) -> Self {
        let corner = Point::new(
            engine.grid_to_pixels_x(origin.x, source_canvas).value() as f64,
            engine.grid_to_pixels_y(origin.y) as f64,
        );
        Self {
            item,
            source_canvas,
            source_index,
            origin,
            grab_offset: pointer - corner,
            target_canvas: source_canvas,
            preview: origin,
        }
    }

    /// Track the pointer over `canvas` and return the snapped preview.
    ///
    /// Positions are clamped to the non-negative quadrant. If the canvas
    /// cannot be measured the preview keeps its last value rather than
    /// jumping to column 0.
    pub fn update<R: ElementResolver>(
        &mut self,
        engine: &mut CoordinateEngine<R>,
        canvas: CanvasId,
        pointer: Point,
    ) -> GridPosition {
        let snapped = engine.snap_point(pointer - self.grab_offset, canvas);
        if snapped.is_degraded() {
            log::debug!("drag {}: {canvas} not measurable, preview held", self.item);
            return self.preview;
        }
        let pos = snapped.value();
        self.target_canvas = canvas;
        self.preview = GridPosition::new(pos.x.max(0), pos.y.max(0));
        self.preview
    }

    pub fn target_canvas(&self) -> CanvasId {
        self.target_canvas
    }

    pub fn preview(&self) -> GridPosition {
        self.preview
    }

    /// Dropping here would leave the item exactly where it started.
    pub fn is_noop(&self) -> bool {
        self.target_canvas == self.source_canvas && self.preview == self.origin
    }
}
