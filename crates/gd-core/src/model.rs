//! Canvas and item data model.
//!
//! A canvas is a named surface holding an ordered list of items. Order is
//! significant: it is the stacking order and the position an item returns to
//! when a delete or move is undone.
//!
//! Item positions are expressed in grid units. Each item carries one layout
//! rectangle per viewport; only the desktop layout's `x`/`y` are touched by
//! drag-and-drop moves.

use crate::id::{CanvasId, ItemId};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ─── Geometry ────────────────────────────────────────────────────────────

/// A position on the grid, in grid units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A layout rectangle in grid units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl LayoutRect {
    pub fn position(&self) -> GridPosition {
        GridPosition::new(self.x, self.y)
    }
}

/// Breakpoints an item can carry a layout for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Viewport {
    Desktop,
    Tablet,
    Mobile,
}

/// Layout of an item for a single viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportLayout {
    pub viewport: Viewport,
    #[serde(flatten)]
    pub rect: LayoutRect,
}

// ─── Items & Canvases ────────────────────────────────────────────────────

/// A positioned entity placed on a canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    /// Owning canvas. Rewritten when the item moves across canvases.
    pub canvas_id: CanvasId,
    #[serde(default)]
    pub layouts: SmallVec<[ViewportLayout; 3]>,
    /// Widget data. Never inspected by the grid engine.
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Item {
    pub fn new(id: ItemId, canvas_id: CanvasId) -> Self {
        Self {
            id,
            canvas_id,
            layouts: SmallVec::new(),
            payload: serde_json::Value::Null,
        }
    }

    /// Builder: set the layout rectangle for `viewport`.
    pub fn with_layout(mut self, viewport: Viewport, rect: LayoutRect) -> Self {
        self.set_layout(viewport, rect);
        self
    }

    /// Builder: attach widget payload.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    pub fn layout(&self, viewport: Viewport) -> Option<&LayoutRect> {
        self.layouts
            .iter()
            .find(|l| l.viewport == viewport)
            .map(|l| &l.rect)
    }

    pub fn layout_mut(&mut self, viewport: Viewport) -> Option<&mut LayoutRect> {
        self.layouts
            .iter_mut()
            .find(|l| l.viewport == viewport)
            .map(|l| &mut l.rect)
    }

    pub fn set_layout(&mut self, viewport: Viewport, rect: LayoutRect) {
        match self.layout_mut(viewport) {
            Some(existing) => *existing = rect,
            None => self.layouts.push(ViewportLayout { viewport, rect }),
        }
    }

    /// Desktop position, if the item has a desktop layout.
    pub fn desktop_position(&self) -> Option<GridPosition> {
        self.layout(Viewport::Desktop).map(LayoutRect::position)
    }

    /// Overwrite the desktop `x`/`y`. An item without a desktop layout gets a
    /// zero-sized one at `pos`; width and height are otherwise preserved.
    pub fn set_desktop_position(&mut self, pos: GridPosition) {
        match self.layout_mut(Viewport::Desktop) {
            Some(rect) => {
                rect.x = pos.x;
                rect.y = pos.y;
            }
            None => self.layouts.push(ViewportLayout {
                viewport: Viewport::Desktop,
                rect: LayoutRect {
                    x: pos.x,
                    y: pos.y,
                    w: 0,
                    h: 0,
                },
            }),
        }
    }

    /// Independent deep copy of this item.
    ///
    /// Commands hold snapshots taken through this method and never share
    /// storage with the live store, so each replay starts from fresh data.
    pub fn snapshot(&self) -> Item {
        Item {
            id: self.id,
            canvas_id: self.canvas_id,
            layouts: self.layouts.iter().copied().collect(),
            payload: self.payload.clone(),
        }
    }
}

/// A named surface holding an ordered sequence of items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub id: CanvasId,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Canvas {
    pub fn new(id: CanvasId) -> Self {
        Self {
            id,
            items: Vec::new(),
        }
    }

    pub fn with_items(id: CanvasId, items: Vec<Item>) -> Self {
        Self { id, items }
    }

    pub fn index_of(&self, item: ItemId) -> Option<usize> {
        self.items.iter().position(|i| i.id == item)
    }

    pub fn get(&self, item: ItemId) -> Option<&Item> {
        self.items.iter().find(|i| i.id == item)
    }

    pub fn get_mut(&mut self, item: ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.id == item)
    }

    pub fn item_ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|i| i.id).collect()
    }
}

/// The currently selected item, if any. Both halves are set and cleared
/// together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub item_id: Option<ItemId>,
    pub canvas_id: Option<CanvasId>,
}

impl Selection {
    pub fn of(canvas: CanvasId, item: ItemId) -> Self {
        Self {
            item_id: Some(item),
            canvas_id: Some(canvas),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.item_id.is_none() && self.canvas_id.is_none()
    }

    pub fn is(&self, canvas: CanvasId, item: ItemId) -> bool {
        self.item_id == Some(item) && self.canvas_id == Some(canvas)
    }
}

/// Axis of the grid. Horizontal units scale with the container, vertical
/// units are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}
