//! Canvas and item state store.
//!
//! The store owns every canvas, the ordered items on each, and the current
//! selection. Rendering layers do not diff the store: every structural
//! mutation bumps [`CanvasStore::revision`] and emits a [`StoreEvent`] to the
//! registered observers, which re-render the affected canvases.
//!
//! Lookups that miss (unknown canvas, unknown item) are not errors. Mutations
//! report them as [`Skip`] and leave the store untouched.

use gd_core::id::{CanvasId, ItemId};
use gd_core::model::{Canvas, GridPosition, Item, Selection};
use gd_core::outcome::{Outcome, Skip};
use std::collections::HashMap;

/// Handle returned by [`CanvasStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// What changed in a structural mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreChange {
    CanvasAdded {
        canvas: CanvasId,
    },
    ItemAdded {
        canvas: CanvasId,
        item: ItemId,
    },
    ItemRemoved {
        canvas: CanvasId,
        item: ItemId,
        /// The removed item was selected; the selection is now empty.
        selection_cleared: bool,
    },
    ItemMoved {
        item: ItemId,
        from: CanvasId,
        to: CanvasId,
    },
    SelectionChanged,
}

/// Notification delivered to observers after a mutation completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreEvent {
    pub revision: u64,
    pub change: StoreChange,
}

/// Where an inserted item goes in its canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    End,
    /// At this index if it is within `0..=len`, otherwise at the end.
    At(usize),
}

/// An item taken out of a canvas, with the index it occupied.
#[derive(Debug, Clone, PartialEq)]
pub struct Removed {
    pub index: usize,
    pub item: Item,
}

/// Result of a successful [`CanvasStore::move_item`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Moved {
    /// Index in the source canvas, read before removal.
    pub source_index: usize,
    /// Index in the target canvas after insertion.
    pub target_index: usize,
    /// The requested `Placement::At` index was out of bounds.
    pub fell_back: bool,
}

type Observer = Box<dyn FnMut(&StoreEvent)>;

/// Owner of all canvases and the selection for one editing session.
#[derive(Default)]
pub struct CanvasStore {
    canvases: HashMap<CanvasId, Canvas>,
    /// Canvas ids in insertion order.
    order: Vec<CanvasId>,
    selection: Selection,
    revision: u64,
    observers: Vec<(ObserverId, Observer)>,
    next_observer: u64,
}

impl CanvasStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `canvases`, without notifying.
    pub fn from_canvases(canvases: impl IntoIterator<Item = Canvas>) -> Self {
        let mut store = Self::new();
        for canvas in canvases {
            store.put_canvas(canvas);
        }
        store
    }

    // ─── Observers ───────────────────────────────────────────────────────

    /// Register a callback invoked after every structural mutation.
    pub fn subscribe(&mut self, observer: impl FnMut(&StoreEvent) + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(oid, _)| *oid != id);
        self.observers.len() != before
    }

    /// Bumped once per structural mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn emit(&mut self, change: StoreChange) {
        self.revision += 1;
        let event = StoreEvent {
            revision: self.revision,
            change,
        };
        log::debug!("store r{}: {:?}", event.revision, change);
        for (_, observer) in &mut self.observers {
            observer(&event);
        }
    }

    // ─── Reads ───────────────────────────────────────────────────────────

    pub fn canvas(&self, id: CanvasId) -> Option<&Canvas> {
        self.canvases.get(&id)
    }

    pub fn canvas_ids(&self) -> &[CanvasId] {
        &self.order
    }

    /// Canvases in insertion order.
    pub fn canvases(&self) -> impl Iterator<Item = &Canvas> {
        self.order.iter().filter_map(|id| self.canvases.get(id))
    }

    pub fn item(&self, canvas: CanvasId, item: ItemId) -> Option<&Item> {
        self.canvas(canvas)?.get(item)
    }

    pub fn index_of(&self, canvas: CanvasId, item: ItemId) -> Option<usize> {
        self.canvas(canvas)?.index_of(item)
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    // ─── Canvases ────────────────────────────────────────────────────────

    fn put_canvas(&mut self, canvas: Canvas) {
        let id = canvas.id;
        if self.canvases.insert(id, canvas).is_none() {
            self.order.push(id);
        }
    }

    /// Add a canvas, replacing any canvas with the same id.
    pub fn add_canvas(&mut self, canvas: Canvas) {
        let id = canvas.id;
        self.put_canvas(canvas);
        self.emit(StoreChange::CanvasAdded { canvas: id });
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Select `item` on `canvas`. Skips if the item is not there.
    pub fn select(&mut self, canvas: CanvasId, item: ItemId) -> Outcome {
        if self.item(canvas, item).is_none() {
            return Outcome::Skipped(self.miss(canvas, item));
        }
        self.selection = Selection::of(canvas, item);
        self.emit(StoreChange::SelectionChanged);
        Outcome::Applied
    }

    pub fn clear_selection(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        self.selection = Selection::default();
        self.emit(StoreChange::SelectionChanged);
    }

    // ─── Structural mutations ────────────────────────────────────────────

    /// Append `item` to the end of `canvas`.
    pub fn push_item(&mut self, canvas: CanvasId, item: Item) -> Outcome {
        self.insert_item(canvas, Placement::End, item)
    }

    /// Insert `item` into `canvas`. An out-of-range index appends and
    /// reports [`Outcome::Appended`].
    pub fn insert_item(&mut self, canvas: CanvasId, placement: Placement, item: Item) -> Outcome {
        let id = item.id;
        let Ok((_, fell_back)) = self.attach(canvas, placement, item) else {
            return Outcome::Skipped(Skip::CanvasMissing(canvas));
        };
        self.emit(StoreChange::ItemAdded { canvas, item: id });
        if fell_back {
            Outcome::Appended
        } else {
            Outcome::Applied
        }
    }

    /// Remove `item` from `canvas`.
    ///
    /// If the removed item is the current selection, the selection is
    /// cleared in the same step, before any observer runs.
    pub fn remove_item(&mut self, canvas: CanvasId, item: ItemId) -> Result<Removed, Skip> {
        let removed = self.detach(canvas, item)?;
        let selection_cleared = self.selection.is(canvas, item);
        if selection_cleared {
            self.selection = Selection::default();
        }
        self.emit(StoreChange::ItemRemoved {
            canvas,
            item,
            selection_cleared,
        });
        Ok(removed)
    }

    /// Take `item` out of `from`, set its owner and desktop position, and
    /// place it in `to`.
    ///
    /// The source index is read before removal. Nothing changes if the item
    /// is not in `from` or `to` does not exist. Selection is preserved; a
    /// selected item stays selected on its new canvas.
    pub fn move_item(
        &mut self,
        item: ItemId,
        from: CanvasId,
        to: CanvasId,
        position: GridPosition,
        placement: Placement,
    ) -> Result<Moved, Skip> {
        let Removed {
            index: source_index,
            item: mut moving,
        } = self.detach(from, item)?;

        let (previous_owner, previous_layouts) = (moving.canvas_id, moving.layouts.clone());
        moving.canvas_id = to;
        moving.set_desktop_position(position);

        let (target_index, fell_back) = match self.attach(to, placement, moving) {
            Ok(placed) => placed,
            Err(mut rejected) => {
                rejected.canvas_id = previous_owner;
                rejected.layouts = previous_layouts;
                if let Err(lost) = self.attach(from, Placement::At(source_index), rejected) {
                    log::debug!("move {item}: {from} vanished, {} dropped", lost.id);
                }
                return Err(Skip::CanvasMissing(to));
            }
        };
        if self.selection.is(from, item) {
            self.selection.canvas_id = Some(to);
        }
        self.emit(StoreChange::ItemMoved { item, from, to });
        Ok(Moved {
            source_index,
            target_index,
            fell_back,
        })
    }

    fn detach(&mut self, canvas: CanvasId, item: ItemId) -> Result<Removed, Skip> {
        let items = &mut self
            .canvases
            .get_mut(&canvas)
            .ok_or(Skip::CanvasMissing(canvas))?
            .items;
        let index = items
            .iter()
            .position(|i| i.id == item)
            .ok_or(Skip::ItemMissing { canvas, item })?;
        Ok(Removed {
            index,
            item: items.remove(index),
        })
    }

    /// Returns the final index and whether a `Placement::At` fell back, or
    /// hands the item back if the canvas does not exist.
    fn attach(
        &mut self,
        canvas: CanvasId,
        placement: Placement,
        item: Item,
    ) -> Result<(usize, bool), Item> {
        let Some(target) = self.canvases.get_mut(&canvas) else {
            return Err(item);
        };
        let items = &mut target.items;
        Ok(match placement {
            Placement::At(index) if index <= items.len() => {
                items.insert(index, item);
                (index, false)
            }
            Placement::At(_) => {
                items.push(item);
                (items.len() - 1, true)
            }
            Placement::End => {
                items.push(item);
                (items.len() - 1, false)
            }
        })
    }

    fn miss(&self, canvas: CanvasId, item: ItemId) -> Skip {
        if self.canvases.contains_key(&canvas) {
            Skip::ItemMissing { canvas, item }
        } else {
            Skip::CanvasMissing(canvas)
        }
    }
}
