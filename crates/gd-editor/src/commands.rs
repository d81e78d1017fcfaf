//! Undo/Redo command history.
//!
//! A command is created right after the user's action has already mutated
//! the store, and records enough of the resulting state to reverse or
//! reapply it. Commands hold their own snapshots and never borrow into the
//! store: every `undo()`/`redo()` looks canvases and items up by id at the
//! moment it runs, so edits made between push and replay cannot corrupt the
//! recorded data.
//!
//! Replays that find their canvas or item gone do nothing and report
//! [`Outcome::Skipped`].
//!
//! Resizes are not recorded. There is no resize command.

use crate::store::{CanvasStore, Placement, Removed};
use gd_core::id::{CanvasId, ItemId};
use gd_core::model::{GridPosition, Item};
use gd_core::outcome::{Outcome, Skip};

/// A reversible record of one store mutation.
pub trait Command {
    /// Reverse the recorded mutation.
    fn undo(&self, store: &mut CanvasStore) -> Outcome;

    /// Reapply the recorded mutation.
    fn redo(&self, store: &mut CanvasStore) -> Outcome;

    /// Human-readable label for menus and tooltips.
    fn description(&self) -> String;
}

fn removal(result: Result<Removed, Skip>) -> Outcome {
    match result {
        Ok(_) => Outcome::Applied,
        Err(skip) => Outcome::Skipped(skip),
    }
}

// ─── Add ─────────────────────────────────────────────────────────────────

/// An item was appended to a canvas.
#[derive(Debug, Clone)]
pub struct AddItemCommand {
    canvas: CanvasId,
    item: Item,
}

impl AddItemCommand {
    pub fn new(canvas: CanvasId, item: &Item) -> Self {
        Self {
            canvas,
            item: item.snapshot(),
        }
    }
}

impl Command for AddItemCommand {
    fn undo(&self, store: &mut CanvasStore) -> Outcome {
        removal(store.remove_item(self.canvas, self.item.id))
    }

    /// Always appends: an added item has no earlier position to return to.
    fn redo(&self, store: &mut CanvasStore) -> Outcome {
        store.push_item(self.canvas, self.item.snapshot())
    }

    fn description(&self) -> String {
        format!("Add {}", self.item.id)
    }
}

// ─── Delete ──────────────────────────────────────────────────────────────

/// An item was removed from a canvas at `index`.
#[derive(Debug, Clone)]
pub struct DeleteItemCommand {
    canvas: CanvasId,
    item: Item,
    index: usize,
}

impl DeleteItemCommand {
    pub fn new(canvas: CanvasId, item: &Item, index: usize) -> Self {
        Self {
            canvas,
            item: item.snapshot(),
            index,
        }
    }
}

impl Command for DeleteItemCommand {
    /// Reinsert at the recorded index, or at the end if the canvas has
    /// shrunk below it.
    fn undo(&self, store: &mut CanvasStore) -> Outcome {
        store.insert_item(self.canvas, Placement::At(self.index), self.item.snapshot())
    }

    fn redo(&self, store: &mut CanvasStore) -> Outcome {
        removal(store.remove_item(self.canvas, self.item.id))
    }

    fn description(&self) -> String {
        format!("Delete {}", self.item.id)
    }
}

// ─── Move ────────────────────────────────────────────────────────────────

/// An item was dragged from one canvas position to another, possibly
/// across canvases.
#[derive(Debug, Clone)]
pub struct MoveItemCommand {
    item: ItemId,
    source_canvas: CanvasId,
    target_canvas: CanvasId,
    source_position: GridPosition,
    target_position: GridPosition,
    /// Index in the source canvas, captured before the item left it.
    source_index: usize,
}

impl MoveItemCommand {
    pub fn new(
        item: ItemId,
        source_canvas: CanvasId,
        target_canvas: CanvasId,
        source_position: GridPosition,
        target_position: GridPosition,
        source_index: usize,
    ) -> Self {
        Self {
            item,
            source_canvas,
            target_canvas,
            source_position,
            target_position,
            source_index,
        }
    }
}

impl Command for MoveItemCommand {
    fn undo(&self, store: &mut CanvasStore) -> Outcome {
        match store.move_item(
            self.item,
            self.target_canvas,
            self.source_canvas,
            self.source_position,
            Placement::At(self.source_index),
        ) {
            Ok(moved) if moved.fell_back => Outcome::Appended,
            Ok(_) => Outcome::Applied,
            Err(skip) => Outcome::Skipped(skip),
        }
    }

    /// Appends on the target canvas, or returns to the recorded index when
    /// the move stayed on one canvas.
    fn redo(&self, store: &mut CanvasStore) -> Outcome {
        let placement = if self.source_canvas == self.target_canvas {
            Placement::At(self.source_index)
        } else {
            Placement::End
        };
        match store.move_item(
            self.item,
            self.source_canvas,
            self.target_canvas,
            self.target_position,
            placement,
        ) {
            Ok(_) => Outcome::Applied,
            Err(skip) => Outcome::Skipped(skip),
        }
    }

    fn description(&self) -> String {
        if self.source_canvas == self.target_canvas {
            format!("Move {}", self.item)
        } else {
            format!("Move {} to {}", self.item, self.target_canvas)
        }
    }
}

// ─── History ─────────────────────────────────────────────────────────────

/// What an undo or redo step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replay {
    pub description: String,
    pub outcome: Outcome,
}

/// Linear undo/redo stacks.
pub struct History {
    undo_stack: Vec<Box<dyn Command>>,
    redo_stack: Vec<Box<dyn Command>>,
    /// Maximum undo depth.
    max_depth: usize,
}

impl History {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::with_capacity(max_depth.min(256)),
            redo_stack: Vec::new(),
            max_depth,
        }
    }

    /// Record a command whose mutation has already been applied.
    /// Discards the redo branch and evicts the oldest entry beyond capacity.
    pub fn push(&mut self, command: Box<dyn Command>) {
        log::debug!("history push: {}", command.description());
        self.undo_stack.push(command);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }

        // Clear redo stack on new action
        self.redo_stack.clear();
    }

    /// Undo the most recent command. `None` if there is nothing to undo.
    pub fn undo(&mut self, store: &mut CanvasStore) -> Option<Replay> {
        let command = self.undo_stack.pop()?;
        let outcome = command.undo(store);
        let description = command.description();
        log::debug!("undo {description}: {outcome:?}");
        self.redo_stack.push(command);
        Some(Replay {
            description,
            outcome,
        })
    }

    /// Redo the most recently undone command. `None` if there is nothing
    /// to redo.
    pub fn redo(&mut self, store: &mut CanvasStore) -> Option<Replay> {
        let command = self.redo_stack.pop()?;
        let outcome = command.redo(store);
        let description = command.description();
        log::debug!("redo {description}: {outcome:?}");
        self.undo_stack.push(command);
        Some(Replay {
            description,
            outcome,
        })
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_description(&self) -> Option<String> {
        self.undo_stack.last().map(|c| c.description())
    }

    pub fn redo_description(&self) -> Option<String> {
        self.redo_stack.last().map(|c| c.description())
    }

    /// Number of undoable steps.
    pub fn len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
