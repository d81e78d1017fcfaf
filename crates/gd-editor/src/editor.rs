//! Grid editor session.
//!
//! `GridEditor` is the one object a host constructs per editing session. It
//! owns the canvas store, the coordinate engine (with its size and element
//! caches), the undo history, and the active drag. Every user action goes
//! through it: the action mutates the store first, then the matching
//! command is recorded from the resulting state.
//!
//! All of this runs on the host's event loop. Observers registered on the
//! store must not call back into the editor.

use crate::commands::{AddItemCommand, DeleteItemCommand, History, MoveItemCommand, Replay};
use crate::drag::DragSession;
use crate::shortcuts::ShortcutAction;
use crate::store::{CanvasStore, ObserverId, Placement, StoreEvent};
use gd_core::id::{CanvasId, ItemId};
use gd_core::model::{Canvas, GridPosition, Item, Selection, Viewport};
use gd_core::outcome::{Conversion, Outcome, Skip};
use gd_core::{CoordinateEngine, ElementResolver, GridConfig, Point, Rect};

pub struct GridEditor<R: ElementResolver> {
    store: CanvasStore,
    engine: CoordinateEngine<R>,
    history: History,
    drag: Option<DragSession>,
}

impl<R: ElementResolver> GridEditor<R> {
    pub fn new(resolver: R, config: GridConfig) -> Self {
        Self::with_canvases(resolver, config, Vec::new())
    }

    pub fn with_canvases(
        resolver: R,
        config: GridConfig,
        canvases: impl IntoIterator<Item = Canvas>,
    ) -> Self {
        let history = History::new(config.history_depth);
        Self {
            store: CanvasStore::from_canvases(canvases),
            engine: CoordinateEngine::new(resolver, config),
            history,
            drag: None,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn store(&self) -> &CanvasStore {
        &self.store
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn engine(&self) -> &CoordinateEngine<R> {
        &self.engine
    }

    /// Mutable engine access for grid/pixel conversions.
    pub fn engine_mut(&mut self) -> &mut CoordinateEngine<R> {
        &mut self.engine
    }

    pub fn selection(&self) -> Selection {
        self.store.selection()
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&StoreEvent) + 'static) -> ObserverId {
        self.store.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Register a canvas created by the authoring layer. Not undoable.
    pub fn add_canvas(&mut self, canvas: Canvas) {
        self.store.add_canvas(canvas);
    }

    // ─── Host signals ────────────────────────────────────────────────────

    /// A container width may have changed.
    pub fn handle_resize(&mut self) {
        self.engine.clear_grid_size_cache();
    }

    /// An element was removed or replaced in the host tree.
    pub fn invalidate_element(&mut self, id: &str) {
        self.engine.locator_mut().invalidate(id);
        self.engine.invalidate_canvas(CanvasId::intern(id));
    }

    // ─── Item actions ────────────────────────────────────────────────────

    /// Append `item` to `canvas` and record it.
    pub fn add_item(&mut self, canvas: CanvasId, mut item: Item) -> Outcome {
        item.canvas_id = canvas;
        let command = AddItemCommand::new(canvas, &item);
        let outcome = self.store.push_item(canvas, item);
        if outcome.changed() {
            self.history.push(Box::new(command));
        }
        outcome
    }

    /// Remove `item` from `canvas` and record it with its index.
    pub fn delete_item(&mut self, canvas: CanvasId, item: ItemId) -> Outcome {
        match self.store.remove_item(canvas, item) {
            Ok(removed) => {
                self.history.push(Box::new(DeleteItemCommand::new(
                    canvas,
                    &removed.item,
                    removed.index,
                )));
                Outcome::Applied
            }
            Err(skip) => Outcome::Skipped(skip),
        }
    }

    /// Delete the selected item. `None` when nothing is selected.
    pub fn delete_selected(&mut self) -> Option<Outcome> {
        let Selection {
            item_id: Some(item),
            canvas_id: Some(canvas),
        } = self.store.selection()
        else {
            return None;
        };
        Some(self.delete_item(canvas, item))
    }

    pub fn select(&mut self, canvas: CanvasId, item: ItemId) -> Outcome {
        self.store.select(canvas, item)
    }

    pub fn clear_selection(&mut self) {
        self.store.clear_selection();
    }

    // ─── Drag and drop ───────────────────────────────────────────────────

    /// Pointer-down on `item`. Returns `false` if another drag is active
    /// or the item is not on `canvas`.
    pub fn begin_drag(&mut self, canvas: CanvasId, item: ItemId, pointer: Point) -> bool {
        if self.drag.is_some() {
            return false;
        }
        let Some(index) = self.store.index_of(canvas, item) else {
            return false;
        };
        let origin = self
            .store
            .item(canvas, item)
            .and_then(Item::desktop_position)
            .unwrap_or_default();
        self.drag = Some(DragSession::begin(
            &mut self.engine,
            item,
            canvas,
            index,
            origin,
            pointer,
        ));
        true
    }

    /// Pointer-move over `canvas`. Returns the snapped preview position.
    pub fn drag_to(&mut self, canvas: CanvasId, pointer: Point) -> Option<GridPosition> {
        let drag = self.drag.as_mut()?;
        Some(drag.update(&mut self.engine, canvas, pointer))
    }

    pub fn drag_session(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Pointer-up. Moves the item to the preview position and records the
    /// move. Returns `None` if no drag was active or the item would land
    /// where it started; neither records a command.
    ///
    /// A drop on another canvas appends the item there. A drop on its own
    /// canvas keeps its stacking index.
    pub fn drop_drag(&mut self) -> Option<Outcome> {
        let drag = self.drag.take()?;
        if drag.is_noop() {
            return None;
        }
        let target = drag.target_canvas();
        let position = drag.preview();
        let placement = if target == drag.source_canvas {
            self.store
                .index_of(target, drag.item)
                .map_or(Placement::End, Placement::At)
        } else {
            Placement::End
        };
        match self.store.move_item(drag.item, drag.source_canvas, target, position, placement) {
            Ok(moved) => {
                self.history.push(Box::new(MoveItemCommand::new(
                    drag.item,
                    drag.source_canvas,
                    target,
                    drag.origin,
                    position,
                    moved.source_index,
                )));
                Some(Outcome::Applied)
            }
            Err(skip) => Some(Outcome::Skipped(skip)),
        }
    }

    /// Abort the active drag. Leaves no command behind.
    pub fn cancel_drag(&mut self) -> bool {
        self.drag.take().is_some()
    }

    // ─── History ─────────────────────────────────────────────────────────

    /// Undo the last recorded action. An active drag is cancelled first.
    pub fn undo(&mut self) -> Option<Replay> {
        self.cancel_drag();
        self.history.undo(&mut self.store)
    }

    /// Redo the last undone action. An active drag is cancelled first.
    pub fn redo(&mut self) -> Option<Replay> {
        self.cancel_drag();
        self.history.redo(&mut self.store)
    }

    /// Dispatch a resolved keyboard shortcut. Returns `true` if anything
    /// changed.
    pub fn handle_shortcut(&mut self, action: ShortcutAction) -> bool {
        match action {
            ShortcutAction::Undo => self.undo().is_some_and(|r| r.outcome.changed()),
            ShortcutAction::Redo => self.redo().is_some_and(|r| r.outcome.changed()),
            ShortcutAction::Delete => self.delete_selected().is_some_and(|o| o.changed()),
            ShortcutAction::Escape => {
                if self.cancel_drag() {
                    return true;
                }
                let had_selection = !self.store.selection().is_empty();
                self.store.clear_selection();
                had_selection
            }
        }
    }

    // ─── Geometry ────────────────────────────────────────────────────────

    /// Snap a container-relative pixel point on `canvas` to the grid.
    pub fn snap_point(&mut self, point: Point, canvas: CanvasId) -> Conversion<GridPosition> {
        self.engine.snap_point(point, canvas)
    }

    /// Pixel rectangle of an item's desktop layout within its canvas.
    pub fn item_pixel_rect(
        &mut self,
        canvas: CanvasId,
        item: ItemId,
    ) -> Result<Conversion<Rect>, Skip> {
        let rect = self
            .store
            .canvas(canvas)
            .ok_or(Skip::CanvasMissing(canvas))?
            .get(item)
            .and_then(|it| it.layout(Viewport::Desktop).copied())
            .ok_or(Skip::ItemMissing { canvas, item })?;
        Ok(self.engine.layout_pixel_rect(&rect, canvas))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gd_core::ContainerHandle;
    use gd_core::model::LayoutRect;
    use pretty_assertions::assert_eq;

    #[derive(Clone)]
    struct Width(f64);

    impl ContainerHandle for Width {
        fn content_width(&self) -> f64 {
            self.0
        }
    }

    struct Page;

    impl ElementResolver for Page {
        type Handle = Width;

        fn lookup(&self, _id: &str) -> Option<Width> {
            Some(Width(1000.0))
        }
    }

    fn c(id: &str) -> CanvasId {
        CanvasId::intern(id)
    }

    fn i(id: &str) -> ItemId {
        ItemId::intern(id)
    }

    fn widget(id: &str, canvas: &str, x: i32, y: i32) -> Item {
        Item::new(i(id), c(canvas)).with_layout(
            Viewport::Desktop,
            LayoutRect { x, y, w: 4, h: 2 },
        )
    }

    fn editor() -> GridEditor<Page> {
        GridEditor::with_canvases(
            Page,
            GridConfig::default(),
            [
                Canvas::with_items(c("c1"), vec![widget("x", "c1", 2, 3)]),
                Canvas::new(c("c2")),
            ],
        )
    }

    #[test]
    fn add_item_records_resulting_state() {
        let mut ed = editor();
        // Owner is rewritten to the canvas it lands on.
        ed.add_item(c("c2"), widget("n", "c1", 0, 0));
        assert_eq!(ed.store().item(c("c2"), i("n")).unwrap().canvas_id, c("c2"));

        ed.undo();
        assert!(ed.store().item(c("c2"), i("n")).is_none());
        ed.redo();
        assert_eq!(ed.store().item(c("c2"), i("n")).unwrap().canvas_id, c("c2"));
    }

    #[test]
    fn add_to_missing_canvas_records_nothing() {
        let mut ed = editor();
        assert_eq!(
            ed.add_item(c("nope"), widget("n", "nope", 0, 0)),
            Outcome::Skipped(Skip::CanvasMissing(c("nope")))
        );
        assert!(!ed.history().can_undo());
    }

    #[test]
    fn delete_selected_then_undo() {
        let mut ed = editor();
        assert_eq!(ed.delete_selected(), None);

        ed.select(c("c1"), i("x"));
        assert_eq!(ed.delete_selected(), Some(Outcome::Applied));
        assert!(ed.selection().is_empty());

        ed.undo();
        assert_eq!(ed.store().index_of(c("c1"), i("x")), Some(0));
    }

    #[test]
    fn drag_across_canvases_is_undoable() {
        let mut ed = editor();
        // Item corner at (40, 60); grab 10px inside.
        assert!(ed.begin_drag(c("c1"), i("x"), Point::new(50.0, 70.0)));
        assert_eq!(
            ed.drag_to(c("c2"), Point::new(110.0, 110.0)),
            Some(GridPosition::new(5, 5))
        );
        assert_eq!(ed.drop_drag(), Some(Outcome::Applied));

        assert!(ed.store().item(c("c1"), i("x")).is_none());
        assert_eq!(
            ed.store().item(c("c2"), i("x")).unwrap().desktop_position(),
            Some(GridPosition::new(5, 5))
        );
        assert_eq!(ed.history().undo_description().as_deref(), Some("Move x to c2"));

        ed.undo();
        assert_eq!(
            ed.store().item(c("c1"), i("x")).unwrap().desktop_position(),
            Some(GridPosition::new(2, 3))
        );
    }

    #[test]
    fn drag_within_canvas_keeps_stacking() {
        let mut ed = GridEditor::with_canvases(
            Page,
            GridConfig::default(),
            [Canvas::with_items(
                c("c1"),
                vec![
                    widget("pa", "c1", 0, 0),
                    widget("pb", "c1", 4, 0),
                    widget("pc", "c1", 8, 0),
                ],
            )],
        );
        let order = |ed: &GridEditor<Page>| ed.store().canvas(c("c1")).unwrap().item_ids();

        ed.begin_drag(c("c1"), i("pa"), Point::ZERO);
        ed.drag_to(c("c1"), Point::new(200.0, 200.0));
        assert_eq!(ed.drop_drag(), Some(Outcome::Applied));
        assert_eq!(order(&ed), vec![i("pa"), i("pb"), i("pc")]);
        assert_eq!(
            ed.store().item(c("c1"), i("pa")).unwrap().desktop_position(),
            Some(GridPosition::new(10, 10))
        );

        ed.undo();
        ed.redo();
        assert_eq!(order(&ed), vec![i("pa"), i("pb"), i("pc")]);
        assert_eq!(
            ed.store().item(c("c1"), i("pa")).unwrap().desktop_position(),
            Some(GridPosition::new(10, 10))
        );
    }

    #[test]
    fn add_records_the_new_item_even_with_duplicate_id() {
        let mut ed = editor();
        let replacement = widget("x", "c1", 9, 9).with_payload(serde_json::json!({ "v": 2 }));
        ed.add_item(c("c1"), replacement.clone());

        // Undo removes the first `x`; redo appends the recorded one.
        ed.undo();
        ed.redo();
        let items = &ed.store().canvas(c("c1")).unwrap().items;
        assert_eq!(items.len(), 2);
        assert_eq!(items[1], replacement);
    }

    #[test]
    fn cancelled_drag_records_nothing() {
        let mut ed = editor();
        ed.begin_drag(c("c1"), i("x"), Point::new(50.0, 70.0));
        ed.drag_to(c("c2"), Point::new(300.0, 300.0));
        assert!(ed.handle_shortcut(ShortcutAction::Escape));

        assert!(!ed.is_dragging());
        assert_eq!(ed.drop_drag(), None);
        assert!(!ed.history().can_undo());
        assert!(ed.store().item(c("c1"), i("x")).is_some());
    }

    #[test]
    fn drop_in_place_records_nothing() {
        let mut ed = editor();
        ed.begin_drag(c("c1"), i("x"), Point::new(50.0, 70.0));
        ed.drag_to(c("c1"), Point::new(52.0, 68.0));
        assert_eq!(ed.drop_drag(), None);
        assert!(!ed.history().can_undo());
    }

    #[test]
    fn second_drag_is_rejected() {
        let mut ed = editor();
        assert!(ed.begin_drag(c("c1"), i("x"), Point::ZERO));
        assert!(!ed.begin_drag(c("c1"), i("x"), Point::ZERO));
        assert!(ed.cancel_drag());
        assert!(!ed.begin_drag(c("c2"), i("x"), Point::ZERO));
    }

    #[test]
    fn item_pixel_rect_uses_desktop_layout() {
        let mut ed = editor();
        assert_eq!(
            ed.item_pixel_rect(c("c1"), i("x")),
            Ok(Conversion::Exact(Rect::new(40.0, 60.0, 120.0, 100.0)))
        );
        assert_eq!(
            ed.item_pixel_rect(c("c2"), i("x")),
            Err(Skip::ItemMissing {
                canvas: c("c2"),
                item: i("x")
            })
        );
    }
}
