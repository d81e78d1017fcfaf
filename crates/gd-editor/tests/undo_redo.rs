//! Integration tests: undo/redo through the grid editor (gd-editor ↔ gd-core).
//!
//! Exercises add/delete/move commands against a dashboard fixture, the
//! selection invariant, and the history's branch-discard rule.

use gd_core::model::*;
use gd_core::{
    CanvasId, ContainerHandle, ElementResolver, GridConfig, ItemId, Outcome, Point, Skip,
};
use gd_editor::store::StoreChange;
use gd_editor::{CanvasStore, Command, GridEditor, MoveItemCommand, Placement};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone)]
struct Width(f64);

impl ContainerHandle for Width {
    fn content_width(&self) -> f64 {
        self.0
    }
}

struct Desktop;

impl ElementResolver for Desktop {
    type Handle = Width;

    fn lookup(&self, _id: &str) -> Option<Width> {
        Some(Width(1000.0))
    }
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn make_editor() -> GridEditor<Desktop> {
    init_logging();
    let canvases: Vec<Canvas> =
        serde_json::from_str(include_str!("fixtures/dashboard.json")).unwrap();
    GridEditor::with_canvases(Desktop, GridConfig::default(), canvases)
}

fn c(id: &str) -> CanvasId {
    CanvasId::intern(id)
}

fn i(id: &str) -> ItemId {
    ItemId::intern(id)
}

fn ids(store: &CanvasStore, canvas: &str) -> Vec<&'static str> {
    store
        .canvas(c(canvas))
        .map(|cv| cv.items.iter().map(|it| it.id.as_str()).collect())
        .unwrap_or_default()
}

// ─── Add ────────────────────────────────────────────────────────────────

#[test]
fn add_then_undo_then_redo() {
    let mut editor = make_editor();
    let note = Item::new(i("note"), c("sidebar"))
        .with_layout(
            Viewport::Desktop,
            LayoutRect {
                x: 0,
                y: 0,
                w: 50,
                h: 4,
            },
        )
        .with_payload(serde_json::json!({ "widget": "text", "body": "hello" }));

    assert_eq!(editor.add_item(c("sidebar"), note.clone()), Outcome::Applied);
    assert_eq!(ids(editor.store(), "sidebar"), vec!["note"]);

    editor.undo();
    assert_eq!(ids(editor.store(), "sidebar"), Vec::<&str>::new());

    editor.redo();
    assert_eq!(editor.store().item(c("sidebar"), i("note")), Some(&note));
}

#[test]
fn repeated_redo_never_shares_state() {
    let mut editor = make_editor();
    let note = Item::new(i("memo"), c("sidebar"));
    editor.add_item(c("sidebar"), note);

    for _ in 0..3 {
        editor.undo();
        editor.redo();
    }
    assert_eq!(ids(editor.store(), "sidebar"), vec!["memo"]);
    assert_eq!(editor.history().len(), 1);
}

// ─── Delete ─────────────────────────────────────────────────────────────

#[test]
fn delete_middle_item_restores_in_place() {
    let mut editor = make_editor();
    let before = editor.store().canvas(c("main")).unwrap().clone();

    assert_eq!(editor.delete_item(c("main"), i("orders")), Outcome::Applied);
    assert_eq!(ids(editor.store(), "main"), vec!["revenue", "latency"]);

    editor.undo();
    assert_eq!(editor.store().canvas(c("main")), Some(&before));

    editor.redo();
    assert_eq!(ids(editor.store(), "main"), vec!["revenue", "latency"]);
}

#[test]
fn deleted_payload_survives_round_trip() {
    let mut editor = make_editor();
    editor.delete_item(c("main"), i("latency"));
    editor.undo();
    let latency = editor.store().item(c("main"), i("latency")).unwrap();
    assert_eq!(latency.payload["thresholds"], serde_json::json!([100, 250]));
}

// ─── Selection ──────────────────────────────────────────────────────────

#[test]
fn deleting_selection_clears_both_fields() {
    let mut editor = make_editor();
    let all: Vec<(CanvasId, ItemId)> = editor
        .store()
        .canvases()
        .flat_map(|cv| cv.items.iter().map(move |it| (cv.id, it.id)))
        .collect();

    for (canvas, item) in all {
        let mut editor = make_editor();
        editor.select(canvas, item);
        editor.delete_selected();
        assert_eq!(editor.selection(), Selection::default(), "{canvas}/{item}");
    }
    assert!(editor.selection().is_empty());
}

#[test]
fn undoing_add_of_selected_item_clears_selection() {
    let mut editor = make_editor();
    editor.add_item(c("sidebar"), Item::new(i("pick"), c("sidebar")));
    editor.select(c("sidebar"), i("pick"));

    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    editor.subscribe(move |ev| sink.borrow_mut().push(ev.change));

    editor.undo();
    assert!(editor.selection().is_empty());
    assert_eq!(
        *events.borrow(),
        vec![StoreChange::ItemRemoved {
            canvas: c("sidebar"),
            item: i("pick"),
            selection_cleared: true,
        }]
    );
}

// ─── Move ───────────────────────────────────────────────────────────────

#[test]
fn move_to_other_canvas_and_back() {
    let mut editor = make_editor();
    // `orders` sits at (25, 0) → pixel corner (500, 0). Grab its corner.
    assert!(editor.begin_drag(c("main"), i("orders"), Point::new(500.0, 0.0)));
    editor.drag_to(c("sidebar"), Point::new(100.0, 100.0));
    assert_eq!(editor.drop_drag(), Some(Outcome::Applied));

    assert_eq!(ids(editor.store(), "main"), vec!["revenue", "latency"]);
    let moved = editor.store().item(c("sidebar"), i("orders")).unwrap();
    assert_eq!(moved.desktop_position(), Some(GridPosition::new(5, 5)));
    assert_eq!(moved.canvas_id, c("sidebar"));

    editor.undo();
    assert_eq!(ids(editor.store(), "main"), vec!["revenue", "orders", "latency"]);
    assert_eq!(ids(editor.store(), "sidebar"), Vec::<&str>::new());
    let back = editor.store().item(c("main"), i("orders")).unwrap();
    assert_eq!(back.desktop_position(), Some(GridPosition::new(25, 0)));
    // Size is untouched by moves.
    assert_eq!(back.layout(Viewport::Desktop).map(|r| (r.w, r.h)), Some((25, 8)));
}

#[test]
fn move_undo_after_untracked_delete_is_silent() {
    init_logging();
    let canvases: Vec<Canvas> =
        serde_json::from_str(include_str!("fixtures/dashboard.json")).unwrap();
    let mut store = CanvasStore::from_canvases(canvases);

    let moved = store
        .move_item(
            i("revenue"),
            c("main"),
            c("sidebar"),
            GridPosition::new(3, 3),
            Placement::End,
        )
        .unwrap();
    let cmd = MoveItemCommand::new(
        i("revenue"),
        c("main"),
        c("sidebar"),
        GridPosition::new(0, 0),
        GridPosition::new(3, 3),
        moved.source_index,
    );

    // Removed behind the history's back.
    store.remove_item(c("sidebar"), i("revenue")).unwrap();
    let revision = store.revision();

    assert_eq!(
        cmd.undo(&mut store),
        Outcome::Skipped(Skip::ItemMissing {
            canvas: c("sidebar"),
            item: i("revenue"),
        })
    );
    assert_eq!(store.revision(), revision);
    assert_eq!(ids(&store, "main"), vec!["orders", "latency"]);
}

// ─── History ────────────────────────────────────────────────────────────

#[test]
fn new_action_after_undo_discards_redo() {
    let mut editor = make_editor();
    editor.add_item(c("sidebar"), Item::new(i("h1"), c("sidebar")));
    editor.add_item(c("sidebar"), Item::new(i("h2"), c("sidebar")));
    editor.undo();
    editor.add_item(c("sidebar"), Item::new(i("h3"), c("sidebar")));

    assert_eq!(editor.redo(), None);
    assert_eq!(ids(editor.store(), "sidebar"), vec!["h1", "h3"]);
}

#[test]
fn history_depth_comes_from_config() {
    init_logging();
    let config = GridConfig::from_json(r#"{ "history_depth": 2 }"#).unwrap();
    let mut editor = GridEditor::with_canvases(Desktop, config, [Canvas::new(c("solo"))]);
    for n in 0..4 {
        editor.add_item(c("solo"), Item::new(ItemId::intern(&format!("d{n}")), c("solo")));
    }
    assert!(editor.undo().is_some());
    assert!(editor.undo().is_some());
    assert!(editor.undo().is_none());
    assert_eq!(ids(editor.store(), "solo"), vec!["d0", "d1"]);
}
