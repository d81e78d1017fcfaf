//! WASM bridge for GD: exposes the grid editor to the browser layout builder.
//!
//! Compiled via `wasm-pack build --target web`. Canvas containers are looked
//! up in the live DOM by canvas id; the page forwards resize, pointer, and
//! key events here and re-renders when the observer callback fires.

use gd_core::id::{CanvasId, ItemId};
use gd_core::model::{Canvas, Item};
use gd_core::{ContainerHandle, ElementResolver, GridConfig, Point};
use gd_editor::GridEditor;
use gd_editor::shortcuts::ShortcutMap;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

// ─── DOM resolution ──────────────────────────────────────────────────────

/// A canvas container element.
#[derive(Clone)]
pub struct DomContainer(web_sys::Element);

impl ContainerHandle for DomContainer {
    fn content_width(&self) -> f64 {
        f64::from(self.0.client_width())
    }
}

/// Looks elements up with `document.getElementById`.
pub struct DomResolver;

impl ElementResolver for DomResolver {
    type Handle = DomContainer;

    fn lookup(&self, id: &str) -> Option<DomContainer> {
        web_sys::window()?
            .document()?
            .get_element_by_id(id)
            .map(DomContainer)
    }
}

// ─── Observer delivery ───────────────────────────────────────────────────

/// Forwards store revisions to the page's callback.
///
/// Store events fire while a `GdGrid` method still holds `&mut self`, and a
/// page that re-renders from the callback reads the grid again. Delivery is
/// therefore queued as a microtask: revisions are coalesced and the latest
/// one reaches JS once the current call has returned.
#[derive(Clone, Default)]
struct Notifier {
    callback: Rc<RefCell<Option<js_sys::Function>>>,
    pending: Rc<Cell<Option<u64>>>,
}

impl Notifier {
    fn set_callback(&self, callback: js_sys::Function) {
        *self.callback.borrow_mut() = Some(callback);
    }

    /// Store `revision` as the latest pending one. Returns `true` if no
    /// delivery was queued yet.
    fn record(&self, revision: u64) -> bool {
        self.pending.replace(Some(revision)).is_none()
    }

    fn notify(&self, revision: u64) {
        if self.callback.borrow().is_none() || !self.record(revision) {
            return;
        }
        let Some(window) = web_sys::window() else {
            log::debug!("no window; observer r{revision} not delivered");
            self.pending.set(None);
            return;
        };
        let this = self.clone();
        let task = Closure::once_into_js(move || this.deliver());
        window.queue_microtask(task.unchecked_ref());
    }

    fn deliver(&self) {
        let Some(revision) = self.pending.take() else {
            return;
        };
        let callback = self.callback.borrow().clone();
        if let Some(f) = callback
            && let Err(e) = f.call1(&JsValue::NULL, &JsValue::from_f64(revision as f64))
        {
            log::warn!("observer callback failed at r{revision}: {e:?}");
        }
    }
}

// ─── Controller ──────────────────────────────────────────────────────────

/// The main WASM-facing grid controller.
///
/// Holds the editor session and the page's re-render callback. All
/// interaction from the page goes through this struct.
#[wasm_bindgen]
pub struct GdGrid {
    editor: GridEditor<DomResolver>,
    /// Delivers the store revision after structural changes.
    notifier: Notifier,
}

#[wasm_bindgen]
impl GdGrid {
    /// Create a controller. `config_json` may be empty for defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<GdGrid, JsValue> {
        console_error_panic_hook_setup();

        let config = if config_json.trim().is_empty() {
            GridConfig::default()
        } else {
            GridConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e))?
        };

        let notifier = Notifier::default();
        let mut editor = GridEditor::new(DomResolver, config);
        let sink = notifier.clone();
        editor.subscribe(move |event| sink.notify(event.revision));

        Ok(Self { editor, notifier })
    }

    /// Register the page's re-render callback: `(revision: number) => void`.
    ///
    /// Called asynchronously with the latest revision after the grid call
    /// that changed the store returns, so the callback may read the grid.
    pub fn set_observer(&mut self, callback: js_sys::Function) {
        self.notifier.set_callback(callback);
    }

    /// Add canvases authored by the page from a JSON array.
    /// Returns `false` if the JSON does not describe canvases.
    pub fn load_canvases_json(&mut self, json: &str) -> bool {
        let canvases: Vec<Canvas> = match serde_json::from_str(json) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("load_canvases_json: {e}");
                return false;
            }
        };
        for canvas in canvases {
            self.editor.add_canvas(canvas);
        }
        true
    }

    /// All canvases, in insertion order, as a JSON array.
    pub fn canvases_json(&self) -> String {
        let canvases: Vec<&Canvas> = self.editor.store().canvases().collect();
        serde_json::to_string(&canvases).unwrap_or_else(|_| "[]".to_string())
    }

    /// The current selection as `{ "item_id": ..., "canvas_id": ... }`.
    pub fn selection_json(&self) -> String {
        serde_json::to_string(&self.editor.selection()).unwrap_or_else(|_| "{}".to_string())
    }

    // ─── Coordinates ─────────────────────────────────────────────────────

    pub fn grid_to_pixels_x(&mut self, units: i32, canvas_id: &str) -> f64 {
        self.editor
            .engine_mut()
            .grid_to_pixels_x(units, CanvasId::intern(canvas_id))
            .value() as f64
    }

    pub fn grid_to_pixels_y(&self, units: i32) -> f64 {
        self.editor.engine().grid_to_pixels_y(units) as f64
    }

    pub fn pixels_to_grid_x(&mut self, pixels: f64, canvas_id: &str) -> i32 {
        self.editor
            .engine_mut()
            .pixels_to_grid_x(pixels, CanvasId::intern(canvas_id))
            .value()
    }

    pub fn pixels_to_grid_y(&self, pixels: f64) -> i32 {
        self.editor.engine().pixels_to_grid_y(pixels)
    }

    /// Pixels per horizontal unit; 0 if the container is not in the DOM.
    pub fn horizontal_unit_size(&mut self, canvas_id: &str, force_recalc: bool) -> f64 {
        self.editor
            .engine_mut()
            .horizontal_unit_size(CanvasId::intern(canvas_id), force_recalc)
            .px()
    }

    /// Call from the page's resize observer.
    pub fn on_resize(&mut self) {
        self.editor.handle_resize();
    }

    /// Call when a canvas container element is replaced.
    pub fn invalidate_element(&mut self, id: &str) {
        self.editor.invalidate_element(id);
    }

    // ─── Items ───────────────────────────────────────────────────────────

    /// Append an item (JSON) to a canvas. Returns `true` if it was added.
    pub fn add_item_json(&mut self, canvas_id: &str, json: &str) -> bool {
        let item: Item = match serde_json::from_str(json) {
            Ok(i) => i,
            Err(e) => {
                log::warn!("add_item_json: {e}");
                return false;
            }
        };
        self.editor
            .add_item(CanvasId::intern(canvas_id), item)
            .changed()
    }

    pub fn select(&mut self, canvas_id: &str, item_id: &str) -> bool {
        self.editor
            .select(CanvasId::intern(canvas_id), ItemId::intern(item_id))
            .changed()
    }

    pub fn delete_selected(&mut self) -> bool {
        self.editor
            .delete_selected()
            .is_some_and(|outcome| outcome.changed())
    }

    // ─── Drag and drop ───────────────────────────────────────────────────

    pub fn begin_drag(&mut self, canvas_id: &str, item_id: &str, x: f64, y: f64) -> bool {
        self.editor.begin_drag(
            CanvasId::intern(canvas_id),
            ItemId::intern(item_id),
            Point::new(x, y),
        )
    }

    /// Returns the snapped `[x, y]` preview in grid units, or `[]` when no
    /// drag is active.
    pub fn drag_to(&mut self, canvas_id: &str, x: f64, y: f64) -> Vec<i32> {
        self.editor
            .drag_to(CanvasId::intern(canvas_id), Point::new(x, y))
            .map(|pos| vec![pos.x, pos.y])
            .unwrap_or_default()
    }

    /// Returns `true` if the drop moved the item.
    pub fn drop_drag(&mut self) -> bool {
        self.editor
            .drop_drag()
            .is_some_and(|outcome| outcome.changed())
    }

    pub fn cancel_drag(&mut self) -> bool {
        self.editor.cancel_drag()
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        self.editor.undo().is_some_and(|r| r.outcome.changed())
    }

    pub fn redo(&mut self) -> bool {
        self.editor.redo().is_some_and(|r| r.outcome.changed())
    }

    pub fn can_undo(&self) -> bool {
        self.editor.history().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.editor.history().can_redo()
    }

    /// Label for the undo menu entry, or empty.
    pub fn undo_label(&self) -> String {
        self.editor.history().undo_description().unwrap_or_default()
    }

    /// Label for the redo menu entry, or empty.
    pub fn redo_label(&self) -> String {
        self.editor.history().redo_description().unwrap_or_default()
    }

    /// Handle a keydown. Returns `true` if the key was consumed and changed
    /// something.
    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> bool {
        match ShortcutMap::resolve(key, ctrl, shift, alt, meta) {
            Some(action) => self.editor.handle_shortcut(action),
            None => false,
        }
    }
}

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("GD WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
