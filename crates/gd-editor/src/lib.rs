pub mod commands;
pub mod drag;
pub mod editor;
pub mod shortcuts;
pub mod store;

pub use commands::{AddItemCommand, Command, DeleteItemCommand, History, MoveItemCommand, Replay};
pub use editor::GridEditor;
pub use store::{CanvasStore, Placement, StoreChange, StoreEvent};
