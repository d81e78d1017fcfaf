pub mod config;
pub mod id;
pub mod locator;
pub mod model;
pub mod outcome;
pub mod transform;

pub use config::GridConfig;
pub use id::{CanvasId, ItemId};
pub use locator::{ContainerHandle, ElementLocator, ElementResolver};
pub use model::*;
pub use outcome::{Conversion, DegradeReason, Outcome, Skip, UnitSize};
pub use transform::CoordinateEngine;

// Re-export geometry types so downstream crates share one kurbo version
pub use kurbo::{Point, Rect, Vec2};
