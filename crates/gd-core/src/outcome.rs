//! Tagged results for operations that degrade instead of failing.
//!
//! Missing containers, canvases, and items are expected while the host is
//! still rendering or after unrelated edits. None of these are errors: each
//! operation returns its fallback value together with a tag saying the
//! fallback was taken, so callers can tell a degraded `0` from a real one.

use crate::id::{CanvasId, ItemId};

/// Why a coordinate conversion fell back to its default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradeReason {
    /// The canvas container could not be resolved.
    ContainerUnresolved,
    /// The container resolved but reported a zero width.
    ZeroWidth,
}

/// Result of a grid/pixel conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Conversion<T> {
    Exact(T),
    Degraded(T, DegradeReason),
}

impl<T: Copy> Conversion<T> {
    /// The converted value, or the fallback on the degraded path.
    pub fn value(&self) -> T {
        match *self {
            Conversion::Exact(v) | Conversion::Degraded(v, _) => v,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Conversion::Degraded(..))
    }

    pub fn degrade_reason(&self) -> Option<DegradeReason> {
        match *self {
            Conversion::Exact(_) => None,
            Conversion::Degraded(_, reason) => Some(reason),
        }
    }
}

/// Pixels per horizontal grid unit, tagged with where it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnitSize {
    /// Served from the size cache.
    Cached(f64),
    /// Freshly measured from the container (and now cached).
    Measured(f64),
    /// Container not resolvable. Reads as 0 and is not cached.
    Unresolved,
}

impl UnitSize {
    pub fn px(&self) -> f64 {
        match *self {
            UnitSize::Cached(px) | UnitSize::Measured(px) => px,
            UnitSize::Unresolved => 0.0,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, UnitSize::Unresolved)
    }
}

/// What a store mutation or command replay found missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    CanvasMissing(CanvasId),
    ItemMissing { canvas: CanvasId, item: ItemId },
}

/// Result of a store mutation or a command replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Applied exactly as recorded.
    Applied,
    /// Applied, but the recorded index was out of bounds so the item went to
    /// the end of the canvas.
    Appended,
    /// Nothing changed.
    Skipped(Skip),
}

impl Outcome {
    /// `true` if the store changed.
    pub fn changed(&self) -> bool {
        !matches!(self, Outcome::Skipped(_))
    }
}
