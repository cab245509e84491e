//! PenArrow Core Library
//!
//! Freehand-to-arrow shaping for pen annotation: grid snapping of the anchor,
//! rotation snapping of the shaft, and arrowhead generation into a stroke buffer.

pub mod arrow;
pub mod input;
pub mod settings;
pub mod snap;
pub mod stroke;
pub mod tools;

pub use arrow::{ArrowHead, ArrowShaper, Direction, ShaftGeometry, shape_arrow};
pub use input::{Modifiers, PointerEvent};
pub use settings::{AnchorSnap, SettingsError, SettingsResult, SnapSettings};
pub use snap::{GridSnapper, SnapResult, snap_to_grid, GRID_SIZE};
pub use stroke::{Stroke, StrokeBuffer, StrokeId};
pub use tools::{ArrowTool, ToolState};
