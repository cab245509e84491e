//! Arrow tool: owns the stroke for one drag gesture.

use crate::arrow::{ArrowHead, ArrowShaper};
use crate::input::PointerEvent;
use crate::settings::SnapSettings;
use crate::stroke::Stroke;
use kurbo::Point;

/// State of a tool interaction.
#[derive(Debug, Clone, Default)]
pub enum ToolState {
    /// Tool is idle, waiting for interaction.
    #[default]
    Idle,
    /// A drag is in progress.
    Active {
        /// Stroke being shaped.
        stroke: Stroke,
        /// Shaper for this gesture.
        shaper: ArrowShaper,
    },
}

/// Drives an [`ArrowShaper`] across a pointer gesture.
///
/// The stroke is created on pointer down, reshaped on every move, and handed
/// to the caller on pointer up.
#[derive(Debug, Clone, Default)]
pub struct ArrowTool {
    pub state: ToolState,
}

impl ArrowTool {
    /// Create a new arrow tool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a gesture with the anchor at `point`.
    ///
    /// Any gesture already in progress is discarded.
    pub fn begin(&mut self, point: Point) {
        if self.is_active() {
            log::warn!("Arrow gesture restarted before it ended");
        }
        self.state = ToolState::Active {
            stroke: Stroke::with_anchor(point),
            shaper: ArrowShaper::new(),
        };
    }

    /// Reshape the arrow for the pointer at `point`.
    pub fn update(&mut self, point: Point, shift_down: bool, settings: &SnapSettings) -> Option<ArrowHead> {
        match &mut self.state {
            ToolState::Active { stroke, shaper } => shaper.draw_shape(stroke, point, shift_down, settings),
            ToolState::Idle => None,
        }
    }

    /// End the gesture at `point` and return the finished stroke.
    ///
    /// A click that never left its anchor produces nothing.
    pub fn end(&mut self, point: Point, shift_down: bool, settings: &SnapSettings) -> Option<Stroke> {
        let ToolState::Active { mut stroke, mut shaper } = std::mem::take(&mut self.state) else {
            return None;
        };

        if stroke.len() == 1 && stroke.anchor() == Some(point) {
            log::debug!("Arrow gesture ended without a shaft");
            return None;
        }

        shaper.draw_shape(&mut stroke, point, shift_down, settings);
        log::debug!("Arrow stroke {} finished with {} points", stroke.id(), stroke.len());
        Some(stroke)
    }

    /// Cancel the current gesture.
    pub fn cancel(&mut self) {
        self.state = ToolState::Idle;
    }

    /// Check if a gesture is in progress.
    pub fn is_active(&self) -> bool {
        matches!(self.state, ToolState::Active { .. })
    }

    /// The stroke being drawn, for preview rendering.
    pub fn stroke(&self) -> Option<&Stroke> {
        match &self.state {
            ToolState::Active { stroke, .. } => Some(stroke),
            ToolState::Idle => None,
        }
    }

    /// Dispatch a pointer event. Returns the finished stroke on pointer up.
    pub fn handle_pointer_event(&mut self, event: PointerEvent, settings: &SnapSettings) -> Option<Stroke> {
        let shift_down = event.modifiers().precise();
        match event {
            PointerEvent::Down { position, .. } => {
                self.begin(position);
                None
            }
            PointerEvent::Move { position, .. } => {
                self.update(position, shift_down, settings);
                None
            }
            PointerEvent::Up { position, .. } => self.end(position, shift_down, settings),
        }
    }
}
