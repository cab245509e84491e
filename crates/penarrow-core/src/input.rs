//! Pointer and modifier input for drawing gestures.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Modifiers with only shift held.
    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::default()
        }
    }

    /// Precise mode: snapping is suspended while shift is held.
    pub fn precise(&self) -> bool {
        self.shift
    }
}

/// Pointer event in canvas coordinates, with the modifiers held at the time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    Down {
        position: Point,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Move {
        position: Point,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Up {
        position: Point,
        #[serde(default)]
        modifiers: Modifiers,
    },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Move { position, .. }
            | PointerEvent::Up { position, .. } => *position,
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        match self {
            PointerEvent::Down { modifiers, .. }
            | PointerEvent::Move { modifiers, .. }
            | PointerEvent::Up { modifiers, .. } => *modifiers,
        }
    }
}
