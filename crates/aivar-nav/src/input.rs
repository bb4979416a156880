//! Input events consumed from the navigable container.

use serde::{Deserialize, Serialize};

/// A raw input event. Coordinates are client pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    Wheel { delta_y: f64 },
    /// `touches[0].clientY` of the touch start.
    TouchStart { y: f64 },
    TouchMove,
    /// `changedTouches[0].clientY` of the touch end.
    TouchEnd { y: f64 },
    TouchCancel,
    /// Viewport width changed.
    Resize { width: u32 },
}
