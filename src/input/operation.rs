//! Editing operation modes.

use serde::{Deserialize, Serialize};

/// What a tap or drag on the viewport does.
///
/// Drawing modes create their annotation on drag; after the drag (or any tap) the editor
/// falls back to [`Operation::NoOp`], where dragging pans the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    /// Drag pans the view; tap does nothing.
    #[default]
    NoOp,
    /// Tap moves the crop's top-left corner.
    CropTopLeft,
    /// Tap moves the crop's bottom-right corner.
    CropBottomRight,
    DrawArrow,
    DrawLine,
    DrawDottedLine,
    DrawRectangle,
    DrawShieldBlock,
    DrawCircle,
    DrawPen,
    /// Tap selects where the text is centered.
    DrawText,
}

impl Operation {
    /// Status hint shown when the operation is selected.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Operation::NoOp => None,
            Operation::CropTopLeft => Some("Click on the new top-left corner of the crop."),
            Operation::CropBottomRight => {
                Some("Click on the new bottom-right corner of the crop.")
            }
            Operation::DrawArrow => {
                Some("Click and drag from start to end (point side) to draw an arrow!")
            }
            Operation::DrawLine => Some("Click and drag from start to end to draw a line!"),
            Operation::DrawDottedLine => {
                Some("Click and drag from start to end to draw a dotted line!")
            }
            Operation::DrawRectangle => {
                Some("Click and drag from one corner to the other to draw a rectangle!")
            }
            Operation::DrawShieldBlock => {
                Some("Click and drag from one corner to the other to draw a shield block!")
            }
            Operation::DrawCircle => Some("Click and drag to draw circle!"),
            Operation::DrawPen => Some("Click and drag to draw freehand!"),
            Operation::DrawText => Some("Click to define center location of text."),
        }
    }

    /// True for operations that create an annotation by dragging.
    pub fn draws_on_drag(&self) -> bool {
        matches!(
            self,
            Operation::DrawArrow
                | Operation::DrawLine
                | Operation::DrawDottedLine
                | Operation::DrawRectangle
                | Operation::DrawShieldBlock
                | Operation::DrawCircle
                | Operation::DrawPen
        )
    }

    /// Offset from the drag start to the initial second corner of a new shape.
    ///
    /// Box-like shapes start a few pixels wide so they are visible right away.
    pub fn initial_extent(&self) -> i32 {
        match self {
            Operation::DrawRectangle | Operation::DrawShieldBlock | Operation::DrawCircle => 5,
            _ => 1,
        }
    }
}
