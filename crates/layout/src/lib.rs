pub mod flow;
pub mod geometry;

use serde::{Deserialize, Serialize};

pub use flow::{GLYPH_WIDTH, LINE_HEIGHT, LayoutMap, layout_document};
pub use geometry::{Direction, grid_insertion_index, insertion_index, layout_direction};
pub use hit_test::hit_test;

/// A rectangle in CSS px, page coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, (x, y): (f32, f32)) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}
