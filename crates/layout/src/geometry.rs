//! Drop-position geometry. Everything here is pure: callers pass the boxes they measured and
//! are responsible for leaving drag placeholders out of `siblings`.

use crate::Rect;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Vertical,
    Horizontal,
}

/// Direction the first two children are laid out in. Fewer than two children is vertical.
pub fn layout_direction(children: &[Rect]) -> Direction {
    let [first, second, ..] = children else {
        return Direction::Vertical;
    };
    let (ax, ay) = first.center();
    let (bx, by) = second.center();
    if (bx - ax).abs() > (by - ay).abs() {
        Direction::Horizontal
    } else {
        Direction::Vertical
    }
}

/// Index of the first sibling whose midpoint along `direction` the cursor has not passed, or
/// `siblings.len()` when it passed them all. Siblings are scanned in rendered order.
pub fn insertion_index(siblings: &[Rect], x: f32, y: f32, direction: Direction) -> usize {
    siblings
        .iter()
        .position(|r| {
            let (mx, my) = r.center();
            match direction {
                Direction::Horizontal => x < mx,
                Direction::Vertical => y < my,
            }
        })
        .unwrap_or(siblings.len())
}

/// Linear index of the grid cell under the cursor, clamped to `[0, sibling_count]`.
///
/// `columns`/`rows` come from the container's track templates; zero rows means implicit rows,
/// derived from the item count.
pub fn grid_insertion_index(
    container: Rect,
    columns: usize,
    rows: usize,
    sibling_count: usize,
    x: f32,
    y: f32,
) -> usize {
    let columns = columns.max(1);
    let rows = if rows == 0 {
        sibling_count.div_ceil(columns).max(1)
    } else {
        rows
    };
    let col = cell(x - container.x, container.width, columns);
    let row = cell(y - container.y, container.height, rows);
    (row * columns + col).min(sibling_count)
}

fn cell(offset: f32, extent: f32, count: usize) -> usize {
    if extent <= 0.0 {
        return 0;
    }
    let index = (offset / (extent / count as f32)).floor();
    if index.is_nan() || index < 0.0 {
        0
    } else {
        (index as usize).min(count - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(n: usize) -> Vec<Rect> {
        (0..n)
            .map(|i| Rect::new(i as f32 * 100.0, 0.0, 100.0, 50.0))
            .collect()
    }

    #[test]
    fn direction_from_first_two_children() {
        assert_eq!(layout_direction(&row(3)), Direction::Horizontal);
        let column = [Rect::new(0.0, 0.0, 100.0, 20.0), Rect::new(0.0, 20.0, 100.0, 20.0)];
        assert_eq!(layout_direction(&column), Direction::Vertical);
        assert_eq!(layout_direction(&row(1)), Direction::Vertical);
    }

    #[test]
    fn index_just_left_of_second_midpoint_is_one() {
        let siblings = row(3);
        // B's midpoint is at x = 150
        assert_eq!(insertion_index(&siblings, 149.0, 25.0, Direction::Horizontal), 1);
        assert_eq!(insertion_index(&siblings, 251.0, 25.0, Direction::Horizontal), 3);
    }

    #[test]
    fn index_is_monotonic_and_bounded() {
        let siblings = row(5);
        assert_eq!(
            insertion_index(&siblings, f32::NEG_INFINITY, 0.0, Direction::Horizontal),
            0
        );
        assert_eq!(
            insertion_index(&siblings, f32::INFINITY, 0.0, Direction::Horizontal),
            5
        );
        let mut last = 0;
        for step in -10..60 {
            let index = insertion_index(&siblings, step as f32 * 10.0, 0.0, Direction::Horizontal);
            assert!(index >= last);
            last = index;
        }
        assert_eq!(last, 5);
    }

    #[test]
    fn vertical_index_uses_y_midpoints() {
        let siblings = [Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(0.0, 10.0, 10.0, 10.0)];
        assert_eq!(insertion_index(&siblings, 500.0, 4.0, Direction::Vertical), 0);
        assert_eq!(insertion_index(&siblings, 500.0, 12.0, Direction::Vertical), 1);
    }

    #[test]
    fn grid_cell_under_cursor() {
        let container = Rect::new(10.0, 10.0, 300.0, 200.0);
        // 3 columns, 2 implicit rows for 5 items
        assert_eq!(grid_insertion_index(container, 3, 0, 5, 15.0, 15.0), 0);
        assert_eq!(grid_insertion_index(container, 3, 0, 5, 215.0, 15.0), 2);
        assert_eq!(grid_insertion_index(container, 3, 0, 5, 115.0, 150.0), 4);
        // last cell is past the items: clamped to the item count
        assert_eq!(grid_insertion_index(container, 3, 0, 5, 300.0, 200.0), 5);
        assert_eq!(grid_insertion_index(container, 3, 0, 5, -50.0, -50.0), 0);
    }
}
