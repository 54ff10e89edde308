use std::ops::Sub;

use bitflags::bitflags;

use crate::storage::Geometry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

bitflags! {
    /// Window edges under the cursor; at most one horizontal and one vertical.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Edges: u8 {
        const LEFT = 0b0001;
        const RIGHT = 0b0010;
        const TOP = 0b0100;
        const BOTTOM = 0b1000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorShape {
    #[default]
    Default,
    Horizontal,
    Vertical,
    /// Top-left / bottom-right diagonal.
    DiagonalForward,
    /// Top-right / bottom-left diagonal.
    DiagonalBack,
}

impl CursorShape {
    pub fn glyph(self) -> Option<char> {
        match self {
            CursorShape::Default => None,
            CursorShape::Horizontal => Some('↔'),
            CursorShape::Vertical => Some('↕'),
            CursorShape::DiagonalForward => Some('⤡'),
            CursorShape::DiagonalBack => Some('⤢'),
        }
    }
}

impl Edges {
    pub fn cursor_shape(self) -> CursorShape {
        let horizontal = self.intersects(Edges::LEFT | Edges::RIGHT);
        let vertical = self.intersects(Edges::TOP | Edges::BOTTOM);
        if self == Edges::TOP | Edges::LEFT || self == Edges::BOTTOM | Edges::RIGHT {
            CursorShape::DiagonalForward
        } else if self == Edges::TOP | Edges::RIGHT || self == Edges::BOTTOM | Edges::LEFT {
            CursorShape::DiagonalBack
        } else if horizontal {
            CursorShape::Horizontal
        } else if vertical {
            CursorShape::Vertical
        } else {
            CursorShape::Default
        }
    }
}

/// Edge-set under `cursor` for a window occupying `bounds`, with grips
/// `margin` cells wide. Left wins over right and top over bottom.
pub fn hit_test(cursor: Point, bounds: Geometry, margin: i32) -> Edges {
    if !bounds.contains(cursor.x, cursor.y) {
        return Edges::empty();
    }
    let local = cursor - Point::new(bounds.x, bounds.y);
    let mut edges = Edges::empty();
    if local.x < margin {
        edges |= Edges::LEFT;
    } else if local.x >= bounds.width - margin {
        edges |= Edges::RIGHT;
    }
    if local.y < margin {
        edges |= Edges::TOP;
    } else if local.y >= bounds.height - margin {
        edges |= Edges::BOTTOM;
    }
    edges
}

/// Geometry after dragging `edges` of `origin` by the cumulative `delta`.
/// Dragging a left or top edge past the minimum keeps the opposite edge fixed.
pub fn resize(origin: Geometry, edges: Edges, delta: Point, min: Size) -> Geometry {
    let mut next = origin;
    if edges.contains(Edges::RIGHT) {
        next.width = (origin.width + delta.x).max(min.width);
    }
    if edges.contains(Edges::BOTTOM) {
        next.height = (origin.height + delta.y).max(min.height);
    }
    if edges.contains(Edges::LEFT) {
        next.width = (origin.width - delta.x).max(min.width);
        next.x = origin.right() - next.width;
    }
    if edges.contains(Edges::TOP) {
        next.height = (origin.height - delta.y).max(min.height);
        next.y = origin.bottom() - next.height;
    }
    next
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    Dragging {
        anchor: Point,
    },
    Resizing {
        edges: Edges,
        start: Point,
        origin: Geometry,
    },
}

impl Interaction {
    pub fn is_idle(&self) -> bool {
        matches!(self, Interaction::Idle)
    }

    pub fn is_resizing(&self) -> bool {
        matches!(self, Interaction::Resizing { .. })
    }

    /// Applies a pointer move; returns the new geometry when it changed.
    pub fn track(&mut self, cursor: Point, current: Geometry, min: Size) -> Option<Geometry> {
        match self {
            Interaction::Idle => None,
            Interaction::Dragging { anchor } => {
                let delta = cursor - *anchor;
                *anchor = cursor;
                if delta == Point::default() {
                    return None;
                }
                Some(Geometry {
                    x: current.x + delta.x,
                    y: current.y + delta.y,
                    ..current
                })
            }
            Interaction::Resizing {
                edges,
                start,
                origin,
            } => {
                let next = resize(*origin, *edges, cursor - *start, min);
                (next != current).then_some(next)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: Size = Size::new(20, 6);
    const BOUNDS: Geometry = Geometry::new(10, 5, 40, 12);

    #[test]
    fn hit_test_covers_all_eight_directions_and_interior() {
        let cases = [
            (Point::new(10, 5), Edges::TOP | Edges::LEFT),
            (Point::new(49, 5), Edges::TOP | Edges::RIGHT),
            (Point::new(10, 16), Edges::BOTTOM | Edges::LEFT),
            (Point::new(49, 16), Edges::BOTTOM | Edges::RIGHT),
            (Point::new(10, 9), Edges::LEFT),
            (Point::new(49, 9), Edges::RIGHT),
            (Point::new(30, 5), Edges::TOP),
            (Point::new(30, 16), Edges::BOTTOM),
            (Point::new(30, 9), Edges::empty()),
            (Point::new(9, 5), Edges::empty()),
            (Point::new(50, 17), Edges::empty()),
        ];
        for (cursor, expected) in cases {
            assert_eq!(hit_test(cursor, BOUNDS, 1), expected, "cursor {cursor:?}");
        }
    }

    #[test]
    fn wider_margin_extends_grip() {
        assert_eq!(
            hit_test(Point::new(12, 9), BOUNDS, 3),
            Edges::LEFT,
            "third column is inside a 3-cell grip"
        );
        assert_eq!(hit_test(Point::new(13, 9), BOUNDS, 3), Edges::empty());
    }

    #[test]
    fn tiny_window_prefers_left_and_top() {
        let tiny = Geometry::new(0, 0, 2, 2);
        assert_eq!(hit_test(Point::new(1, 1), tiny, 2), Edges::LEFT | Edges::TOP);
    }

    #[test]
    fn cursor_shapes_follow_edge_sets() {
        assert_eq!((Edges::TOP | Edges::LEFT).cursor_shape(), CursorShape::DiagonalForward);
        assert_eq!((Edges::BOTTOM | Edges::RIGHT).cursor_shape(), CursorShape::DiagonalForward);
        assert_eq!((Edges::TOP | Edges::RIGHT).cursor_shape(), CursorShape::DiagonalBack);
        assert_eq!((Edges::BOTTOM | Edges::LEFT).cursor_shape(), CursorShape::DiagonalBack);
        assert_eq!(Edges::LEFT.cursor_shape(), CursorShape::Horizontal);
        assert_eq!(Edges::RIGHT.cursor_shape(), CursorShape::Horizontal);
        assert_eq!(Edges::TOP.cursor_shape(), CursorShape::Vertical);
        assert_eq!(Edges::BOTTOM.cursor_shape(), CursorShape::Vertical);
        assert_eq!(Edges::empty().cursor_shape(), CursorShape::Default);
    }

    #[test]
    fn bottom_right_grows_by_exact_delta() {
        let next = resize(BOUNDS, Edges::BOTTOM | Edges::RIGHT, Point::new(7, 3), MIN);
        assert_eq!(next, Geometry::new(10, 5, 47, 15));
    }

    #[test]
    fn top_left_moves_anchor_with_delta() {
        let grow = resize(BOUNDS, Edges::TOP | Edges::LEFT, Point::new(-4, -2), MIN);
        assert_eq!(grow, Geometry::new(6, 3, 44, 14));

        let shrink = resize(BOUNDS, Edges::TOP | Edges::LEFT, Point::new(5, 2), MIN);
        assert_eq!(shrink, Geometry::new(15, 7, 35, 10));
    }

    #[test]
    fn clamped_left_top_keep_opposite_edges_fixed() {
        let next = resize(BOUNDS, Edges::TOP | Edges::LEFT, Point::new(100, 100), MIN);
        assert_eq!(next.width, MIN.width);
        assert_eq!(next.height, MIN.height);
        assert_eq!(next.right(), BOUNDS.right());
        assert_eq!(next.bottom(), BOUNDS.bottom());
    }

    #[test]
    fn clamped_right_bottom_keep_anchor() {
        let next = resize(BOUNDS, Edges::BOTTOM | Edges::RIGHT, Point::new(-100, -100), MIN);
        assert_eq!(next, Geometry::new(10, 5, MIN.width, MIN.height));
    }

    #[test]
    fn single_edges_leave_other_axis_alone() {
        let next = resize(BOUNDS, Edges::LEFT, Point::new(3, 9), MIN);
        assert_eq!(next, Geometry::new(13, 5, 37, 12));
        let next = resize(BOUNDS, Edges::BOTTOM, Point::new(9, -2), MIN);
        assert_eq!(next, Geometry::new(10, 5, 40, 10));
    }

    #[test]
    fn dragging_follows_cursor_and_moves_anchor() {
        let mut interaction = Interaction::Dragging {
            anchor: Point::new(20, 6),
        };
        let moved = interaction
            .track(Point::new(25, 8), BOUNDS, MIN)
            .expect("moved");
        assert_eq!(moved, Geometry::new(15, 7, 40, 12));
        assert_eq!(
            interaction,
            Interaction::Dragging {
                anchor: Point::new(25, 8)
            }
        );
        assert_eq!(interaction.track(Point::new(25, 8), moved, MIN), None);
    }

    #[test]
    fn resizing_uses_cumulative_delta_from_start() {
        let mut interaction = Interaction::Resizing {
            edges: Edges::RIGHT,
            start: Point::new(49, 9),
            origin: BOUNDS,
        };
        let first = interaction
            .track(Point::new(52, 9), BOUNDS, MIN)
            .expect("grew");
        assert_eq!(first.width, 43);
        let second = interaction
            .track(Point::new(54, 9), first, MIN)
            .expect("grew again");
        assert_eq!(second.width, 45);
        assert_eq!(Interaction::Idle.track(Point::new(0, 0), BOUNDS, MIN), None);
    }
}
