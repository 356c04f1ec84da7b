/// Integer pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point) -> f32 {
        let dx = (other.x - self.x) as f32;
        let dy = (other.y - self.y) as f32;
        dx.hypot(dy)
    }
}

/// Axis-aligned bounding box anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub const fn at(origin: Point, width: i32, height: i32) -> Self {
        Self::new(origin.x, origin.y, width, height)
    }

    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub const fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Inclusive-edge intersection: boxes whose edges touch count as overlapping.
    pub const fn overlaps(&self, other: &Rect) -> bool {
        self.x <= other.right()
            && other.x <= self.right()
            && self.y <= other.bottom()
            && other.y <= self.bottom()
    }

    pub fn overlaps_any(&self, others: &[Rect]) -> bool {
        others.iter().any(|o| self.overlaps(o))
    }

    /// True when the whole box lies inside `[0, W - w] x [0, H - h]`.
    pub const fn within(&self, bounds: WorldBounds) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.x <= bounds.width - self.width
            && self.y <= bounds.height - self.height
    }

    pub fn clamp_to_world(&self, bounds: WorldBounds) -> Rect {
        Rect {
            x: self.x.clamp(0, (bounds.width - self.width).max(0)),
            y: self.y.clamp(0, (bounds.height - self.height).max(0)),
            ..*self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldBounds {
    pub width: i32,
    pub height: i32,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
        }
    }
}

/// Cardinal direction used for facing, wander headings and single-axis steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub const fn offset(self, amount: i32) -> Point {
        match self {
            Direction::Up => Point::new(0, -amount),
            Direction::Down => Point::new(0, amount),
            Direction::Left => Point::new(-amount, 0),
            Direction::Right => Point::new(amount, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_overlap() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(10, 0, 10, 10);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn separated_boxes_do_not_overlap() {
        let a = Rect::new(0, 0, 10, 10);
        assert!(!a.overlaps(&Rect::new(11, 0, 10, 10)));
        assert!(!a.overlaps(&Rect::new(0, 11, 10, 10)));
        assert!(!a.overlaps(&Rect::new(-20, -20, 5, 5)));
    }

    #[test]
    fn contained_box_overlaps() {
        let outer = Rect::new(0, 0, 100, 100);
        let inner = Rect::new(40, 40, 5, 5);
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn clamp_pulls_box_back_inside() {
        let bounds = WorldBounds::default();
        let r = Rect::new(-5, 800, 32, 32).clamp_to_world(bounds);
        assert_eq!(r.origin(), Point::new(0, 768 - 32));
        assert!(r.within(bounds));

        let r = Rect::new(2000, 10, 32, 32).clamp_to_world(bounds);
        assert_eq!(r.origin(), Point::new(1024 - 32, 10));
    }

    #[test]
    fn within_uses_inclusive_upper_limit() {
        let bounds = WorldBounds::default();
        assert!(Rect::new(1024 - 32, 768 - 32, 32, 32).within(bounds));
        assert!(!Rect::new(1024 - 31, 0, 32, 32).within(bounds));
    }

    #[test]
    fn center_of_house_box() {
        assert_eq!(Rect::new(400, 300, 80, 80).center(), Point::new(440, 340));
    }
}
