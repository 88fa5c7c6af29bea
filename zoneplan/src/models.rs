use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A weighted point which may be covered or left outside
/// of the placed rectangle.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Building {
    pub x: f64,
    pub y: f64,
    pub weight: f64,
}

impl Building {
    pub fn new(x: f64, y: f64, weight: f64) -> Self {
        Self { x, y, weight }
    }

    /// Total order over position first, weight second.
    pub(crate) fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.x
            .total_cmp(&other.x)
            .then(self.y.total_cmp(&other.y))
            .then(self.weight.total_cmp(&other.weight))
    }
}

/// Axis-aligned rectangle with `x1 <= x2` and `y1 <= y2`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Rectangle {
    /// Creates a rectangle from two arbitrary corners.
    pub fn new(ax: f64, ay: f64, bx: f64, by: f64) -> Self {
        Self {
            x1: ax.min(bx),
            y1: ay.min(by),
            x2: ax.max(bx),
            y2: ay.max(by),
        }
    }

    /// The smallest rectangle enclosing all given buildings.
    pub fn bounding(buildings: &[Building]) -> Option<Self> {
        let first = buildings.first()?;
        let init = Self::new(first.x, first.y, first.x, first.y);
        Some(buildings.iter().fold(init, |r, b| Self {
            x1: r.x1.min(b.x),
            y1: r.y1.min(b.y),
            x2: r.x2.max(b.x),
            y2: r.y2.max(b.y),
        }))
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn perimeter(&self) -> f64 {
        2.0 * (self.width() + self.height())
    }

    /// Distances along each axis from the building to the rectangle.
    /// Both are zero when the building lies inside or on the boundary.
    pub fn gaps(&self, b: &Building) -> (f64, f64) {
        let gap_x = if b.x < self.x1 {
            self.x1 - b.x
        } else if b.x > self.x2 {
            b.x - self.x2
        } else {
            0.0
        };
        let gap_y = if b.y < self.y1 {
            self.y1 - b.y
        } else if b.y > self.y2 {
            b.y - self.y2
        } else {
            0.0
        };
        (gap_x, gap_y)
    }

    pub fn contains(&self, b: &Building) -> bool {
        self.x1 <= b.x && b.x <= self.x2 && self.y1 <= b.y && b.y <= self.y2
    }

    /// Lexicographic order over `(x1, y1, x2, y2)`.
    pub fn lex_cmp(&self, other: &Self) -> Ordering {
        self.x1
            .total_cmp(&other.x1)
            .then(self.y1.total_cmp(&other.y1))
            .then(self.x2.total_cmp(&other.x2))
            .then(self.y2.total_cmp(&other.y2))
    }
}

/// A parsed optimization request.
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    pub buildings: Vec<Building>,
    /// Minimum number of buildings the rectangle has to cover.
    pub required: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizationResult {
    pub cost: f64,
    pub rectangle: Rectangle,
    pub covered: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_corners() {
        let r = Rectangle::new(4.0, -1.0, 1.0, 3.0);
        assert_eq!(r, Rectangle { x1: 1.0, y1: -1.0, x2: 4.0, y2: 3.0 });
        assert_eq!(r.area(), 12.0);
        assert_eq!(r.perimeter(), 14.0);
    }

    #[test]
    fn test_gaps() {
        let r = Rectangle::new(0.0, 0.0, 2.0, 2.0);
        assert_eq!(r.gaps(&Building::new(1.0, 1.0, 1.0)), (0.0, 0.0));
        assert_eq!(r.gaps(&Building::new(2.0, 0.0, 1.0)), (0.0, 0.0));
        assert_eq!(r.gaps(&Building::new(-3.0, 1.0, 1.0)), (3.0, 0.0));
        assert_eq!(r.gaps(&Building::new(5.0, 6.0, 1.0)), (3.0, 4.0));
    }

    #[test]
    fn test_bounding() {
        assert_eq!(Rectangle::bounding(&[]), None);
        let b = [
            Building::new(3.0, 1.0, 0.0),
            Building::new(-1.0, 7.0, 2.0),
            Building::new(0.0, 0.0, 1.0),
        ];
        assert_eq!(
            Rectangle::bounding(&b),
            Some(Rectangle::new(-1.0, 0.0, 3.0, 7.0))
        );
    }

    #[test]
    fn test_lex_cmp() {
        let a = Rectangle::new(0.0, 0.0, 1.0, 1.0);
        let b = Rectangle::new(0.0, 0.0, 1.0, 2.0);
        let c = Rectangle::new(0.0, 1.0, 0.0, 1.0);
        assert_eq!(a.lex_cmp(&b), Ordering::Less);
        assert_eq!(c.lex_cmp(&b), Ordering::Greater);
        assert_eq!(a.lex_cmp(&a), Ordering::Equal);
    }
}
