use serde::{Deserialize, Serialize};

/// Tolerance used when comparing layout coordinates.
pub const EPSILON: f32 = 0.01;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn zero() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
        }
    }

    /// Scales uniformly so that `width` does not exceed `max_width`.
    pub fn fit_width(self, max_width: f32) -> Self {
        if self.width <= max_width || self.width <= 0.0 {
            return self;
        }
        let scale = max_width / self.width;
        Self {
            width: max_width,
            height: self.height * scale,
        }
    }

    pub fn aspect_ratio(self) -> f32 {
        if self.height == 0.0 { 0.0 } else { self.width / self.height }
    }
}

/// An axis-aligned rectangle in page coordinates (origin top-left, y grows downwards).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Returns true if `other` lies inside `self`, within [`EPSILON`].
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x - EPSILON
            && other.y >= self.y - EPSILON
            && other.right() <= self.right() + EPSILON
            && other.bottom() <= self.bottom() + EPSILON
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Rect {
        Rect {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_width_preserves_aspect_ratio() {
        let size = Size::new(1000.0, 500.0).fit_width(250.0);
        assert_eq!(size.width, 250.0);
        assert!((size.aspect_ratio() - 2.0).abs() < 1e-6);
        assert_eq!(Size::new(10.0, 5.0).fit_width(250.0), Size::new(10.0, 5.0));
    }

    #[test]
    fn contains_and_union() {
        let page = Rect::new(10.0, 10.0, 100.0, 100.0);
        assert!(page.contains(&Rect::new(10.0, 10.0, 100.0, 100.0)));
        assert!(!page.contains(&Rect::new(5.0, 10.0, 10.0, 10.0)));
        let u = Rect::new(0.0, 0.0, 10.0, 10.0).union(&Rect::new(5.0, 20.0, 10.0, 5.0));
        assert_eq!(u, Rect::new(0.0, 0.0, 15.0, 25.0));
    }
}
