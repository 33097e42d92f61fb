#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

impl Circle {
    pub const fn new(x: f64, y: f64, r: f64) -> Self {
        Self { x, y, r }
    }

    pub fn distance_to(&self, other: &Circle) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// True when the two circles overlap by more than a hair.
    pub fn intersects(&self, other: &Circle) -> bool {
        let dr = self.r + other.r - 1e-6;
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dr > 0.0 && dr * dr > dx * dx + dy * dy
    }

    /// True when `other` lies inside `self`, with a tolerance relative to the larger radius.
    pub fn encloses_weak(&self, other: &Circle) -> bool {
        let dr = self.r - other.r + self.r.max(other.r).max(1.0) * 1e-9;
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dr > 0.0 && dr * dr > dx * dx + dy * dy
    }

    pub(crate) fn encloses_not(&self, other: &Circle) -> bool {
        let dr = self.r - other.r;
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dr < 0.0 || dr * dr < dx * dx + dy * dy
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }
}
