//! 2D primitives: a unit direction and a point in display space.

/// A direction in the plane, measured from the +X axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    /// Unit vector along +X, the default direction for new velocities.
    pub const PLUS_X: Vector2 = Vector2 { x: 1.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn from_angle(angle_radians: f32) -> Self {
        let mut v = Self::PLUS_X;
        v.set_by_angle(angle_radians);
        v
    }

    /// Point this vector at `angle_radians`, making it unit length.
    pub fn set_by_angle(&mut self, angle_radians: f32) {
        let (sin, cos) = angle_radians.sin_cos();
        self.x = cos;
        self.y = sin;
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl Default for Vector2 {
    fn default() -> Self {
        Self::PLUS_X
    }
}

/// A mutable position in display space. Pixels are addressed by truncating
/// the coordinates toward zero.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Pixel coordinates for this point.
    pub fn to_pixel(self) -> (i32, i32) {
        (self.x as i32, self.y as i32)
    }
}
