//! Velocity: a magnitude along a direction, applied once per simulation tick.
//!
//! Displacement is per call, not per second. One `apply_to_point` is one
//! tick's worth of motion, so the magnitude is expressed in pixels per tick.
//! Aging, on the other hand, is measured in milliseconds (see `Particle`).

use crate::vector::{Point, Vector2};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Velocity {
    pub magnitude: f32,
    pub min_mag: f32,
    pub max_mag: f32,
    pub direction: Vector2,
    /// When set, [`Velocity::effective_magnitude`] clamps to `[min_mag, max_mag]`.
    pub limit_mag: bool,
}

impl Velocity {
    pub fn new(magnitude: f32, min_mag: f32, max_mag: f32, direction: Vector2, limit_mag: bool) -> Self {
        Self {
            magnitude,
            min_mag,
            max_mag,
            direction,
            limit_mag,
        }
    }

    pub fn set_direction_by_angle(&mut self, angle_radians: f32) {
        self.direction.set_by_angle(angle_radians);
    }

    pub fn constrain_magnitude(&mut self, constrain: bool) {
        self.limit_mag = constrain;
    }

    /// The magnitude actually used for displacement.
    pub fn effective_magnitude(&self) -> f32 {
        if self.limit_mag {
            // clamp() panics on min > max, so order the bounds first
            let (lo, hi) = if self.min_mag <= self.max_mag {
                (self.min_mag, self.max_mag)
            } else {
                (self.max_mag, self.min_mag)
            };
            self.magnitude.clamp(lo, hi)
        } else {
            self.magnitude
        }
    }

    /// Move `point` by one tick of this velocity.
    pub fn apply_to_point(&self, point: &mut Point) {
        let magnitude = self.effective_magnitude();
        let dx = self.direction.x * magnitude;
        let dy = self.direction.y * magnitude;
        point.x += dx;
        point.y += dy;
    }
}

impl Default for Velocity {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, Vector2::PLUS_X, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn apply_to_point_moves_along_direction() {
        let v = Velocity::new(2.0, 0.0, 1.0, Vector2::PLUS_X, false);
        let mut p = Point::new(10.0, 10.0);
        v.apply_to_point(&mut p);
        assert_eq!(p, Point::new(12.0, 10.0));
    }

    #[test]
    fn apply_to_point_ignores_time_and_accumulates_per_call() {
        let mut v = Velocity::default();
        v.magnitude = 1.5;
        v.set_direction_by_angle(FRAC_PI_2);
        let mut p = Point::new(0.0, 0.0);
        for _ in 0..4 {
            v.apply_to_point(&mut p);
        }
        assert!(p.x.abs() < 1e-5);
        assert!((p.y - 6.0).abs() < 1e-5);
    }

    #[rstest]
    #[case(5.0, false, 5.0)]
    #[case(5.0, true, 1.0)]
    #[case(-2.0, true, 0.0)]
    #[case(0.5, true, 0.5)]
    fn effective_magnitude_clamps_only_when_limited(
        #[case] magnitude: f32,
        #[case] limit: bool,
        #[case] expected: f32,
    ) {
        let mut v = Velocity::new(magnitude, 0.0, 1.0, Vector2::PLUS_X, false);
        v.constrain_magnitude(limit);
        assert_eq!(v.effective_magnitude(), expected);
    }

    #[test]
    fn limited_velocity_displaces_by_clamped_magnitude() {
        let v = Velocity::new(5.0, 0.0, 1.0, Vector2::PLUS_X, true);
        let mut p = Point::default();
        v.apply_to_point(&mut p);
        assert_eq!(p, Point::new(1.0, 0.0));
    }

    #[test]
    fn swapped_bounds_do_not_panic() {
        let v = Velocity::new(5.0, 2.0, 1.0, Vector2::PLUS_X, true);
        assert_eq!(v.effective_magnitude(), 2.0);
    }
}
