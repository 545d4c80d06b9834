//! A single spark: where it is, how it moves, how old it is, what color it is.
//!
//! ## Lifecycle
//! ```text
//! Inactive --reset()+emitter.activate()--> Alive --elapsed >= lifespan--> Dead
//! ```
//! `active` tracks whether the particle is alive right now. `died` is a
//! separate latch set by the owning system the first time it sees the
//! particle dead, so the death is only counted once.

use crate::Color;
use crate::vector::{Point, Vector2};
use crate::velocity::Velocity;

/// Speed of the velocity template new particles are created with.
pub const DEFAULT_SPEED: f32 = 5.0;

/// Placeholder lifespan (ms) until an emitter assigns a real one.
pub const DEFAULT_LIFESPAN_MS: f32 = 2500.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    /// Age in milliseconds.
    pub elapsed: f32,
    /// Milliseconds this particle lives for once activated.
    pub lifespan: f32,
    pub active: bool,
    pub died: bool,
    pub position: Point,
    pub velocity: Velocity,
    pub base_color: Color,
    /// Color to draw this frame; fades from `base_color` to black.
    pub current_color: Color,
}

impl Particle {
    /// An inactive particle at the origin with the default velocity template.
    pub fn new(base_color: Color) -> Self {
        Self {
            elapsed: 0.0,
            lifespan: DEFAULT_LIFESPAN_MS,
            active: false,
            died: false,
            position: Point::default(),
            velocity: Velocity::new(DEFAULT_SPEED, 0.0, 1.0, Vector2::PLUS_X, false),
            base_color,
            current_color: base_color,
        }
    }

    /// Back to the idle state. Position and velocity are left for the emitter.
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.active = false;
        self.died = false;
    }

    pub fn set_velocity(&mut self, angle_radians: f32, speed: f32) {
        self.velocity.set_direction_by_angle(angle_radians);
        self.velocity.magnitude = speed;
    }

    /// Advance the particle by `dt` milliseconds.
    ///
    /// Ages the particle, decides whether it is still alive, and while alive
    /// refreshes its faded color and moves it one tick. Returns `active`.
    pub fn evaluate(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        self.active = self.elapsed < self.lifespan;

        if self.active {
            let t = Self::lifespan_factor(self.elapsed, self.lifespan);
            self.current_color = self.base_color.lerp_to_black(t);
            self.velocity.apply_to_point(&mut self.position);
        }

        self.active
    }

    /// Record this particle's death. Returns true only the first time the
    /// particle is observed dead.
    pub fn mark_died(&mut self) -> bool {
        if self.active || self.died {
            return false;
        }
        self.died = true;
        true
    }

    /// Normalized age in `[0, 1]`. A non-positive lifespan counts as fully aged.
    pub fn lifespan_factor(elapsed: f32, lifespan: f32) -> f32 {
        if lifespan <= 0.0 {
            return 1.0;
        }
        (elapsed / lifespan).clamp(0.0, 1.0)
    }
}

impl Default for Particle {
    fn default() -> Self {
        Self::new(Color::WHITE)
    }
}
