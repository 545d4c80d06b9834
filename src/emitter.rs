//! Emitters decide how a particle is launched when its system triggers.
//!
//! An emitter owns no particles. It reads the epicenter, draws from the
//! injected random source and writes lifespan, position and velocity into
//! the particle it is handed.
//!
//! ## Rust concept: enums as strategies
//! Both launch strategies carry the same two settings, so a sum type is
//! enough; `match` in [`Emitter::activate`] picks the behavior.

use crate::SimError;
use crate::particle::Particle;
use crate::vector::Point;
use rand::{Rng, RngCore};
use std::f32::consts::TAU;

/// Default upper bound on a particle's life, in seconds.
pub const MAX_PARTICLE_LIFETIME: f32 = 2.5;
/// Default upper bound on launch speed, in pixels per tick.
pub const MAX_PARTICLE_SPEED: f32 = 5.0;

/// Every radial spark gets at least this speed so none sit at the epicenter.
const MIN_RADIAL_SPEED: f32 = 0.05;
/// Lower bound (seconds) of a radial spark's lifespan.
const MIN_RADIAL_LIFETIME: f32 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Emitter {
    /// Uniformly random direction over the full circle.
    Radial360 { max_lifespan: f32, max_speed: f32 },
    /// Always along +X.
    DirectedAxis { max_lifespan: f32, max_speed: f32 },
}

impl Emitter {
    pub fn radial(max_lifespan: f32, max_speed: f32) -> Result<Self, SimError> {
        validate(max_lifespan, max_speed)?;
        Ok(Emitter::Radial360 {
            max_lifespan,
            max_speed,
        })
    }

    pub fn directed_axis(max_lifespan: f32, max_speed: f32) -> Result<Self, SimError> {
        validate(max_lifespan, max_speed)?;
        Ok(Emitter::DirectedAxis {
            max_lifespan,
            max_speed,
        })
    }

    pub fn max_lifespan(&self) -> f32 {
        match *self {
            Emitter::Radial360 { max_lifespan, .. } | Emitter::DirectedAxis { max_lifespan, .. } => {
                max_lifespan
            }
        }
    }

    pub fn max_speed(&self) -> f32 {
        match *self {
            Emitter::Radial360 { max_speed, .. } | Emitter::DirectedAxis { max_speed, .. } => {
                max_speed
            }
        }
    }

    /// Launch `particle` from `epicenter`.
    ///
    /// The particle is reset, placed on the epicenter, marked active and
    /// given a fresh lifespan (ms) and velocity.
    pub fn activate(&self, particle: &mut Particle, epicenter: Point, rng: &mut dyn RngCore) {
        let (direction, speed, lifespan) = match *self {
            Emitter::Radial360 {
                max_lifespan,
                max_speed,
            } => {
                let direction = uniform(rng, 0.0, TAU);
                let speed = MIN_RADIAL_SPEED + uniform(rng, 0.0, max_speed);
                let lifespan = uniform(rng, MIN_RADIAL_LIFETIME, max_lifespan) * 1000.0;
                (direction, speed, lifespan)
            }
            Emitter::DirectedAxis {
                max_lifespan,
                max_speed,
            } => {
                let speed = uniform(rng, 0.0, 1.0) * max_speed;
                let lifespan = uniform(rng, 0.0, 1.0) * max_lifespan * 1000.0;
                (0.0, speed, lifespan)
            }
        };

        particle.lifespan = lifespan;
        particle.reset();
        particle.position = epicenter;
        particle.active = true;
        particle.current_color = particle.base_color;
        particle.set_velocity(direction, speed);
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Emitter::Radial360 {
            max_lifespan: MAX_PARTICLE_LIFETIME,
            max_speed: MAX_PARTICLE_SPEED,
        }
    }
}

fn validate(max_lifespan: f32, max_speed: f32) -> Result<(), SimError> {
    if !max_lifespan.is_finite() || max_lifespan <= 0.0 {
        return Err(SimError::InvalidLifespan(max_lifespan));
    }
    if !max_speed.is_finite() || max_speed < 0.0 {
        return Err(SimError::InvalidSpeed(max_speed));
    }
    Ok(())
}

/// Draw from `[lo, hi)`, or return `lo` when the range is empty.
fn uniform(rng: &mut dyn RngCore, lo: f32, hi: f32) -> f32 {
    if hi > lo { rng.random_range(lo..hi) } else { lo }
}
