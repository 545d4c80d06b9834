//! Configuration errors.
//!
//! Everything the simulation consumes is generated internally, so there is
//! nothing to recover from at runtime. These errors are raised once, when a
//! panel, emitter or particle system is built with settings that cannot work.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    #[error("particle pool must hold at least one particle")]
    EmptyPool,

    #[error("color palette is empty")]
    EmptyPalette,

    #[error("max lifespan must be a positive number of seconds, got {0}")]
    InvalidLifespan(f32),

    #[error("max speed must be a non-negative number, got {0}")]
    InvalidSpeed(f32),

    #[error("panel must have at least one row and column, got {rows}x{cols}")]
    InvalidPanel { rows: u32, cols: u32 },
}
