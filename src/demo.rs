//! The frame loop: measure dt, update the system, draw, present, repeat.
//!
//! ## Rust concepts
//! - Generic structs (`Demo<R, C>`) so the caller keeps concrete access to
//!   its renderer after the run (e.g. to save a snapshot)
//! - Trait objects for the particle system, chosen at runtime
//! - `std::time::Instant` for frame pacing

use crate::clock::Clock;
use crate::config::FireworksConfig;
use crate::is_running;
use crate::render::Renderer;
use crate::system::ParticleSystem;
use crate::SimError;
use rand::rngs::StdRng;
use std::sync::atomic::AtomicBool;
use std::thread;
use std::time::{Duration, Instant};

/// Why a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The configured run duration elapsed.
    DurationElapsed,
    /// Every particle died and auto-trigger is off.
    SystemInactive,
    /// The `running` flag was cleared (Ctrl+C).
    Interrupted,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub elapsed_ms: f64,
    pub slow_frames: u64,
    pub reason: StopReason,
}

pub struct Demo<R, C> {
    system: Box<dyn ParticleSystem>,
    renderer: R,
    clock: C,
    rng: StdRng,
    run_duration_ms: Option<f64>,
    frame_period: Duration,
    start_ticks: f64,
    prev_ticks: f64,
}

impl<R: Renderer, C: Clock> Demo<R, C> {
    pub fn new(
        config: &FireworksConfig,
        renderer: R,
        mut clock: C,
        mut rng: StdRng,
    ) -> Result<Self, SimError> {
        let system = config.build_system(&mut rng)?;
        let now = clock.now_ms();
        Ok(Self {
            system,
            renderer,
            clock,
            rng,
            run_duration_ms: config.run_duration_ms,
            frame_period: Duration::from_millis(config.frame_ms),
            start_ticks: now,
            prev_ticks: now,
        })
    }

    /// Run one frame. Returns whether the system still has live particles.
    pub fn step(&mut self) -> bool {
        let current_ticks = self.clock.now_ms();
        let dt = (current_ticks - self.prev_ticks) as f32;
        self.prev_ticks = current_ticks;

        let active = self.system.update(dt, &mut self.rng);

        self.renderer.clear();
        self.system.draw(&mut self.renderer);
        self.renderer.present();

        active
    }

    /// Run frames until the duration elapses, the system goes dark, or
    /// `running` is cleared.
    pub fn run(&mut self, running: &AtomicBool) -> RunSummary {
        let mut frames = 0;
        let mut slow_frames = 0;

        let reason = loop {
            if !is_running(running) {
                break StopReason::Interrupted;
            }

            let frame_start = Instant::now();
            let active = self.step();
            frames += 1;

            if let Some(limit) = self.run_duration_ms {
                if self.elapsed_ms() >= limit {
                    break StopReason::DurationElapsed;
                }
            }
            if !active {
                break StopReason::SystemInactive;
            }

            // A zero frame period means "as fast as possible"
            if self.frame_period.is_zero() {
                continue;
            }
            let frame_time = frame_start.elapsed();
            match self.frame_period.checked_sub(frame_time) {
                Some(remaining) => thread::sleep(remaining),
                None => {
                    slow_frames += 1;
                    // Only log the first few slow frames
                    if slow_frames <= 5 {
                        tracing::warn!(
                            "Frame {} took {}ms (target: {}ms)",
                            frames,
                            frame_time.as_millis(),
                            self.frame_period.as_millis()
                        );
                    }
                }
            }
        };

        let summary = RunSummary {
            frames,
            elapsed_ms: self.elapsed_ms(),
            slow_frames,
            reason,
        };
        tracing::info!(
            "Run finished after {} frames ({:.0}ms, {:?})",
            summary.frames,
            summary.elapsed_ms,
            summary.reason
        );
        summary
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.prev_ticks - self.start_ticks
    }

    pub fn system(&self) -> &dyn ParticleSystem {
        self.system.as_ref()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }
}
