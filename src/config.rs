//! Fireworks settings: presets plus whatever the command line overrides.
//!
//! ## Rust concept: builder-style `with_*` methods
//! Each method takes `self` by value and returns it, so a config reads as
//! one expression: `FireworksConfig::preset(Preset::Fade).with_particles(50)`.

use crate::emitter::Emitter;
use crate::system::{ExplosiveParticleSystem, OneshotParticleSystem, ParticleSystem};
use crate::{Color, FADE_PALETTE, PanelConfig, SIMPLE_PALETTE, SimError};
use clap::ValueEnum;
use rand::RngCore;

/// Which particle system to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SystemMode {
    /// Every spark launches together, the burst restarts when all are dead
    Explosive,
    /// A single spark at a time
    Oneshot,
}

/// How sparks leave the epicenter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EmitterKind {
    /// Random direction over the full circle
    Radial,
    /// Straight along +X
    PlusX,
}

/// Named settings from the two color fireworks demos.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// 100 slow, short-lived sparks
    Simple,
    /// 200 fast sparks that fade to black over up to 2.5 s
    Fade,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FireworksConfig {
    pub panel: PanelConfig,
    pub mode: SystemMode,
    pub emitter: EmitterKind,
    pub particles: usize,
    /// Seconds.
    pub max_lifespan: f32,
    /// Pixels per tick.
    pub max_speed: f32,
    pub auto_trigger: bool,
    /// Stop after this many simulated milliseconds; `None` runs until Ctrl+C.
    pub run_duration_ms: Option<f64>,
    /// Target frame period used to pace the loop.
    pub frame_ms: u64,
    pub palette: Vec<Color>,
}

impl FireworksConfig {
    pub fn preset(preset: Preset) -> Self {
        let (particles, max_lifespan, max_speed, palette) = match preset {
            Preset::Simple => (100, 1.5, 1.0, SIMPLE_PALETTE),
            Preset::Fade => (200, 2.5, 5.0, FADE_PALETTE),
        };
        Self {
            panel: PanelConfig::default(),
            mode: SystemMode::Explosive,
            emitter: EmitterKind::Radial,
            particles,
            max_lifespan,
            max_speed,
            auto_trigger: true,
            run_duration_ms: Some(10_000.0),
            frame_ms: 17,
            palette: palette.to_vec(),
        }
    }

    pub fn with_panel(mut self, panel: PanelConfig) -> Self {
        self.panel = panel;
        self
    }

    pub fn with_mode(mut self, mode: SystemMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_emitter(mut self, emitter: EmitterKind) -> Self {
        self.emitter = emitter;
        self
    }

    pub fn with_particles(mut self, particles: usize) -> Self {
        self.particles = particles;
        self
    }

    pub fn with_max_lifespan(mut self, seconds: f32) -> Self {
        self.max_lifespan = seconds;
        self
    }

    pub fn with_max_speed(mut self, speed: f32) -> Self {
        self.max_speed = speed;
        self
    }

    pub fn with_auto_trigger(mut self, auto_trigger: bool) -> Self {
        self.auto_trigger = auto_trigger;
        self
    }

    pub fn with_run_duration_ms(mut self, duration: Option<f64>) -> Self {
        self.run_duration_ms = duration;
        self
    }

    pub fn with_frame_ms(mut self, frame_ms: u64) -> Self {
        self.frame_ms = frame_ms;
        self
    }

    pub fn build_emitter(&self) -> Result<Emitter, SimError> {
        match self.emitter {
            EmitterKind::Radial => Emitter::radial(self.max_lifespan, self.max_speed),
            EmitterKind::PlusX => Emitter::directed_axis(self.max_lifespan, self.max_speed),
        }
    }

    /// Build and generate the configured system, centered on the panel.
    pub fn build_system(
        &self,
        rng: &mut dyn RngCore,
    ) -> Result<Box<dyn ParticleSystem>, SimError> {
        PanelConfig::validated(self.panel.rows, self.panel.cols)?;
        let emitter = self.build_emitter()?;

        let mut system: Box<dyn ParticleSystem> = match self.mode {
            SystemMode::Explosive => Box::new(ExplosiveParticleSystem::new(
                self.particles,
                self.auto_trigger,
                emitter,
            )?),
            SystemMode::Oneshot => Box::new(OneshotParticleSystem::new(
                self.particles,
                self.auto_trigger,
                emitter,
            )?),
        };
        system.set_epicenter(self.panel.center());
        system.generate(&self.palette, rng)?;
        Ok(system)
    }
}

impl Default for FireworksConfig {
    fn default() -> Self {
        Self::preset(Preset::Fade)
    }
}
