//! Particle systems: fixed pools of particles driven once per frame.
//!
//! A system owns every particle in its pool. Each frame the driver calls
//! [`ParticleSystem::update`] with the elapsed milliseconds, then
//! [`ParticleSystem::draw`] with a renderer.
//!
//! ## Death accounting
//! `particle_count` is the number of live particles. A particle that goes
//! dead during a pass is counted down once, and its `died` latch makes sure
//! later passes never count it again. Between updates
//! `particle_count == particles.filter(|p| p.active && !p.died).count()`.
//!
//! ## Rust concept: traits with default methods
//! [`ParticleSystem`] only asks implementors for their pool, `trigger`, and
//! `update`. Everything shared (reset, draw, queries) is written once as a
//! default method on top of [`ParticleSystem::pool`].

use crate::emitter::Emitter;
use crate::particle::Particle;
use crate::render::Renderer;
use crate::vector::Point;
use crate::{Color, SimError};
use rand::{Rng, RngCore};

// ── Pool ─────────────────────────────────────────────────────────────

/// State shared by every kind of particle system.
#[derive(Clone, Debug)]
pub struct ParticlePool {
    particles: Vec<Particle>,
    pool_size: usize,
    particle_count: usize,
    epicenter: Point,
    active: bool,
    auto_trigger: bool,
    initial_trigger: bool,
    emitter: Emitter,
}

impl ParticlePool {
    /// An empty pool of `pool_size` slots. Call `generate` to fill it.
    pub fn new(pool_size: usize, auto_trigger: bool, emitter: Emitter) -> Result<Self, SimError> {
        if pool_size == 0 {
            return Err(SimError::EmptyPool);
        }
        Ok(Self {
            particles: Vec::with_capacity(pool_size),
            pool_size,
            particle_count: 0,
            epicenter: Point::default(),
            active: false,
            auto_trigger,
            initial_trigger: true,
            emitter,
        })
    }

    /// Fill the pool with idle particles, each with a color drawn from `palette`.
    fn generate(&mut self, palette: &[Color], rng: &mut dyn RngCore) -> Result<(), SimError> {
        if palette.is_empty() {
            return Err(SimError::EmptyPalette);
        }
        self.particles = (0..self.pool_size)
            .map(|_| Particle::new(palette[rng.random_range(0..palette.len())]))
            .collect();
        self.particle_count = 0;
        self.active = false;
        self.initial_trigger = true;
        Ok(())
    }

    fn reset(&mut self) {
        for p in &mut self.particles {
            p.reset();
        }
        self.particle_count = 0;
    }

    /// Launch the first `limit` particles from the epicenter.
    fn activate(&mut self, limit: usize, rng: &mut dyn RngCore) {
        self.reset();
        let epicenter = self.epicenter;
        for p in self.particles.iter_mut().take(limit) {
            self.emitter.activate(p, epicenter, rng);
            self.particle_count += 1;
        }
        self.active = self.particle_count > 0;
    }

    /// Age the first `limit` launched particles and count down new deaths.
    fn evaluate(&mut self, limit: usize, dt: f32) {
        for p in self.particles.iter_mut().take(limit) {
            // Idle particles (never launched, or reset) stay idle. A dead
            // particle's elapsed time therefore stops advancing once it dies.
            if !p.active {
                continue;
            }
            if !p.evaluate(dt) && p.mark_died() {
                self.particle_count = self.particle_count.saturating_sub(1);
            }
        }
        self.active = self.particle_count > 0;
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }
}

// ── Trait ────────────────────────────────────────────────────────────

pub trait ParticleSystem {
    fn pool(&self) -> &ParticlePool;

    fn pool_mut(&mut self) -> &mut ParticlePool;

    /// (Re)launch particles through the emitter and set the live count.
    fn trigger(&mut self, rng: &mut dyn RngCore);

    /// Advance the simulation by `dt` milliseconds.
    ///
    /// The first call only triggers the system. Later calls age the managed
    /// particles, count down deaths, and retrigger once everything is dead
    /// if auto-trigger is on. Returns whether any particle is alive.
    fn update(&mut self, dt: f32, rng: &mut dyn RngCore) -> bool;

    /// Fill the pool with fresh idle particles colored from `palette`.
    fn generate(&mut self, palette: &[Color], rng: &mut dyn RngCore) -> Result<(), SimError> {
        self.pool_mut().generate(palette, rng)
    }

    /// Put every particle back to idle without moving it.
    fn reset(&mut self) {
        let pool = self.pool_mut();
        pool.reset();
        pool.active = false;
    }

    /// Reset and arm the initial trigger, so the next `update` relaunches.
    fn reset_to_initial(&mut self) {
        self.pool_mut().initial_trigger = true;
        self.reset();
    }

    fn is_active(&self) -> bool {
        self.pool().particle_count > 0
    }

    fn particle_count(&self) -> usize {
        self.pool().particle_count
    }

    fn particles(&self) -> &[Particle] {
        self.pool().particles()
    }

    fn epicenter(&self) -> Point {
        self.pool().epicenter
    }

    fn set_epicenter(&mut self, epicenter: Point) {
        self.pool_mut().epicenter = epicenter;
    }

    fn auto_trigger(&self) -> bool {
        self.pool().auto_trigger
    }

    fn set_auto_trigger(&mut self, auto_trigger: bool) {
        self.pool_mut().auto_trigger = auto_trigger;
    }

    /// Plot every live particle. Never changes simulation state.
    fn draw(&self, renderer: &mut dyn Renderer) {
        for (index, p) in self.particles().iter().enumerate() {
            tracing::trace!(
                index,
                x = p.position.x,
                y = p.position.y,
                elapsed = p.elapsed,
                lifespan = p.lifespan,
                active = p.active,
                died = p.died,
                "particle"
            );
            if p.active {
                let (x, y) = p.position.to_pixel();
                renderer.set_pixel(x, y, p.current_color);
            }
        }
    }
}

/// Shared update protocol: trigger on first call, otherwise evaluate
/// `limit` particles and retrigger when all are dead.
fn run_update<S: ParticleSystem + ?Sized>(
    system: &mut S,
    limit: usize,
    dt: f32,
    rng: &mut dyn RngCore,
) -> bool {
    if system.pool().initial_trigger {
        system.pool_mut().initial_trigger = false;
        system.trigger(rng);
    } else {
        system.pool_mut().evaluate(limit, dt);
        let pool = system.pool();
        if !pool.active && pool.auto_trigger {
            system.trigger(rng);
        }
    }
    system.pool().active
}

// ── Explosive ────────────────────────────────────────────────────────

/// Every particle launches at once; the burst restarts when all have died.
#[derive(Clone, Debug)]
pub struct ExplosiveParticleSystem {
    pool: ParticlePool,
}

impl ExplosiveParticleSystem {
    pub fn new(pool_size: usize, auto_trigger: bool, emitter: Emitter) -> Result<Self, SimError> {
        Ok(Self {
            pool: ParticlePool::new(pool_size, auto_trigger, emitter)?,
        })
    }
}

impl ParticleSystem for ExplosiveParticleSystem {
    fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    fn pool_mut(&mut self) -> &mut ParticlePool {
        &mut self.pool
    }

    fn trigger(&mut self, rng: &mut dyn RngCore) {
        let limit = self.pool.particles.len();
        self.pool.activate(limit, rng);
        tracing::debug!(
            particles = self.pool.particle_count,
            x = self.pool.epicenter.x,
            y = self.pool.epicenter.y,
            "explosion triggered"
        );
    }

    fn update(&mut self, dt: f32, rng: &mut dyn RngCore) -> bool {
        let limit = self.pool.particles.len();
        run_update(self, limit, dt, rng)
    }
}

// ── Oneshot ──────────────────────────────────────────────────────────

/// Manages exactly one live particle (index 0) whatever the pool size.
#[derive(Clone, Debug)]
pub struct OneshotParticleSystem {
    pool: ParticlePool,
}

impl OneshotParticleSystem {
    pub fn new(pool_size: usize, auto_trigger: bool, emitter: Emitter) -> Result<Self, SimError> {
        Ok(Self {
            pool: ParticlePool::new(pool_size, auto_trigger, emitter)?,
        })
    }
}

impl ParticleSystem for OneshotParticleSystem {
    fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    fn pool_mut(&mut self) -> &mut ParticlePool {
        &mut self.pool
    }

    fn trigger(&mut self, rng: &mut dyn RngCore) {
        self.pool.activate(1, rng);
        tracing::debug!(particles = self.pool.particle_count, "oneshot triggered");
    }

    fn update(&mut self, dt: f32, rng: &mut dyn RngCore) -> bool {
        run_update(self, 1, dt, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_PALETTE;
    use crate::render::FrameBuffer;
    use crate::PanelConfig;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rstest::rstest;

    fn live_count(system: &dyn ParticleSystem) -> usize {
        system
            .particles()
            .iter()
            .filter(|p| p.active && !p.died)
            .count()
    }

    fn explosive(pool: usize, auto_trigger: bool, rng: &mut StdRng) -> ExplosiveParticleSystem {
        let emitter = Emitter::radial(1.0, 1.0).unwrap();
        let mut system = ExplosiveParticleSystem::new(pool, auto_trigger, emitter).unwrap();
        system.set_epicenter(Point::new(64.0, 64.0));
        system.generate(&DEFAULT_PALETTE, rng).unwrap();
        system
    }

    fn oneshot(pool: usize, auto_trigger: bool, rng: &mut StdRng) -> OneshotParticleSystem {
        let emitter = Emitter::radial(1.0, 1.0).unwrap();
        let mut system = OneshotParticleSystem::new(pool, auto_trigger, emitter).unwrap();
        system.set_epicenter(Point::new(10.0, 20.0));
        system.generate(&DEFAULT_PALETTE, rng).unwrap();
        system
    }

    #[test]
    fn empty_pool_is_rejected() {
        let emitter = Emitter::default();
        assert_eq!(
            ExplosiveParticleSystem::new(0, true, emitter).unwrap_err(),
            SimError::EmptyPool
        );
        assert_eq!(
            OneshotParticleSystem::new(0, true, emitter).unwrap_err(),
            SimError::EmptyPool
        );
    }

    #[test]
    fn generate_rejects_empty_palette() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut system = ExplosiveParticleSystem::new(3, true, Emitter::default()).unwrap();
        assert_eq!(system.generate(&[], &mut rng), Err(SimError::EmptyPalette));
    }

    #[test]
    fn generate_fills_pool_with_idle_palette_particles() {
        let mut rng = StdRng::seed_from_u64(0);
        let system = explosive(16, true, &mut rng);
        assert_eq!(system.particles().len(), 16);
        assert_eq!(system.particle_count(), 0);
        assert!(!system.is_active());
        for p in system.particles() {
            assert!(!p.active);
            assert!(DEFAULT_PALETTE.contains(&p.base_color));
        }
    }

    #[test]
    fn update_before_generate_stays_inactive() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut system = ExplosiveParticleSystem::new(3, true, Emitter::default()).unwrap();

        assert!(!system.update(0.0, &mut rng));
        assert_eq!(system.particle_count(), 0);
        assert!(!system.is_active());
        assert!(!system.pool().active);

        // Retriggering an empty pool is harmless.
        assert!(!system.update(16.0, &mut rng));
        assert_eq!(system.particle_count(), 0);
    }

    #[test]
    fn dead_particles_stop_aging() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut system = explosive(2, false, &mut rng);
        system.update(0.0, &mut rng);

        system.update(5_000.0, &mut rng);
        let frozen: Vec<f32> = system.particles().iter().map(|p| p.elapsed).collect();
        system.update(16.0, &mut rng);
        let later: Vec<f32> = system.particles().iter().map(|p| p.elapsed).collect();
        assert_eq!(frozen, later);
    }

    #[test]
    fn first_update_triggers_whole_pool() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut system = explosive(4, true, &mut rng);

        assert!(system.update(0.0, &mut rng));
        assert_eq!(system.particle_count(), 4);
        for p in system.particles() {
            assert!(p.active);
            assert_eq!(p.position, Point::new(64.0, 64.0));
        }
    }

    #[test]
    fn explosive_retriggers_in_the_same_call() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut system = explosive(4, true, &mut rng);
        system.update(0.0, &mut rng);

        for _ in 0..10 {
            // Longer than any radial lifespan, so every spark dies each pass.
            assert!(system.update(1000.0, &mut rng));
            assert_eq!(system.particle_count(), 4);
            assert!(system.particles().iter().all(|p| p.active));
            assert!(system
                .particles()
                .iter()
                .all(|p| p.position == Point::new(64.0, 64.0)));
        }
    }

    #[test]
    fn explosive_without_auto_trigger_goes_dark() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut system = explosive(8, false, &mut rng);
        system.update(0.0, &mut rng);

        assert!(!system.update(1000.0, &mut rng));
        assert_eq!(system.particle_count(), 0);
        assert!(!system.is_active());
        assert!(system.particles().iter().all(|p| p.died));

        // Dead sparks are never counted twice.
        assert!(!system.update(1000.0, &mut rng));
        assert_eq!(system.particle_count(), 0);
    }

    #[test]
    fn explosive_count_matches_live_particles_every_frame() {
        let mut rng = StdRng::seed_from_u64(1234);
        let mut system = explosive(50, true, &mut rng);
        system.update(0.0, &mut rng);

        for _ in 0..300 {
            system.update(16.7, &mut rng);
            assert_eq!(system.particle_count(), live_count(&system));
        }
    }

    #[test]
    fn explosive_count_falls_as_sparks_die() {
        let mut rng = StdRng::seed_from_u64(77);
        let mut system = explosive(50, false, &mut rng);
        system.update(0.0, &mut rng);

        let mut previous = system.particle_count();
        while system.update(50.0, &mut rng) {
            assert!(system.particle_count() <= previous);
            previous = system.particle_count();
        }
        assert_eq!(system.particle_count(), 0);
    }

    #[test]
    fn reset_idles_everything_without_moving() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut system = explosive(6, false, &mut rng);
        system.update(0.0, &mut rng);
        system.update(16.0, &mut rng);
        let positions: Vec<Point> = system.particles().iter().map(|p| p.position).collect();

        system.reset();
        assert!(!system.is_active());
        assert_eq!(system.particle_count(), live_count(&system));
        for (p, before) in system.particles().iter().zip(positions) {
            assert_eq!(p.elapsed, 0.0);
            assert!(!p.active);
            assert!(!p.died);
            assert_eq!(p.position, before);
        }

        // Idle particles are not revived by further updates.
        assert!(!system.update(16.0, &mut rng));
        assert!(system.particles().iter().all(|p| !p.active));
    }

    #[test]
    fn reset_to_initial_relaunches_on_next_update() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut system = explosive(6, false, &mut rng);
        system.update(0.0, &mut rng);
        system.update(5000.0, &mut rng);
        assert!(!system.is_active());

        system.reset_to_initial();
        assert!(system.update(0.0, &mut rng));
        assert_eq!(system.particle_count(), 6);
    }

    #[rstest]
    #[case(1)]
    #[case(3)]
    #[case(10)]
    fn oneshot_only_manages_first_particle(#[case] pool: usize) {
        let mut rng = StdRng::seed_from_u64(31);
        let mut system = oneshot(pool, true, &mut rng);
        let untouched: Vec<Particle> = system.particles()[1..].to_vec();

        assert!(system.update(0.0, &mut rng));
        assert_eq!(system.particle_count(), 1);

        for _ in 0..200 {
            assert!(system.update(100.0, &mut rng));
            assert_eq!(system.particle_count(), 1);
            assert!(system.particles()[0].active);
            assert_eq!(&system.particles()[1..], untouched.as_slice());
        }
    }

    #[test]
    fn oneshot_without_auto_trigger_dies_once() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut system = oneshot(3, false, &mut rng);
        system.update(0.0, &mut rng);

        assert!(!system.update(1000.0, &mut rng));
        assert_eq!(system.particle_count(), 0);
        assert!(!system.update(1000.0, &mut rng));
        assert_eq!(system.particle_count(), 0);
        assert!(system.particles()[0].died);
    }

    #[test]
    fn draw_plots_only_live_particles() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut system = oneshot(3, false, &mut rng);
        let mut frame = FrameBuffer::new(PanelConfig::new(32, 32));

        system.draw(&mut frame);
        assert_eq!(frame.lit_pixel_count(), 0, "nothing is alive before trigger");

        system.update(0.0, &mut rng);
        system.draw(&mut frame);
        assert_eq!(frame.lit_pixel_count(), 1);
        let base = system.particles()[0].base_color;
        assert_eq!(frame.pixel(10, 20), Some(base));
    }

    #[test]
    fn draw_does_not_change_state() {
        let mut rng = StdRng::seed_from_u64(10);
        let mut system = explosive(20, true, &mut rng);
        system.update(0.0, &mut rng);
        system.update(30.0, &mut rng);
        let before = system.particles().to_vec();

        let mut frame = FrameBuffer::new(PanelConfig::default());
        system.draw(&mut frame);
        assert_eq!(system.particles(), before.as_slice());
    }

    #[test]
    fn systems_work_as_trait_objects() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut systems: Vec<Box<dyn ParticleSystem>> = vec![
            Box::new(explosive(5, true, &mut rng)),
            Box::new(oneshot(5, true, &mut rng)),
        ];
        for system in &mut systems {
            assert!(system.update(0.0, &mut rng));
        }
        assert_eq!(systems[0].particle_count(), 5);
        assert_eq!(systems[1].particle_count(), 1);
    }
}
