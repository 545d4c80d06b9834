//! Matrix fireworks
//!
//! Runs a particle-system fireworks show on an RGB LED matrix, or headless
//! into an in-memory frame buffer when there is no panel attached.
//!
//! ## Architecture
//! - **Particle system**: explosive burst or oneshot spark, built from a preset
//! - **Renderer**: the LED matrix (hardware feature) or a `FrameBuffer`
//! - **Frame loop**: `Demo` computes dt from a clock, updates, draws, presents
//!
//! ## Usage
//! ```sh
//! sudo ./target/release/matrix-fireworks --preset fade --rows 64 --cols 64
//! cargo run --no-default-features -- --headless --simulated-clock --snapshot last.png
//! ```

use clap::Parser;
use matrix_fireworks::clock::{Clock, MonotonicClock, SimulatedClock};
use matrix_fireworks::config::{EmitterKind, FireworksConfig, Preset, SystemMode};
use matrix_fireworks::demo::Demo;
use matrix_fireworks::render::{FrameBuffer, Renderer};
use matrix_fireworks::{PanelConfig, setup_signal_handler};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use tracing_subscriber::EnvFilter;

/// Particle-system fireworks for RGB LED matrix panels
#[derive(Parser)]
#[command(name = "matrix-fireworks")]
#[command(version)]
struct Args {
    /// Number of rows on the LED panel
    #[arg(long, default_value = "128")]
    rows: u32,

    /// Number of columns on the LED panel
    #[arg(long, default_value = "128")]
    cols: u32,

    /// Starting settings; the flags below override individual values
    #[arg(long, value_enum, default_value = "fade")]
    preset: Preset,

    /// Particle system to run
    #[arg(long, value_enum, default_value = "explosive")]
    mode: SystemMode,

    /// How sparks leave the center of the panel
    #[arg(long, value_enum, default_value = "radial")]
    emitter: EmitterKind,

    /// Size of the particle pool
    #[arg(long)]
    particles: Option<usize>,

    /// Longest a spark can live, in seconds
    #[arg(long)]
    max_lifespan: Option<f32>,

    /// Fastest a spark can move, in pixels per frame
    #[arg(long)]
    max_speed: Option<f32>,

    /// Let the show end once every spark has died
    #[arg(long)]
    no_auto_trigger: bool,

    /// Stop after this many milliseconds
    #[arg(long, default_value = "10000", conflicts_with = "forever")]
    duration_ms: f64,

    /// Run until Ctrl+C
    #[arg(long)]
    forever: bool,

    /// Target frame period in milliseconds (0 = no pacing)
    #[arg(long, default_value = "17")]
    frame_ms: u64,

    /// Seed for the random generator, for reproducible shows
    #[arg(long)]
    seed: Option<u64>,

    /// Draw into an in-memory frame buffer instead of the LED matrix
    #[arg(long)]
    headless: bool,

    /// Advance time by a fixed 16.7ms per frame instead of the wall clock
    #[arg(long)]
    simulated_clock: bool,

    /// Save the last headless frame as a PNG
    #[arg(long, requires = "headless")]
    snapshot: Option<PathBuf>,

    /// Log every particle on every frame (very verbose)
    #[arg(long)]
    trace_particles: bool,
}

impl Args {
    fn to_config(&self) -> FireworksConfig {
        let mut config = FireworksConfig::preset(self.preset)
            .with_panel(PanelConfig::new(self.rows, self.cols))
            .with_mode(self.mode)
            .with_emitter(self.emitter)
            .with_auto_trigger(!self.no_auto_trigger)
            .with_frame_ms(self.frame_ms)
            .with_run_duration_ms((!self.forever).then_some(self.duration_ms));

        if let Some(particles) = self.particles {
            config = config.with_particles(particles);
        }
        if let Some(seconds) = self.max_lifespan {
            config = config.with_max_lifespan(seconds);
        }
        if let Some(speed) = self.max_speed {
            config = config.with_max_speed(speed);
        }
        config
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_filter = if args.trace_particles {
        "info,matrix_fireworks::system=trace"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false) // Disable ANSI color codes for systemd/journald
        .compact()
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.to_config();
    PanelConfig::validated(config.panel.rows, config.panel.cols)?;

    tracing::info!("Matrix fireworks v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Panel: {}x{}", config.panel.cols, config.panel.rows);
    tracing::info!(
        "{:?} system, {:?} emitter, {} particles, max lifespan {}s, max speed {}",
        config.mode,
        config.emitter,
        config.particles,
        config.max_lifespan,
        config.max_speed
    );

    let rng = match args.seed {
        Some(seed) => {
            tracing::info!("Seed: {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_os_rng(),
    };

    let running = setup_signal_handler()?;

    if args.headless {
        let frame = FrameBuffer::new(config.panel);
        let frame = with_clock(args, &config, frame, rng, &running)?;
        tracing::info!("Presented {} frames", frame.frames_presented());
        if let Some(path) = &args.snapshot {
            frame.save_png(path)?;
            tracing::info!("Saved last frame to {}", path.display());
        }
        return Ok(());
    }

    run_on_matrix(args, &config, rng, &running)
}

#[cfg(feature = "hardware")]
fn run_on_matrix(
    args: &Args,
    config: &FireworksConfig,
    rng: StdRng,
    running: &AtomicBool,
) -> Result<(), Box<dyn std::error::Error>> {
    use matrix_fireworks::render::MatrixRenderer;

    let matrix = MatrixRenderer::new(config.panel)?;
    with_clock(args, config, matrix, rng, running)?;
    println!("\nShutting down cleanly.");
    Ok(())
}

#[cfg(not(feature = "hardware"))]
fn run_on_matrix(
    _args: &Args,
    _config: &FireworksConfig,
    _rng: StdRng,
    _running: &AtomicBool,
) -> Result<(), Box<dyn std::error::Error>> {
    Err("Driving the LED matrix requires the 'hardware' feature; use --headless instead".into())
}

fn with_clock<R: Renderer>(
    args: &Args,
    config: &FireworksConfig,
    renderer: R,
    rng: StdRng,
    running: &AtomicBool,
) -> Result<R, Box<dyn std::error::Error>> {
    if args.simulated_clock {
        drive(config, renderer, SimulatedClock::default(), rng, running)
    } else {
        drive(config, renderer, MonotonicClock::new(), rng, running)
    }
}

fn drive<R: Renderer, C: Clock>(
    config: &FireworksConfig,
    renderer: R,
    clock: C,
    rng: StdRng,
    running: &AtomicBool,
) -> Result<R, Box<dyn std::error::Error>> {
    let mut demo = Demo::new(config, renderer, clock, rng)?;
    demo.run(running);
    Ok(demo.into_renderer())
}
