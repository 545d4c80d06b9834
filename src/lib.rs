//! Particle-system fireworks for RGB LED matrix panels.
//!
//! The simulation core is display independent:
//! - [`vector`]: unit directions and points
//! - [`velocity`]: per-tick displacement
//! - [`particle`]: aging, fading, motion
//! - [`emitter`]: how a particle is launched from the epicenter
//! - [`system`]: fixed pools of particles with trigger/death accounting
//!
//! The rest of the crate is the plumbing around it: a [`render::Renderer`]
//! boundary (headless frame buffer or the real panel), a [`clock::Clock`]
//! for computing frame deltas, presets in [`config`] and the frame loop in
//! [`demo`].

pub mod clock;
pub mod config;
pub mod demo;
pub mod emitter;
pub mod error;
pub mod particle;
pub mod render;
pub mod system;
pub mod vector;
pub mod velocity;

pub use error::SimError;

#[cfg(feature = "hardware")]
use rpi_led_matrix::{LedMatrix, LedMatrixOptions, LedRuntimeOptions};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

// ── Panel configuration ────────────────────────────────────────────

/// Longest side we accept, in pixels. Sixteen chained 64-pixel panels.
pub const MAX_PANEL_SIDE: u32 = 1024;

/// Configuration for the LED panel dimensions.
///
/// # Rust concept: derive macros
/// `Clone, Copy` make this cheaply copyable (it's just two u32s).
/// `Debug` gives us `{:?}` formatting. `PartialEq, Eq` let us compare.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelConfig {
    pub rows: u32,
    pub cols: u32,
}

impl PanelConfig {
    pub fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }

    /// Like [`PanelConfig::new`], but rejects a panel with no pixels or
    /// more than [`MAX_PANEL_SIDE`] pixels along either side.
    pub fn validated(rows: u32, cols: u32) -> Result<Self, SimError> {
        if rows == 0 || cols == 0 || rows > MAX_PANEL_SIDE || cols > MAX_PANEL_SIDE {
            return Err(SimError::InvalidPanel { rows, cols });
        }
        Ok(Self::new(rows, cols))
    }

    /// Total number of pixels on the panel.
    pub fn pixel_count(&self) -> u64 {
        self.rows as u64 * self.cols as u64
    }

    /// Center of the panel in display space, where fireworks go off by default.
    pub fn center(&self) -> vector::Point {
        vector::Point::new(self.cols as f32 / 2.0, self.rows as f32 / 2.0)
    }

    /// Returns true if `(x, y)` addresses a pixel on the panel.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.cols && (y as u32) < self.rows
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            rows: 128,
            cols: 128,
        }
    }
}

// ── Color ──────────────────────────────────────────────────────────

/// Our own color type, decoupled from the hardware crate.
///
/// Particles store plain RGB triples. At the hardware boundary we convert
/// via `Into<LedColor>`, so the simulation can be tested anywhere.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Fade this color toward black.
    ///
    /// `t` is clamped to `[0, 1]`; `0.0` returns the color unchanged and
    /// `1.0` returns black. Each channel is scaled by `1 - t` and rounded
    /// to the nearest integer, ties to even.
    ///
    /// # Rust concept: `self` by value
    /// `Color` is `Copy`, so taking `self` instead of `&self` costs nothing
    /// and reads naturally: `base.lerp_to_black(0.5)`.
    pub fn lerp_to_black(self, t: f32) -> Self {
        let intensity = 1.0 - t.clamp(0.0, 1.0);
        // Ties go to the even integer: 127.5 -> 128, 0.5 -> 0
        let scale = |channel: u8| (channel as f32 * intensity).round_ties_even() as u8;
        Self {
            r: scale(self.r),
            g: scale(self.g),
            b: scale(self.b),
        }
    }
}

/// Convert our Color to the hardware crate's LedColor at the boundary.
#[cfg(feature = "hardware")]
impl From<Color> for rpi_led_matrix::LedColor {
    fn from(c: Color) -> Self {
        rpi_led_matrix::LedColor {
            red: c.r,
            green: c.g,
            blue: c.b,
        }
    }
}

/// Linear interpolation between `min` and `max`.
pub fn lerp(min: f32, max: f32, t: f32) -> f32 {
    min + (max - min) * t
}

/// Spark colors of the "simple" preset.
pub const SIMPLE_PALETTE: [Color; 21] = [
    Color::new(255, 0, 0),     // red
    Color::new(0, 255, 0),     // green
    Color::new(0, 0, 255),     // blue
    Color::new(255, 255, 0),   // yellow
    Color::new(255, 0, 255),   // magenta
    Color::new(0, 255, 255),   // cyan
    Color::new(255, 255, 255), // white
    Color::new(128, 128, 128), // gray
    Color::new(128, 0, 0),     // dark red
    Color::new(0, 128, 0),     // dark green
    Color::new(0, 0, 128),     // dark blue
    Color::new(128, 128, 0),   // dark yellow
    Color::new(128, 0, 128),   // dark magenta
    Color::new(0, 128, 128),   // dark cyan
    Color::new(192, 192, 192), // light gray
    Color::new(192, 0, 0),     // light red
    Color::new(0, 192, 0),     // light green
    Color::new(0, 0, 192),     // light blue
    Color::new(192, 192, 0),   // light yellow
    Color::new(192, 0, 192),   // light magenta
    Color::new(0, 192, 192),   // light cyan
];

/// Spark colors of the "fade" preset. Some entries repeat, which makes
/// those colors more likely.
pub const FADE_PALETTE: [Color; 21] = [
    Color::new(255, 0, 0),     // red
    Color::new(0, 255, 0),     // green
    Color::new(0, 0, 255),     // blue
    Color::new(255, 255, 0),   // yellow
    Color::new(255, 0, 255),   // magenta
    Color::new(0, 255, 255),   // cyan
    Color::new(255, 255, 255), // white
    Color::new(128, 128, 128), // gray
    Color::new(128, 0, 0),     // dark red
    Color::new(0, 128, 0),     // dark green
    Color::new(0, 0, 128),     // dark blue
    Color::new(128, 128, 0),   // dark yellow
    Color::new(128, 0, 128),   // dark magenta
    Color::new(0, 128, 128),   // dark cyan
    Color::new(192, 192, 192), // light gray
    Color::new(255, 128, 0),   // orange
    Color::new(128, 0, 128),   // purple
    Color::new(0, 128, 128),   // teal
    Color::new(128, 128, 0),   // olive
    Color::new(128, 0, 128),   // indigo
    Color::new(0, 128, 128),   // aqua
];

/// Palette used when nothing else is configured.
pub const DEFAULT_PALETTE: [Color; 21] = FADE_PALETTE;

// ── Matrix initialization ──────────────────────────────────────────

/// Create a matrix configured for our hardware:
/// Pi Zero 2 W + Adafruit Bonnet + configurable panel size.
///
/// # Rust concept: Result and the ? operator
/// This function returns `Result` because matrix initialization can fail
/// (e.g., if not running as root, or if GPIO is unavailable).
/// The caller uses `?` to propagate errors upward.
#[cfg(feature = "hardware")]
pub fn create_matrix(panel: PanelConfig) -> Result<LedMatrix, Box<dyn std::error::Error>> {
    let mut options = LedMatrixOptions::new();
    options.set_rows(panel.rows);
    options.set_cols(panel.cols);
    options.set_hardware_mapping("adafruit-hat");

    options.set_pwm_bits(8)?; // Full 8-bit color depth, needed for smooth fades
    options.set_pwm_lsb_nanoseconds(130);

    let mut rt_options = LedRuntimeOptions::new();
    rt_options.set_gpio_slowdown(2); // Pi Zero 2 W requires slowdown=2

    let matrix = LedMatrix::new(Some(options), Some(rt_options))?;

    Ok(matrix)
}

/// Set up a Ctrl+C handler that sets `running` to false.
///
/// # Rust concept: Arc and AtomicBool
/// The `running` flag is shared between the frame loop and the signal
/// handler. `Arc` lets both own it; `AtomicBool` makes the flag safe to
/// flip from another thread without a mutex.
pub fn setup_signal_handler() -> Result<Arc<AtomicBool>, ctrlc::Error> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone(); // Clone the Arc, not the bool

    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    Ok(running)
}

/// Check if the frame loop should keep running.
pub fn is_running(running: &AtomicBool) -> bool {
    running.load(Ordering::SeqCst)
}

// ── Tests ──────────────────────────────────────────────────────────
