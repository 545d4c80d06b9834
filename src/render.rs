//! Rendering boundary: where simulated particles become lit pixels.
//!
//! The simulation only ever calls [`Renderer::set_pixel`]. The frame loop
//! calls [`Renderer::clear`] before drawing and [`Renderer::present`] after.
//! Two renderers ship with the crate:
//! - [`FrameBuffer`]: an in-memory RGB image, used headless and in tests
//! - `MatrixRenderer` (hardware feature): the real LED panel, double-buffered
//!
//! ## Rust concepts
//! - Trait objects (`&mut dyn Renderer`) so systems don't care where pixels go
//! - `Option` for bounds-checked reads
//! - Ownership transfer with `swap()` for double buffering

use crate::{Color, PanelConfig};
use image::{Rgb, RgbImage};
use std::path::Path;

pub trait Renderer {
    /// Plot one pixel. Coordinates outside the panel are ignored.
    fn set_pixel(&mut self, x: i32, y: i32, color: Color);

    /// Blank the frame being drawn.
    fn clear(&mut self);

    /// Commit the drawn frame to the display.
    fn present(&mut self);
}

// ── Frame buffer ─────────────────────────────────────────────────────

/// Headless renderer backed by an `RgbImage`.
///
/// Pixels are drawn into a back buffer; `present` copies it to the front
/// buffer, which is what [`FrameBuffer::pixel`] and
/// [`FrameBuffer::save_png`] read.
pub struct FrameBuffer {
    panel: PanelConfig,
    back: RgbImage,
    front: RgbImage,
    frames_presented: u64,
}

impl FrameBuffer {
    pub fn new(panel: PanelConfig) -> Self {
        Self {
            panel,
            back: RgbImage::new(panel.cols, panel.rows),
            front: RgbImage::new(panel.cols, panel.rows),
            frames_presented: 0,
        }
    }

    pub fn panel(&self) -> PanelConfig {
        self.panel
    }

    /// Color of a pixel in the frame being drawn, `None` if out of bounds.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        if !self.panel.contains(x, y) {
            return None;
        }
        let p = self.back.get_pixel(x as u32, y as u32);
        Some(Color::new(p[0], p[1], p[2]))
    }

    /// Number of non-black pixels in the frame being drawn.
    pub fn lit_pixel_count(&self) -> usize {
        self.back.pixels().filter(|p| p.0 != [0, 0, 0]).count()
    }

    /// The last presented frame.
    pub fn presented(&self) -> &RgbImage {
        &self.front
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Write the last presented frame as a PNG.
    pub fn save_png(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        self.front.save(path)?;
        Ok(())
    }
}

impl Renderer for FrameBuffer {
    fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if self.panel.contains(x, y) {
            self.back
                .put_pixel(x as u32, y as u32, Rgb([color.r, color.g, color.b]));
        }
    }

    fn clear(&mut self) {
        for pixel in self.back.pixels_mut() {
            *pixel = Rgb([0, 0, 0]);
        }
    }

    fn present(&mut self) {
        self.front.clone_from(&self.back);
        self.frames_presented += 1;
    }
}

// ── LED matrix ───────────────────────────────────────────────────────

/// Renderer that owns the LED matrix and an offscreen canvas.
///
/// `present` hands the canvas to `matrix.swap()`, which shows it at the
/// next vsync and gives back the previous canvas to draw the next frame.
#[cfg(feature = "hardware")]
pub struct MatrixRenderer {
    matrix: rpi_led_matrix::LedMatrix,
    canvas: Option<rpi_led_matrix::LedCanvas>,
    panel: PanelConfig,
}

#[cfg(feature = "hardware")]
impl MatrixRenderer {
    pub fn new(panel: PanelConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let matrix = crate::create_matrix(panel)?;
        let canvas = matrix.offscreen_canvas();
        tracing::info!("LED matrix initialized ({}x{})", panel.cols, panel.rows);
        Ok(Self {
            matrix,
            canvas: Some(canvas),
            panel,
        })
    }
}

#[cfg(feature = "hardware")]
impl Renderer for MatrixRenderer {
    fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if !self.panel.contains(x, y) {
            return;
        }
        if let Some(canvas) = self.canvas.as_mut() {
            canvas.set(x, y, &color.into());
        }
    }

    fn clear(&mut self) {
        if let Some(canvas) = self.canvas.as_mut() {
            canvas.clear();
        }
    }

    fn present(&mut self) {
        // swap() consumes the canvas, so take it out and put the new one back
        if let Some(canvas) = self.canvas.take() {
            self.canvas = Some(self.matrix.swap(canvas));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tempfile::TempDir;

    #[test]
    fn set_pixel_is_visible_before_present() {
        let mut fb = FrameBuffer::new(PanelConfig::new(8, 16));
        fb.set_pixel(3, 5, Color::new(1, 2, 3));
        assert_eq!(fb.pixel(3, 5), Some(Color::new(1, 2, 3)));
        assert_eq!(fb.presented().get_pixel(3, 5).0, [0, 0, 0]);
    }

    #[rstest]
    #[case(-1, 0)]
    #[case(0, -1)]
    #[case(16, 0)]
    #[case(0, 8)]
    fn out_of_bounds_pixels_are_ignored(#[case] x: i32, #[case] y: i32) {
        let mut fb = FrameBuffer::new(PanelConfig::new(8, 16));
        fb.set_pixel(x, y, Color::WHITE);
        assert_eq!(fb.lit_pixel_count(), 0);
        assert_eq!(fb.pixel(x, y), None);
    }

    #[test]
    fn clear_blanks_the_back_buffer() {
        let mut fb = FrameBuffer::new(PanelConfig::new(4, 4));
        fb.set_pixel(0, 0, Color::WHITE);
        fb.set_pixel(3, 3, Color::WHITE);
        assert_eq!(fb.lit_pixel_count(), 2);
        fb.clear();
        assert_eq!(fb.lit_pixel_count(), 0);
    }

    #[test]
    fn present_publishes_the_frame() {
        let mut fb = FrameBuffer::new(PanelConfig::new(4, 4));
        fb.set_pixel(1, 2, Color::new(9, 8, 7));
        fb.present();
        assert_eq!(fb.frames_presented(), 1);
        assert_eq!(fb.presented().get_pixel(1, 2).0, [9, 8, 7]);

        fb.clear();
        assert_eq!(fb.presented().get_pixel(1, 2).0, [9, 8, 7]);
    }

    #[test]
    fn save_png_writes_presented_frame() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("frame.png");

        let mut fb = FrameBuffer::new(PanelConfig::new(4, 6));
        fb.set_pixel(5, 3, Color::new(255, 128, 0));
        fb.present();
        fb.save_png(&path).unwrap();

        let saved = image::open(&path).unwrap().to_rgb8();
        assert_eq!(saved.dimensions(), (6, 4));
        assert_eq!(saved.get_pixel(5, 3).0, [255, 128, 0]);
    }
}
