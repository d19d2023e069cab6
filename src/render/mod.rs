//! Pixel render pipeline.
//!
//! The visualiser paints onto an owned RGBA surface. Draw calls are issued
//! in *CSS units* (one unit = one cell column horizontally, half a cell row
//! vertically when blitted as half-blocks); the backing store may be larger
//! by a clamped density factor, in which case the shell box-filters it back
//! down at blit time for smoother output.

pub mod frame;
pub mod layout;

pub use frame::{render_frame, RenderParams};

/// Ceiling of the supersampling density. Anything higher burns pixels the
/// half-block blit cannot show.
const MAX_PIXEL_DENSITY: f32 = 2.0;

/// Owned RGBA drawing surface with a density-scaled backing buffer.
pub struct Surface {
    data: Vec<u8>,
    backing_w: usize,
    backing_h: usize,
    css_w: f32,
    css_h: f32,
    scale: f32,
}

impl Surface {
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            backing_w: 0,
            backing_h: 0,
            css_w: 0.0,
            css_h: 0.0,
            scale: 1.0,
        }
    }

    /// Synchronise the backing buffer with a new container size.
    ///
    /// Density is clamped to `[1, 2]`. Reallocation happens only when the
    /// backing dimensions actually change, so repeated calls with identical
    /// arguments are free and leave the pixels untouched.
    pub fn resize(&mut self, css_w: u32, css_h: u32, density: f32) {
        let density = density.clamp(1.0, MAX_PIXEL_DENSITY);
        let backing_w = (css_w as f32 * density).floor() as usize;
        let backing_h = (css_h as f32 * density).floor() as usize;

        self.css_w = css_w as f32;
        self.css_h = css_h as f32;
        self.scale = density;

        if backing_w != self.backing_w || backing_h != self.backing_h {
            self.backing_w = backing_w;
            self.backing_h = backing_h;
            self.data.clear();
            self.data.resize(backing_w * backing_h * 4, 0);
        }
    }

    /// Displayed size in CSS units.
    pub fn css_size(&self) -> (f32, f32) {
        (self.css_w, self.css_h)
    }

    /// Actual pixel storage dimensions.
    pub fn backing_size(&self) -> (usize, usize) {
        (self.backing_w, self.backing_h)
    }

    /// Darken every pixel toward black by `alpha`. This is the fading-trail
    /// pass: the previous frame stays faintly visible instead of being
    /// cleared outright.
    pub fn fade(&mut self, alpha: f32) {
        let keep = 1.0 - alpha.clamp(0.0, 1.0);
        for px in self.data.chunks_exact_mut(4) {
            px[0] = (px[0] as f32 * keep) as u8;
            px[1] = (px[1] as f32 * keep) as u8;
            px[2] = (px[2] as f32 * keep) as u8;
        }
    }

    #[inline]
    fn blend_pixel(&mut self, x: usize, y: usize, color: (u8, u8, u8), alpha: f32) {
        if x >= self.backing_w || y >= self.backing_h {
            return;
        }
        let idx = (y * self.backing_w + x) * 4;
        let inv = 1.0 - alpha;
        self.data[idx] = (self.data[idx] as f32 * inv + color.0 as f32 * alpha) as u8;
        self.data[idx + 1] = (self.data[idx + 1] as f32 * inv + color.1 as f32 * alpha) as u8;
        self.data[idx + 2] = (self.data[idx + 2] as f32 * inv + color.2 as f32 * alpha) as u8;
        self.data[idx + 3] = 255;
    }

    /// Alpha-blend a filled rectangle given in CSS units. Negative origins
    /// and overhanging extents are clipped to the surface.
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: (u8, u8, u8), alpha: f32) {
        if w <= 0.0 || h <= 0.0 || alpha <= 0.0 {
            return;
        }
        let x0 = ((x * self.scale).floor().max(0.0)) as usize;
        let y0 = ((y * self.scale).floor().max(0.0)) as usize;
        let x1 = (((x + w) * self.scale).ceil().max(0.0) as usize).min(self.backing_w);
        let y1 = (((y + h) * self.scale).ceil().max(0.0) as usize).min(self.backing_h);

        for yy in y0..y1 {
            for xx in x0..x1 {
                self.blend_pixel(xx, yy, color, alpha);
            }
        }
    }

    /// Vertical line segment in CSS units, one unit wide. Used by the
    /// waveform trace to connect consecutive samples without gaps.
    pub fn vline(&mut self, x: f32, y_top: f32, y_bottom: f32, color: (u8, u8, u8), alpha: f32) {
        let (top, bottom) = if y_top <= y_bottom {
            (y_top, y_bottom)
        } else {
            (y_bottom, y_top)
        };
        self.fill_rect(x, top, 1.0, (bottom - top).max(1.0), color, alpha);
    }

    /// Average the backing pixels behind the CSS pixel at (`x`, `y`).
    ///
    /// With density 1 this is a plain lookup; with density 2 it box-filters
    /// the 2x2 supersampled block, which is what makes the higher density
    /// worth paying for.
    pub fn sample_css(&self, x: usize, y: usize) -> (u8, u8, u8) {
        let x0 = ((x as f32 * self.scale).floor() as usize).min(self.backing_w);
        let y0 = ((y as f32 * self.scale).floor() as usize).min(self.backing_h);
        let x1 = (((x + 1) as f32 * self.scale).ceil() as usize).min(self.backing_w);
        let y1 = (((y + 1) as f32 * self.scale).ceil() as usize).min(self.backing_h);
        if x0 >= x1 || y0 >= y1 {
            return (0, 0, 0);
        }

        let (mut r, mut g, mut b) = (0u32, 0u32, 0u32);
        for yy in y0..y1 {
            for xx in x0..x1 {
                let idx = (yy * self.backing_w + xx) * 4;
                r += self.data[idx] as u32;
                g += self.data[idx + 1] as u32;
                b += self.data[idx + 2] as u32;
            }
        }
        let count = ((x1 - x0) * (y1 - y0)) as u32;
        ((r / count) as u8, (g / count) as u8, (b / count) as u8)
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_is_idempotent() {
        let mut surface = Surface::new();
        surface.resize(800, 200, 1.0);
        surface.fill_rect(0.0, 0.0, 800.0, 200.0, (255, 0, 255), 1.0);
        let before = surface.sample_css(10, 10);

        surface.resize(800, 200, 1.0);
        assert_eq!(surface.backing_size(), (800, 200));
        assert_eq!(surface.sample_css(10, 10), before, "repeat resize cleared pixels");
    }

    #[test]
    fn density_is_clamped_and_scales_backing() {
        let mut surface = Surface::new();
        surface.resize(100, 50, 4.0);
        assert_eq!(surface.backing_size(), (200, 100));
        surface.resize(100, 50, 0.25);
        assert_eq!(surface.backing_size(), (100, 50));
    }

    #[test]
    fn zero_size_surface_accepts_draw_calls() {
        let mut surface = Surface::new();
        surface.resize(800, 200, 1.0);
        surface.resize(0, 0, 1.0);
        assert_eq!(surface.backing_size(), (0, 0));
        // None of these may panic or write anywhere.
        surface.fade(0.25);
        surface.fill_rect(-5.0, -5.0, 500.0, 500.0, (255, 255, 255), 0.8);
        surface.vline(3.0, 0.0, 10.0, (255, 255, 255), 0.5);
        assert_eq!(surface.sample_css(0, 0), (0, 0, 0));
    }

    #[test]
    fn fill_clips_to_surface() {
        let mut surface = Surface::new();
        surface.resize(10, 10, 1.0);
        surface.fill_rect(-3.0, -3.0, 100.0, 100.0, (200, 100, 50), 1.0);
        assert_eq!(surface.sample_css(9, 9), (200, 100, 50));
    }

    #[test]
    fn fade_darkens_toward_black() {
        let mut surface = Surface::new();
        surface.resize(4, 4, 1.0);
        surface.fill_rect(0.0, 0.0, 4.0, 4.0, (200, 200, 200), 1.0);
        surface.fade(0.25);
        let (r, _, _) = surface.sample_css(1, 1);
        assert!(r < 200 && r > 100);
        for _ in 0..60 {
            surface.fade(0.25);
        }
        assert_eq!(surface.sample_css(1, 1), (0, 0, 0));
    }

    #[test]
    fn supersampled_blit_averages_the_block() {
        let mut surface = Surface::new();
        surface.resize(2, 2, 2.0);
        assert_eq!(surface.backing_size(), (4, 4));
        // Paint half a CSS pixel at full white; the sample must come back grey.
        surface.fill_rect(0.0, 0.0, 0.5, 1.0, (255, 255, 255), 1.0);
        let (r, g, b) = surface.sample_css(0, 0);
        assert!(r > 100 && r < 160, "expected a box-filtered grey, got {r}");
        assert_eq!(r, g);
        assert_eq!(g, b);
    }
}
