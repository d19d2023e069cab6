//! Bar geometry shared by every paint pass.

/// Pre-computed bar layout in CSS units.
pub struct BarLayout {
    pub origin_x: f32,
    pub origin_y: f32,
    pub usable_w: f32,
    pub usable_h: f32,
    pub bar_w: f32,
    pub gap: f32,
    pub bar_count: usize,
}

/// Narrowest a bar is allowed to get before it stops reading as a bar.
const MIN_BAR_WIDTH: f32 = 2.0;

impl BarLayout {
    /// Compute the layout for a surface of `css_w` x `css_h`.
    ///
    /// Degenerate sizes never fail: usable extents are floored at one pixel
    /// and the bar width at two, so a hidden or collapsing container simply
    /// produces clipped draw calls.
    pub fn compute(
        css_w: f32,
        css_h: f32,
        bar_count: usize,
        padding_x: f32,
        padding_y: f32,
        gap: f32,
    ) -> Self {
        let usable_w = (css_w - padding_x * 2.0).max(1.0);
        let usable_h = (css_h - padding_y * 2.0).max(1.0);
        let count = bar_count.max(1);
        let bar_w = (((usable_w - gap * (count - 1) as f32) / count as f32).floor())
            .max(MIN_BAR_WIDTH);

        Self {
            origin_x: padding_x,
            origin_y: padding_y,
            usable_w,
            usable_h,
            bar_w,
            gap,
            bar_count: count,
        }
    }

    /// Left edge of bar `i`.
    pub fn bar_x(&self, i: usize) -> f32 {
        self.origin_x + i as f32 * (self.bar_w + self.gap)
    }

    /// Vertical midline of the usable area (mirror axis / waveform centre).
    pub fn mid_y(&self) -> f32 {
        self.origin_y + self.usable_h / 2.0
    }

    /// Bottom edge of the usable area (baseline of non-mirrored bars).
    pub fn baseline_y(&self) -> f32 {
        self.origin_y + self.usable_h
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_width_comes_from_usable_width() {
        let layout = BarLayout::compute(800.0, 200.0, 64, 18.0, 18.0, 3.0);
        assert_eq!(layout.usable_w, 764.0);
        assert_eq!(layout.usable_h, 164.0);
        // (764 - 3*63) / 64 = 8.98... -> 8
        assert_eq!(layout.bar_w, 8.0);
        assert_eq!(layout.bar_x(0), 18.0);
        assert_eq!(layout.bar_x(1), 29.0);
    }

    #[test]
    fn bar_width_never_collapses_below_minimum() {
        let layout = BarLayout::compute(40.0, 30.0, 64, 18.0, 18.0, 3.0);
        assert!(layout.bar_w >= 2.0);
        assert!(layout.usable_w >= 1.0);
        assert!(layout.usable_h >= 1.0);
    }

    #[test]
    fn zero_surface_still_produces_a_layout() {
        let layout = BarLayout::compute(0.0, 0.0, 48, 18.0, 18.0, 3.0);
        assert_eq!(layout.usable_w, 1.0);
        assert_eq!(layout.usable_h, 1.0);
        assert!(layout.bar_w >= 2.0);
    }

    #[test]
    fn zero_bar_count_is_clamped() {
        let layout = BarLayout::compute(800.0, 200.0, 0, 18.0, 18.0, 3.0);
        assert_eq!(layout.bar_count, 1);
    }
}
