//! Per-frame paint sequence.
//!
//! The layered "neon" look depends on draw order: background fade first,
//! then for every bar a widened low-alpha glow pass, the solid core with a
//! brighter strip near its top, and the falling peak cap; the optional
//! waveform trace and the glass sheen go on last.

use crate::color::ColorScheme;
use crate::engine::BarField;

use super::layout::BarLayout;
use super::Surface;

const GLOW_ALPHA: f32 = 0.18;
const CORE_ALPHA: f32 = 0.75;
const STRIP_ALPHA: f32 = 0.22;
const CAP_ALPHA: f32 = 0.92;
const WAVE_ALPHA: f32 = 0.5;
const SHEEN_ALPHA: f32 = 0.05;
const BASELINE_ALPHA: f32 = 0.25;

/// Waveform swing as a fraction of the usable height.
const WAVE_AMPLITUDE: f32 = 0.35;
/// Peak cap thickness and its clearance above the bar top, CSS units.
const CAP_HEIGHT: f32 = 2.0;
const CAP_GAP: f32 = 1.0;

/// Knobs the session feeds through from configuration.
pub struct RenderParams<'a> {
    pub mirror: bool,
    pub padding_x: f32,
    pub padding_y: f32,
    pub gap: f32,
    pub fade_alpha: f32,
    pub scheme: &'a ColorScheme,
}

/// Paint one frame.
///
/// `bars: None` is the waiting state: only the fade, a thin baseline and the
/// sheen are painted, with no bar computation at all.
pub fn render_frame(
    surface: &mut Surface,
    bars: Option<&BarField>,
    waveform: Option<&[u8]>,
    params: &RenderParams,
) {
    let (w, h) = surface.css_size();
    surface.fade(params.fade_alpha);

    match bars {
        Some(bars) => {
            let layout = BarLayout::compute(
                w,
                h,
                bars.bar_count(),
                params.padding_x,
                params.padding_y,
                params.gap,
            );
            paint_bars(surface, bars, &layout, params);
            if let Some(samples) = waveform {
                paint_waveform(surface, samples, &layout, params);
            }
        }
        None => paint_waiting_baseline(surface, params),
    }

    // Glass sheen across the top of the panel.
    surface.fill_rect(0.0, 0.0, w, (h * 0.12).max(1.0), (255, 255, 255), SHEEN_ALPHA);
}

fn paint_bars(surface: &mut Surface, bars: &BarField, layout: &BarLayout, params: &RenderParams) {
    let count = layout.bar_count.min(bars.bar_count());

    // Glow first so every core lands on top of its own halo.
    for pass in 0..2 {
        let glow = pass == 0;
        for i in 0..count {
            let x = layout.bar_x(i);
            let position = i as f32 / count.max(1) as f32;
            let level = bars.level(i);
            let bar_h = bars.height_px(i, layout.usable_h).max(1.0);
            let color = params.scheme.get_color(position, level);

            let (y, height) = if params.mirror {
                (layout.mid_y() - bar_h / 2.0, bar_h)
            } else {
                (layout.baseline_y() - bar_h, bar_h)
            };

            if glow {
                surface.fill_rect(
                    x - 1.0,
                    y - 1.0,
                    layout.bar_w + 2.0,
                    height + 2.0,
                    color,
                    GLOW_ALPHA,
                );
            } else {
                surface.fill_rect(x, y, layout.bar_w, height, color, CORE_ALPHA);
                let strip_h = (height * 0.25).floor().max(2.0).min(height);
                surface.fill_rect(x, y, layout.bar_w, strip_h, color, STRIP_ALPHA);
                paint_peak_cap(surface, bars, layout, params, i, x, color);
            }
        }
    }
}

fn paint_peak_cap(
    surface: &mut Surface,
    bars: &BarField,
    layout: &BarLayout,
    params: &RenderParams,
    i: usize,
    x: f32,
    color: (u8, u8, u8),
) {
    let offset = bars.peak_offset_px(i, layout.usable_h);
    if offset < 1.0 {
        return;
    }

    if params.mirror {
        let above = (layout.mid_y() - offset / 2.0 - CAP_GAP - CAP_HEIGHT).max(layout.origin_y);
        let below =
            (layout.mid_y() + offset / 2.0 + CAP_GAP).min(layout.baseline_y() - CAP_HEIGHT);
        surface.fill_rect(x, above, layout.bar_w, CAP_HEIGHT, color, CAP_ALPHA);
        surface.fill_rect(x, below, layout.bar_w, CAP_HEIGHT, color, CAP_ALPHA);
    } else {
        let y = (layout.baseline_y() - offset - CAP_GAP - CAP_HEIGHT).max(layout.origin_y);
        surface.fill_rect(x, y, layout.bar_w, CAP_HEIGHT, color, CAP_ALPHA);
    }
}

/// Connected line trace of the time-domain samples, centred on the midline.
fn paint_waveform(
    surface: &mut Surface,
    samples: &[u8],
    layout: &BarLayout,
    params: &RenderParams,
) {
    if samples.is_empty() {
        return;
    }

    let columns = layout.usable_w.floor() as usize;
    if columns == 0 {
        return;
    }

    let mid = layout.mid_y();
    let amplitude = layout.usable_h * WAVE_AMPLITUDE;
    let color = params.scheme.get_color(0.5, 0.9);

    let mut prev_y: Option<f32> = None;
    for col in 0..columns {
        let idx = (col * samples.len()) / columns;
        let sample = (samples[idx.min(samples.len() - 1)] as f32 - 128.0) / 128.0;
        let y = (mid - sample * amplitude)
            .clamp(layout.origin_y, layout.baseline_y() - 1.0);

        let x = layout.origin_x + col as f32;
        surface.vline(x, prev_y.unwrap_or(y), y, color, WAVE_ALPHA);
        prev_y = Some(y);
    }
}

/// The documented "waiting" visual: a thin accent line along the baseline
/// while no analysis source is ready. Not an error state.
fn paint_waiting_baseline(surface: &mut Surface, params: &RenderParams) {
    let (w, h) = surface.css_size();
    let layout = BarLayout::compute(w, h, 1, params.padding_x, params.padding_y, params.gap);
    let color = params.scheme.get_color(0.5, 0.6);
    surface.fill_rect(
        layout.origin_x,
        layout.baseline_y() - 1.0,
        layout.usable_w,
        1.0,
        color,
        BASELINE_ALPHA,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorScheme;

    fn params(scheme: &ColorScheme) -> RenderParams<'_> {
        RenderParams {
            mirror: false,
            padding_x: 18.0,
            padding_y: 18.0,
            gap: 3.0,
            fade_alpha: 0.25,
            scheme,
        }
    }

    fn loud_bars(count: usize) -> BarField {
        let mut bars = BarField::new(count, 0.55, 0.14, 0.35);
        for _ in 0..20 {
            bars.update(&vec![1.0; count], 16.67);
        }
        bars
    }

    #[test]
    fn bars_leave_pixels_on_the_surface() {
        let scheme = ColorScheme::default();
        let mut surface = Surface::new();
        surface.resize(800, 200, 1.0);
        let bars = loud_bars(64);

        render_frame(&mut surface, Some(&bars), None, &params(&scheme));

        let lit = (0..800)
            .flat_map(|x| (0..200).map(move |y| (x, y)))
            .filter(|&(x, y)| surface.sample_css(x, y) != (0, 0, 0))
            .count();
        assert!(lit > 1000, "only {lit} pixels lit");
    }

    #[test]
    fn waiting_frame_paints_only_the_baseline_band() {
        let scheme = ColorScheme::default();
        let mut surface = Surface::new();
        surface.resize(400, 100, 1.0);

        render_frame(&mut surface, None, None, &params(&scheme));

        // Middle of the panel stays dark; the baseline row does not.
        assert_eq!(surface.sample_css(200, 50), (0, 0, 0));
        let baseline = surface.sample_css(200, 81);
        assert_ne!(baseline, (0, 0, 0));
    }

    // Container collapsed to nothing: the full paint sequence must survive.
    #[test]
    fn shrinking_to_zero_never_panics() {
        let scheme = ColorScheme::default();
        let mut surface = Surface::new();
        surface.resize(800, 200, 1.0);
        let bars = loud_bars(48);

        render_frame(&mut surface, Some(&bars), None, &params(&scheme));
        surface.resize(0, 0, 1.0);
        render_frame(&mut surface, Some(&bars), Some(&[0u8, 128, 255]), &params(&scheme));
        render_frame(&mut surface, None, None, &params(&scheme));
    }

    #[test]
    fn mirror_mode_paints_both_halves() {
        let scheme = ColorScheme::default();
        let mut surface = Surface::new();
        surface.resize(400, 100, 1.0);
        let bars = loud_bars(48);
        let mut p = params(&scheme);
        p.mirror = true;

        render_frame(&mut surface, Some(&bars), None, &p);

        let above = surface.sample_css(60, 30);
        let below = surface.sample_css(60, 70);
        assert_ne!(above, (0, 0, 0));
        assert_ne!(below, (0, 0, 0));
    }

    #[test]
    fn waveform_trace_marks_the_midline_region() {
        let scheme = ColorScheme::default();
        let mut surface = Surface::new();
        surface.resize(400, 100, 1.0);
        let bars = BarField::new(64, 0.55, 0.14, 0.35);
        let flat = vec![128u8; 512];

        render_frame(&mut surface, Some(&bars), Some(&flat), &params(&scheme));

        // A flat waveform is a horizontal line on the midline.
        assert_ne!(surface.sample_css(200, 50), (0, 0, 0));
    }
}
