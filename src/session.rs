//! One visualiser session: exclusive owner of the frame clock, the bar
//! field and the pixel surface, plus whichever level feed is active.
//!
//! The session never owns the live capture pipeline; the shell keeps that
//! handle and merely lends the session a [`LiveSource`] reader. Stopping a
//! session is a flag flip checked at the top of every frame.

use crate::audio::{AudioSource, LiveSource};
use crate::color::ColorScheme;
use crate::config::VisualizerConfig;
use crate::engine::{bars_from_magnitudes, BarField, FrameClock, SyntheticLevels};
use crate::render::{render_frame, RenderParams, Surface};

/// Acquisition state surfaced to the shell. Governs whether real analysis
/// data feeds the loop; the render pipeline itself does not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceStatus {
    Idle,
    Starting,
    Running,
    Denied,
    Error,
}

impl SourceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SourceStatus::Idle => "idle",
            SourceStatus::Starting => "starting",
            SourceStatus::Running => "running",
            SourceStatus::Denied => "denied",
            SourceStatus::Error => "error",
        }
    }
}

/// The two raw-level producers behind one seam, selected at construction
/// and swappable when live capture comes or goes.
enum LevelFeed {
    Synthetic(SyntheticLevels),
    Live(LiveSource),
}

pub struct VisualiserSession {
    config: VisualizerConfig,
    clock: FrameClock,
    bars: BarField,
    surface: Surface,
    feed: LevelFeed,
    status: SourceStatus,
    active: bool,
}

impl VisualiserSession {
    pub fn new(config: VisualizerConfig) -> Self {
        let bar_count = config.bar_count();
        Self {
            clock: FrameClock::new(),
            bars: BarField::new(bar_count, config.attack, config.release, config.peak_fall),
            surface: Surface::new(),
            feed: LevelFeed::Synthetic(SyntheticLevels::new(config.seed, bar_count)),
            status: SourceStatus::Idle,
            active: false,
            config,
        }
    }

    /// Arm the render loop. The clock restarts so the first frame sees a
    /// zero delta rather than the whole time the session sat stopped.
    pub fn start(&mut self) {
        self.active = true;
        self.clock.reset();
    }

    /// Raise the stop flag; the next scheduled frame becomes a no-op.
    pub fn stop(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn status(&self) -> SourceStatus {
        self.status
    }

    pub fn set_status(&mut self, status: SourceStatus) {
        self.status = status;
    }

    pub fn is_live(&self) -> bool {
        matches!(self.feed, LevelFeed::Live(_))
    }

    /// Swap in a live analyser reader. The bar state carries over; only the
    /// raw targets change origin.
    pub fn attach_live(&mut self, source: LiveSource) {
        self.feed = LevelFeed::Live(source);
        self.status = SourceStatus::Running;
    }

    /// Fall back to the synthetic feed (stop, or the capture went away).
    pub fn detach_live(&mut self) {
        self.feed = LevelFeed::Synthetic(SyntheticLevels::new(
            self.config.seed,
            self.config.bar_count(),
        ));
        self.status = SourceStatus::Idle;
    }

    pub fn mirror(&self) -> bool {
        self.config.mirror
    }

    /// Toggle the mirrored layout. Changing the bar count reallocates the
    /// field; the visual discontinuity on toggle is accepted.
    pub fn set_mirror(&mut self, mirror: bool) {
        if self.config.mirror == mirror {
            return;
        }
        self.config.mirror = mirror;
        let bar_count = self.config.bar_count();
        self.bars.set_bar_count(bar_count);
        if let LevelFeed::Synthetic(synth) = &mut self.feed {
            synth.set_bar_count(bar_count);
        }
    }

    pub fn scheme(&self) -> ColorScheme {
        self.config.color_scheme
    }

    pub fn cycle_scheme(&mut self) {
        self.config.color_scheme = self.config.color_scheme.next();
    }

    /// Resize entry point, driven by the shell's per-frame size observation.
    /// Idempotent; the effect is visible to the very next frame.
    pub fn notify_resize(&mut self, css_w: u32, css_h: u32) {
        self.surface.resize(css_w, css_h, self.config.pixel_density);
    }

    /// The painted surface, for the shell to blit.
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Run one frame: tick the clock, sample the feed, integrate the bar
    /// state, paint. A live feed with nothing to give renders the waiting
    /// baseline for this frame only.
    pub fn render_frame(&mut self, now_ms: f64, show_waveform: bool) {
        if !self.active {
            return;
        }

        let delta_ms = self.clock.tick(now_ms) as f32;
        let bar_count = self.config.bar_count();

        let (raw_levels, waveform) = match &mut self.feed {
            LevelFeed::Synthetic(synth) => {
                let elapsed_s = (now_ms / 1000.0) as f32;
                (Some(synth.sample(elapsed_s, delta_ms)), None)
            }
            LevelFeed::Live(source) => match source.sample_frequency_magnitudes() {
                Some(magnitudes) => (
                    Some(bars_from_magnitudes(&magnitudes, bar_count)),
                    source.sample_waveform(),
                ),
                None => (None, None),
            },
        };

        let params = RenderParams {
            mirror: self.config.mirror,
            padding_x: self.config.padding_x,
            padding_y: self.config.padding_y,
            gap: self.config.gap,
            fade_alpha: self.config.fade_alpha,
            scheme: &self.config.color_scheme,
        };

        match raw_levels {
            Some(levels) => {
                self.bars.update(&levels, delta_ms);
                let trace = if show_waveform { waveform } else { None };
                render_frame(&mut self.surface, Some(&self.bars), trace.as_deref(), &params);
            }
            None => render_frame(&mut self.surface, None, None, &params),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AnalyserFrame;
    use std::sync::Arc;
    use tokio::sync::watch;

    fn session() -> VisualiserSession {
        VisualiserSession::new(VisualizerConfig::default())
    }

    #[test]
    fn stopped_session_ignores_frames() {
        let mut s = session();
        s.notify_resize(200, 100);
        s.render_frame(16.0, false);
        // Never started: the surface stays black.
        assert_eq!(s.surface().sample_css(100, 50), (0, 0, 0));
    }

    #[test]
    fn synthetic_session_paints_after_start() {
        let mut s = session();
        s.notify_resize(200, 100);
        s.start();
        for frame in 0..30 {
            s.render_frame(frame as f64 * 16.67, false);
        }
        let lit = (0..200)
            .flat_map(|x| (20..80).map(move |y| (x, y)))
            .filter(|&(x, y)| s.surface().sample_css(x, y) != (0, 0, 0))
            .count();
        assert!(lit > 100, "synthetic feed never lit the surface ({lit})");
    }

    #[test]
    fn live_session_without_frames_renders_waiting_state() {
        let (_tx, rx) = watch::channel(None);
        let mut s = session();
        s.notify_resize(200, 100);
        s.start();
        s.attach_live(LiveSource::new(rx));
        assert_eq!(s.status(), SourceStatus::Running);

        s.render_frame(0.0, true);
        // Waiting baseline only: midline dark, baseline lit.
        assert_eq!(s.surface().sample_css(100, 50), (0, 0, 0));
        assert_ne!(s.surface().sample_css(100, 81), (0, 0, 0));
        // A sample gap does not transition the status.
        assert_eq!(s.status(), SourceStatus::Running);
    }

    #[test]
    fn live_frames_drive_the_bars() {
        let (tx, rx) = watch::channel(None);
        let mut s = session();
        s.notify_resize(200, 100);
        s.start();
        s.attach_live(LiveSource::new(rx));

        tx.send(Some(Arc::new(AnalyserFrame {
            magnitudes: vec![255; 1024],
            waveform: Vec::new(),
        })))
        .unwrap();
        for frame in 0..20 {
            s.render_frame(frame as f64 * 16.67, false);
        }

        let lit = (0..200)
            .flat_map(|x| (0..100).map(move |y| (x, y)))
            .filter(|&(x, y)| s.surface().sample_css(x, y) != (0, 0, 0))
            .count();
        assert!(lit > 1000, "live frames never lit the surface ({lit})");
    }

    #[test]
    fn mirror_toggle_switches_bar_counts() {
        let mut s = session();
        assert!(!s.mirror());
        s.set_mirror(true);
        assert!(s.mirror());
        // Toggling back and forth is stable.
        s.set_mirror(true);
        s.set_mirror(false);
        assert!(!s.mirror());
    }

    #[test]
    fn detach_live_returns_to_idle_synthetic() {
        let (_tx, rx) = watch::channel(None);
        let mut s = session();
        s.attach_live(LiveSource::new(rx));
        assert!(s.is_live());
        s.detach_live();
        assert!(!s.is_live());
        assert_eq!(s.status(), SourceStatus::Idle);
    }

    #[test]
    fn zero_sized_surface_survives_a_full_frame() {
        let mut s = session();
        s.notify_resize(800, 200);
        s.start();
        s.render_frame(0.0, true);
        s.notify_resize(0, 0);
        s.render_frame(16.67, true);
        s.render_frame(33.3, true);
    }
}
