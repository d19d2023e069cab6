/// Largest delta a single frame may observe, in milliseconds.
///
/// A suspended terminal or a long scheduler stall would otherwise inject a
/// huge step into the smoothing state and make every bar snap.
const MAX_DELTA_MS: f64 = 50.0;

/// Monotonic per-frame delta-time source.
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self { last_ms: None }
    }

    /// Advance the clock to `now_ms` and return the clamped delta.
    ///
    /// The first tick after construction or [`reset`](Self::reset) returns
    /// `0.0` and only records the baseline. A regressing timestamp yields
    /// `0.0`, never a negative delta.
    pub fn tick(&mut self, now_ms: f64) -> f64 {
        let delta = match self.last_ms {
            Some(last) => (now_ms - last).clamp(0.0, MAX_DELTA_MS),
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        delta
    }

    /// Forget the baseline so the next tick starts a fresh run.
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_returns_zero() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(1234.5), 0.0);
    }

    #[test]
    fn delta_between_ticks() {
        let mut clock = FrameClock::new();
        clock.tick(100.0);
        assert!((clock.tick(116.67) - 16.67).abs() < 1e-9);
    }

    #[test]
    fn delta_clamped_to_50ms() {
        let mut clock = FrameClock::new();
        clock.tick(0.0);
        assert_eq!(clock.tick(5000.0), 50.0);
        // Baseline still advances to the observed timestamp.
        assert!((clock.tick(5016.0) - 16.0).abs() < 1e-9);
    }

    #[test]
    fn regressing_timestamp_yields_zero() {
        let mut clock = FrameClock::new();
        clock.tick(1000.0);
        assert_eq!(clock.tick(900.0), 0.0);
        assert_eq!(clock.tick(916.0), 16.0);
    }

    #[test]
    fn reset_restarts_the_run() {
        let mut clock = FrameClock::new();
        clock.tick(0.0);
        clock.tick(16.0);
        clock.reset();
        assert_eq!(clock.tick(2000.0), 0.0);
    }
}
