/// Per-bar smoothing and peak-cap state.
///
/// Raw targets rise fast (attack) and fall slow (release), the way a VU-style
/// meter reads; each bar additionally carries a peak cap that tracks its
/// recent maximum and falls at a constant rate per millisecond.
pub struct BarField {
    attack: f32,
    release: f32,
    peak_fall: f32,
    smoothed: Vec<f32>,
    peaks: Vec<f32>,
}

impl BarField {
    pub fn new(bar_count: usize, attack: f32, release: f32, peak_fall: f32) -> Self {
        Self {
            attack,
            release,
            peak_fall,
            smoothed: vec![0.0; bar_count],
            peaks: vec![0.0; bar_count],
        }
    }

    pub fn bar_count(&self) -> usize {
        self.smoothed.len()
    }

    /// Reallocate both state arrays, zeroed. No bar identity survives a
    /// layout change; the visual discontinuity is accepted.
    pub fn set_bar_count(&mut self, bar_count: usize) {
        self.smoothed = vec![0.0; bar_count];
        self.peaks = vec![0.0; bar_count];
    }

    /// Integrate one frame of raw targets.
    ///
    /// `raw_levels` is expected in `[0, 1]`; out-of-range input is clamped.
    /// A length mismatch reallocates the field first.
    pub fn update(&mut self, raw_levels: &[f32], delta_ms: f32) {
        if raw_levels.len() != self.smoothed.len() {
            self.set_bar_count(raw_levels.len());
        }

        let fall = self.peak_fall * 0.01 * delta_ms.max(0.0);
        for (i, &raw) in raw_levels.iter().enumerate() {
            let target = raw.clamp(0.0, 1.0);
            let prev = self.smoothed[i];
            let rate = if target > prev { self.attack } else { self.release };
            let next = (prev + (target - prev) * rate).clamp(0.0, 1.0);
            let peak = (self.peaks[i] - fall).max(next).clamp(0.0, 1.0);
            self.smoothed[i] = next;
            self.peaks[i] = peak;
        }
    }

    /// Smoothed level of bar `i` in `[0, 1]`.
    pub fn level(&self, i: usize) -> f32 {
        self.smoothed.get(i).copied().unwrap_or(0.0)
    }

    /// Peak-cap level of bar `i` in `[0, 1]`.
    pub fn peak(&self, i: usize) -> f32 {
        self.peaks.get(i).copied().unwrap_or(0.0)
    }

    /// Bar height in pixels for a usable height of `usable_h`.
    pub fn height_px(&self, i: usize, usable_h: f32) -> f32 {
        (self.level(i) * usable_h).floor()
    }

    /// Vertical offset of the peak cap above the baseline, in pixels.
    pub fn peak_offset_px(&self, i: usize, usable_h: f32) -> f32 {
        (self.peak(i) * usable_h).floor()
    }
}
