//! Raw-level producers: the bin-to-bar mapping over analyser bytes and the
//! seeded synthetic signal used when no live source is active.

/// Fraction of the analyser bins where the useful range starts. Everything
/// below is sub-audible rumble.
const BIN_RANGE_LOW: f32 = 0.03;
/// Fraction of the analyser bins where the useful range ends. The bins above
/// read as noise at typical capture levels.
const BIN_RANGE_HIGH: f32 = 0.65;
/// Symmetric averaging window, in bins, around each bar's sample position.
const BIN_WINDOW: usize = 6;

/// Map analyser byte magnitudes onto `bar_count` raw levels in `[0, 1]`.
///
/// Bars sample the bin range with a quadratic warp so the lower frequencies,
/// which carry most of the perceived loudness, get proportionally more of
/// the bar range than a linear spacing would give them.
pub fn bars_from_magnitudes(magnitudes: &[u8], bar_count: usize) -> Vec<f32> {
    let bins = magnitudes.len();
    let start = (BIN_RANGE_LOW * bins as f32).floor() as usize;
    let end = (BIN_RANGE_HIGH * bins as f32).floor() as usize;
    if bar_count == 0 || end <= start {
        return vec![0.0; bar_count];
    }

    let span = (end - start) as f32;
    (0..bar_count)
        .map(|i| {
            let t = if bar_count > 1 {
                i as f32 / (bar_count - 1) as f32
            } else {
                0.0
            };
            let curved = t * t;
            let center = start + (curved * span).floor() as usize;

            let lo = center.saturating_sub(BIN_WINDOW / 2).max(start);
            let hi = (center + BIN_WINDOW / 2).min(end);
            let sum: u32 = magnitudes[lo..hi].iter().map(|&m| m as u32).sum();
            sum as f32 / (hi - lo) as f32 / 255.0
        })
        .collect()
}

/// xorshift32 sequence reduced to `[0, 1)` in thousandths.
struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    fn new(seed: u32) -> Self {
        Self {
            state: seed.max(1),
        }
    }

    fn next(&mut self) -> f32 {
        let mut s = self.state;
        s ^= s << 13;
        s ^= s >> 17;
        s ^= s << 5;
        self.state = s;
        (s % 1000) as f32 / 1000.0
    }
}

/// Procedural energy signal for the synthetic visualiser variant.
///
/// A composite of three sinusoids supplies a global energy envelope; each
/// bar perturbs it with a fixed seeded "DNA" value, a slow travelling wave
/// and a faster jitter so the bars never move in lockstep. The same seed
/// reproduces the same bar profile for the same timestamps.
pub struct SyntheticLevels {
    seed: u32,
    dna: Vec<f32>,
    energy: f32,
}

impl SyntheticLevels {
    pub fn new(seed: u32, bar_count: usize) -> Self {
        Self {
            seed,
            dna: Self::generate_dna(seed, bar_count),
            energy: 0.2,
        }
    }

    fn generate_dna(seed: u32, bar_count: usize) -> Vec<f32> {
        let mut rng = XorShift32::new(seed);
        (0..bar_count).map(|_| 0.25 + rng.next() * 0.75).collect()
    }

    /// Re-derive the DNA profile from the original seed at a new bar count.
    pub fn set_bar_count(&mut self, bar_count: usize) {
        self.dna = Self::generate_dna(self.seed, bar_count);
    }

    /// Produce one frame of raw levels at `elapsed_s` seconds into the run.
    pub fn sample(&mut self, elapsed_s: f32, delta_ms: f32) -> Vec<f32> {
        let t = elapsed_s;
        let target = (0.35
            + 0.25 * (t * 2.2).sin()
            + 0.18 * (t * 5.1).sin()
            + 0.08 * (t * 11.0).sin())
        .clamp(0.0, 1.0);
        self.energy += (target - self.energy) * (1.0 - 0.001f32.powf(delta_ms.max(0.0)));

        let energy = self.energy;
        self.dna
            .iter()
            .enumerate()
            .map(|(i, &dna)| {
                let wave = 0.55 + 0.45 * (t * 2.0 + i as f32 * 0.22).sin();
                let jitter = 0.88 + 0.12 * (t * 8.0 + i as f32 * 1.7).sin();
                (dna * wave * jitter * (0.35 + energy * 1.4)).clamp(0.0, 1.0)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bin_window_stays_inside_useful_range() {
        // 1024 bins: useful range is [30, 665).
        let magnitudes: Vec<u8> = (0..1024).map(|i| (i % 256) as u8).collect();
        let bins = magnitudes.len();
        let start = (BIN_RANGE_LOW * bins as f32).floor() as usize;
        let end = (BIN_RANGE_HIGH * bins as f32).floor() as usize;

        for bar_count in [1usize, 2, 48, 64] {
            for i in [0, bar_count.saturating_sub(1)] {
                let t = if bar_count > 1 {
                    i as f32 / (bar_count - 1) as f32
                } else {
                    0.0
                };
                let center = start + (t * t * (end - start) as f32).floor() as usize;
                let lo = center.saturating_sub(BIN_WINDOW / 2).max(start);
                let hi = (center + BIN_WINDOW / 2).min(end);
                assert!(lo >= start && hi <= end && lo < hi);
            }
            // And the mapping itself must not panic or leave the unit range.
            for level in bars_from_magnitudes(&magnitudes, bar_count) {
                assert!((0.0..=1.0).contains(&level));
            }
        }
    }

    #[test]
    fn degenerate_bin_counts_yield_silence() {
        assert!(bars_from_magnitudes(&[], 8).iter().all(|&l| l == 0.0));
        assert!(bars_from_magnitudes(&[200; 1], 8).iter().all(|&l| l == 0.0));
        assert!(bars_from_magnitudes(&[200; 1024], 0).is_empty());
    }

    #[test]
    fn full_scale_bins_map_to_full_levels() {
        let levels = bars_from_magnitudes(&[255u8; 2048], 64);
        assert_eq!(levels.len(), 64);
        for level in levels {
            assert!((level - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn same_seed_same_profile() {
        let mut a = SyntheticLevels::new(7, 48);
        let mut b = SyntheticLevels::new(7, 48);
        for frame in 0..120 {
            let t = frame as f32 * 0.01667;
            assert_eq!(a.sample(t, 16.67), b.sample(t, 16.67));
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = SyntheticLevels::new(1, 48);
        let mut b = SyntheticLevels::new(2, 48);
        assert_ne!(a.sample(1.0, 16.67), b.sample(1.0, 16.67));
    }

    #[test]
    fn synthetic_levels_stay_in_unit_range() {
        let mut synth = SyntheticLevels::new(42, 64);
        for frame in 0..600 {
            let t = frame as f32 * 0.01667;
            for level in synth.sample(t, 16.67) {
                assert!((0.0..=1.0).contains(&level));
            }
        }
    }

    #[test]
    fn bar_count_change_rederives_from_seed() {
        let mut synth = SyntheticLevels::new(9, 48);
        synth.set_bar_count(64);
        let fresh = SyntheticLevels::new(9, 64);
        assert_eq!(synth.dna, fresh.dna);
    }
}
