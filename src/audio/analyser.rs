use rustfft::{num_complex::Complex, FftPlanner};

use super::AnalyserFrame;

/// Decibel range mapped onto the byte scale. Magnitudes at or below the
/// floor read as 0, at or above the ceiling as 255.
const DB_FLOOR: f32 = -100.0;
const DB_CEIL: f32 = -30.0;

/// Byte-oriented spectrum/waveform analyser.
///
/// Consumes mono sample windows and produces the two byte sequences the
/// visualiser engine understands: Hann-windowed FFT magnitudes smoothed
/// over time and mapped onto a fixed decibel range, plus the raw window as
/// time-domain bytes centred at 128.
pub struct SpectrumAnalyser {
    window_size: usize,
    smoothing: f32,
    planner: FftPlanner<f32>,
    hann: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
}

impl SpectrumAnalyser {
    /// `window_size` is the analysis window in samples (2048 pairs well with
    /// the engine's bin-mapping constants); `smoothing` is the 0..1 time
    /// constant applied to linear magnitudes before the decibel mapping.
    pub fn new(window_size: usize, smoothing: f32) -> Self {
        let hann: Vec<f32> = (0..window_size)
            .map(|i| {
                0.5 * (1.0
                    - (2.0 * std::f32::consts::PI * i as f32 / (window_size - 1) as f32).cos())
            })
            .collect();

        Self {
            window_size,
            smoothing: smoothing.clamp(0.0, 1.0),
            planner: FftPlanner::new(),
            hann,
            buffer: vec![Complex::new(0.0, 0.0); window_size],
            smoothed: vec![0.0; window_size / 2],
        }
    }

    /// Analyse one window of mono samples in `[-1, 1]`.
    ///
    /// Shorter input is zero-padded; longer input is truncated to the
    /// window.
    pub fn process(&mut self, samples: &[f32]) -> AnalyserFrame {
        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let sample = samples.get(i).copied().unwrap_or(0.0);
            *slot = Complex::new(sample * self.hann[i], 0.0);
        }

        let fft = self.planner.plan_fft_forward(self.window_size);
        fft.process(&mut self.buffer);

        let tau = self.smoothing;
        let window_size = self.window_size as f32;
        let buffer = &self.buffer;
        let magnitudes: Vec<u8> = self
            .smoothed
            .iter_mut()
            .enumerate()
            .map(|(bin, prev)| {
                let linear = buffer[bin].norm() / window_size;
                *prev = *prev * tau + linear * (1.0 - tau);
                let db = 20.0 * prev.max(1e-10).log10();
                let scaled = (db - DB_FLOOR) / (DB_CEIL - DB_FLOOR) * 255.0;
                scaled.clamp(0.0, 255.0) as u8
            })
            .collect();

        let waveform: Vec<u8> = samples
            .iter()
            .take(self.window_size)
            .map(|&s| (s.clamp(-1.0, 1.0) * 127.0 + 128.0) as u8)
            .collect();

        AnalyserFrame {
            magnitudes,
            waveform,
        }
    }
}
