mod analyser;
mod capture;

pub use analyser::SpectrumAnalyser;
pub use capture::{AudioCapture, CaptureError};

use std::sync::Arc;
use tokio::sync::watch;

/// One analysis snapshot published by the capture thread.
///
/// Both sequences use the analyser's byte convention: frequency magnitudes
/// in `0..=255`, time-domain samples centred at 128.
#[derive(Debug, Clone, Default)]
pub struct AnalyserFrame {
    pub magnitudes: Vec<u8>,
    pub waveform: Vec<u8>,
}

/// The capability the visualiser session consumes: two per-frame snapshot
/// queries, either of which may come back absent. Absence is a normal state
/// (source not ready, or a transient gap), never an error.
pub trait AudioSource {
    /// Frequency-bin energy snapshot; length is stable for the lifetime of
    /// one acquisition.
    fn sample_frequency_magnitudes(&mut self) -> Option<Vec<u8>>;

    /// Time-domain amplitude snapshot, bytes centred at 128. Optional
    /// capability; absent when the producer does not supply it.
    fn sample_waveform(&mut self) -> Option<Vec<u8>>;
}

/// Live [`AudioSource`] fed by the capture thread through a watch channel.
///
/// The channel is owned elsewhere (the shell keeps the [`AudioCapture`]
/// handle alive); this reader only ever borrows the latest frame, and keeps
/// rendering from absence if the producer dies.
pub struct LiveSource {
    rx: watch::Receiver<Option<Arc<AnalyserFrame>>>,
    latest: Option<Arc<AnalyserFrame>>,
}

impl LiveSource {
    pub fn new(rx: watch::Receiver<Option<Arc<AnalyserFrame>>>) -> Self {
        Self { rx, latest: None }
    }
}

impl AudioSource for LiveSource {
    fn sample_frequency_magnitudes(&mut self) -> Option<Vec<u8>> {
        // A dropped sender means the capture thread is gone; from here on
        // every sample reads as absent instead of replaying the last frame.
        if self.rx.has_changed().is_err() {
            self.latest = None;
            return None;
        }
        self.latest = self.rx.borrow_and_update().clone();
        self.latest
            .as_ref()
            .map(|frame| frame.magnitudes.clone())
            .filter(|m| !m.is_empty())
    }

    fn sample_waveform(&mut self) -> Option<Vec<u8>> {
        // Reuses the frame fetched by the magnitudes query this frame.
        self.latest
            .as_ref()
            .map(|frame| frame.waveform.clone())
            .filter(|w| !w.is_empty())
    }
}

/// Spin up the capture pipeline: a PulseAudio monitor stream feeding the
/// byte analyser on a dedicated thread, frames published over watch.
///
/// Returns the capture handle (keep it alive; dropping it stops the thread)
/// and the receiving side for [`LiveSource`].
pub fn create_capture_pipeline(
    device: Option<String>,
    sample_rate: u32,
    window: usize,
    smoothing: f32,
) -> Result<(AudioCapture, watch::Receiver<Option<Arc<AnalyserFrame>>>), CaptureError> {
    let (tx, rx) = watch::channel(None);
    let capture = AudioCapture::connect(device, sample_rate, window, smoothing, tx)?;
    Ok((capture, rx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_source_reports_absent_until_a_frame_lands() {
        let (tx, rx) = watch::channel(None);
        let mut source = LiveSource::new(rx);
        assert!(source.sample_frequency_magnitudes().is_none());
        assert!(source.sample_waveform().is_none());

        tx.send(Some(Arc::new(AnalyserFrame {
            magnitudes: vec![10; 1024],
            waveform: vec![128; 2048],
        })))
        .unwrap();

        let mags = source.sample_frequency_magnitudes().unwrap();
        assert_eq!(mags.len(), 1024);
        assert_eq!(source.sample_waveform().unwrap().len(), 2048);
    }

    #[test]
    fn empty_waveform_is_treated_as_absent_capability() {
        let (tx, rx) = watch::channel(None);
        let mut source = LiveSource::new(rx);
        tx.send(Some(Arc::new(AnalyserFrame {
            magnitudes: vec![10; 8],
            waveform: Vec::new(),
        })))
        .unwrap();

        assert!(source.sample_frequency_magnitudes().is_some());
        assert!(source.sample_waveform().is_none());
    }

    #[test]
    fn dead_producer_reads_as_absent() {
        let (tx, rx) = watch::channel(Some(Arc::new(AnalyserFrame {
            magnitudes: vec![42; 16],
            waveform: vec![128; 16],
        })));
        let mut source = LiveSource::new(rx);
        assert!(source.sample_frequency_magnitudes().is_some());

        drop(tx);
        // A vanished producer is a permanent gap, not a failure, and the
        // stale frame must not keep replaying.
        assert!(source.sample_frequency_magnitudes().is_none());
        assert!(source.sample_waveform().is_none());
    }
}
