use libpulse_binding as pulse;
use libpulse_simple_binding as psimple;
use pulse::error::{Code, PAErr};
use pulse::sample::{Format, Spec};
use pulse::stream::Direction;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{AnalyserFrame, SpectrumAnalyser};

/// Why an acquisition attempt failed. The shell maps `Denied` onto the
/// permission-retry UI and everything else onto the generic error state.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("audio capture access was denied: {0}")]
    Denied(String),
    #[error("audio capture unavailable: {0}")]
    Unavailable(String),
}

fn map_pa_err(err: PAErr) -> CaptureError {
    let message = format!("{}", err);
    match Code::try_from(err) {
        Ok(Code::Access) => CaptureError::Denied(message),
        _ => CaptureError::Unavailable(message),
    }
}

/// Handle over the live capture thread.
///
/// Dropping the handle raises the stop flag; the thread notices on its next
/// read and exits, which in turn leaves the watch channel parked on its
/// last frame.
pub struct AudioCapture {
    _capture_thread: thread::JoinHandle<()>,
    stop_flag: Arc<AtomicBool>,
}

impl Drop for AudioCapture {
    fn drop(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }
}

impl AudioCapture {
    /// Connect to PulseAudio/PipeWire and start publishing analyser frames.
    ///
    /// With an explicit `device` the capture reads that sink's monitor;
    /// otherwise the default sink's monitor is discovered via `pactl`, so
    /// the visualiser reacts to whatever the user is listening to.
    pub fn connect(
        device: Option<String>,
        sample_rate: u32,
        window: usize,
        smoothing: f32,
        sender: watch::Sender<Option<Arc<AnalyserFrame>>>,
    ) -> Result<Self, CaptureError> {
        let source = match device {
            Some(sink) => {
                let monitor = format!("{}.monitor", sink);
                info!("Using explicit sink monitor: {}", monitor);
                Some(monitor)
            }
            None => find_monitor_source(),
        };

        let spec = Spec {
            format: Format::F32le,
            channels: 2,
            rate: sample_rate,
        };
        if !spec.is_valid() {
            return Err(CaptureError::Unavailable(format!(
                "invalid sample spec (rate {})",
                sample_rate
            )));
        }

        let stream = psimple::Simple::new(
            None,                 // default server
            "neonamp",            // application name
            Direction::Record,    // recording stream
            source.as_deref(),    // source name (None = default)
            "visualiser-capture", // stream description
            &spec,                // sample format
            None,                 // default channel map
            None,                 // default buffering attributes
        )
        .map_err(map_pa_err)?;

        info!(
            "Capturing from {}",
            source.as_deref().unwrap_or("default source")
        );

        let stop_flag = Arc::new(AtomicBool::new(false));
        let thread_stop = stop_flag.clone();
        let capture_thread = thread::spawn(move || {
            capture_loop(stream, window, smoothing, sender, thread_stop);
        });

        Ok(Self {
            _capture_thread: capture_thread,
            stop_flag,
        })
    }
}

fn capture_loop(
    stream: psimple::Simple,
    window: usize,
    smoothing: f32,
    sender: watch::Sender<Option<Arc<AnalyserFrame>>>,
    stop_flag: Arc<AtomicBool>,
) {
    let mut analyser = SpectrumAnalyser::new(window, smoothing);

    // Stereo interleaved; one read per analysis window.
    let mut buffer = vec![0.0f32; window * 2];
    let mut mono = vec![0.0f32; window];

    loop {
        if stop_flag.load(Ordering::Relaxed) {
            debug!("Stop flag set, ending capture loop");
            break;
        }

        let byte_slice = unsafe {
            std::slice::from_raw_parts_mut(
                buffer.as_mut_ptr() as *mut u8,
                buffer.len() * std::mem::size_of::<f32>(),
            )
        };
        if let Err(e) = stream.read(byte_slice) {
            warn!("PulseAudio read error: {}", e);
            continue;
        }

        for (slot, pair) in mono.iter_mut().zip(buffer.chunks_exact(2)) {
            *slot = (pair[0] + pair[1]) / 2.0;
        }

        let frame = analyser.process(&mono);
        if sender.send(Some(Arc::new(frame))).is_err() {
            debug!("Analyser receiver dropped, stopping capture");
            break;
        }
    }
}

/// Resolve the default sink's monitor source so we capture system output.
fn find_monitor_source() -> Option<String> {
    if let Ok(output) = std::process::Command::new("pactl")
        .args(["get-default-sink"])
        .output()
    {
        if output.status.success() {
            let sink = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !sink.is_empty() {
                let monitor = format!("{}.monitor", sink);
                info!("Using default sink monitor: {}", monitor);
                return Some(monitor);
            }
        }
    }

    warn!("Could not determine default sink, using PulseAudio default source");
    None
}
