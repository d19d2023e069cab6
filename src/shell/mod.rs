//! Terminal shell: the retro player chrome around the visualiser panel.
//!
//! Owns the ~60 fps loop, the keybindings, the live-capture acquisition
//! state machine and the per-frame resize observation. The session itself
//! never blocks; acquisition runs on its own thread and lands through a
//! channel polled once per frame.

mod chrome;
mod view;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io::{self, stdout};
use std::sync::mpsc::{self, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::audio::{self, AnalyserFrame, AudioCapture, CaptureError, LiveSource};
use crate::config::Config;
use crate::metadata::{self, PlayerCommand, Transport};
use crate::session::{SourceStatus, VisualiserSession};

type AcquisitionOutcome =
    Result<(AudioCapture, watch::Receiver<Option<Arc<AnalyserFrame>>>), CaptureError>;

pub async fn run(config: Config) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, config).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

struct App {
    config: Config,
    session: VisualiserSession,
    /// Live capture pipeline; dropping it stops the capture thread.
    capture: Option<AudioCapture>,
    /// In-flight acquisition attempt, polled once per frame.
    pending: Option<mpsc::Receiver<AcquisitionOutcome>>,
    show_waveform: bool,
}

impl App {
    fn new(config: Config) -> Self {
        let show_waveform = config.shell.show_waveform;
        Self {
            session: VisualiserSession::new(config.visualizer.clone()),
            capture: None,
            pending: None,
            show_waveform,
            config,
        }
    }

    /// Kick off live acquisition on a worker thread. The loop keeps
    /// rendering the waiting state until the result lands.
    fn begin_acquisition(&mut self) {
        if self.pending.is_some() {
            return;
        }
        self.session.set_status(SourceStatus::Starting);

        let device = self.config.audio.device.clone();
        let sample_rate = self.config.audio.sample_rate;
        let window = self.config.audio.window;
        let smoothing = self.config.audio.smoothing;

        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let _ = tx.send(audio::create_capture_pipeline(
                device,
                sample_rate,
                window,
                smoothing,
            ));
        });
        self.pending = Some(rx);
    }

    fn poll_acquisition(&mut self) {
        let Some(rx) = &self.pending else { return };
        match rx.try_recv() {
            Ok(Ok((capture, frames))) => {
                info!("Live capture attached");
                self.capture = Some(capture);
                self.session.attach_live(LiveSource::new(frames));
                self.pending = None;
            }
            Ok(Err(e)) => {
                warn!("Acquisition failed: {}", e);
                let status = match e {
                    CaptureError::Denied(_) => SourceStatus::Denied,
                    CaptureError::Unavailable(_) => SourceStatus::Error,
                };
                self.session.set_status(status);
                self.pending = None;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                self.session.set_status(SourceStatus::Error);
                self.pending = None;
            }
        }
    }

    /// Release the capture and the in-flight attempt together, then fall
    /// back to the synthetic feed.
    fn stop_live(&mut self) {
        self.capture = None;
        self.pending = None;
        self.session.detach_live();
    }

    fn toggle_live(&mut self) {
        if self.session.is_live() || self.pending.is_some() {
            self.stop_live();
        } else {
            self.begin_acquisition();
        }
    }
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: Config,
) -> Result<()> {
    let (transport, mut track_rx) = metadata::start_transport();

    let mut app = App::new(config);
    app.session.start();
    if app.config.shell.start_live {
        app.begin_acquisition();
    }

    let frame_budget = Duration::from_secs_f64(1.0 / app.config.shell.fps.max(1) as f64);
    let epoch = Instant::now();
    let mut window_title = String::new();

    loop {
        // Stop flag first: a stopped session schedules nothing further.
        if !app.session.is_active() {
            break;
        }

        app.poll_acquisition();

        // Observe the container size before painting so the backing buffer
        // is in sync for this frame. Two CSS rows per terminal cell.
        let size = terminal.size()?;
        let layout = chrome::ShellLayout::compute(Rect::new(0, 0, size.width, size.height));
        let viz = layout.visualiser_inner();
        app.session
            .notify_resize(viz.width as u32, viz.height as u32 * 2);

        let now_ms = epoch.elapsed().as_secs_f64() * 1000.0;
        app.session.render_frame(now_ms, app.show_waveform);

        let track = track_rx.borrow_and_update().clone();

        // Mirror the current track into the terminal title, player-style.
        let title = if track.has_info() {
            format!("{} - neonamp", track.display_text())
        } else {
            "neonamp".to_string()
        };
        if title != window_title {
            execute!(io::stdout(), crossterm::terminal::SetTitle(&title))?;
            window_title = title;
        }

        terminal.draw(|frame| {
            // Recompute against the actual frame area; the terminal may have
            // resized since the pre-frame size poll.
            let layout = chrome::ShellLayout::compute(frame.area());
            chrome::draw(frame, &layout, &app.session, &track, app.show_waveform);
        })?;

        // Spend the rest of the frame budget waiting for input.
        if event::poll(frame_budget)? {
            if let Event::Key(key) = event::read()? {
                handle_key(key, &mut app, &transport);
            }
        }
    }

    // Stopping releases the capture and the resize observation together.
    app.stop_live();
    Ok(())
}

fn handle_key(key: KeyEvent, app: &mut App, transport: &Transport) {
    match key {
        KeyEvent {
            code: KeyCode::Char('q') | KeyCode::Esc,
            ..
        }
        | KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            ..
        } => {
            app.session.stop();
        }
        KeyEvent {
            code: KeyCode::Char(' '),
            ..
        } => transport.send(PlayerCommand::PlayPause),
        KeyEvent {
            code: KeyCode::Char('n'),
            ..
        } => transport.send(PlayerCommand::Next),
        KeyEvent {
            code: KeyCode::Char('p'),
            ..
        } => transport.send(PlayerCommand::Previous),
        KeyEvent {
            code: KeyCode::Char('+') | KeyCode::Char('='),
            ..
        } => transport.send(PlayerCommand::VolumeDelta(0.05)),
        KeyEvent {
            code: KeyCode::Char('-'),
            ..
        } => transport.send(PlayerCommand::VolumeDelta(-0.05)),
        KeyEvent {
            code: KeyCode::Char('m'),
            ..
        } => app.toggle_live(),
        KeyEvent {
            code: KeyCode::Char('r'),
            ..
        } => {
            // Retry is explicit and user-initiated, never automatic.
            if matches!(
                app.session.status(),
                SourceStatus::Denied | SourceStatus::Error
            ) {
                app.begin_acquisition();
            }
        }
        KeyEvent {
            code: KeyCode::Char('v'),
            ..
        } => {
            let mirrored = app.session.mirror();
            app.session.set_mirror(!mirrored);
        }
        KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::NONE,
            ..
        } => app.session.cycle_scheme(),
        KeyEvent {
            code: KeyCode::Char('w'),
            ..
        } => app.show_waveform = !app.show_waveform,
        _ => {}
    }
}
