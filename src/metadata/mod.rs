//! MPRIS bridge: feeds the Now Playing panel and carries the transport
//! commands (play/pause, skip, volume) the chrome's buttons issue.
//!
//! Everything here is best-effort. No reachable player means placeholder
//! chrome, never an error.

use anyhow::{anyhow, Result};
use mpris::{PlaybackStatus, Player, PlayerFinder};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::interval;
use tracing::{debug, warn};

/// Snapshot of the active player's state.
#[derive(Debug, Clone, Default)]
pub struct TrackInfo {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub playing: bool,
    pub position: Option<Duration>,
    pub length: Option<Duration>,
    pub volume: Option<f64>,
}

impl TrackInfo {
    pub fn display_text(&self) -> String {
        match (&self.title, &self.artist) {
            (Some(title), Some(artist)) => format!("{} - {}", artist, title),
            (Some(title), None) => title.clone(),
            (None, Some(artist)) => artist.clone(),
            (None, None) => String::new(),
        }
    }

    pub fn has_info(&self) -> bool {
        self.title.is_some() || self.artist.is_some()
    }

    /// Seek progress in `[0, 1]`, when both position and length are known.
    pub fn progress(&self) -> Option<f64> {
        let length = self.length?.as_secs_f64();
        if length <= 0.0 {
            return None;
        }
        Some((self.position?.as_secs_f64() / length).clamp(0.0, 1.0))
    }
}

/// Commands the shell's transport row can issue.
#[derive(Debug, Clone, Copy)]
pub enum PlayerCommand {
    PlayPause,
    Next,
    Previous,
    /// Nudge the player volume by a signed delta in `[0, 1]` units.
    VolumeDelta(f64),
}

/// Sending half of the transport; cheap to clone into the shell.
#[derive(Clone)]
pub struct Transport {
    commands: mpsc::UnboundedSender<PlayerCommand>,
}

impl Transport {
    pub fn send(&self, command: PlayerCommand) {
        // A dead watcher just means the chrome goes inert.
        let _ = self.commands.send(command);
    }
}

/// Start the MPRIS watcher task. Returns the transport handle and the
/// track-info watch the chrome reads each frame.
pub fn start_transport() -> (Transport, watch::Receiver<Arc<TrackInfo>>) {
    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel();
    let (info_tx, info_rx) = watch::channel(Arc::new(TrackInfo::default()));

    tokio::spawn(async move {
        let mut poll = interval(Duration::from_millis(500));
        loop {
            tokio::select! {
                _ = poll.tick() => {
                    let info = fetch_track_info().unwrap_or_else(|e| {
                        debug!("No MPRIS player info: {}", e);
                        TrackInfo::default()
                    });
                    if info_tx.send(Arc::new(info)).is_err() {
                        break;
                    }
                }
                command = cmd_rx.recv() => match command {
                    Some(command) => {
                        if let Err(e) = apply_command(command) {
                            warn!("Player command {:?} failed: {}", command, e);
                        }
                    }
                    None => break,
                }
            }
        }
    });

    (Transport { commands: cmd_tx }, info_rx)
}

fn active_player(finder: &PlayerFinder) -> Result<Player> {
    if let Ok(player) = finder.find_active() {
        return Ok(player);
    }
    finder
        .find_all()
        .map_err(|e| anyhow!("listing players: {}", e))?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("no players found"))
}

fn fetch_track_info() -> Result<TrackInfo> {
    let finder = PlayerFinder::new().map_err(|e| anyhow!("dbus: {}", e))?;
    let player = active_player(&finder)?;

    let metadata = player
        .get_metadata()
        .map_err(|e| anyhow!("metadata: {}", e))?;
    let status = player
        .get_playback_status()
        .map_err(|e| anyhow!("playback status: {}", e))?;

    Ok(TrackInfo {
        title: metadata.title().map(str::to_string),
        artist: metadata.artists().map(|a| a.join(", ")),
        album: metadata.album_name().map(str::to_string),
        playing: status == PlaybackStatus::Playing,
        position: player.get_position().ok(),
        length: metadata.length(),
        volume: player.get_volume().ok(),
    })
}

fn apply_command(command: PlayerCommand) -> Result<()> {
    let finder = PlayerFinder::new().map_err(|e| anyhow!("dbus: {}", e))?;
    let player = active_player(&finder)?;

    match command {
        PlayerCommand::PlayPause => player
            .play_pause()
            .map_err(|e| anyhow!("play-pause: {}", e))?,
        PlayerCommand::Next => player.next().map_err(|e| anyhow!("next: {}", e))?,
        PlayerCommand::Previous => player
            .previous()
            .map_err(|e| anyhow!("previous: {}", e))?,
        PlayerCommand::VolumeDelta(delta) => {
            let current = player.get_volume().unwrap_or(0.5);
            player
                .set_volume((current + delta).clamp(0.0, 1.0))
                .map_err(|e| anyhow!("set-volume: {}", e))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_text_prefers_artist_dash_title() {
        let info = TrackInfo {
            title: Some("Porcelain".into()),
            artist: Some("Moby".into()),
            ..Default::default()
        };
        assert_eq!(info.display_text(), "Moby - Porcelain");

        let title_only = TrackInfo {
            title: Some("Porcelain".into()),
            ..Default::default()
        };
        assert_eq!(title_only.display_text(), "Porcelain");
        assert!(TrackInfo::default().display_text().is_empty());
    }

    #[test]
    fn progress_needs_both_position_and_length() {
        let mut info = TrackInfo::default();
        assert!(info.progress().is_none());

        info.length = Some(Duration::from_secs(200));
        assert!(info.progress().is_none());

        info.position = Some(Duration::from_secs(50));
        assert!((info.progress().unwrap() - 0.25).abs() < 1e-9);

        // Position past the end clamps instead of overflowing the bar.
        info.position = Some(Duration::from_secs(500));
        assert_eq!(info.progress().unwrap(), 1.0);
    }

    #[test]
    fn zero_length_track_has_no_progress() {
        let info = TrackInfo {
            position: Some(Duration::from_secs(10)),
            length: Some(Duration::ZERO),
            ..Default::default()
        };
        assert!(info.progress().is_none());
    }
}
