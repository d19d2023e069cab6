//! The player chrome: frame layout, transport row, Now Playing panel and
//! the keybinding status line.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use std::time::Duration;

use crate::metadata::TrackInfo;
use crate::session::{SourceStatus, VisualiserSession};

use super::view;

/// Screen regions for one frame. Computed before painting so the session
/// can resize its surface to the visualiser panel first.
pub struct ShellLayout {
    pub visualiser: Rect,
    pub side: Rect,
    pub transport: Rect,
    pub status: Rect,
}

impl ShellLayout {
    pub fn compute(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(8),
                Constraint::Length(4),
                Constraint::Length(1),
            ])
            .split(area);
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(24), Constraint::Length(34)])
            .split(rows[0]);

        Self {
            visualiser: cols[0],
            side: cols[1],
            transport: rows[1],
            status: rows[2],
        }
    }

    /// The visualiser panel minus its border, i.e. the drawable container.
    pub fn visualiser_inner(&self) -> Rect {
        let r = self.visualiser;
        Rect {
            x: r.x.saturating_add(1),
            y: r.y.saturating_add(1),
            width: r.width.saturating_sub(2),
            height: r.height.saturating_sub(2),
        }
    }
}

pub fn draw(
    frame: &mut Frame,
    layout: &ShellLayout,
    session: &VisualiserSession,
    track: &TrackInfo,
    show_waveform: bool,
) {
    let (r, g, b) = session.scheme().get_color(0.5, 0.8);
    let accent = Color::Rgb(r, g, b);

    view::draw_visualiser(frame, layout.visualiser, session, accent);
    draw_transport(frame, layout.transport, track, accent);
    draw_now_playing(frame, layout.side, track, accent);
    draw_status_bar(frame, layout.status, session, show_waveform);
}

fn draw_transport(frame: &mut Frame, area: Rect, track: &TrackInfo, accent: Color) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width < 20 || inner.height == 0 {
        return;
    }

    let button = Style::default().fg(Color::Gray);
    let lit = Style::default().fg(accent).add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(Color::DarkGray);

    // Transport buttons, seek readout, seek bar.
    let play_glyph = if track.playing { "⏸" } else { "▶" };
    let position = format_clock(track.position);
    let length = format_clock(track.length);
    let bar_width = (inner.width as usize).saturating_sub(28).max(4);
    let progress = track.progress().unwrap_or(0.0);

    let mut top = vec![
        Span::styled(" ⏮ ", button),
        Span::styled(play_glyph, if track.playing { lit } else { button }),
        Span::styled(" ⏹ ", button),
        Span::styled("⏭ ", button),
        Span::styled(format!(" {} ", position), dim),
    ];
    top.extend(meter_spans(progress, bar_width, accent));
    top.push(Span::styled(format!(" {} ", length), dim));

    // Volume row.
    let volume = track.volume.unwrap_or(0.0);
    let vol_width = (inner.width as usize).saturating_sub(14).max(4);
    let mut bottom = vec![Span::styled(" vol ", dim)];
    bottom.extend(meter_spans(volume, vol_width, accent));
    bottom.push(Span::styled(
        format!(" {:>3.0}% ", (volume * 100.0).round()),
        dim,
    ));

    frame.render_widget(
        Paragraph::new(vec![Line::from(top), Line::from(bottom)]),
        inner,
    );
}

/// Filled/empty meter used by both the seek bar and the volume slider.
fn meter_spans(fraction: f64, width: usize, accent: Color) -> Vec<Span<'static>> {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    vec![
        Span::styled("━".repeat(filled), Style::default().fg(accent)),
        Span::styled(
            "─".repeat(width - filled),
            Style::default().fg(Color::DarkGray),
        ),
    ]
}

fn draw_now_playing(frame: &mut Frame, area: Rect, track: &TrackInfo, accent: Color) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent))
        .title(" Now Playing ");
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let bright = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    let normal = Style::default().fg(Color::Gray);
    let dim = Style::default().fg(Color::DarkGray);

    let mut lines = Vec::new();
    if track.has_info() {
        lines.push(Line::from(Span::styled(
            track.title.clone().unwrap_or_default(),
            bright,
        )));
        lines.push(Line::from(Span::styled(
            track.artist.clone().unwrap_or_default(),
            normal,
        )));
        if let Some(album) = &track.album {
            lines.push(Line::from(Span::styled(album.clone(), dim)));
        }
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!(
                "{} / {}",
                format_clock(track.position),
                format_clock(track.length)
            ),
            normal,
        )));
        lines.push(Line::from(Span::styled(
            if track.playing { "playing" } else { "paused" },
            dim,
        )));
    } else {
        lines.push(Line::from(Span::styled("No track playing", dim)));
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "Start any MPRIS-capable player",
            dim,
        )));
        lines.push(Line::from(Span::styled(
            "and the chrome comes alive.",
            dim,
        )));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_status_bar(
    frame: &mut Frame,
    area: Rect,
    session: &VisualiserSession,
    show_waveform: bool,
) {
    let live = match session.status() {
        SourceStatus::Idle => "off",
        status => status.label(),
    };
    let status = format!(
        " [space] play/pause  [n/p] skip  [m]ic: {}  [v] mirror: {}  [c]olor: {}  [w]ave: {}  [q]uit ",
        live,
        if session.mirror() { "on" } else { "off" },
        session.scheme().name(),
        if show_waveform { "on" } else { "off" },
    );
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            status,
            Style::default().fg(Color::DarkGray),
        ))),
        area,
    );
}

/// mm:ss, or a placeholder when the player does not report the value.
fn format_clock(duration: Option<Duration>) -> String {
    match duration {
        Some(d) => {
            let total = d.as_secs();
            format!("{:02}:{:02}", total / 60, total % 60)
        }
        None => "--:--".to_string(),
    }
}
