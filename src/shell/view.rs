//! Blitting the pixel surface into terminal cells.
//!
//! Each cell shows two vertically stacked CSS pixels via the upper
//! half-block glyph: the glyph's foreground is the top pixel, the cell
//! background the bottom one. With density > 1 the surface is supersampled
//! and `sample_css` box-filters it back down here.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::session::{SourceStatus, VisualiserSession};

pub fn draw_visualiser(
    frame: &mut Frame,
    area: Rect,
    session: &VisualiserSession,
    accent: Color,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent))
        .title(" Visualiser ");
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let surface = session.surface();
    let (backing_w, backing_h) = surface.backing_size();
    if backing_w == 0 || backing_h == 0 {
        // Nothing painted yet (first frame, or a collapsed container).
        draw_status_overlay(frame, inner, session.status(), accent);
        return;
    }
    for row in 0..inner.height {
        for col in 0..inner.width {
            let top = surface.sample_css(col as usize, row as usize * 2);
            let bottom = surface.sample_css(col as usize, row as usize * 2 + 1);
            if top == (0, 0, 0) && bottom == (0, 0, 0) {
                continue;
            }
            if let Some(cell) = frame
                .buffer_mut()
                .cell_mut((inner.x + col, inner.y + row))
            {
                cell.set_char('▀');
                cell.set_fg(Color::Rgb(top.0, top.1, top.2));
                cell.set_bg(Color::Rgb(bottom.0, bottom.1, bottom.2));
            }
        }
    }

    draw_status_overlay(frame, inner, session.status(), accent);
}

/// Permission/progress overlay on top of the panel. `running` and `idle`
/// draw nothing; the waiting baseline underneath already tells the story.
fn draw_status_overlay(frame: &mut Frame, area: Rect, status: SourceStatus, accent: Color) {
    let (title, hint) = match status {
        SourceStatus::Starting => ("Starting capture…", "Connecting to the audio server"),
        SourceStatus::Denied => (
            "Capture access denied",
            "Check audio permissions, press r to retry",
        ),
        SourceStatus::Error => ("Capture error", "Press r to retry, m for synthetic mode"),
        SourceStatus::Idle | SourceStatus::Running => return,
    };

    let width = (title.chars().count().max(hint.chars().count()) as u16 + 4).min(area.width);
    let height = 4u16.min(area.height);
    if width < 8 || height < 3 {
        return;
    }
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };

    frame.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);
    frame.render_widget(
        Paragraph::new(vec![
            Line::from(Span::styled(
                title,
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(hint, Style::default().fg(Color::Gray))),
        ])
        .alignment(Alignment::Center),
        inner,
    );
}
