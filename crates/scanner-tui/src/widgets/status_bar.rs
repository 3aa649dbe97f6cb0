//! Status bar — bottom line with link state and keybindings.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::connection::ConnectionStatus;
use crate::theme::{C_ACCENT, C_BADGE_LIVE, C_CONNECTING, C_MODE_NORMAL, C_MUTED, C_SEPARATOR};

const KEYS: &str =
    " ↑↓/jk select  Enter click row  h hold  l lockout  p priority  g/G first/last  K keys  q quit";

/// Draw a horizontal separator line.
pub fn draw_separator(frame: &mut Frame, area: Rect) {
    let line = Line::from(Span::styled(
        "─".repeat(area.width as usize),
        Style::default().fg(C_SEPARATOR),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

/// Draw the keybindings footer bar (one row).
pub fn draw_keys_bar(frame: &mut Frame, area: Rect, connection: &ConnectionStatus) {
    let bulb = match connection {
        ConnectionStatus::Connected => C_BADGE_LIVE,
        ConnectionStatus::Connecting => C_CONNECTING,
        ConnectionStatus::Disconnected(_) => C_ACCENT,
    };

    let line = Line::from(vec![
        Span::styled(
            " SCANNER ",
            Style::default()
                .fg(C_MODE_NORMAL)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("●", Style::default().fg(bulb).add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::styled(KEYS, Style::default().fg(C_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
