//! Header component — 1-row top bar.
//!
//! Link state and endpoint, then the three telemetry slots, then audio and
//! last-event time.  Not focusable.

use ratatui::crossterm::event::{KeyEvent, MouseEvent};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    audio::AudioStatus,
    component::Component,
    connection::ConnectionStatus,
    telemetry::TelemetrySlot,
    theme::{
        style_default, style_muted, style_secondary, C_ACCENT, C_BADGE_ERR, C_BADGE_LIVE,
        C_BADGE_PENDING,
    },
};

pub struct Header;

impl Header {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::new()
    }
}

/// Spans for the header line.
fn header_spans(state: &AppState) -> Vec<Span<'static>> {
    let link_color = match state.connection {
        ConnectionStatus::Connected => C_BADGE_LIVE,
        ConnectionStatus::Connecting => C_BADGE_PENDING,
        ConnectionStatus::Disconnected(_) => C_BADGE_ERR,
    };
    let mut spans = vec![
        Span::styled(" ● ", Style::default().fg(link_color)),
        Span::styled(
            state.connection.label(),
            Style::default().fg(link_color).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(state.endpoint.clone(), style_muted()),
    ];
    if let ConnectionStatus::Disconnected(reason) = &state.connection {
        spans.push(Span::styled(
            format!(" ({})", reason),
            Style::default().fg(C_ACCENT),
        ));
    }

    let telemetry = state.telemetry();
    for slot in [
        TelemetrySlot::Heartbeat,
        TelemetrySlot::CcQuality,
        TelemetrySlot::TcQuality,
    ] {
        spans.push(Span::styled(format!("   {} ", slot.label()), style_secondary()));
        let value = telemetry.get(slot);
        spans.push(if value.is_empty() {
            Span::styled("–", style_muted())
        } else {
            Span::styled(value.to_string(), style_default())
        });
    }

    let audio = match &state.audio {
        AudioStatus::Playing(device) => format!("   ♪ {}", device),
        AudioStatus::Muted => "   ♪ muted".to_string(),
        AudioStatus::Unavailable(reason) => format!("   ♪ no audio ({})", reason),
    };
    spans.push(Span::styled(audio, style_secondary()));

    if let Some(at) = state.last_event_at {
        spans.push(Span::styled(
            format!("   last {}", at.format("%H:%M:%S")),
            style_muted(),
        ));
    }
    if state.dropped_frames > 0 {
        spans.push(Span::styled(
            format!("   {} dropped", state.dropped_frames),
            Style::default().fg(C_ACCENT),
        ));
    }
    spans
}

impl Component for Header {
    fn id(&self) -> ComponentId {
        ComponentId::Header
    }

    fn handle_key(&mut self, _key: KeyEvent, _state: &AppState) -> Vec<Action> {
        vec![]
    }

    fn handle_mouse(&mut self, _event: MouseEvent, _area: Rect, _state: &AppState) -> Vec<Action> {
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, state: &AppState) {
        if area.height == 0 {
            return;
        }
        let line = Line::from(header_spans(state));
        frame.render_widget(Paragraph::new(line), area);
    }
}
