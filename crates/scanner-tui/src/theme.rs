//! Color palette and style constants for the scanner TUI.

use ratatui::style::{Color, Modifier, Style};

use crate::style::{ControlState, StyleClass, StyleSet};

// ── Color palette ─────────────────────────────────────────────────────────────

pub const C_BG: Color = Color::Rgb(18, 18, 18);
pub const C_ACCENT: Color = Color::Rgb(255, 95, 95);
pub const C_CONNECTING: Color = Color::Rgb(255, 184, 80);
pub const C_MUTED: Color = Color::Rgb(72, 72, 88);
pub const C_SEPARATOR: Color = Color::Rgb(40, 40, 52);
pub const C_SECONDARY: Color = Color::Rgb(115, 115, 138);
pub const C_PRIMARY: Color = Color::Rgb(210, 210, 225);
pub const C_SELECTION_BG: Color = Color::Rgb(28, 28, 40);
pub const C_PANEL_BORDER: Color = Color::Rgb(40, 40, 52);
pub const C_PANEL_BORDER_FOCUSED: Color = Color::Rgb(120, 100, 200);
pub const C_NUMBER_HINT: Color = Color::Rgb(90, 90, 115);
pub const C_BADGE_LIVE: Color = Color::Rgb(80, 200, 120);
pub const C_BADGE_ERR: Color = Color::Rgb(255, 95, 95);
pub const C_BADGE_PENDING: Color = Color::Rgb(255, 184, 80);
pub const C_MODE_NORMAL: Color = Color::Rgb(115, 115, 138);

// Row/panel highlight classes.
pub const C_CONTROL_CHANNEL: Color = Color::Rgb(80, 140, 200);
pub const C_LOCKED_OUT: Color = Color::Rgb(150, 60, 60);
pub const C_PLAYING: Color = Color::Rgb(80, 200, 120);
pub const C_PANEL_OPEN: Color = Color::Rgb(180, 120, 220);

// Panel buttons.
pub const C_BUTTON: Color = Color::Rgb(210, 210, 225);
pub const C_BUTTON_TOGGLED_BG: Color = Color::Rgb(255, 184, 80);
pub const C_BUTTON_TOGGLED_FG: Color = Color::Rgb(18, 18, 18);

// ── Predefined styles ─────────────────────────────────────────────────────────

pub fn style_default() -> Style {
    Style::default().fg(C_PRIMARY)
}

pub fn style_secondary() -> Style {
    Style::default().fg(C_SECONDARY)
}

pub fn style_muted() -> Style {
    Style::default().fg(C_MUTED)
}

pub fn style_focused_border() -> Style {
    Style::default().fg(C_PANEL_BORDER_FOCUSED)
}

pub fn style_unfocused_border() -> Style {
    Style::default().fg(C_PANEL_BORDER)
}

pub fn class_color(class: StyleClass) -> Color {
    match class {
        StyleClass::ControlChannel => C_CONTROL_CHANNEL,
        StyleClass::LockedOut => C_LOCKED_OUT,
        StyleClass::Playing => C_PLAYING,
        StyleClass::PanelOpen => C_PANEL_OPEN,
    }
}

/// Style for a row or panel line carrying `set`.
pub fn style_classes(set: StyleSet) -> Style {
    match set.color() {
        Some(StyleClass::Playing) => Style::default()
            .fg(C_PLAYING)
            .add_modifier(Modifier::BOLD),
        Some(class) => Style::default().fg(class_color(class)),
        None => style_default(),
    }
}

pub fn style_button(control: ControlState) -> Style {
    match control {
        ControlState { enabled: false, .. } => style_muted(),
        ControlState { toggled: true, .. } => Style::default()
            .fg(C_BUTTON_TOGGLED_FG)
            .bg(C_BUTTON_TOGGLED_BG)
            .add_modifier(Modifier::BOLD),
        ControlState { .. } => Style::default().fg(C_BUTTON),
    }
}
