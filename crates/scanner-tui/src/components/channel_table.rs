//! ChannelTable — the channel rows and their control panels.
//!
//! Each registry entry draws as one row line, followed by a panel line when
//! the back end has opened that row's panel.  The cursor is held as a
//! frequency rather than an index, so rows inserted above it never move it.

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use scanner_proto::format::{format_frequency, format_source};
use scanner_proto::protocol::PanelButton;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    registry::{ChannelRow, ControlPanel, LayoutItem, RowRegistry},
    theme::{style_button, style_classes, style_secondary, C_BADGE_LIVE, C_SELECTION_BG},
    widgets::pane_chrome::{pane_chrome_borders, Badge},
};

// Column widths, in terminal cells.
const W_MARKER: usize = 2;
const W_FREQ: usize = 12;
const W_TG: usize = 8;
const W_ICON: usize = 2;
const W_SOURCE: usize = 8;
const FIXED_WIDTH: usize = W_MARKER + W_FREQ + 1 + W_TG + 1 + W_ICON + 1 + 1 + W_SOURCE;

/// Indent of the first panel button.
const PANEL_INDENT: usize = W_MARKER + 2;
const BUTTON_GAP: usize = 2;
const WHEEL_STEP: usize = 3;

/// What a drawn line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineTarget {
    Row(u64),
    Panel(u64),
}

pub struct ChannelTable {
    /// Frequency under the cursor.
    cursor: Option<u64>,
    /// First visible line.
    scroll: usize,
    /// Keep the cursor on screen; cleared by wheel scrolling.
    follow_cursor: bool,
    /// Line targets of the last layout, for mouse hit-testing.
    lines: Vec<LineTarget>,
    /// Inner height of the last draw.
    viewport: usize,
    pub borders: Borders,
}

impl ChannelTable {
    pub fn new() -> Self {
        Self {
            cursor: None,
            scroll: 0,
            follow_cursor: true,
            lines: Vec::new(),
            viewport: 0,
            borders: Borders::ALL,
        }
    }

    /// Recompute line targets from the registry.  Also settles the cursor on
    /// the first row once there is one.
    fn relayout(&mut self, registry: &RowRegistry) {
        self.lines.clear();
        for item in registry.layout() {
            match item {
                LayoutItem::Row(row) => self.lines.push(LineTarget::Row(row.frequency())),
                LayoutItem::Panel(panel) if panel.visible => {
                    self.lines.push(LineTarget::Panel(panel.frequency()))
                }
                LayoutItem::Panel(_) => {}
            }
        }
        if self.cursor.is_none() {
            self.cursor = registry.at(0).map(|e| e.row.frequency());
        }
    }

    fn move_cursor(&mut self, registry: &RowRegistry, target: impl FnOnce(usize, usize) -> usize) {
        if registry.is_empty() {
            return;
        }
        let last = registry.len() - 1;
        let current = self
            .cursor
            .and_then(|f| registry.position(f))
            .unwrap_or(0);
        let next = target(current, last).min(last);
        self.cursor = registry.at(next).map(|e| e.row.frequency());
        self.follow_cursor = true;
    }

    fn max_scroll(&self) -> usize {
        self.lines.len().saturating_sub(self.viewport)
    }

    /// Adjust `scroll` so the cursor row and its open panel are visible.
    fn scroll_to_cursor(&mut self) {
        let Some(cursor) = self.cursor else {
            return;
        };
        let Some(first) = self.lines.iter().position(|t| *t == LineTarget::Row(cursor)) else {
            return;
        };
        let last = match self.lines.get(first + 1) {
            Some(LineTarget::Panel(f)) if *f == cursor => first + 1,
            _ => first,
        };
        if first < self.scroll {
            self.scroll = first;
        } else if self.viewport > 0 && last >= self.scroll + self.viewport {
            self.scroll = last + 1 - self.viewport;
        }
    }

    fn button_key(&self, button: PanelButton, state: &AppState) -> Vec<Action> {
        let Some(frequency) = self.cursor else {
            return vec![];
        };
        match state.registry().get(frequency) {
            Some(entry) if entry.panel.visible => vec![Action::ClickButton(button, frequency)],
            _ => vec![],
        }
    }
}

impl Default for ChannelTable {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for ChannelTable {
    fn id(&self) -> ComponentId {
        ComponentId::ChannelTable
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind != KeyEventKind::Press {
            return vec![];
        }
        let page = self.viewport.max(1);
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => vec![Action::SelectDown(1)],
            KeyCode::Char('k') | KeyCode::Up => vec![Action::SelectUp(1)],
            KeyCode::PageDown => vec![Action::SelectDown(page)],
            KeyCode::PageUp => vec![Action::SelectUp(page)],
            KeyCode::Char('g') | KeyCode::Home => vec![Action::SelectFirst],
            KeyCode::Char('G') | KeyCode::End => vec![Action::SelectLast],
            KeyCode::Enter => self.cursor.map(Action::ClickRow).into_iter().collect(),
            KeyCode::Char('h') => self.button_key(PanelButton::HoldGroup, state),
            KeyCode::Char('l') => self.button_key(PanelButton::LockoutGroup, state),
            KeyCode::Char('p') => self.button_key(PanelButton::GroupPriority, state),
            _ => vec![],
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent, area: Rect, _state: &AppState) -> Vec<Action> {
        match event.kind {
            MouseEventKind::ScrollUp => vec![Action::ScrollUp(WHEEL_STEP)],
            MouseEventKind::ScrollDown => vec![Action::ScrollDown(WHEEL_STEP)],
            MouseEventKind::Down(MouseButton::Left) => {
                // +1 for the border
                if event.row <= area.y || event.column <= area.x {
                    return vec![];
                }
                let rel_row = (event.row - area.y - 1) as usize;
                let rel_col = (event.column - area.x - 1) as usize;
                if rel_row >= self.viewport {
                    return vec![];
                }
                match self.lines.get(self.scroll + rel_row) {
                    Some(LineTarget::Row(frequency)) => {
                        self.cursor = Some(*frequency);
                        vec![Action::ClickRow(*frequency)]
                    }
                    Some(LineTarget::Panel(frequency)) => match button_at(rel_col) {
                        Some(button) => {
                            self.cursor = Some(*frequency);
                            vec![Action::ClickButton(button, *frequency)]
                        }
                        None => vec![],
                    },
                    None => vec![],
                }
            }
            _ => vec![],
        }
    }

    fn on_action(&mut self, action: &Action, state: &AppState) -> Vec<Action> {
        let registry = state.registry();
        match action {
            Action::SelectUp(n) => self.move_cursor(registry, |i, _| i.saturating_sub(*n)),
            Action::SelectDown(n) => self.move_cursor(registry, |i, _| i.saturating_add(*n)),
            Action::SelectFirst => self.move_cursor(registry, |_, _| 0),
            Action::SelectLast => self.move_cursor(registry, |_, last| last),
            Action::ScrollUp(n) => {
                self.follow_cursor = false;
                self.scroll = self.scroll.saturating_sub(*n);
            }
            Action::ScrollDown(n) => {
                self.follow_cursor = false;
                self.scroll = (self.scroll + n).min(self.max_scroll());
            }
            _ => {}
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let registry = state.registry();
        self.relayout(registry);

        let title = format!("channels ({})", registry.len());
        let block = pane_chrome_borders(
            &title,
            Some('1'),
            focused,
            (!registry.is_empty()).then_some(Badge {
                text: "SCAN",
                color: C_BADGE_LIVE,
            }),
            self.borders,
        );
        let inner = block.inner(area);
        frame.render_widget(block, area);

        self.viewport = inner.height as usize;
        if self.follow_cursor {
            self.scroll_to_cursor();
        }
        self.scroll = self.scroll.min(self.max_scroll());

        if registry.is_empty() {
            let waiting = Paragraph::new(Line::from(Span::styled(
                "  waiting for channels…",
                style_secondary(),
            )));
            frame.render_widget(waiting, inner);
            return;
        }

        let width = inner.width as usize;
        let lines: Vec<Line> = self
            .lines
            .iter()
            .skip(self.scroll)
            .take(self.viewport)
            .filter_map(|target| match *target {
                LineTarget::Row(f) => registry
                    .get(f)
                    .map(|e| row_line(&e.row, self.cursor == Some(f), width)),
                LineTarget::Panel(f) => registry.get(f).map(|e| panel_line(&e.panel)),
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

/// Panel button under column `col` of a panel line.
fn button_at(col: usize) -> Option<PanelButton> {
    let mut start = PANEL_INDENT;
    for button in PanelButton::ALL {
        let end = start + button_text(button).chars().count();
        if (start..end).contains(&col) {
            return Some(button);
        }
        start = end + BUTTON_GAP;
    }
    None
}

fn button_text(button: PanelButton) -> String {
    format!("[{}]", button.label())
}

fn row_line(row: &ChannelRow, selected: bool, width: usize) -> Line<'static> {
    let mut style = style_classes(row.style);
    if selected {
        style = style.bg(C_SELECTION_BG);
    }
    let marker = if selected { "▸ " } else { "  " };
    let description_width = width.saturating_sub(FIXED_WIDTH);

    Line::from(vec![
        Span::raw(marker),
        Span::raw(fit(&format_frequency(row.frequency()), W_FREQ)),
        Span::raw(" "),
        Span::raw(fit(&row.talkgroup_label, W_TG)),
        Span::raw(" "),
        Span::raw(fit(&row.category_icon, W_ICON)),
        Span::raw(" "),
        Span::raw(fit(&row.description, description_width)),
        Span::raw(" "),
        Span::raw(fit_right(&format_source(row.source_id), W_SOURCE)),
    ])
    .style(style)
}

fn panel_line(panel: &ControlPanel) -> Line<'static> {
    let mut spans = vec![Span::raw(" ".repeat(PANEL_INDENT))];
    for (i, button) in PanelButton::ALL.into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" ".repeat(BUTTON_GAP)));
        }
        spans.push(Span::styled(
            button_text(button),
            style_button(panel.control(button)),
        ));
    }
    Line::from(spans).style(panel_style(panel))
}

fn panel_style(panel: &ControlPanel) -> Style {
    style_classes(panel.style)
}

/// Truncate or pad `text` to exactly `width` cells.
fn fit(text: &str, width: usize) -> String {
    let (mut out, used) = take_width(text, width);
    out.push_str(&" ".repeat(width - used));
    out
}

fn fit_right(text: &str, width: usize) -> String {
    let (out, used) = take_width(text, width);
    format!("{}{}", " ".repeat(width - used), out)
}

fn take_width(text: &str, width: usize) -> (String, usize) {
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    (out, used)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioStatus, NullSink};
    use crate::emitter::tests::RecordingTransport;
    use crate::synchronizer::Synchronizer;
    use ratatui::crossterm::event::KeyModifiers;
    use ratatui::{backend::TestBackend, Terminal};
    use scanner_proto::protocol::Frame;

    fn state_with(frames: &[&str]) -> AppState {
        let mut sync = Synchronizer::init(
            Box::new(RecordingTransport::default()),
            Box::new(NullSink),
        );
        for f in frames {
            sync.on_frame(Frame::Text(f.to_string()));
        }
        AppState::new(sync, "ws://test/".into(), AudioStatus::Muted, true)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn area() -> Rect {
        Rect::new(0, 0, 80, 12)
    }

    const ROW_A: &str = r#"{"event":"UPDATE_ROW","freq":460025000,"tg":1201,"description":"Fire","active":true}"#;
    const ROW_B: &str = r#"{"event":"UPDATE_ROW","freq":453000000,"tg":9,"description":"Police"}"#;
    const SHOW_A: &str = r#"{"event":"SHOW_ROW_BUTTONS","freq":460025000}"#;

    fn laid_out(state: &AppState) -> ChannelTable {
        let mut table = ChannelTable::new();
        table.relayout(state.registry());
        table.viewport = 10;
        table
    }

    #[test]
    fn test_cursor_starts_on_first_row_and_moves() {
        let state = state_with(&[ROW_A, ROW_B]);
        let mut table = laid_out(&state);
        assert_eq!(table.cursor, Some(453_000_000));

        let actions = table.handle_key(key(KeyCode::Char('j')), &state);
        assert_eq!(actions, vec![Action::SelectDown(1)]);
        table.on_action(&Action::SelectDown(1), &state);
        assert_eq!(table.cursor, Some(460_025_000));

        // Clamped at the end.
        table.on_action(&Action::SelectDown(5), &state);
        assert_eq!(table.cursor, Some(460_025_000));
        table.on_action(&Action::SelectFirst, &state);
        assert_eq!(table.cursor, Some(453_000_000));
    }

    #[test]
    fn test_cursor_follows_frequency_across_inserts() {
        let mut state = state_with(&[ROW_A]);
        let mut table = laid_out(&state);
        assert_eq!(table.cursor, Some(460_025_000));

        state.sync.on_frame(Frame::Text(ROW_B.to_string()));
        table.relayout(state.registry());
        assert_eq!(table.cursor, Some(460_025_000));
        assert_eq!(
            table.handle_key(key(KeyCode::Enter), &state),
            vec![Action::ClickRow(460_025_000)]
        );
    }

    #[test]
    fn test_button_keys_need_visible_panel() {
        let mut state = state_with(&[ROW_A]);
        let mut table = laid_out(&state);
        assert!(table.handle_key(key(KeyCode::Char('l')), &state).is_empty());

        state.sync.on_frame(Frame::Text(SHOW_A.to_string()));
        assert_eq!(
            table.handle_key(key(KeyCode::Char('l')), &state),
            vec![Action::ClickButton(PanelButton::LockoutGroup, 460_025_000)]
        );
        assert_eq!(
            table.handle_key(key(KeyCode::Char('p')), &state),
            vec![Action::ClickButton(PanelButton::GroupPriority, 460_025_000)]
        );
    }

    #[test]
    fn test_click_row_and_panel_button() {
        let state = state_with(&[ROW_A, ROW_B, SHOW_A]);
        let mut table = laid_out(&state);
        // lines: row B, row A, panel A (inside border at y=1..)
        assert_eq!(
            table.handle_mouse(click(10, 2), area(), &state),
            vec![Action::ClickRow(460_025_000)]
        );
        assert_eq!(table.cursor, Some(460_025_000));

        // Panel line at y=3; "[L/O GROUP]" starts after "[HOLD GROUP]" + gap.
        let lockout_col = 1 + (PANEL_INDENT + "[HOLD GROUP]".len() + BUTTON_GAP) as u16;
        assert_eq!(
            table.handle_mouse(click(lockout_col, 3), area(), &state),
            vec![Action::ClickButton(PanelButton::LockoutGroup, 460_025_000)]
        );
        // Gap between buttons.
        assert!(table.handle_mouse(click(lockout_col - 1, 3), area(), &state).is_empty());
        // Below the last line.
        assert!(table.handle_mouse(click(10, 8), area(), &state).is_empty());
    }

    #[test]
    fn test_button_hit_ranges() {
        assert_eq!(button_at(0), None);
        assert_eq!(button_at(PANEL_INDENT), Some(PanelButton::HoldGroup));
        let prio = PANEL_INDENT + "[HOLD GROUP]".len() + BUTTON_GAP + "[L/O GROUP]".len() + BUTTON_GAP;
        assert_eq!(button_at(prio), Some(PanelButton::GroupPriority));
        assert_eq!(button_at(prio + "[GROUP PRIO]".len()), None);
    }

    #[test]
    fn test_fit_counts_cells() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdef", 3), "abc");
        // Wide glyph that would overflow is dropped, not split.
        assert_eq!(fit("a🚒", 2), "a ");
        assert_eq!(fit_right("1e240", 8), "   1e240");
    }

    #[test]
    fn test_draw_renders_rows_and_panel() {
        let state = state_with(&[ROW_A, ROW_B, SHOW_A]);
        let mut table = ChannelTable::new();
        let mut terminal = Terminal::new(TestBackend::new(80, 8)).unwrap();
        terminal
            .draw(|f| table.draw(f, f.area(), true, &state))
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("channels (2)"));
        assert!(text.contains("453.0000 MHz"));
        assert!(text.contains("460.0250 MHz"));
        assert!(text.contains("[L/O GROUP]"));
        assert!(text.find("453.0000").unwrap() < text.find("460.0250").unwrap());
    }
}
