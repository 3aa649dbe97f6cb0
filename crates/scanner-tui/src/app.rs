//! App — component-based event loop.
//!
//! Architecture:
//! - `App` owns the components and `AppState` (shared read-only data for components).
//! - Terminal input arrives as `AppMessage`s from a blocking reader task.
//! - Connection events arrive on their own channel and are applied in order.
//! - Components return `Vec<Action>`; App dispatches each Action.
//! - Commands to the back end leave through the synchronizer's emitter.

use std::collections::VecDeque;
use std::io;

use chrono::Local;
use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::Block,
    Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use scanner_proto::protocol::Frame;

use crate::{
    action::Action,
    app_state::AppState,
    component::Component,
    components::{channel_table::ChannelTable, header::Header},
    connection::{ConnectionEvent, ConnectionStatus},
    synchronizer::Dispatch,
    theme::C_BG,
    widgets::status_bar,
};

// ── Internal event bus ────────────────────────────────────────────────────────

enum AppMessage {
    Event(Event),
}

/// Messages handled per wakeup before the next redraw.
const MAX_DRAIN: usize = 256;

// ── Pane area tracking ────────────────────────────────────────────────────────

/// Last-drawn layout rects, for mouse hit-testing.
#[derive(Default, Clone)]
struct PaneAreas {
    channel_table: Rect,
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct App {
    pub state: AppState,

    header: Header,
    channel_table: ChannelTable,

    should_quit: bool,
    pane_areas: PaneAreas,
}

impl App {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            header: Header::new(),
            channel_table: ChannelTable::new(),
            should_quit: false,
            pane_areas: PaneAreas::default(),
        }
    }

    pub async fn run(mut self, mut conn_rx: mpsc::Receiver<ConnectionEvent>) -> anyhow::Result<()> {
        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        let (tx, mut rx) = mpsc::channel::<AppMessage>(1024);

        // ── Background task: keyboard/mouse events ────────────────────────────
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    if tx.blocking_send(AppMessage::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        // ── Main loop ─────────────────────────────────────────────────────────
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
            }
            needs_redraw = false;

            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => {
                    needs_redraw = self.handle_message(msg);
                }

                Some(ev) = conn_rx.recv() => {
                    let mut redraw = self.handle_connection(ev);
                    let mut drained = 0usize;
                    while drained < MAX_DRAIN {
                        let Ok(next) = conn_rx.try_recv() else {
                            break;
                        };
                        drained += 1;
                        redraw |= self.handle_connection(next);
                    }
                    needs_redraw = redraw;
                }

                else => break,
            }
        }

        // ── Teardown ──────────────────────────────────────────────────────────
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
        info!("scanner exiting");

        Ok(())
    }

    fn handle_message(&mut self, msg: AppMessage) -> bool {
        match msg {
            AppMessage::Event(ev) => match ev {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Release {
                        return false;
                    }
                    let actions = self.handle_key(key);
                    self.dispatch_all(actions);
                    true
                }
                Event::Mouse(mouse) => {
                    let actions = self.handle_mouse(mouse);
                    let redraw = !actions.is_empty();
                    self.dispatch_all(actions);
                    redraw
                }
                Event::Resize(..) => true,
                _ => false,
            },
        }
    }

    /// Apply one connection event.  Returns whether a redraw is due.
    fn handle_connection(&mut self, event: ConnectionEvent) -> bool {
        match event {
            ConnectionEvent::Connected => {
                self.state.connection = ConnectionStatus::Connected;
                true
            }
            ConnectionEvent::Frame(frame) => {
                let is_text = matches!(frame, Frame::Text(_));
                let dispatch = self.state.sync.on_frame(frame);
                if is_text {
                    self.state.last_event_at = Some(Local::now());
                }
                if let Dispatch::Dropped(_) = dispatch {
                    self.state.dropped_frames += 1;
                    return true;
                }
                dispatch.changes_view()
            }
            ConnectionEvent::Closed(reason) => {
                warn!("disconnected: {}", reason);
                self.state.connection = ConnectionStatus::Disconnected(reason);
                true
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        match key.code {
            KeyCode::Char('q') if key.modifiers == KeyModifiers::NONE => return vec![Action::Quit],
            KeyCode::Char('c') if key.modifiers == KeyModifiers::CONTROL => {
                return vec![Action::Quit];
            }
            KeyCode::Char('K') => return vec![Action::ToggleKeys],
            _ => {}
        }
        self.channel_table.handle_key(key, &self.state)
    }

    fn handle_mouse(&mut self, event: MouseEvent) -> Vec<Action> {
        if !matches!(
            event.kind,
            MouseEventKind::Down(_) | MouseEventKind::ScrollUp | MouseEventKind::ScrollDown
        ) {
            return vec![];
        }

        fn hit(r: Rect, col: u16, row: u16) -> bool {
            r.width > 0
                && r.height > 0
                && col >= r.x
                && col < r.x + r.width
                && row >= r.y
                && row < r.y + r.height
        }

        let area = self.pane_areas.channel_table;
        if hit(area, event.column, event.row) {
            debug!(pane = ?self.channel_table.id(), kind = ?event.kind, "mouse");
            return self.channel_table.handle_mouse(event, area, &self.state);
        }
        vec![]
    }

    // ── Action dispatcher ─────────────────────────────────────────────────────

    fn dispatch_all(&mut self, actions: Vec<Action>) {
        let mut queue: VecDeque<Action> = actions.into();
        while let Some(action) = queue.pop_front() {
            queue.extend(self.dispatch(action));
        }
    }

    /// Apply one action; returns follow-up actions from components.
    fn dispatch(&mut self, action: Action) -> Vec<Action> {
        debug!(?action, "dispatch");
        match action {
            Action::ClickRow(frequency) => {
                self.state.sync.click_row(frequency);
                vec![]
            }
            Action::ClickButton(button, frequency) => {
                self.state.sync.click_button(button, frequency);
                vec![]
            }
            Action::ToggleKeys => {
                self.state.show_keys_bar = !self.state.show_keys_bar;
                vec![]
            }
            Action::Quit => {
                self.should_quit = true;
                vec![]
            }
            other => {
                let s = &self.state;
                let mut out = self.header.on_action(&other, s);
                out.extend(self.channel_table.on_action(&other, s));
                out
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(Style::default().bg(C_BG)), area);

        // ── Outer layout: header | separator | body | (keys) ─────────────────
        let keys_h = if self.state.show_keys_bar { 1u16 } else { 0 };
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(keys_h),
            ])
            .split(area);

        self.header.draw(frame, outer[0], false, &self.state);
        status_bar::draw_separator(frame, outer[1]);

        self.channel_table.draw(frame, outer[2], true, &self.state);
        self.pane_areas.channel_table = outer[2];

        if self.state.show_keys_bar {
            status_bar::draw_keys_bar(frame, outer[3], &self.state.connection);
        }
    }
}
