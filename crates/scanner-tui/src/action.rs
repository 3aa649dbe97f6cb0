//! Action enum — user intents and internal events flowing through the App.

use scanner_proto::protocol::PanelButton;

/// Unique identifier for a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    Header,
    ChannelTable,
}

/// All actions that can flow through the system.
/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // ── Back end ─────────────────────────────────────────────────────────────
    ClickRow(u64),
    ClickButton(PanelButton, u64),

    // ── Navigation ───────────────────────────────────────────────────────────
    SelectUp(usize),
    SelectDown(usize),
    SelectFirst,
    SelectLast,
    ScrollUp(usize),
    ScrollDown(usize),

    // ── UI ───────────────────────────────────────────────────────────────────
    ToggleKeys,
    Quit,
}
