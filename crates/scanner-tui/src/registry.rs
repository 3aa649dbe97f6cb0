//! Row registry — the source of truth for the channel table.
//!
//! Entries are kept strictly ascending by frequency.  Each entry fuses a
//! channel row with its control panel: one key, created together, never
//! removed.

use scanner_proto::protocol::{PanelButton, RowUpdate};

use crate::style::{self, ChannelFlags, ControlState, StyleSet};

/// Per-frequency state driving one line of the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRow {
    frequency: u64,
    pub talkgroup_label: String,
    pub category_icon: String,
    pub description: String,
    pub source_id: Option<u32>,
    pub flags: ChannelFlags,
    pub style: StyleSet,
}

impl ChannelRow {
    fn new(update: &RowUpdate) -> Self {
        let mut row = Self {
            frequency: update.frequency,
            talkgroup_label: String::new(),
            category_icon: String::new(),
            description: String::new(),
            source_id: None,
            flags: ChannelFlags::default(),
            style: StyleSet::default(),
        };
        row.overwrite(update);
        row
    }

    /// The row's identity; immutable after creation.
    pub fn frequency(&self) -> u64 {
        self.frequency
    }

    fn overwrite(&mut self, update: &RowUpdate) {
        self.talkgroup_label.clone_from(&update.talkgroup_label);
        self.category_icon.clone_from(&update.category_icon);
        self.description.clone_from(&update.description);
        self.source_id = update.source_id;
        self.flags = flags_of(update);
    }
}

/// Hold / lockout / priority buttons under a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlPanel {
    frequency: u64,
    pub visible: bool,
    pub style: StyleSet,
    pub hold: ControlState,
    pub lockout: ControlState,
    pub priority: ControlState,
}

impl ControlPanel {
    fn new(frequency: u64) -> Self {
        Self {
            frequency,
            visible: false,
            style: StyleSet::default(),
            hold: ControlState::DISABLED,
            lockout: ControlState::DISABLED,
            priority: ControlState::DISABLED,
        }
    }

    pub fn frequency(&self) -> u64 {
        self.frequency
    }

    pub fn control(&self, button: PanelButton) -> ControlState {
        match button {
            PanelButton::HoldGroup => self.hold,
            PanelButton::LockoutGroup => self.lockout,
            PanelButton::GroupPriority => self.priority,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowEntry {
    pub row: ChannelRow,
    pub panel: ControlPanel,
}

impl RowEntry {
    fn restyle(&mut self) {
        let visual = style::resolve(&self.row.flags);
        self.row.style = visual.row;
        self.panel.style = visual.panel;
        self.panel.hold = visual.hold;
        self.panel.lockout = visual.lockout;
        self.panel.priority = visual.priority;
    }
}

/// Outcome of [`RowRegistry::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Updated,
}

/// One element of the table's layout sequence.
#[derive(Debug, Clone, Copy)]
pub enum LayoutItem<'a> {
    Row(&'a ChannelRow),
    Panel(&'a ControlPanel),
}

#[derive(Debug, Default)]
pub struct RowRegistry {
    entries: Vec<RowEntry>,
}

impl RowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or overwrite the row for `update.frequency`, then re-resolve its
    /// visual state.
    pub fn upsert(&mut self, update: &RowUpdate) -> Upsert {
        if let Some(entry) = self.get_mut(update.frequency) {
            entry.row.overwrite(update);
            entry.restyle();
            return Upsert::Updated;
        }

        let mut entry = RowEntry {
            row: ChannelRow::new(update),
            panel: ControlPanel::new(update.frequency),
        };
        entry.restyle();

        match self
            .entries
            .iter()
            .position(|e| e.row.frequency > update.frequency)
        {
            Some(idx) => self.entries.insert(idx, entry),
            None => self.entries.push(entry),
        }
        Upsert::Created
    }

    pub fn exists(&self, frequency: u64) -> bool {
        self.index_of(frequency).is_some()
    }

    pub fn get(&self, frequency: u64) -> Option<&RowEntry> {
        self.index_of(frequency).map(|i| &self.entries[i])
    }

    fn get_mut(&mut self, frequency: u64) -> Option<&mut RowEntry> {
        self.index_of(frequency).map(move |i| &mut self.entries[i])
    }

    fn index_of(&self, frequency: u64) -> Option<usize> {
        self.entries
            .binary_search_by_key(&frequency, |e| e.row.frequency)
            .ok()
    }

    /// Show or hide a row's control panel.  Returns `false`, changing
    /// nothing, when no row exists for `frequency`.
    pub fn set_panel_visible(&mut self, frequency: u64, visible: bool) -> bool {
        match self.get_mut(frequency) {
            Some(entry) => {
                entry.panel.visible = visible;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending frequency order.
    pub fn iter(&self) -> impl Iterator<Item = &RowEntry> {
        self.entries.iter()
    }

    pub fn frequencies(&self) -> Vec<u64> {
        self.entries.iter().map(|e| e.row.frequency).collect()
    }

    /// Layout sequence: every row immediately followed by its panel.
    pub fn layout(&self) -> impl Iterator<Item = LayoutItem<'_>> {
        self.entries
            .iter()
            .flat_map(|e| [LayoutItem::Row(&e.row), LayoutItem::Panel(&e.panel)])
    }

    /// Position of `frequency` in the ordered collection.
    pub fn position(&self, frequency: u64) -> Option<usize> {
        self.index_of(frequency)
    }

    pub fn at(&self, index: usize) -> Option<&RowEntry> {
        self.entries.get(index)
    }
}

fn flags_of(update: &RowUpdate) -> ChannelFlags {
    ChannelFlags {
        is_control_channel: update.is_control_channel,
        is_locked_out: update.is_locked_out,
        is_playing: update.is_playing,
        is_panel_open: update.is_panel_open,
        is_active: update.is_active,
        is_priority: update.is_priority,
    }
}
