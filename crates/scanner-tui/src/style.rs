//! Visual state resolver — flags in, style classes and control states out.
//!
//! Precedence, evaluated fresh on every update:
//! ```text
//!  1. control channel   — row gets ControlChannel, nothing else anywhere
//!  2. color claim       — LockedOut, Playing (both may be set); PanelOpen only
//!                         when neither claimed the color
//!  3. controls          — inactive rows disable lockout/priority and clear
//!                         their toggles; active rows enable and toggle them
//! ```
//! Every output is recomputed from scratch, so a flag that turns false always
//! takes its class with it.

/// Boolean state of one channel, as last pushed by the back end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelFlags {
    pub is_control_channel: bool,
    pub is_locked_out: bool,
    pub is_playing: bool,
    pub is_panel_open: bool,
    pub is_active: bool,
    pub is_priority: bool,
}

/// Conditional style classes a row or panel can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleClass {
    ControlChannel,
    LockedOut,
    Playing,
    PanelOpen,
}

impl StyleClass {
    const fn bit(self) -> u8 {
        match self {
            StyleClass::ControlChannel => 1 << 0,
            StyleClass::LockedOut => 1 << 1,
            StyleClass::Playing => 1 << 2,
            StyleClass::PanelOpen => 1 << 3,
        }
    }
}

/// Set of [`StyleClass`]es.  `set` is an idempotent toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StyleSet(u8);

impl StyleSet {
    pub fn contains(self, class: StyleClass) -> bool {
        self.0 & class.bit() != 0
    }

    pub fn set(&mut self, class: StyleClass, on: bool) {
        if on {
            self.0 |= class.bit();
        } else {
            self.0 &= !class.bit();
        }
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The one color to paint.  Lockout and playing can both be present;
    /// playing wins so the audible channel is always the highlighted one.
    pub fn color(self) -> Option<StyleClass> {
        [
            StyleClass::ControlChannel,
            StyleClass::Playing,
            StyleClass::LockedOut,
            StyleClass::PanelOpen,
        ]
        .into_iter()
        .find(|class| self.contains(*class))
    }
}

/// Enabled/toggled state of one panel button.  A disabled control never shows
/// as toggled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlState {
    pub enabled: bool,
    pub toggled: bool,
}

impl ControlState {
    pub const DISABLED: ControlState = ControlState {
        enabled: false,
        toggled: false,
    };

    fn enabled(toggled: bool) -> Self {
        Self {
            enabled: true,
            toggled,
        }
    }
}

/// Resolver output for one row and its control panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisualState {
    pub row: StyleSet,
    pub panel: StyleSet,
    pub hold: ControlState,
    pub lockout: ControlState,
    pub priority: ControlState,
}

pub fn resolve(flags: &ChannelFlags) -> VisualState {
    let mut row = StyleSet::default();
    let mut panel = StyleSet::default();

    if flags.is_control_channel {
        row.set(StyleClass::ControlChannel, true);
    } else {
        let mut color_claimed = false;

        row.set(StyleClass::LockedOut, flags.is_locked_out);
        panel.set(StyleClass::LockedOut, flags.is_locked_out);
        color_claimed |= flags.is_locked_out;

        row.set(StyleClass::Playing, flags.is_playing);
        panel.set(StyleClass::Playing, flags.is_playing);
        color_claimed |= flags.is_playing;

        let panel_open = flags.is_panel_open && !color_claimed;
        row.set(StyleClass::PanelOpen, panel_open);
        panel.set(StyleClass::PanelOpen, panel_open);
    }

    let (lockout, priority) = if flags.is_active {
        (
            ControlState::enabled(flags.is_locked_out),
            ControlState::enabled(flags.is_priority),
        )
    } else {
        (ControlState::DISABLED, ControlState::DISABLED)
    };

    VisualState {
        row,
        panel,
        // The back end has no hold implementation; the button stays inert.
        hold: ControlState::DISABLED,
        lockout,
        priority,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags() -> ChannelFlags {
        ChannelFlags::default()
    }

    #[test]
    fn test_control_channel_overrides_everything() {
        let v = resolve(&ChannelFlags {
            is_control_channel: true,
            is_locked_out: true,
            is_playing: true,
            is_panel_open: true,
            ..flags()
        });
        assert!(v.row.contains(StyleClass::ControlChannel));
        assert!(!v.row.contains(StyleClass::LockedOut));
        assert!(!v.row.contains(StyleClass::Playing));
        assert!(!v.row.contains(StyleClass::PanelOpen));
        assert!(v.panel.is_empty());
        assert_eq!(v.row.color(), Some(StyleClass::ControlChannel));
    }

    #[test]
    fn test_playing_claims_color_over_panel_open() {
        let v = resolve(&ChannelFlags {
            is_playing: true,
            is_panel_open: true,
            ..flags()
        });
        assert!(v.row.contains(StyleClass::Playing));
        assert!(v.panel.contains(StyleClass::Playing));
        assert!(!v.row.contains(StyleClass::PanelOpen));
        assert!(!v.panel.contains(StyleClass::PanelOpen));
        assert_eq!(v.row.color(), Some(StyleClass::Playing));
    }

    #[test]
    fn test_lockout_claims_color_over_panel_open() {
        let v = resolve(&ChannelFlags {
            is_locked_out: true,
            is_panel_open: true,
            ..flags()
        });
        assert_eq!(v.row.color(), Some(StyleClass::LockedOut));
        assert!(!v.panel.contains(StyleClass::PanelOpen));
    }

    #[test]
    fn test_panel_open_shows_when_unclaimed() {
        let v = resolve(&ChannelFlags {
            is_panel_open: true,
            ..flags()
        });
        assert_eq!(v.row.color(), Some(StyleClass::PanelOpen));
        assert_eq!(v.panel.color(), Some(StyleClass::PanelOpen));
    }

    #[test]
    fn test_lockout_and_playing_coexist_playing_paints() {
        let v = resolve(&ChannelFlags {
            is_locked_out: true,
            is_playing: true,
            ..flags()
        });
        assert!(v.row.contains(StyleClass::LockedOut));
        assert!(v.row.contains(StyleClass::Playing));
        assert_eq!(v.row.color(), Some(StyleClass::Playing));
    }

    #[test]
    fn test_no_flags_no_classes() {
        let v = resolve(&flags());
        assert!(v.row.is_empty());
        assert!(v.panel.is_empty());
        assert_eq!(v.row.color(), None);
    }

    #[test]
    fn test_inactive_disables_and_masks_toggles() {
        let v = resolve(&ChannelFlags {
            is_active: false,
            is_locked_out: true,
            is_priority: true,
            ..flags()
        });
        assert_eq!(v.lockout, ControlState::DISABLED);
        assert_eq!(v.priority, ControlState::DISABLED);
    }

    #[test]
    fn test_active_enables_and_toggles_per_flag() {
        let v = resolve(&ChannelFlags {
            is_active: true,
            is_locked_out: true,
            is_priority: false,
            ..flags()
        });
        assert_eq!(
            v.lockout,
            ControlState {
                enabled: true,
                toggled: true
            }
        );
        assert_eq!(
            v.priority,
            ControlState {
                enabled: true,
                toggled: false
            }
        );
        assert!(!v.hold.enabled);
    }

    #[test]
    fn test_style_set_toggle_is_idempotent() {
        let mut set = StyleSet::default();
        set.set(StyleClass::Playing, true);
        set.set(StyleClass::Playing, true);
        assert!(set.contains(StyleClass::Playing));
        set.set(StyleClass::Playing, false);
        set.set(StyleClass::Playing, false);
        assert!(set.is_empty());
    }
}
