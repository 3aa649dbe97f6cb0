//! Scanner synchronizer — owns the client-side mirror of the back end and
//! routes every inbound frame to the component responsible for it.
//!
//! ```text
//!  Frame::Binary ──────────────────────────────► AudioSink::feed
//!  Frame::Text ─► Event::decode ─┬─ UPDATE_ROW ───► RowRegistry::upsert (+ resolve)
//!                                ├─ UPDATE_*  ────► Telemetry::set
//!                                ├─ SHOW/HIDE ────► RowRegistry::set_panel_visible
//!                                └─ unknown ──────► ignored
//! ```
//!
//! Frames are handled strictly one at a time in arrival order.  A frame that
//! fails to decode is dropped and logged; nothing it carried is applied.

use scanner_proto::protocol::{Event, Frame, PanelButton};
use tracing::{debug, trace, warn};

use crate::audio::AudioSink;
use crate::emitter::{CommandEmitter, Transport};
use crate::registry::{RowRegistry, Upsert};
use crate::telemetry::{Telemetry, TelemetrySlot};

/// What one inbound frame did to client state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Row { frequency: u64, upsert: Upsert },
    Telemetry(TelemetrySlot),
    PanelVisibility {
        frequency: u64,
        visible: bool,
        /// `false` when the frequency had no row.
        applied: bool,
    },
    /// Bytes handed to the audio sink.
    Audio(usize),
    /// Well-formed event with an unrecognised tag.
    Ignored,
    /// Undecodable text frame.
    Dropped(String),
}

impl Dispatch {
    /// Whether the visible table or telemetry may have changed.
    pub fn changes_view(&self) -> bool {
        matches!(
            self,
            Dispatch::Row { .. }
                | Dispatch::Telemetry(_)
                | Dispatch::PanelVisibility { applied: true, .. }
        )
    }
}

pub struct Synchronizer {
    registry: RowRegistry,
    telemetry: Telemetry,
    emitter: CommandEmitter,
    sink: Box<dyn AudioSink>,
}

impl Synchronizer {
    /// Empty registry, blank telemetry.  The first frame may be of any kind.
    pub fn init(transport: Box<dyn Transport>, sink: Box<dyn AudioSink>) -> Self {
        Self {
            registry: RowRegistry::new(),
            telemetry: Telemetry::default(),
            emitter: CommandEmitter::new(transport),
            sink,
        }
    }

    pub fn registry(&self) -> &RowRegistry {
        &self.registry
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    pub fn on_frame(&mut self, frame: Frame) -> Dispatch {
        match frame {
            Frame::Binary(pcm) => {
                self.sink.feed(&pcm);
                Dispatch::Audio(pcm.len())
            }
            Frame::Text(text) => match Event::decode(&text) {
                Ok(event) => self.on_event(event),
                Err(e) => {
                    warn!("dropping frame: {}", e);
                    trace!(frame = %text, "dropped frame body");
                    Dispatch::Dropped(e.to_string())
                }
            },
        }
    }

    fn on_event(&mut self, event: Event) -> Dispatch {
        trace!(tag = event.tag(), "event");
        match event {
            Event::UpdateRow(update) => {
                let upsert = self.registry.upsert(&update);
                if upsert == Upsert::Created {
                    debug!(frequency = update.frequency, "new channel row");
                }
                Dispatch::Row {
                    frequency: update.frequency,
                    upsert,
                }
            }
            Event::UpdateHeartbeat { display } => {
                self.set_telemetry(TelemetrySlot::Heartbeat, display)
            }
            Event::UpdateCcQuality { display } => {
                self.set_telemetry(TelemetrySlot::CcQuality, display)
            }
            Event::UpdateTcQuality { display } => {
                self.set_telemetry(TelemetrySlot::TcQuality, display)
            }
            Event::ShowRowButtons { frequency } => self.set_panel_visible(frequency, true),
            Event::HideRowButtons { frequency } => self.set_panel_visible(frequency, false),
            Event::Unknown => Dispatch::Ignored,
        }
    }

    fn set_telemetry(&mut self, slot: TelemetrySlot, display: String) -> Dispatch {
        self.telemetry.set(slot, display);
        Dispatch::Telemetry(slot)
    }

    fn set_panel_visible(&mut self, frequency: u64, visible: bool) -> Dispatch {
        let applied = self.registry.set_panel_visible(frequency, visible);
        if !applied {
            debug!(frequency, visible, "panel visibility for unknown row ignored");
        }
        Dispatch::PanelVisibility {
            frequency,
            visible,
            applied,
        }
    }

    /// User selected a row.  The back end answers with row and panel events;
    /// nothing changes locally.
    pub fn click_row(&mut self, frequency: u64) {
        self.emitter.click_row(frequency);
    }

    /// User pressed a panel button.  Disabled buttons and unknown rows are
    /// not sent.
    pub fn click_button(&mut self, button: PanelButton, frequency: u64) -> bool {
        let enabled = self
            .registry
            .get(frequency)
            .is_some_and(|entry| entry.panel.control(button).enabled);
        if enabled {
            self.emitter.click_button(button, frequency);
        } else {
            debug!(?button, frequency, "ignoring click on disabled control");
        }
        enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::tests::RecordingTransport;
    use crate::style::{ControlState, StyleClass};
    use scanner_proto::protocol::Command;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct RecordingSink {
        frames: Rc<RefCell<Vec<Vec<u8>>>>,
    }

    impl AudioSink for RecordingSink {
        fn feed(&mut self, pcm: &[u8]) {
            self.frames.borrow_mut().push(pcm.to_vec());
        }
    }

    struct Harness {
        sync: Synchronizer,
        sent: RecordingTransport,
        audio: RecordingSink,
    }

    fn harness() -> Harness {
        let sent = RecordingTransport::default();
        let audio = RecordingSink::default();
        let sync = Synchronizer::init(Box::new(sent.clone()), Box::new(audio.clone()));
        Harness { sync, sent, audio }
    }

    fn text(json: &str) -> Frame {
        Frame::Text(json.to_string())
    }

    fn row(freq: u64, extra: &str) -> Frame {
        let sep = if extra.is_empty() { "" } else { "," };
        Frame::Text(format!(
            r#"{{"event":"UPDATE_ROW","freq":{freq},"tg":"1201","icon":"🚒","description":"Fire Dispatch","source":"3039"{sep}{extra}}}"#
        ))
    }

    #[test]
    fn test_init_is_empty() {
        let h = harness();
        assert!(h.sync.registry().is_empty());
        assert_eq!(h.sync.telemetry(), &Telemetry::default());
    }

    #[test]
    fn test_rows_sorted_regardless_of_arrival() {
        let mut h = harness();
        for f in [851_012_500u64, 453_000_000, 460_025_000, 155_070_000] {
            h.sync.on_frame(row(f, ""));
        }
        assert_eq!(
            h.sync.registry().frequencies(),
            vec![155_070_000, 453_000_000, 460_025_000, 851_012_500]
        );
    }

    #[test]
    fn test_repeat_frequency_updates_in_place() {
        let mut h = harness();
        let descriptions = [
            (460_025_000u64, "A"),
            (453_000_000, "B"),
            (460_025_000, "C"),
        ];
        let mut outcomes = Vec::new();
        for (f, d) in descriptions {
            outcomes.push(h.sync.on_frame(Frame::Text(format!(
                r#"{{"event":"UPDATE_ROW","freq":{f},"description":"{d}"}}"#
            ))));
        }
        assert_eq!(
            outcomes,
            vec![
                Dispatch::Row {
                    frequency: 460_025_000,
                    upsert: Upsert::Created
                },
                Dispatch::Row {
                    frequency: 453_000_000,
                    upsert: Upsert::Created
                },
                Dispatch::Row {
                    frequency: 460_025_000,
                    upsert: Upsert::Updated
                },
            ]
        );
        let reg = h.sync.registry();
        assert_eq!(reg.frequencies(), vec![453_000_000, 460_025_000]);
        assert_eq!(reg.get(453_000_000).unwrap().row.description, "B");
        assert_eq!(reg.get(460_025_000).unwrap().row.description, "C");
    }

    #[test]
    fn test_control_channel_clears_previous_colors() {
        let mut h = harness();
        h.sync.on_frame(row(10, r#""playing":true,"drawer_open":true"#));
        h.sync.on_frame(row(10, r#""control":true,"playing":true"#));
        let entry = h.sync.registry().get(10).unwrap();
        assert_eq!(entry.row.style.color(), Some(StyleClass::ControlChannel));
        assert!(!entry.row.style.contains(StyleClass::Playing));
        assert!(entry.panel.style.is_empty());
    }

    #[test]
    fn test_playing_with_open_panel_paints_playing() {
        let mut h = harness();
        h.sync.on_frame(row(
            100,
            r#""control":false,"lockout":false,"playing":true,"drawer_open":true"#,
        ));
        let entry = h.sync.registry().get(100).unwrap();
        assert_eq!(entry.row.style.color(), Some(StyleClass::Playing));
        assert!(!entry.row.style.contains(StyleClass::PanelOpen));
        assert!(!entry.panel.style.contains(StyleClass::PanelOpen));
    }

    #[test]
    fn test_inactive_row_masks_toggles() {
        let mut h = harness();
        h.sync.on_frame(row(10, r#""lockout":true,"prio":true,"active":false"#));
        let panel = &h.sync.registry().get(10).unwrap().panel;
        assert_eq!(panel.lockout, ControlState::DISABLED);
        assert_eq!(panel.priority, ControlState::DISABLED);

        h.sync.on_frame(row(10, r#""lockout":true,"prio":true,"active":true"#));
        let panel = &h.sync.registry().get(10).unwrap().panel;
        assert!(panel.lockout.enabled && panel.lockout.toggled);
        assert!(panel.priority.enabled && panel.priority.toggled);
    }

    #[test]
    fn test_telemetry_slots() {
        let mut h = harness();
        assert_eq!(
            h.sync.on_frame(text(r#"{"event":"UPDATE_HEARTBEAT","display":"🧡"}"#)),
            Dispatch::Telemetry(TelemetrySlot::Heartbeat)
        );
        h.sync.on_frame(text(r#"{"event":"UPDATE_CC_QUALITY","display":"🟢🟢🟢"}"#));
        h.sync.on_frame(text(r#"{"event":"UPDATE_TC_QUALITY","display":"🟡"}"#));
        h.sync.on_frame(text(r#"{"event":"UPDATE_HEARTBEAT","display":"❤️"}"#));
        let t = h.sync.telemetry();
        assert_eq!(t.get(TelemetrySlot::Heartbeat), "❤️");
        assert_eq!(t.get(TelemetrySlot::CcQuality), "🟢🟢🟢");
        assert_eq!(t.get(TelemetrySlot::TcQuality), "🟡");
    }

    #[test]
    fn test_show_hide_panel() {
        let mut h = harness();
        h.sync.on_frame(row(10, ""));
        let shown = h.sync.on_frame(text(r#"{"event":"SHOW_ROW_BUTTONS","freq":10}"#));
        assert!(shown.changes_view());
        assert!(h.sync.registry().get(10).unwrap().panel.visible);

        h.sync.on_frame(text(r#"{"event":"HIDE_ROW_BUTTONS","freq":10}"#));
        assert!(!h.sync.registry().get(10).unwrap().panel.visible);
    }

    #[test]
    fn test_hide_for_unknown_row_changes_nothing() {
        let mut h = harness();
        h.sync.on_frame(row(10, ""));
        let d = h.sync.on_frame(text(r#"{"event":"HIDE_ROW_BUTTONS","freq":99}"#));
        assert_eq!(
            d,
            Dispatch::PanelVisibility {
                frequency: 99,
                visible: false,
                applied: false
            }
        );
        assert!(!d.changes_view());
        assert_eq!(h.sync.registry().frequencies(), vec![10]);
    }

    #[test]
    fn test_binary_frames_reach_sink_verbatim_in_order() {
        let mut h = harness();
        let a = vec![0x01, 0x00, 0xff, 0x7f];
        let b = vec![0x00, 0x80, 0x42];
        assert_eq!(h.sync.on_frame(Frame::Binary(a.clone())), Dispatch::Audio(4));
        h.sync.on_frame(row(10, ""));
        h.sync.on_frame(Frame::Binary(b.clone()));
        assert_eq!(*h.audio.frames.borrow(), vec![a, b]);
        assert_eq!(h.sync.registry().len(), 1);
    }

    #[test]
    fn test_json_looking_binary_goes_to_audio() {
        let mut h = harness();
        let payload = br#"{"event":"UPDATE_ROW","freq":1}"#.to_vec();
        h.sync.on_frame(Frame::Binary(payload.clone()));
        assert!(h.sync.registry().is_empty());
        assert_eq!(*h.audio.frames.borrow(), vec![payload]);
    }

    #[test]
    fn test_malformed_frame_dropped_without_side_effects() {
        let mut h = harness();
        h.sync.on_frame(row(10, ""));
        let before = h.sync.registry().get(10).unwrap().clone();

        for bad in [
            "not json",
            r#"{"freq":10}"#,
            r#"{"event":"UPDATE_ROW","freq":"ten"}"#,
            r#"{"event":"UPDATE_HEARTBEAT"}"#,
        ] {
            assert!(matches!(h.sync.on_frame(text(bad)), Dispatch::Dropped(_)));
        }
        assert_eq!(h.sync.registry().get(10), Some(&before));
        assert_eq!(h.sync.registry().len(), 1);
        assert_eq!(h.sync.telemetry(), &Telemetry::default());

        // Later frames still apply.
        h.sync.on_frame(row(20, ""));
        assert_eq!(h.sync.registry().len(), 2);
    }

    #[test]
    fn test_unknown_tag_ignored() {
        let mut h = harness();
        assert_eq!(
            h.sync.on_frame(text(r#"{"event":"SOMETHING_NEW","x":1}"#)),
            Dispatch::Ignored
        );
        assert!(h.sync.registry().is_empty());
    }

    #[test]
    fn test_click_row_emits_without_local_change() {
        let mut h = harness();
        h.sync.on_frame(row(10, ""));
        let before = h.sync.registry().get(10).unwrap().clone();
        h.sync.click_row(10);
        assert_eq!(*h.sent.sent.borrow(), vec![Command::ClickRow { frequency: 10 }]);
        assert_eq!(h.sync.registry().get(10), Some(&before));
    }

    #[test]
    fn test_click_button_only_when_enabled() {
        let mut h = harness();
        h.sync.on_frame(row(10, r#""active":false"#));
        assert!(!h.sync.click_button(PanelButton::LockoutGroup, 10));
        assert!(!h.sync.click_button(PanelButton::GroupPriority, 99));
        assert!(h.sent.sent.borrow().is_empty());

        h.sync.on_frame(row(10, r#""active":true"#));
        assert!(!h.sync.click_button(PanelButton::HoldGroup, 10));
        assert!(h.sync.click_button(PanelButton::LockoutGroup, 10));
        assert_eq!(
            *h.sent.sent.borrow(),
            vec![Command::ClickButton {
                button: PanelButton::LockoutGroup,
                frequency: 10
            }]
        );
    }
}
