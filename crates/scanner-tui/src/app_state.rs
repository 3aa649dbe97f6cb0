//! AppState — shared read-only data passed to all components during render/event.
//!
//! Components read this, but never mutate it.
//! The App event-loop is the only thing that writes to AppState.

use chrono::{DateTime, Local};

use crate::audio::AudioStatus;
use crate::connection::ConnectionStatus;
use crate::registry::RowRegistry;
use crate::synchronizer::Synchronizer;
use crate::telemetry::Telemetry;

pub struct AppState {
    /// Client-side mirror of the back end.
    pub sync: Synchronizer,
    pub connection: ConnectionStatus,
    /// Websocket URL, shown in the header.
    pub endpoint: String,
    pub audio: AudioStatus,
    /// Arrival time of the last text frame.
    pub last_event_at: Option<DateTime<Local>>,
    /// Text frames that failed to decode.
    pub dropped_frames: u64,
    pub show_keys_bar: bool,
}

impl AppState {
    pub fn new(sync: Synchronizer, endpoint: String, audio: AudioStatus, show_keys_bar: bool) -> Self {
        Self {
            sync,
            connection: ConnectionStatus::default(),
            endpoint,
            audio,
            last_event_at: None,
            dropped_frames: 0,
            show_keys_bar,
        }
    }

    pub fn registry(&self) -> &RowRegistry {
        self.sync.registry()
    }

    pub fn telemetry(&self) -> &Telemetry {
        self.sync.telemetry()
    }
}
