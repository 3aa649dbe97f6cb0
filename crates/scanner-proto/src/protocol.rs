use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Sample rate of the PCM carried in binary frames (16-bit signed LE, mono).
pub const PCM_SAMPLE_RATE_HZ: u32 = 8000;

/// One unit of transport payload.  The kind is decided by the websocket
/// framing type, never by inspecting the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Raw audio samples; the whole frame is payload.
    Binary(Vec<u8>),
    /// One structured event.
    Text(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed event frame: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("event frame has no `event` tag")]
    MissingTag,
}

/// Messages sent from the back end to the client (text frames).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event")]
pub enum Event {
    #[serde(rename = "UPDATE_ROW")]
    UpdateRow(RowUpdate),
    #[serde(rename = "UPDATE_HEARTBEAT")]
    UpdateHeartbeat { display: String },
    #[serde(rename = "UPDATE_CC_QUALITY")]
    UpdateCcQuality { display: String },
    #[serde(rename = "UPDATE_TC_QUALITY")]
    UpdateTcQuality { display: String },
    #[serde(rename = "SHOW_ROW_BUTTONS")]
    ShowRowButtons {
        #[serde(rename = "freq", alias = "frequency")]
        frequency: u64,
    },
    #[serde(rename = "HIDE_ROW_BUTTONS")]
    HideRowButtons {
        #[serde(rename = "freq", alias = "frequency")]
        frequency: u64,
    },
    /// Any tag this client does not know.  Newer back ends may send more.
    #[serde(other)]
    Unknown,
}

impl Event {
    /// Parse one text frame.
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(text)?;
        let tag = value
            .get("event")
            .and_then(Value::as_str)
            .ok_or(ProtocolError::MissingTag)?;
        let event = Event::deserialize(&value)?;
        if event == Event::Unknown {
            tracing::debug!(tag, "ignoring unrecognised event");
        }
        Ok(event)
    }

    /// Wire tag, for logging.
    pub fn tag(&self) -> &'static str {
        match self {
            Event::UpdateRow(_) => "UPDATE_ROW",
            Event::UpdateHeartbeat { .. } => "UPDATE_HEARTBEAT",
            Event::UpdateCcQuality { .. } => "UPDATE_CC_QUALITY",
            Event::UpdateTcQuality { .. } => "UPDATE_TC_QUALITY",
            Event::ShowRowButtons { .. } => "SHOW_ROW_BUTTONS",
            Event::HideRowButtons { .. } => "HIDE_ROW_BUTTONS",
            Event::Unknown => "UNKNOWN",
        }
    }
}

/// Payload of `UPDATE_ROW`: the full state of one channel.
///
/// Field names on the wire are the back end's short names; the long names are
/// accepted too.  Display fields default to empty, flags to `false`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct RowUpdate {
    #[serde(rename = "freq", alias = "frequency")]
    pub frequency: u64,
    #[serde(
        rename = "tg",
        alias = "talkgroup_label",
        default,
        deserialize_with = "text_or_number"
    )]
    pub talkgroup_label: String,
    #[serde(
        rename = "icon",
        alias = "category_icon",
        default,
        deserialize_with = "text_or_number"
    )]
    pub category_icon: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub description: String,
    #[serde(
        rename = "source",
        alias = "source_id",
        default,
        deserialize_with = "optional_source"
    )]
    pub source_id: Option<u32>,
    #[serde(rename = "control", alias = "is_control_channel", default)]
    pub is_control_channel: bool,
    #[serde(rename = "lockout", alias = "is_locked_out", default)]
    pub is_locked_out: bool,
    #[serde(rename = "playing", alias = "is_playing", default)]
    pub is_playing: bool,
    #[serde(rename = "drawer_open", alias = "is_panel_open", default)]
    pub is_panel_open: bool,
    #[serde(rename = "active", alias = "is_active", default)]
    pub is_active: bool,
    #[serde(rename = "prio", alias = "is_priority", default)]
    pub is_priority: bool,
}

/// The back end sends talkgroups as integers but blanks them with `""` on the
/// control channel, so display fields accept either.
fn text_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    match Value::deserialize(d)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(D::Error::custom(format!("expected text, found {other}"))),
    }
}

/// Source radio id: an integer, or `""`/null when there is none.
fn optional_source<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    match Value::deserialize(d)? {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| D::Error::custom(format!("bad source id {s:?}: {e}"))),
        Value::Number(n) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("source id out of range: {n}"))),
        other => Err(D::Error::custom(format!("expected source id, found {other}"))),
    }
}

/// The three buttons of a row's control panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PanelButton {
    #[serde(rename = "hold_group")]
    HoldGroup,
    #[serde(rename = "lo_group")]
    LockoutGroup,
    #[serde(rename = "group_prio")]
    GroupPriority,
}

impl PanelButton {
    /// Left-to-right order in the panel.
    pub const ALL: [PanelButton; 3] = [
        PanelButton::HoldGroup,
        PanelButton::LockoutGroup,
        PanelButton::GroupPriority,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PanelButton::HoldGroup => "HOLD GROUP",
            PanelButton::LockoutGroup => "L/O GROUP",
            PanelButton::GroupPriority => "GROUP PRIO",
        }
    }
}

/// Messages sent from the client to the back end (text frames).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum Command {
    #[serde(rename = "CLICK_ROW")]
    ClickRow {
        #[serde(rename = "freq")]
        frequency: u64,
    },
    #[serde(rename = "CLICK_BUTTON")]
    ClickButton {
        button: PanelButton,
        #[serde(rename = "freq")]
        frequency: u64,
    },
}

impl Command {
    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}
