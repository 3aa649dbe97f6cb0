//! Connection — the duplex websocket to the scanner back end.
//!
//! One background task owns the socket.  Inbound messages become
//! [`ConnectionEvent::Frame`]s, classified by websocket framing type alone.
//! Outbound [`Command`]s arrive through a bounded queue fed by
//! [`ChannelTransport`].  There is no reconnect: once the socket is gone the
//! task reports [`ConnectionEvent::Closed`] and exits.

use anyhow::anyhow;
use futures_util::{SinkExt, StreamExt};
use scanner_proto::protocol::{Command, Frame};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, trace, warn};

use crate::emitter::Transport;

/// Outbound commands waiting for the socket.
const COMMAND_QUEUE: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    Connected,
    Frame(Frame),
    Closed(String),
}

/// What the header shows about the link.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Connected,
    Disconnected(String),
}

impl ConnectionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Connecting => "CONNECTING",
            ConnectionStatus::Connected => "LIVE",
            ConnectionStatus::Disconnected(_) => "OFFLINE",
        }
    }
}

/// [`Transport`] that hands commands to the connection task.  Never blocks;
/// a full or closed queue drops the command.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: mpsc::Sender<Command>,
}

impl Transport for ChannelTransport {
    fn send(&mut self, command: Command) -> anyhow::Result<()> {
        self.tx
            .try_send(command)
            .map_err(|e| anyhow!("command queue: {}", e))
    }
}

/// Map a websocket message to a transport frame.  Control messages carry no
/// payload for the client.
pub fn frame_from_ws(message: Message) -> Option<Frame> {
    match message {
        Message::Text(text) => Some(Frame::Text(text)),
        Message::Binary(bytes) => Some(Frame::Binary(bytes)),
        Message::Ping(_) | Message::Pong(_) | Message::Close(_) | Message::Frame(_) => None,
    }
}

/// Connect to `url` in the background.  Events go to `events`; the returned
/// transport feeds commands back out.
pub fn spawn(url: String, events: mpsc::Sender<ConnectionEvent>) -> ChannelTransport {
    let (tx, rx) = mpsc::channel::<Command>(COMMAND_QUEUE);
    tokio::spawn(async move {
        let reason = match run(&url, &events, rx).await {
            Ok(reason) => {
                info!("connection to {} closed: {}", url, reason);
                reason
            }
            Err(e) => {
                warn!("connection to {} failed: {:#}", url, e);
                format!("{:#}", e)
            }
        };
        let _ = events.send(ConnectionEvent::Closed(reason)).await;
    });
    ChannelTransport { tx }
}

async fn run(
    url: &str,
    events: &mpsc::Sender<ConnectionEvent>,
    mut commands: mpsc::Receiver<Command>,
) -> anyhow::Result<String> {
    info!("connecting to {}", url);
    let (ws, _response) = connect_async(url).await?;
    info!("connected to {}", url);
    if events.send(ConnectionEvent::Connected).await.is_err() {
        return Ok("client gone".to_string());
    }

    let (mut sink, mut stream) = ws.split();
    loop {
        tokio::select! {
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Close(frame))) => {
                    let reason = frame
                        .map(|f| format!("closed by server ({})", f.code))
                        .unwrap_or_else(|| "closed by server".to_string());
                    return Ok(reason);
                }
                Some(Ok(message)) => {
                    let Some(frame) = frame_from_ws(message) else {
                        trace!("control message");
                        continue;
                    };
                    if events.send(ConnectionEvent::Frame(frame)).await.is_err() {
                        return Ok("client gone".to_string());
                    }
                }
                Some(Err(e)) => return Err(e.into()),
                None => return Ok("stream ended".to_string()),
            },

            outgoing = commands.recv() => match outgoing {
                Some(command) => {
                    let text = command.encode()?;
                    debug!(%text, "sending");
                    sink.send(Message::Text(text)).await?;
                }
                None => {
                    let _ = sink.close().await;
                    return Ok("client gone".to_string());
                }
            },
        }
    }
}
