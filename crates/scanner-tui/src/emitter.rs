//! Command emitter — user intent out to the back end, fire-and-forget.

use scanner_proto::protocol::{Command, PanelButton};
use tracing::{debug, warn};

/// Outbound half of the duplex connection.
pub trait Transport {
    fn send(&mut self, command: Command) -> anyhow::Result<()>;
}

pub struct CommandEmitter {
    transport: Box<dyn Transport>,
}

impl CommandEmitter {
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn click_row(&mut self, frequency: u64) {
        self.emit(Command::ClickRow { frequency });
    }

    /// Callers only offer enabled buttons; nothing is re-checked here.
    pub fn click_button(&mut self, button: PanelButton, frequency: u64) {
        self.emit(Command::ClickButton { button, frequency });
    }

    fn emit(&mut self, command: Command) {
        debug!(?command, "emitting command");
        if let Err(e) = self.transport.send(command) {
            warn!("dropping command {:?}: {}", command, e);
        }
    }
}
