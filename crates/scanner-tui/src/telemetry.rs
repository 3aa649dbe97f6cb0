//! Telemetry surface — three independent last-value-wins text slots.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetrySlot {
    Heartbeat,
    /// Control-channel decode quality.
    CcQuality,
    /// Traffic-channel decode quality.
    TcQuality,
}

impl TelemetrySlot {
    pub fn label(self) -> &'static str {
        match self {
            TelemetrySlot::Heartbeat => "CC",
            TelemetrySlot::CcQuality => "CC quality",
            TelemetrySlot::TcQuality => "TC quality",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Telemetry {
    heartbeat: String,
    cc_quality: String,
    tc_quality: String,
}

impl Telemetry {
    pub fn set(&mut self, slot: TelemetrySlot, display: String) {
        *self.slot_mut(slot) = display;
    }

    pub fn get(&self, slot: TelemetrySlot) -> &str {
        match slot {
            TelemetrySlot::Heartbeat => &self.heartbeat,
            TelemetrySlot::CcQuality => &self.cc_quality,
            TelemetrySlot::TcQuality => &self.tc_quality,
        }
    }

    fn slot_mut(&mut self, slot: TelemetrySlot) -> &mut String {
        match slot {
            TelemetrySlot::Heartbeat => &mut self.heartbeat,
            TelemetrySlot::CcQuality => &mut self.cc_quality,
            TelemetrySlot::TcQuality => &mut self.tc_quality,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_are_independent_and_last_value_wins() {
        let mut t = Telemetry::default();
        t.set(TelemetrySlot::Heartbeat, "🧡".into());
        t.set(TelemetrySlot::CcQuality, "🔴🔴⚪".into());
        t.set(TelemetrySlot::Heartbeat, "❤️".into());
        assert_eq!(t.get(TelemetrySlot::Heartbeat), "❤️");
        assert_eq!(t.get(TelemetrySlot::CcQuality), "🔴🔴⚪");
        assert_eq!(t.get(TelemetrySlot::TcQuality), "");
    }
}
