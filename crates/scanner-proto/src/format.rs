//! Display formatting shared by every projection of a channel row.

/// Frequency in Hz as megahertz with exactly four fractional digits,
/// e.g. `460025000` → `"460.0250 MHz"`.
///
/// Integer arithmetic so that values like 851.0125 MHz never pick up
/// binary-float rounding noise.
pub fn format_frequency(hz: u64) -> String {
    // Units of 100 Hz, rounded half-up.
    let ticks = hz.saturating_add(50) / 100;
    format!("{}.{:04} MHz", ticks / 10_000, ticks % 10_000)
}

/// Source radio id in lowercase hex, no prefix or padding.  Unknown ids
/// render as an empty cell.
pub fn format_source(source_id: Option<u32>) -> String {
    source_id.map(|id| format!("{:x}", id)).unwrap_or_default()
}
