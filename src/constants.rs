//! `Jaybird` Constants
//!
//! Protocol ranges, radio timing constants and buffer limits used throughout
//! the library. Interval values are expressed in the time units of the
//! underlying radio command set unless noted otherwise.

/// Maximum serialized advertising / scan-response payload length in bytes.
pub const MAX_ADV_PAYLOAD: usize = 31;

/// Minimum advertising interval for connectable and scannable types, in
/// 0.625 ms units (20 ms).
pub const ADV_INTERVAL_MIN: u16 = 0x0020;

/// Minimum advertising interval for non-connectable undirected advertising,
/// in 0.625 ms units (100 ms). The protocol mandates a longer floor here.
pub const ADV_INTERVAL_MIN_NONCON: u16 = 0x00A0;

/// Maximum advertising interval in 0.625 ms units (10.24 s).
pub const ADV_INTERVAL_MAX: u16 = 0x4000;

/// Maximum advertising timeout in seconds.
pub const ADV_TIMEOUT_MAX_S: u16 = 0x3FFF;

/// Minimum scan interval/window in 0.625 ms units.
pub const SCAN_INTERVAL_MIN: u16 = 0x0004;

/// Maximum scan interval/window in 0.625 ms units.
pub const SCAN_INTERVAL_MAX: u16 = 0x4000;

/// Advertising channel map enabling channels 37, 38 and 39.
pub const ADV_CHANNEL_MAP_ALL: u8 = 0x07;

/// Duration of one protocol time unit in microseconds.
pub const TIME_UNIT_US: u32 = 625;

/// Duration of one connection interval unit in microseconds.
pub const CONN_INTERVAL_UNIT_US: u32 = 1250;

/// Guard interval in milliseconds subtracted from the connection interval
/// when deriving the advertising interval of a connected device, following
/// the radio vendor's time slot allocation guidelines.
pub const GUARD_INTERVAL_MS: u32 = 5;

/// Default minimum/maximum connection interval in 1.25 ms units (50 ms).
pub const DEFAULT_CONN_INTERVAL: u16 = 40;

/// Link supervision timeout in 10 ms units (6 s).
pub const SUPERVISION_TIMEOUT: u16 = 600;

/// Minimum and maximum connection event length in 0.625 ms units (5 ms).
pub const CONN_EVENT_LENGTH: u16 = 8;

/// Maximum number of whitelist entries.
pub const MAX_WHITELIST_ENTRIES: usize = 8;

/// Sentinel for "no connection established".
pub const INVALID_CONNECTION_HANDLE: u16 = 0xFFFF;

/// Depth of the deferred event queue drained by `process_events`.
pub const DEFERRED_QUEUE_DEPTH: usize = 4;

/// `BD_ADDR` length in bytes.
pub const BD_ADDR_LENGTH: usize = 6;

/// Convert milliseconds to 0.625 ms protocol time units.
#[must_use]
pub const fn ms_to_time_units(ms: u32) -> u16 {
    ((ms * 1000) / TIME_UNIT_US) as u16
}

/// Convert 0.625 ms protocol time units to milliseconds, rounding down.
#[must_use]
pub const fn time_units_to_ms(units: u16) -> u32 {
    (units as u32 * TIME_UNIT_US) / 1000
}

/// Convert 1.25 ms connection interval units to milliseconds, rounding down.
#[must_use]
pub const fn conn_units_to_ms(units: u16) -> u32 {
    (units as u32 * CONN_INTERVAL_UNIT_US) / 1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_unit_conversions_round_trip_on_exact_values() {
        assert_eq!(ms_to_time_units(100), 160);
        assert_eq!(time_units_to_ms(160), 100);
        assert_eq!(time_units_to_ms(1), 0); // rounds down
        assert_eq!(conn_units_to_ms(40), 50);
    }
}
