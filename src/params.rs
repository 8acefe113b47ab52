//! Role parameters and whitelist policy modes

use crate::{GapError, constants};

/// Advertising PDU type requested by the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AdvertisingType {
    /// Connectable undirected advertising (`ADV_IND`)
    ConnectableUndirected = 0x00,
    /// Connectable directed advertising (`ADV_DIRECT_IND`); requires a
    /// security manager and is not implemented
    ConnectableDirected = 0x01,
    /// Scannable undirected advertising (`ADV_SCAN_IND`)
    ScannableUndirected = 0x02,
    /// Non-connectable undirected advertising (`ADV_NONCONN_IND`)
    NonConnectableUndirected = 0x03,
}

impl AdvertisingType {
    /// Whether this advertising type answers scan requests, i.e. whether a
    /// scan response payload applies.
    #[must_use]
    pub fn supports_scan_response(self) -> bool {
        matches!(
            self,
            Self::ConnectableUndirected | Self::ScannableUndirected
        )
    }
}

/// Advertising parameters supplied to `start_advertising`
///
/// The interval is expressed in 0.625 ms protocol time units; the timeout in
/// seconds, with `0` meaning no timeout. Range validation happens when the
/// role is started, strictly before any radio command is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdvertisingParams {
    advertising_type: AdvertisingType,
    interval: u16,
    timeout_s: u16,
}

impl AdvertisingParams {
    /// Create advertising parameters.
    #[must_use]
    pub const fn new(advertising_type: AdvertisingType, interval: u16, timeout_s: u16) -> Self {
        Self {
            advertising_type,
            interval,
            timeout_s,
        }
    }

    /// The advertising type.
    #[must_use]
    pub fn advertising_type(&self) -> AdvertisingType {
        self.advertising_type
    }

    /// Advertising interval in 0.625 ms units.
    #[must_use]
    pub fn interval(&self) -> u16 {
        self.interval
    }

    /// Advertising timeout in seconds, `0` for none.
    #[must_use]
    pub fn timeout(&self) -> u16 {
        self.timeout_s
    }
}

/// Scanning parameters supplied to `start_scan` and `connect`
///
/// Interval and window are in 0.625 ms protocol time units and the window
/// must not exceed the interval. The timeout is in seconds, `0` for none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanningParams {
    interval: u16,
    window: u16,
    timeout_s: u16,
    active: bool,
}

impl ScanningParams {
    /// Create scanning parameters.
    ///
    /// # Errors
    ///
    /// Returns [`GapError::ParamOutOfRange`] when interval or window fall
    /// outside the protocol range or the window exceeds the interval.
    pub fn new(interval: u16, window: u16, timeout_s: u16, active: bool) -> Result<Self, GapError> {
        if interval < constants::SCAN_INTERVAL_MIN || interval > constants::SCAN_INTERVAL_MAX {
            return Err(GapError::ParamOutOfRange);
        }
        if window < constants::SCAN_INTERVAL_MIN || window > interval {
            return Err(GapError::ParamOutOfRange);
        }
        Ok(Self {
            interval,
            window,
            timeout_s,
            active,
        })
    }

    /// Scan interval in 0.625 ms units.
    #[must_use]
    pub fn interval(&self) -> u16 {
        self.interval
    }

    /// Scan window in 0.625 ms units.
    #[must_use]
    pub fn window(&self) -> u16 {
        self.window
    }

    /// Scan timeout in seconds, `0` for none.
    #[must_use]
    pub fn timeout(&self) -> u16 {
        self.timeout_s
    }

    /// Whether scan requests are sent (active scanning).
    #[must_use]
    pub fn active(&self) -> bool {
        self.active
    }
}

/// Preferred connection parameters
///
/// Carried by `connect` for interface parity; negotiation of preferred
/// parameters is not implemented and the values are ignored. Connection
/// intervals are configured via `set_connection_interval`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConnectionParams {
    /// Minimum connection interval in 1.25 ms units
    pub min_connection_interval: u16,
    /// Maximum connection interval in 1.25 ms units
    pub max_connection_interval: u16,
    /// Slave latency in connection events
    pub slave_latency: u16,
    /// Supervision timeout in 10 ms units
    pub connection_supervision_timeout: u16,
}

/// Whitelist policy applied when advertising starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdvertisingPolicyMode {
    /// Process scan and connection requests from any device
    #[default]
    IgnoreWhitelist,
    /// Only process scan requests from whitelisted devices
    FilterScanRequests,
    /// Only process connection requests from whitelisted devices
    FilterConnectionRequests,
    /// Only process scan and connection requests from whitelisted devices
    FilterAllRequests,
}

/// Whitelist policy applied when scanning starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanningPolicyMode {
    /// Accept advertisements from any device
    #[default]
    IgnoreWhitelist,
    /// Only accept advertisements from whitelisted devices
    FilterAllAdvertisements,
}

/// Filter policy values carried by the set-advertising-parameters command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AdvertisingFilterPolicy {
    /// No whitelist use
    NoWhitelist = 0x00,
    /// Whitelist filters scan requests only
    WhitelistForScan = 0x01,
    /// Whitelist filters connection requests only
    WhitelistForConnection = 0x02,
    /// Whitelist filters both
    WhitelistForAll = 0x03,
}

impl From<AdvertisingPolicyMode> for AdvertisingFilterPolicy {
    fn from(mode: AdvertisingPolicyMode) -> Self {
        match mode {
            AdvertisingPolicyMode::IgnoreWhitelist => Self::NoWhitelist,
            AdvertisingPolicyMode::FilterScanRequests => Self::WhitelistForScan,
            AdvertisingPolicyMode::FilterConnectionRequests => Self::WhitelistForConnection,
            AdvertisingPolicyMode::FilterAllRequests => Self::WhitelistForAll,
        }
    }
}
