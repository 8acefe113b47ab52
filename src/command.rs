//! Radio command port, vendor status codes and asynchronous radio events
//!
//! The controller talks to the radio coprocessor exclusively through
//! [`RadioCommandPort`]. Every command is a synchronous round-trip from the
//! caller's perspective: the future resolves once the coprocessor has
//! returned a [`VendorStatus`] for the command. Advertisement reports and
//! procedure-completion notifications arrive out of band as [`RadioEvent`]s
//! and are fed into [`GapController::handle_event`].
//!
//! One-shot role timers live behind [`TimerService`]; expiry callbacks must
//! not issue radio commands and instead report back through
//! [`GapController::timeout_elapsed`].
//!
//! [`GapController::handle_event`]: crate::GapController::handle_event
//! [`GapController::timeout_elapsed`]: crate::GapController::timeout_elapsed

use crate::{
    AddressType, AdvertisingFilterPolicy, AdvertisingType, BleAddress, DisconnectionReason,
    GapError, constants::MAX_ADV_PAYLOAD,
};
use heapless::Vec;

/// Status codes returned by the radio coprocessor for every command
///
/// The value space mixes standard HCI error codes (low range) with the
/// vendor's own codes (0x40..) and the vendor timeout marker `0xFF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum VendorStatus {
    /// Command executed successfully
    Success = 0x00,
    /// Unknown connection identifier
    UnknownConnectionId = 0x02,
    /// The command is not allowed in the current state
    CommandDisallowed = 0x0C,
    /// The feature is not supported by this controller variant
    UnsupportedFeature = 0x11,
    /// Invalid command parameters
    InvalidParameters = 0x12,
    /// Invalid attribute or connection handle
    InvalidHandle = 0x40,
    /// Generic vendor failure
    Failed = 0x41,
    /// Invalid parameters in a vendor command
    InvalidParams = 0x42,
    /// The controller is busy
    Busy = 0x43,
    /// The operation is not allowed
    NotAllowed = 0x46,
    /// The controller ran out of memory
    OutOfMemory = 0x48,
    /// The requested procedure is not available on this controller
    /// (e.g. hardware variants without the observer role)
    InvalidCid = 0x50,
    /// Insufficient resources to complete the operation
    InsufficientResources = 0x64,
    /// The command timed out inside the stack
    Timeout = 0xFF,
}

impl VendorStatus {
    /// Decode a raw status byte; unknown codes collapse to [`Self::Failed`].
    #[must_use]
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0x00 => Self::Success,
            0x02 => Self::UnknownConnectionId,
            0x0C => Self::CommandDisallowed,
            0x11 => Self::UnsupportedFeature,
            0x12 => Self::InvalidParameters,
            0x40 => Self::InvalidHandle,
            0x42 => Self::InvalidParams,
            0x43 => Self::Busy,
            0x46 => Self::NotAllowed,
            0x48 => Self::OutOfMemory,
            0x50 => Self::InvalidCid,
            0x64 => Self::InsufficientResources,
            0xFF => Self::Timeout,
            _ => Self::Failed,
        }
    }

    /// Whether this status signals success.
    #[must_use]
    pub fn is_success(self) -> bool {
        self == Self::Success
    }

    /// Translate this status into the application error taxonomy.
    ///
    /// This is the default mapping; call sites with a narrower documented
    /// contract (e.g. disconnect) apply their own.
    ///
    /// # Errors
    ///
    /// Any status other than [`Self::Success`].
    pub fn to_result(self) -> Result<(), GapError> {
        match self {
            Self::Success => Ok(()),
            Self::Timeout => Err(GapError::StackBusy),
            Self::InvalidHandle | Self::InvalidParameters | Self::InvalidParams => {
                Err(GapError::InvalidParam)
            }
            Self::InsufficientResources | Self::OutOfMemory => Err(GapError::NoMem),
            Self::CommandDisallowed | Self::NotAllowed => Err(GapError::OperationNotPermitted),
            Self::UnsupportedFeature | Self::InvalidCid => Err(GapError::NotImplemented),
            _ => Err(GapError::Unspecified),
        }
    }
}

/// Parameters of the set-advertising-parameters command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdvertisingSetup {
    /// Minimum advertising interval in 0.625 ms units
    pub interval_min: u16,
    /// Maximum advertising interval in 0.625 ms units
    pub interval_max: u16,
    /// Advertising PDU type
    pub advertising_type: AdvertisingType,
    /// Local address type placed in the PDU
    pub own_address_type: AddressType,
    /// Whitelist filter policy
    pub filter_policy: AdvertisingFilterPolicy,
    /// Advertising channel map
    pub channel_map: u8,
}

/// Parameters of the start-observation command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanSetup {
    /// Active (scan requests sent) vs passive scanning
    pub active: bool,
    /// Scan interval in 0.625 ms units
    pub interval: u16,
    /// Scan window in 0.625 ms units, no larger than the interval
    pub window: u16,
    /// Local address type used in scan requests
    pub own_address_type: AddressType,
}

/// Parameters of the create-connection command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConnectionSetup {
    /// Scan interval used while initiating, in 0.625 ms units
    pub scan_interval: u16,
    /// Scan window used while initiating, in 0.625 ms units
    pub scan_window: u16,
    /// Peer address type
    pub peer_address_type: AddressType,
    /// Peer address
    pub peer_address: BleAddress,
    /// Local address type
    pub own_address_type: AddressType,
    /// Minimum connection interval in 1.25 ms units
    pub conn_interval_min: u16,
    /// Maximum connection interval in 1.25 ms units
    pub conn_interval_max: u16,
    /// Slave latency in connection events
    pub conn_latency: u16,
    /// Supervision timeout in 10 ms units
    pub supervision_timeout: u16,
    /// Minimum connection event length in 0.625 ms units
    pub conn_length_min: u16,
    /// Maximum connection event length in 0.625 ms units
    pub conn_length_max: u16,
}

/// Vendor command surface consumed by the GAP controller
///
/// Implementations wrap the transport to the radio coprocessor. Each method
/// issues one command and resolves with its status; none of them may be
/// called re-entrantly.
#[allow(async_fn_in_trait)]
pub trait RadioCommandPort {
    /// Set advertising parameters.
    async fn set_advertising_parameters(&mut self, setup: &AdvertisingSetup) -> VendorStatus;

    /// Replace the advertising data payload.
    async fn set_advertising_data(&mut self, data: &[u8]) -> VendorStatus;

    /// Replace the scan response payload. An empty slice clears it.
    async fn set_scan_response_data(&mut self, data: &[u8]) -> VendorStatus;

    /// Enable or disable advertising.
    async fn set_advertising_enable(&mut self, enable: bool) -> VendorStatus;

    /// Start the observation (scan) procedure.
    async fn start_observation(&mut self, setup: &ScanSetup) -> VendorStatus;

    /// Terminate the observation procedure.
    async fn terminate_observation(&mut self) -> VendorStatus;

    /// Create a connection to the given peer.
    async fn create_connection(&mut self, setup: &ConnectionSetup) -> VendorStatus;

    /// Terminate the connection identified by `handle`.
    async fn terminate_connection(
        &mut self,
        handle: u16,
        reason: DisconnectionReason,
    ) -> VendorStatus;

    /// Push the given whitelist into the controller.
    async fn configure_whitelist(&mut self, entries: &[BleAddress]) -> VendorStatus;

    /// Set the random address used when the local address type is random.
    async fn set_random_address(&mut self, address: BleAddress) -> VendorStatus;

    /// Write the public address to the persistent radio configuration.
    async fn write_public_address(&mut self, address: BleAddress) -> VendorStatus;

    /// Read the public address back from the radio configuration.
    async fn read_public_address(&mut self) -> (VendorStatus, Option<BleAddress>);

    /// Set the transmit power amplifier configuration.
    async fn set_tx_power(&mut self, enable_high_power: bool, pa_level: u8) -> VendorStatus;

    /// Update the GATT appearance characteristic value (little-endian on the
    /// wire).
    async fn update_appearance_characteristic(&mut self, appearance: u16) -> VendorStatus;
}

/// One-shot timers the controller arms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GapTimer {
    /// Advertising timeout
    Advertising,
    /// Scanning timeout
    Scanning,
    /// Delay between discovery-complete and connection creation
    ConnectionDelay,
}

/// One-shot deferred callback scheduling
///
/// Arming a timer that is already pending replaces the previous deadline. A
/// timer that fires is self-disarming. Expiry must be reported to the
/// controller via `timeout_elapsed`; the callback context is assumed to be
/// unfit for radio I/O.
pub trait TimerService {
    /// Arm `timer` to fire once after `duration_ms` milliseconds.
    fn attach(&mut self, timer: GapTimer, duration_ms: u32);

    /// Cancel a pending `timer`, if any.
    fn detach(&mut self, timer: GapTimer);
}

/// A raw advertisement or scan-response report from the radio
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvertisementEvent {
    /// Raw PDU type from the report
    pub pdu_type: u8,
    /// Peer address type
    pub peer_address_type: AddressType,
    /// Peer address
    pub peer_address: BleAddress,
    /// Report payload
    pub data: Vec<u8, MAX_ADV_PAYLOAD>,
    /// Received signal strength in dBm
    pub rssi: i8,
}

/// Asynchronous events delivered by the radio coprocessor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RadioEvent {
    /// A device was found while scanning
    Advertisement(AdvertisementEvent),
    /// The discovery procedure completed
    DiscoveryComplete,
    /// A connection attempt finished
    ConnectionComplete {
        /// Completion status
        status: VendorStatus,
        /// Handle assigned by the radio on success
        handle: u16,
    },
    /// A connection was torn down
    DisconnectionComplete {
        /// Completion status
        status: VendorStatus,
        /// Handle of the affected connection
        handle: u16,
        /// Raw reason code reported by the radio
        reason: u8,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_raw() {
        for status in [
            VendorStatus::Success,
            VendorStatus::UnknownConnectionId,
            VendorStatus::CommandDisallowed,
            VendorStatus::UnsupportedFeature,
            VendorStatus::InvalidParameters,
            VendorStatus::InvalidHandle,
            VendorStatus::Failed,
            VendorStatus::InvalidParams,
            VendorStatus::Busy,
            VendorStatus::NotAllowed,
            VendorStatus::OutOfMemory,
            VendorStatus::InvalidCid,
            VendorStatus::InsufficientResources,
            VendorStatus::Timeout,
        ] {
            assert_eq!(VendorStatus::from_raw(status as u8), status);
        }
        // unknown codes collapse to the generic failure
        assert_eq!(VendorStatus::from_raw(0x99), VendorStatus::Failed);
    }

    #[test]
    fn status_translation_covers_the_taxonomy() {
        assert_eq!(VendorStatus::Success.to_result(), Ok(()));
        assert_eq!(
            VendorStatus::Timeout.to_result(),
            Err(GapError::StackBusy)
        );
        assert_eq!(
            VendorStatus::InvalidHandle.to_result(),
            Err(GapError::InvalidParam)
        );
        assert_eq!(
            VendorStatus::InvalidParams.to_result(),
            Err(GapError::InvalidParam)
        );
        assert_eq!(
            VendorStatus::InsufficientResources.to_result(),
            Err(GapError::NoMem)
        );
        assert_eq!(
            VendorStatus::CommandDisallowed.to_result(),
            Err(GapError::OperationNotPermitted)
        );
        assert_eq!(
            VendorStatus::InvalidCid.to_result(),
            Err(GapError::NotImplemented)
        );
        assert_eq!(
            VendorStatus::Failed.to_result(),
            Err(GapError::Unspecified)
        );
    }
}
