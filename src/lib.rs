#![no_std]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![allow(clippy::too_many_lines)]

#[macro_use]
mod log;

mod address;
pub mod adv_data;
pub mod command;
pub mod constants;
mod controller;
mod filter;
pub mod params;
#[cfg(test)]
pub(crate) mod testutil;

pub use address::{AddressManager, AddressType, BleAddress};
pub use adv_data::{AdType, AdUnit, AdvertisingData};
pub use command::{
    AdvertisementEvent, AdvertisingSetup, ConnectionSetup, GapTimer, RadioCommandPort, RadioEvent,
    ScanSetup, TimerService, VendorStatus,
};
pub use controller::GapController;
pub use filter::{AdvertisementReport, DiscoveryReason};
pub use params::{
    AdvertisingFilterPolicy, AdvertisingParams, AdvertisingPolicyMode, AdvertisingType,
    ConnectionParams, ScanningParams, ScanningPolicyMode,
};

/// GAP-facing errors with a flat, stable taxonomy
///
/// Success is represented by `Ok(())`; every failure maps a vendor status
/// code or a validation failure onto one of these variants. The translation
/// is documented per operation on [`GapController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GapError {
    /// A payload would exceed a fixed buffer limit (e.g. the 31-byte
    /// advertising payload)
    BufferOverflow,
    /// The requested feature is not implemented by this stack
    NotImplemented,
    /// A parameter fell outside its protocol-defined range; no command was
    /// issued
    ParamOutOfRange,
    /// The radio rejected a command parameter set
    InvalidParam,
    /// The operation is not permitted in the current configuration
    OperationNotPermitted,
    /// The radio command timed out; the caller should retry later
    StackBusy,
    /// The radio reported insufficient resources
    NoMem,
    /// The controller is in a state that forbids the operation
    InvalidState,
    /// Catch-all for unmapped vendor failures
    Unspecified,
}

/// Current role flags of the GAP controller
///
/// Flags are mutated only on confirmed transitions (after the radio command
/// succeeds or a terminal event arrives), with one exception: `connecting`
/// is set optimistically when a connect sequence starts and cleared on both
/// success and command failure paths described in [`GapController::connect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GapState {
    /// Advertising is enabled on the radio
    pub advertising: bool,
    /// An observation (scan) procedure is running
    pub scanning: bool,
    /// A connection attempt is pending
    pub connecting: bool,
    /// A connection is established
    pub connected: bool,
}

/// GAP role of the local device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum GapRole {
    /// Advertises and accepts connections
    #[default]
    Peripheral = 0x01,
    /// Scans and initiates connections
    Central = 0x02,
}

/// Reason codes carried by the terminate-connection command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DisconnectionReason {
    /// Authentication failure
    AuthenticationFailure = 0x05,
    /// Supervision timeout expired
    ConnectionTimeout = 0x08,
    /// The remote user terminated the connection
    RemoteUserTerminatedConnection = 0x13,
    /// The remote device is low on resources
    RemoteDevTerminationDueToLowResources = 0x14,
    /// The remote device is powering off
    RemoteDevTerminationDueToPowerOff = 0x15,
    /// The local host terminated the connection
    LocalHostTerminatedConnection = 0x16,
    /// Terminated due to a MIC failure on a received packet
    ConnectionTerminatedDueToMicFailure = 0x3D,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gap_state_defaults_to_all_idle() {
        let state = GapState::default();
        assert!(!state.advertising);
        assert!(!state.scanning);
        assert!(!state.connecting);
        assert!(!state.connected);
    }

    #[test]
    fn gap_role_defaults_to_peripheral() {
        assert_eq!(GapRole::default(), GapRole::Peripheral);
        assert_eq!(GapRole::Central as u8, 0x02);
    }

    #[test]
    fn disconnection_reason_wire_values() {
        assert_eq!(DisconnectionReason::RemoteUserTerminatedConnection as u8, 0x13);
        assert_eq!(DisconnectionReason::ConnectionTimeout as u8, 0x08);
    }
}
