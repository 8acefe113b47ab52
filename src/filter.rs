//! Advertisement report classification and filtering

use crate::{
    AddressType, AdvertisingType, BleAddress, ScanningPolicyMode, constants::MAX_ADV_PAYLOAD,
};
use heapless::Vec;

/// Raw advertising PDU types as carried by advertisement report events.
pub mod pdu {
    /// Connectable undirected advertising
    pub const ADV_IND: u8 = 0x00;
    /// Connectable directed advertising
    pub const ADV_DIRECT_IND: u8 = 0x01;
    /// Scannable undirected advertising
    pub const ADV_SCAN_IND: u8 = 0x02;
    /// Non-connectable undirected advertising
    pub const ADV_NONCONN_IND: u8 = 0x03;
    /// Scan response
    pub const SCAN_RSP: u8 = 0x04;
}

/// Why a report callback fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DiscoveryReason {
    /// A peer device was observed
    DeviceFound,
    /// The discovery procedure finished
    DiscoveryComplete,
}

/// A decoded advertisement report surfaced to the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvertisementReport {
    /// Report reason
    pub reason: DiscoveryReason,
    /// Logical advertising type of the observed PDU
    pub advertising_type: AdvertisingType,
    /// Whether the report is a scan response
    pub is_scan_response: bool,
    /// Peer address type
    pub peer_address_type: AddressType,
    /// Peer address
    pub peer_address: BleAddress,
    /// Raw payload
    pub data: Vec<u8, MAX_ADV_PAYLOAD>,
    /// Received signal strength in dBm
    pub rssi: i8,
}

/// Map a raw PDU type to its logical advertising type and scan-response flag.
///
/// Unrecognized PDU types default to connectable undirected. Scannable
/// undirected PDUs carry the scan-response flag together with actual scan
/// responses.
#[must_use]
pub fn classify_pdu(pdu_type: u8) -> (AdvertisingType, bool) {
    match pdu_type {
        pdu::ADV_DIRECT_IND => (AdvertisingType::ConnectableDirected, false),
        pdu::ADV_SCAN_IND | pdu::SCAN_RSP => (AdvertisingType::ScannableUndirected, true),
        pdu::ADV_NONCONN_IND => (AdvertisingType::NonConnectableUndirected, false),
        _ => (AdvertisingType::ConnectableUndirected, false),
    }
}

/// Whether a report must be dropped before classification.
///
/// Reports are dropped when the scanning policy restricts observation to the
/// whitelist, and unconditionally for private peer address types: without
/// address resolution there is no way to match them against anything.
#[must_use]
pub fn should_drop(mode: ScanningPolicyMode, peer_address_type: AddressType) -> bool {
    mode == ScanningPolicyMode::FilterAllAdvertisements || peer_address_type.is_private()
}
