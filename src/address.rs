//! Device addresses and the local address store

use crate::{GapError, RadioCommandPort, constants::BD_ADDR_LENGTH};

/// A BLE device address wrapper for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BleAddress(pub [u8; BD_ADDR_LENGTH]);

impl BleAddress {
    /// Create a new address from bytes (least significant byte first, as on
    /// the wire)
    #[must_use]
    pub const fn new(addr: [u8; BD_ADDR_LENGTH]) -> Self {
        Self(addr)
    }

    /// Get the raw address bytes
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; BD_ADDR_LENGTH] {
        &self.0
    }

    /// Whether the two most significant bits of the address are `11`, the
    /// protocol requirement for random static addresses
    #[must_use]
    pub const fn has_static_address_bits(&self) -> bool {
        (self.0[BD_ADDR_LENGTH - 1] & 0xC0) == 0xC0
    }

    /// Format the address as a colon-separated hex string
    #[must_use]
    pub fn format_hex(&self) -> heapless::String<17> {
        let mut result = heapless::String::new();
        let hex_chars = [
            '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F',
        ];
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                result.push(':').ok();
            }
            result.push(hex_chars[(byte >> 4) as usize]).ok();
            result.push(hex_chars[(byte & 0x0F) as usize]).ok();
        }
        result
    }

    /// Parse an address from a colon-separated hex string
    ///
    /// # Errors
    ///
    /// Returns [`GapError::InvalidParam`] if the string is not exactly six
    /// colon-separated hex byte pairs.
    pub fn from_hex(hex: &str) -> Result<Self, GapError> {
        if hex.len() != 17 || !hex.chars().all(|c| c.is_ascii_hexdigit() || c == ':') {
            return Err(GapError::InvalidParam);
        }

        let mut bytes = [0u8; BD_ADDR_LENGTH];
        for (i, byte) in hex.split(':').enumerate() {
            if i >= BD_ADDR_LENGTH || byte.len() != 2 {
                return Err(GapError::InvalidParam);
            }
            bytes[i] = u8::from_str_radix(byte, 16).map_err(|_| GapError::InvalidParam)?;
        }
        Ok(Self(bytes))
    }
}

impl From<[u8; BD_ADDR_LENGTH]> for BleAddress {
    fn from(addr: [u8; BD_ADDR_LENGTH]) -> Self {
        Self(addr)
    }
}

impl From<BleAddress> for [u8; BD_ADDR_LENGTH] {
    fn from(addr: BleAddress) -> Self {
        addr.0
    }
}

impl TryFrom<&str> for BleAddress {
    type Error = GapError;

    fn try_from(hex: &str) -> Result<Self, Self::Error> {
        BleAddress::from_hex(hex)
    }
}

impl TryFrom<&[u8]> for BleAddress {
    type Error = GapError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() == BD_ADDR_LENGTH {
            let mut addr = [0u8; BD_ADDR_LENGTH];
            addr.copy_from_slice(bytes);
            Ok(BleAddress(addr))
        } else {
            Err(GapError::InvalidParam)
        }
    }
}

/// Type of a device address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AddressType {
    /// Public device address
    #[default]
    Public = 0x00,
    /// Random static address; the two most significant bits must be `11`
    RandomStatic = 0x01,
    /// Random private resolvable address (requires address resolution,
    /// unimplemented)
    RandomPrivateResolvable = 0x02,
    /// Random private non-resolvable address (unimplemented)
    RandomPrivateNonResolvable = 0x03,
}

impl AddressType {
    /// Decode a raw address type; values past the last defined one are
    /// rejected.
    #[must_use]
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0x00 => Some(Self::Public),
            0x01 => Some(Self::RandomStatic),
            0x02 => Some(Self::RandomPrivateResolvable),
            0x03 => Some(Self::RandomPrivateNonResolvable),
            _ => None,
        }
    }

    /// Whether this is one of the random private (privacy) types.
    #[must_use]
    pub fn is_private(self) -> bool {
        matches!(
            self,
            Self::RandomPrivateResolvable | Self::RandomPrivateNonResolvable
        )
    }
}

/// Local device address store
///
/// Holds at most one address per supported type; a single selector tracks
/// which type is current. Public addresses live in the radio's persistent
/// configuration storage. Random static addresses are also cached here, since
/// that storage cannot be read back once a random address is set.
#[derive(Debug, Default)]
pub struct AddressManager {
    address_type: AddressType,
    static_address: Option<BleAddress>,
    is_set: bool,
}

impl AddressManager {
    /// Create an empty store with the public type selected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently selected address type.
    #[must_use]
    pub fn address_type(&self) -> AddressType {
        self.address_type
    }

    /// Whether a local address has been set explicitly.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.is_set
    }

    /// Set the local device address.
    ///
    /// On success the active address type selector is updated.
    ///
    /// # Errors
    ///
    /// - [`GapError::ParamOutOfRange`] for a random static address whose two
    ///   most significant bits are not `11`
    /// - [`GapError::NotImplemented`] for the random private types
    /// - [`GapError::OperationNotPermitted`] when the radio rejects the write
    pub async fn set_address<P: RadioCommandPort>(
        &mut self,
        radio: &mut P,
        address_type: AddressType,
        address: BleAddress,
    ) -> Result<(), GapError> {
        match address_type {
            AddressType::Public => {
                let status = radio.write_public_address(address).await;
                if !status.is_success() {
                    return Err(GapError::OperationNotPermitted);
                }
            }
            AddressType::RandomStatic => {
                if !address.has_static_address_bits() {
                    return Err(GapError::ParamOutOfRange);
                }

                let status = radio.set_random_address(address).await;
                if !status.is_success() {
                    return Err(GapError::OperationNotPermitted);
                }

                // The radio configuration cannot be read back once a random
                // address is set, so keep a local copy.
                self.static_address = Some(address);
            }
            AddressType::RandomPrivateResolvable | AddressType::RandomPrivateNonResolvable => {
                return Err(GapError::NotImplemented);
            }
        }

        self.address_type = address_type;
        self.is_set = true;
        Ok(())
    }

    /// Get the local address for the active type.
    ///
    /// # Errors
    ///
    /// - [`GapError::NotImplemented`] when the active type is private
    /// - [`GapError::Unspecified`] when the radio read fails
    /// - [`GapError::InvalidState`] when a random static address was never set
    pub async fn get_address<P: RadioCommandPort>(
        &self,
        radio: &mut P,
    ) -> Result<(AddressType, BleAddress), GapError> {
        match self.address_type {
            AddressType::Public => {
                let (status, address) = radio.read_public_address().await;
                match address {
                    Some(address) if status.is_success() => Ok((AddressType::Public, address)),
                    _ => Err(GapError::Unspecified),
                }
            }
            AddressType::RandomStatic => self
                .static_address
                .map(|address| (AddressType::RandomStatic, address))
                .ok_or(GapError::InvalidState),
            AddressType::RandomPrivateResolvable | AddressType::RandomPrivateNonResolvable => {
                Err(GapError::NotImplemented)
            }
        }
    }

    /// Reset the store to its defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{Cmd, FakeRadio};
    use embassy_futures::block_on;

    #[test]
    fn address_formats_as_colon_separated_hex() {
        let addr = BleAddress::new([0xBC, 0x9A, 0x78, 0x56, 0x34, 0x12]);
        assert_eq!(addr.format_hex().as_str(), "BC:9A:78:56:34:12");
    }

    #[test]
    fn address_parses_from_hex() {
        let addr = BleAddress::from_hex("BC:9A:78:56:34:12").unwrap();
        assert_eq!(addr.as_bytes(), &[0xBC, 0x9A, 0x78, 0x56, 0x34, 0x12]);

        assert_eq!(BleAddress::from_hex("BC:9A"), Err(GapError::InvalidParam));
        assert_eq!(
            BleAddress::from_hex("ZZ:9A:78:56:34:12"),
            Err(GapError::InvalidParam)
        );
    }

    #[test]
    fn address_type_rejects_values_past_the_last_variant() {
        assert_eq!(AddressType::from_raw(0x03), Some(AddressType::RandomPrivateNonResolvable));
        assert_eq!(AddressType::from_raw(0x04), None);
    }

    #[test]
    fn static_address_requires_high_bits_set() {
        let mut manager = AddressManager::new();
        let mut radio = FakeRadio::new();

        // 0x7F: top two bits are 01
        let bad = BleAddress::new([0x01, 0x02, 0x03, 0x04, 0x05, 0x7F]);
        let result = block_on(manager.set_address(&mut radio, AddressType::RandomStatic, bad));
        assert_eq!(result, Err(GapError::ParamOutOfRange));
        assert!(radio.issued.is_empty());
        assert!(!manager.is_set());
    }

    #[test]
    fn static_address_is_cached_and_read_back_locally() {
        let mut manager = AddressManager::new();
        let mut radio = FakeRadio::new();

        let addr = BleAddress::new([0x01, 0x02, 0x03, 0x04, 0x05, 0xC5]);
        block_on(manager.set_address(&mut radio, AddressType::RandomStatic, addr)).unwrap();
        assert_eq!(radio.issued.as_slice(), &[Cmd::SetRandomAddress]);
        assert_eq!(manager.address_type(), AddressType::RandomStatic);

        radio.issued.clear();
        let (ty, read_back) = block_on(manager.get_address(&mut radio)).unwrap();
        assert_eq!(ty, AddressType::RandomStatic);
        assert_eq!(read_back, addr);
        // no radio command: the cached copy is authoritative
        assert!(radio.issued.is_empty());
    }

    #[test]
    fn public_address_goes_through_radio_config() {
        let mut manager = AddressManager::new();
        let mut radio = FakeRadio::new();

        let addr = BleAddress::new([0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F]);
        block_on(manager.set_address(&mut radio, AddressType::Public, addr)).unwrap();
        assert_eq!(radio.issued.as_slice(), &[Cmd::WritePublicAddress]);

        radio.public_address = Some(addr);
        let (ty, read_back) = block_on(manager.get_address(&mut radio)).unwrap();
        assert_eq!(ty, AddressType::Public);
        assert_eq!(read_back, addr);
    }

    #[test]
    fn private_address_types_are_not_implemented() {
        let mut manager = AddressManager::new();
        let mut radio = FakeRadio::new();

        let addr = BleAddress::new([0; 6]);
        for ty in [
            AddressType::RandomPrivateResolvable,
            AddressType::RandomPrivateNonResolvable,
        ] {
            let result = block_on(manager.set_address(&mut radio, ty, addr));
            assert_eq!(result, Err(GapError::NotImplemented));
        }
        assert!(radio.issued.is_empty());
    }
}
