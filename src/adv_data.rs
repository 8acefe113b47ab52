//! Advertising payload codec
//!
//! Advertising and scan-response payloads are sequences of
//! `[length, type, value...]` units, bounded by the 31-byte PDU payload
//! limit. [`AdvertisingData`] builds and walks such sequences without
//! allocation; oversize payloads are rejected with
//! [`GapError::BufferOverflow`] at build time, before anything reaches the
//! radio.

use crate::{GapError, constants::MAX_ADV_PAYLOAD};
use heapless::Vec;

/// Advertising data element types
///
/// The subset of assigned numbers this stack inspects or commonly emits;
/// arbitrary raw types can still be carried by a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AdType {
    /// Flags
    Flags = 0x01,
    /// Incomplete list of 16-bit service UUIDs
    IncompleteList16 = 0x02,
    /// Complete list of 16-bit service UUIDs
    CompleteList16 = 0x03,
    /// Incomplete list of 128-bit service UUIDs
    IncompleteList128 = 0x06,
    /// Complete list of 128-bit service UUIDs
    CompleteList128 = 0x07,
    /// Shortened local name
    ShortenedLocalName = 0x08,
    /// Complete local name
    CompleteLocalName = 0x09,
    /// TX power level in dBm
    TxPowerLevel = 0x0A,
    /// Service data, 16-bit UUID
    ServiceData = 0x16,
    /// Appearance
    Appearance = 0x19,
    /// Manufacturer specific data
    ManufacturerSpecificData = 0xFF,
}

/// One decoded `(type, value)` unit of an advertising payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdUnit<'a> {
    /// Raw advertising data type byte
    pub ad_type: u8,
    /// Unit value bytes
    pub data: &'a [u8],
}

impl AdUnit<'_> {
    /// Whether this unit carries the given well-known type.
    #[must_use]
    pub fn is(&self, ad_type: AdType) -> bool {
        self.ad_type == ad_type as u8
    }
}

/// Iterator over the units of a serialized advertising payload
///
/// Stops at the first malformed unit (zero or truncated length).
#[derive(Debug, Clone)]
pub struct AdUnits<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for AdUnits<'a> {
    type Item = AdUnit<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (&len, tail) = self.rest.split_first()?;
        let len = len as usize;
        if len == 0 || len > tail.len() {
            self.rest = &[];
            return None;
        }
        let (unit, rest) = tail.split_at(len);
        self.rest = rest;
        Some(AdUnit {
            ad_type: unit[0],
            data: &unit[1..],
        })
    }
}

/// A bounded advertising or scan-response payload
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdvertisingData {
    buf: Vec<u8, MAX_ADV_PAYLOAD>,
}

impl AdvertisingData {
    /// Create an empty payload.
    #[must_use]
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Build a payload from already serialized bytes.
    ///
    /// # Errors
    ///
    /// Returns [`GapError::BufferOverflow`] when `bytes` exceeds the payload
    /// limit.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GapError> {
        Ok(Self {
            buf: Vec::from_slice(bytes).map_err(|()| GapError::BufferOverflow)?,
        })
    }

    /// Append one `(type, value)` unit.
    ///
    /// # Errors
    ///
    /// Returns [`GapError::BufferOverflow`] when the unit would push the
    /// serialized payload past the limit; the payload is left unchanged.
    pub fn add(&mut self, ad_type: AdType, data: &[u8]) -> Result<(), GapError> {
        self.add_raw(ad_type as u8, data)
    }

    /// Append one unit with a raw type byte.
    ///
    /// # Errors
    ///
    /// Same as [`Self::add`].
    pub fn add_raw(&mut self, ad_type: u8, data: &[u8]) -> Result<(), GapError> {
        if self.buf.len() + data.len() + 2 > MAX_ADV_PAYLOAD {
            return Err(GapError::BufferOverflow);
        }
        // length byte counts the type byte plus the value
        self.buf.push(data.len() as u8 + 1).ok();
        self.buf.push(ad_type).ok();
        self.buf.extend_from_slice(data).ok();
        Ok(())
    }

    /// The serialized payload bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.buf
    }

    /// Serialized payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Iterate over the decoded `(type, value)` units.
    #[must_use]
    pub fn units(&self) -> AdUnits<'_> {
        AdUnits { rest: &self.buf }
    }

    /// Extract the appearance value, if the payload carries one
    /// (little-endian 16-bit).
    #[must_use]
    pub fn appearance(&self) -> Option<u16> {
        self.units()
            .find(|unit| unit.is(AdType::Appearance) && unit.data.len() >= 2)
            .map(|unit| u16::from_le_bytes([unit.data[0], unit.data[1]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_at_the_limit_is_accepted() {
        let mut data = AdvertisingData::new();
        // 3 + 28 = 31 bytes total
        data.add(AdType::Flags, &[0x06]).unwrap();
        data.add(AdType::ManufacturerSpecificData, &[0xAA; 26]).unwrap();
        assert_eq!(data.len(), MAX_ADV_PAYLOAD);
    }

    #[test]
    fn payload_past_the_limit_is_rejected_unchanged() {
        let mut data = AdvertisingData::new();
        data.add(AdType::Flags, &[0x06]).unwrap();
        let before = data.clone();
        assert_eq!(
            data.add(AdType::ManufacturerSpecificData, &[0xAA; 27]),
            Err(GapError::BufferOverflow)
        );
        assert_eq!(data, before);
    }

    #[test]
    fn units_round_trip() {
        let mut data = AdvertisingData::new();
        data.add(AdType::Flags, &[0x06]).unwrap();
        data.add(AdType::CompleteLocalName, b"jay").unwrap();
        data.add(AdType::TxPowerLevel, &[0xF8]).unwrap();

        let mut units = data.units();
        let flags = units.next().unwrap();
        assert!(flags.is(AdType::Flags));
        assert_eq!(flags.data, &[0x06]);

        let name = units.next().unwrap();
        assert!(name.is(AdType::CompleteLocalName));
        assert_eq!(name.data, b"jay");

        let tx = units.next().unwrap();
        assert!(tx.is(AdType::TxPowerLevel));
        assert!(units.next().is_none());
    }

    #[test]
    fn truncated_unit_terminates_iteration() {
        // claims 5 bytes but only 2 follow
        let data = AdvertisingData::from_bytes(&[0x05, 0x09, b'j', b'a']).unwrap();
        assert!(data.units().next().is_none());
    }

    #[test]
    fn appearance_is_decoded_little_endian() {
        let mut data = AdvertisingData::new();
        data.add(AdType::Flags, &[0x06]).unwrap();
        assert_eq!(data.appearance(), None);

        // generic thermometer, 0x0300
        data.add(AdType::Appearance, &[0x00, 0x03]).unwrap();
        assert_eq!(data.appearance(), Some(0x0300));
    }
}
