//! Fragment reassembly for ANCS attribute values
//!
//! An attribute value arrives as a head fragment (attribute ID, 2-byte
//! little-endian length, first payload slice) followed by zero or more
//! continuation fragments carrying payload only. `FragmentBuffer` collects
//! one value and reports when it is complete.

use super::constants::ANCS_ATTR_HEADER_SIZE;
use super::types::{AttributeKind, CompletedAttribute};
use crate::error::{AncsError, AncsResult};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

/// Parsed header of a head fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeHeader {
    pub kind: AttributeKind,
    pub declared_length: u16,
}

impl AttributeHeader {
    /// Parse the 3-byte attribute header at the start of a head fragment
    pub fn parse(raw: &[u8]) -> AncsResult<Self> {
        if raw.len() < ANCS_ATTR_HEADER_SIZE {
            return Err(AncsError::MalformedHead { len: raw.len() });
        }

        let mut cursor = Cursor::new(raw);
        let malformed = |_| AncsError::MalformedHead { len: raw.len() };
        let kind = AttributeKind::try_from(cursor.read_u8().map_err(malformed)?)?;
        let declared_length = cursor.read_u16::<LittleEndian>().map_err(malformed)?;

        Ok(Self {
            kind,
            declared_length,
        })
    }

    /// Total bytes of the value including its header
    pub fn total_len(&self) -> usize {
        self.declared_length as usize + ANCS_ATTR_HEADER_SIZE
    }
}

/// Reassembly buffer for a single attribute value
#[derive(Debug, Clone)]
pub struct FragmentBuffer {
    notification_id: u32,
    header: AttributeHeader,
    /// Raw bytes seen so far, header included
    bytes_accumulated: usize,
    payload: Vec<u8>,
}

impl FragmentBuffer {
    /// Start a buffer from a head fragment
    ///
    /// Rejects heads whose declared value would not fit in `capacity` bytes
    /// (header included) and heads carrying more bytes than they declare.
    pub fn start(notification_id: u32, raw: &[u8], capacity: usize) -> AncsResult<Self> {
        let header = AttributeHeader::parse(raw)?;
        let total = header.total_len();

        if total > capacity {
            return Err(AncsError::CapacityExceeded {
                needed: total,
                capacity,
            });
        }
        if raw.len() > total {
            return Err(AncsError::CapacityExceeded {
                needed: raw.len(),
                capacity: total,
            });
        }

        let mut payload = Vec::with_capacity(header.declared_length as usize);
        payload.extend_from_slice(&raw[ANCS_ATTR_HEADER_SIZE..]);

        Ok(Self {
            notification_id,
            header,
            bytes_accumulated: raw.len(),
            payload,
        })
    }

    /// Append a continuation fragment
    ///
    /// A fragment that would run past the declared length is rejected and
    /// leaves the buffer untouched.
    pub fn append(&mut self, bytes: &[u8]) -> AncsResult<()> {
        let needed = self.bytes_accumulated + bytes.len();
        if needed > self.header.total_len() {
            return Err(AncsError::CapacityExceeded {
                needed,
                capacity: self.header.total_len(),
            });
        }

        self.payload.extend_from_slice(bytes);
        self.bytes_accumulated = needed;
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.bytes_accumulated == self.header.total_len()
    }

    pub fn notification_id(&self) -> u32 {
        self.notification_id
    }

    pub fn header(&self) -> AttributeHeader {
        self.header
    }

    pub fn kind(&self) -> AttributeKind {
        self.header.kind
    }

    pub fn declared_length(&self) -> u16 {
        self.header.declared_length
    }

    pub fn bytes_accumulated(&self) -> usize {
        self.bytes_accumulated
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Consume the buffer into a completed attribute without decoding
    pub fn into_completed(self) -> CompletedAttribute {
        CompletedAttribute {
            notification_id: self.notification_id,
            kind: self.header.kind,
            raw_value: self.payload,
            decoded: None,
        }
    }
}
