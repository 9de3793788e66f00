//! ANCS client configuration

use super::constants::*;
use super::types::CategoryMask;

/// ANCS client configuration
#[derive(Debug, Clone)]
pub struct AncsClientConfig {
    /// Upper bound on a reassembled attribute, header included
    pub buffer_capacity: usize,
    /// Max length requested for the title
    pub title_max_length: u16,
    /// Assumed data source packet size
    pub packet_capacity: usize,
    /// Fixed per-packet overhead counted against `packet_capacity`
    pub packet_overhead: usize,
    /// Categories enabled on the notification source at init
    pub category_mask: CategoryMask,
    /// Whether init also enables the data source
    pub enable_data_source: bool,
}

impl Default for AncsClientConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: ANCS_DEFAULT_BUFFER_CAPACITY,
            title_max_length: ANCS_DEFAULT_TITLE_MAX_LENGTH,
            packet_capacity: ANCS_DEFAULT_PACKET_CAPACITY,
            packet_overhead: ANCS_DEFAULT_PACKET_OVERHEAD,
            category_mask: CategoryMask::INCOMING_CALL
                | CategoryMask::SOCIAL
                | CategoryMask::MISSED_CALL,
            enable_data_source: true,
        }
    }
}

impl AncsClientConfig {
    /// Largest message length that can still be reassembled
    pub fn max_message_length(&self) -> u16 {
        let usable = self.buffer_capacity.saturating_sub(ANCS_ATTR_HEADER_SIZE);
        u16::try_from(usable).unwrap_or(u16::MAX)
    }

    /// Whether a head fragment of `head_len` bytes holds the whole value
    pub fn fits_in_one_packet(&self, head_len: usize) -> bool {
        head_len + self.packet_overhead < self.packet_capacity
    }
}
