//! Apple Notification Center Service (ANCS) client
//!
//! This module retrieves the attributes of notifications announced by a
//! remote ANCS server. Attributes are requested one at a time, reassembled
//! from data source fragments and chained: date, title, message size and
//! finally the message itself.

pub mod buffer;
pub mod chain;
pub mod client;
pub mod config;
pub mod constants;
pub mod decoder;
pub mod transport;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export the public API
pub use self::buffer::{AttributeHeader, FragmentBuffer};
pub use self::chain::{ChainState, NextRequest, PendingRequest};
pub use self::client::{AlertSink, AncsClient, AncsMessage, AttributeTransport, CoalescingAlert, InitOutcome};
pub use self::config::AncsClientConfig;
pub use self::constants::*;
pub use self::transport::{
    is_ancs_service, AncsCharacteristic, AncsHandles, CharacteristicWriter, GattAncsTransport,
};
pub use self::types::*;
