//! AncsClient - An Apple Notification Center Service client for Bluetooth LE
//!
//! This library drives the attribute retrieval side of ANCS: it reacts to
//! new notifications from a connected iOS device, requests their attributes
//! over the control point and reassembles the fragmented replies arriving on
//! the data source. The link itself (connection, discovery, GATT writes) is
//! supplied by the caller through the `AttributeTransport` and
//! `CharacteristicWriter` traits.

pub mod ancs;
pub mod error;

// Re-export common types for convenience
pub use ancs::{
    AlertSink, AncsClient, AncsClientConfig, AncsHandles, AncsMessage, AttributeKind,
    AttributeTransport, CategoryMask, ChainState, CoalescingAlert, CompletedAttribute,
    GattAncsTransport, InitOutcome, InitStatus, NotificationSourceEvent,
};
pub use error::{AncsError, AncsResult};
