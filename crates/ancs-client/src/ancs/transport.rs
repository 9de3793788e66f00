//! GATT-backed attribute transport
//!
//! Encodes ANCS control point commands and subscription changes as plain
//! characteristic writes against the handles found during discovery.

use super::client::AttributeTransport;
use super::constants::{
    ANCS_CONTROL_POINT_UUID, ANCS_DATA_SOURCE_UUID, ANCS_NOTIFICATION_SOURCE_UUID, ANCS_SERVICE_UUID,
    CCCD_DISABLED, CCCD_NOTIFICATIONS_ENABLED,
};
use super::types::{
    encode_get_app_attributes, encode_get_notification_attributes, AppAttributeKind,
    AttributeSpec, CategoryMask, NotificationSourceEvent,
};
use crate::error::AncsResult;
use log::{debug, trace};

/// Writes a value to a characteristic or descriptor handle
pub trait CharacteristicWriter {
    fn write(&mut self, handle: u16, value: &[u8]) -> AncsResult<()>;
}

impl<F> CharacteristicWriter for F
where
    F: FnMut(u16, &[u8]) -> AncsResult<()>,
{
    fn write(&mut self, handle: u16, value: &[u8]) -> AncsResult<()> {
        self(handle, value)
    }
}

/// Characteristics of the ANCS service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AncsCharacteristic {
    NotificationSource,
    ControlPoint,
    DataSource,
}

impl AncsCharacteristic {
    pub fn uuid(&self) -> u128 {
        match self {
            AncsCharacteristic::NotificationSource => ANCS_NOTIFICATION_SOURCE_UUID,
            AncsCharacteristic::ControlPoint => ANCS_CONTROL_POINT_UUID,
            AncsCharacteristic::DataSource => ANCS_DATA_SOURCE_UUID,
        }
    }

    /// Classify a discovered characteristic UUID
    pub fn from_uuid(uuid: u128) -> Option<Self> {
        match uuid {
            ANCS_NOTIFICATION_SOURCE_UUID => Some(AncsCharacteristic::NotificationSource),
            ANCS_CONTROL_POINT_UUID => Some(AncsCharacteristic::ControlPoint),
            ANCS_DATA_SOURCE_UUID => Some(AncsCharacteristic::DataSource),
            _ => None,
        }
    }
}

/// Whether a discovered primary service is ANCS
pub fn is_ancs_service(uuid: u128) -> bool {
    uuid == ANCS_SERVICE_UUID
}

/// Handles of the remote ANCS service
///
/// Filled in by service discovery: `control_point` is the value handle of
/// the characteristic `AncsCharacteristic::ControlPoint` identifies, the
/// other two are the CCCDs of the notification and data sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AncsHandles {
    pub control_point: u16,
    pub notification_source_cccd: u16,
    pub data_source_cccd: u16,
}

/// Attribute transport writing to a remote ANCS service
pub struct GattAncsTransport<W: CharacteristicWriter> {
    writer: W,
    handles: AncsHandles,
    categories: CategoryMask,
    notification_source_enabled: bool,
    data_source_enabled: bool,
}

impl<W: CharacteristicWriter> GattAncsTransport<W> {
    pub fn new(writer: W, handles: AncsHandles) -> Self {
        Self {
            writer,
            handles,
            categories: CategoryMask::empty(),
            notification_source_enabled: false,
            data_source_enabled: false,
        }
    }

    pub fn handles(&self) -> AncsHandles {
        self.handles
    }

    /// Categories passed when the notification source was last enabled
    pub fn categories(&self) -> CategoryMask {
        self.categories
    }

    pub fn notification_source_enabled(&self) -> bool {
        self.notification_source_enabled
    }

    pub fn data_source_enabled(&self) -> bool {
        self.data_source_enabled
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Parse a raw notification source payload and keep it only if its
    /// category was enabled
    pub fn filter_notification_source(&self, raw: &[u8]) -> AncsResult<Option<NotificationSourceEvent>> {
        let event = NotificationSourceEvent::parse(raw)?;

        if !self.notification_source_enabled || !self.categories.accepts(event.category_id) {
            debug!(
                "Filtered notification {} in category {}",
                event.notification_id, event.category_id
            );
            return Ok(None);
        }

        Ok(Some(event))
    }

    fn write_cccd(&mut self, handle: u16, enabled: bool) -> AncsResult<()> {
        let value = if enabled {
            CCCD_NOTIFICATIONS_ENABLED
        } else {
            CCCD_DISABLED
        };
        self.writer.write(handle, &value)
    }

    fn write_control_point(&mut self, command: Vec<u8>) -> AncsResult<()> {
        trace!("ANCS control point write: {}", hex::encode(&command));
        self.writer.write(self.handles.control_point, &command)
    }
}

impl<W: CharacteristicWriter> AttributeTransport for GattAncsTransport<W> {
    fn request_notification_attributes(
        &mut self,
        notification_id: u32,
        attributes: &[AttributeSpec],
    ) -> AncsResult<()> {
        self.write_control_point(encode_get_notification_attributes(notification_id, attributes))
    }

    fn request_app_attributes(
        &mut self,
        identifier: &[u8],
        attributes: &[AppAttributeKind],
    ) -> AncsResult<()> {
        self.write_control_point(encode_get_app_attributes(identifier, attributes))
    }

    fn enable_notification_source(&mut self, enabled: bool, categories: CategoryMask) -> AncsResult<()> {
        self.write_cccd(self.handles.notification_source_cccd, enabled)?;
        self.notification_source_enabled = enabled;
        self.categories = categories;
        Ok(())
    }

    fn enable_data_source(&mut self, enabled: bool) -> AncsResult<()> {
        self.write_cccd(self.handles.data_source_cccd, enabled)?;
        self.data_source_enabled = enabled;
        Ok(())
    }
}
