//! Type definitions for the ANCS protocol
use super::constants::*;
use crate::error::{AncsError, AncsResult};
use bitflags::bitflags;
use byteorder::{LittleEndian, ReadBytesExt};
use std::fmt;
use std::io::Cursor;

/// Notification attribute identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    AppIdentifier,
    Title,
    Subtitle,
    Message,
    MessageSize,
    Date,
    PositiveActionLabel,
    NegativeActionLabel,
}

impl AttributeKind {
    /// Convert to the attribute ID used on the wire
    pub fn to_u8(&self) -> u8 {
        match self {
            AttributeKind::AppIdentifier => ANCS_ATTR_APP_IDENTIFIER,
            AttributeKind::Title => ANCS_ATTR_TITLE,
            AttributeKind::Subtitle => ANCS_ATTR_SUBTITLE,
            AttributeKind::Message => ANCS_ATTR_MESSAGE,
            AttributeKind::MessageSize => ANCS_ATTR_MESSAGE_SIZE,
            AttributeKind::Date => ANCS_ATTR_DATE,
            AttributeKind::PositiveActionLabel => ANCS_ATTR_POSITIVE_ACTION_LABEL,
            AttributeKind::NegativeActionLabel => ANCS_ATTR_NEGATIVE_ACTION_LABEL,
        }
    }
}

impl TryFrom<u8> for AttributeKind {
    type Error = AncsError;

    fn try_from(value: u8) -> AncsResult<Self> {
        match value {
            ANCS_ATTR_APP_IDENTIFIER => Ok(AttributeKind::AppIdentifier),
            ANCS_ATTR_TITLE => Ok(AttributeKind::Title),
            ANCS_ATTR_SUBTITLE => Ok(AttributeKind::Subtitle),
            ANCS_ATTR_MESSAGE => Ok(AttributeKind::Message),
            ANCS_ATTR_MESSAGE_SIZE => Ok(AttributeKind::MessageSize),
            ANCS_ATTR_DATE => Ok(AttributeKind::Date),
            ANCS_ATTR_POSITIVE_ACTION_LABEL => Ok(AttributeKind::PositiveActionLabel),
            ANCS_ATTR_NEGATIVE_ACTION_LABEL => Ok(AttributeKind::NegativeActionLabel),
            other => Err(AncsError::UnknownAttribute(other)),
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttributeKind::AppIdentifier => "AppIdentifier",
            AttributeKind::Title => "Title",
            AttributeKind::Subtitle => "Subtitle",
            AttributeKind::Message => "Message",
            AttributeKind::MessageSize => "MessageSize",
            AttributeKind::Date => "Date",
            AttributeKind::PositiveActionLabel => "PositiveActionLabel",
            AttributeKind::NegativeActionLabel => "NegativeActionLabel",
        };
        f.write_str(name)
    }
}

/// App attribute identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppAttributeKind {
    DisplayName,
}

impl AppAttributeKind {
    pub fn to_u8(&self) -> u8 {
        match self {
            AppAttributeKind::DisplayName => ANCS_APP_ATTR_DISPLAY_NAME,
        }
    }
}

/// Notification source event IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventId {
    Added,
    Modified,
    Removed,
}

impl TryFrom<u8> for EventId {
    type Error = AncsError;

    fn try_from(value: u8) -> AncsResult<Self> {
        match value {
            ANCS_EVENT_ADDED => Ok(EventId::Added),
            ANCS_EVENT_MODIFIED => Ok(EventId::Modified),
            ANCS_EVENT_REMOVED => Ok(EventId::Removed),
            other => Err(AncsError::UnknownEvent(other)),
        }
    }
}

bitflags! {
    /// Notification source event flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EventFlags: u8 {
        const SILENT = ANCS_EVENT_FLAG_SILENT;
        const IMPORTANT = ANCS_EVENT_FLAG_IMPORTANT;
        const PRE_EXISTING = ANCS_EVENT_FLAG_PRE_EXISTING;
        const POSITIVE_ACTION = ANCS_EVENT_FLAG_POSITIVE_ACTION;
        const NEGATIVE_ACTION = ANCS_EVENT_FLAG_NEGATIVE_ACTION;
    }
}

/// Notification categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryId {
    Other,
    IncomingCall,
    MissedCall,
    Voicemail,
    Social,
    Schedule,
    Email,
    News,
    HealthAndFitness,
    BusinessAndFinance,
    Location,
    Entertainment,
}

impl CategoryId {
    pub fn to_u8(&self) -> u8 {
        match self {
            CategoryId::Other => ANCS_CATEGORY_OTHER,
            CategoryId::IncomingCall => ANCS_CATEGORY_INCOMING_CALL,
            CategoryId::MissedCall => ANCS_CATEGORY_MISSED_CALL,
            CategoryId::Voicemail => ANCS_CATEGORY_VOICEMAIL,
            CategoryId::Social => ANCS_CATEGORY_SOCIAL,
            CategoryId::Schedule => ANCS_CATEGORY_SCHEDULE,
            CategoryId::Email => ANCS_CATEGORY_EMAIL,
            CategoryId::News => ANCS_CATEGORY_NEWS,
            CategoryId::HealthAndFitness => ANCS_CATEGORY_HEALTH_AND_FITNESS,
            CategoryId::BusinessAndFinance => ANCS_CATEGORY_BUSINESS_AND_FINANCE,
            CategoryId::Location => ANCS_CATEGORY_LOCATION,
            CategoryId::Entertainment => ANCS_CATEGORY_ENTERTAINMENT,
        }
    }

    /// The mask bit selecting this category
    pub fn mask(&self) -> CategoryMask {
        CategoryMask::from_bits_truncate(1 << self.to_u8())
    }
}

impl TryFrom<u8> for CategoryId {
    type Error = AncsError;

    fn try_from(value: u8) -> AncsResult<Self> {
        match value {
            ANCS_CATEGORY_OTHER => Ok(CategoryId::Other),
            ANCS_CATEGORY_INCOMING_CALL => Ok(CategoryId::IncomingCall),
            ANCS_CATEGORY_MISSED_CALL => Ok(CategoryId::MissedCall),
            ANCS_CATEGORY_VOICEMAIL => Ok(CategoryId::Voicemail),
            ANCS_CATEGORY_SOCIAL => Ok(CategoryId::Social),
            ANCS_CATEGORY_SCHEDULE => Ok(CategoryId::Schedule),
            ANCS_CATEGORY_EMAIL => Ok(CategoryId::Email),
            ANCS_CATEGORY_NEWS => Ok(CategoryId::News),
            ANCS_CATEGORY_HEALTH_AND_FITNESS => Ok(CategoryId::HealthAndFitness),
            ANCS_CATEGORY_BUSINESS_AND_FINANCE => Ok(CategoryId::BusinessAndFinance),
            ANCS_CATEGORY_LOCATION => Ok(CategoryId::Location),
            ANCS_CATEGORY_ENTERTAINMENT => Ok(CategoryId::Entertainment),
            other => Err(AncsError::UnknownCategory(other)),
        }
    }
}

bitflags! {
    /// Set of categories enabled on the notification source
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CategoryMask: u16 {
        const OTHER = 1 << ANCS_CATEGORY_OTHER;
        const INCOMING_CALL = 1 << ANCS_CATEGORY_INCOMING_CALL;
        const MISSED_CALL = 1 << ANCS_CATEGORY_MISSED_CALL;
        const VOICEMAIL = 1 << ANCS_CATEGORY_VOICEMAIL;
        const SOCIAL = 1 << ANCS_CATEGORY_SOCIAL;
        const SCHEDULE = 1 << ANCS_CATEGORY_SCHEDULE;
        const EMAIL = 1 << ANCS_CATEGORY_EMAIL;
        const NEWS = 1 << ANCS_CATEGORY_NEWS;
        const HEALTH_AND_FITNESS = 1 << ANCS_CATEGORY_HEALTH_AND_FITNESS;
        const BUSINESS_AND_FINANCE = 1 << ANCS_CATEGORY_BUSINESS_AND_FINANCE;
        const LOCATION = 1 << ANCS_CATEGORY_LOCATION;
        const ENTERTAINMENT = 1 << ANCS_CATEGORY_ENTERTAINMENT;
    }
}

impl CategoryMask {
    /// Whether a raw category ID is selected by this mask
    pub fn accepts(&self, category_id: u8) -> bool {
        CategoryId::try_from(category_id)
            .map(|category| self.contains(category.mask()))
            .unwrap_or(false)
    }
}

/// Notification Source characteristic payload
///
/// ```text
/// | Event ID | Event Flags | Category ID | Category Count | Notification UID |
/// |    1B    |     1B      |     1B      |       1B       |     4B (LE)      |
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationSourceEvent {
    pub event_id: u8,
    pub event_flags: u8,
    pub category_id: u8,
    pub category_count: u8,
    pub notification_id: u32,
}

impl NotificationSourceEvent {
    /// Parse a notification source payload
    pub fn parse(data: &[u8]) -> AncsResult<Self> {
        if data.len() != ANCS_NOTIFICATION_SOURCE_LEN {
            return Err(AncsError::InvalidNotificationSource { len: data.len() });
        }

        let mut cursor = Cursor::new(data);
        let short = |_| AncsError::InvalidNotificationSource { len: data.len() };

        Ok(Self {
            event_id: cursor.read_u8().map_err(short)?,
            event_flags: cursor.read_u8().map_err(short)?,
            category_id: cursor.read_u8().map_err(short)?,
            category_count: cursor.read_u8().map_err(short)?,
            notification_id: cursor.read_u32::<LittleEndian>().map_err(short)?,
        })
    }

    /// Serialize to the 8-byte wire format
    pub fn to_bytes(&self) -> [u8; ANCS_NOTIFICATION_SOURCE_LEN] {
        let uid = self.notification_id.to_le_bytes();
        [
            self.event_id,
            self.event_flags,
            self.category_id,
            self.category_count,
            uid[0],
            uid[1],
            uid[2],
            uid[3],
        ]
    }

    pub fn event(&self) -> AncsResult<EventId> {
        EventId::try_from(self.event_id)
    }

    pub fn flags(&self) -> EventFlags {
        EventFlags::from_bits_truncate(self.event_flags)
    }

    pub fn category(&self) -> AncsResult<CategoryId> {
        CategoryId::try_from(self.category_id)
    }
}

/// One entry of a Get Notification Attributes attribute list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSpec {
    pub kind: AttributeKind,
    pub max_length: Option<u16>,
}

impl AttributeSpec {
    pub fn new(kind: AttributeKind) -> Self {
        Self {
            kind,
            max_length: None,
        }
    }

    pub fn with_max_length(kind: AttributeKind, max_length: u16) -> Self {
        Self {
            kind,
            max_length: Some(max_length),
        }
    }
}

/// A single-attribute request issued by the chain controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeRequest {
    pub notification_id: u32,
    pub kind: AttributeKind,
    pub max_length: Option<u16>,
}

impl AttributeRequest {
    pub fn spec(&self) -> AttributeSpec {
        AttributeSpec {
            kind: self.kind,
            max_length: self.max_length,
        }
    }
}

/// An app attribute request for a NUL-terminated app identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppAttributeRequest {
    pub identifier: Vec<u8>,
    pub attributes: Vec<AppAttributeKind>,
}

/// Control point command IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandId {
    GetNotificationAttributes,
    GetAppAttributes,
    PerformNotificationAction,
}

impl CommandId {
    pub fn to_u8(&self) -> u8 {
        match self {
            CommandId::GetNotificationAttributes => ANCS_CMD_GET_NOTIFICATION_ATTRIBUTES,
            CommandId::GetAppAttributes => ANCS_CMD_GET_APP_ATTRIBUTES,
            CommandId::PerformNotificationAction => ANCS_CMD_PERFORM_NOTIFICATION_ACTION,
        }
    }
}

impl TryFrom<u8> for CommandId {
    type Error = AncsError;

    fn try_from(value: u8) -> AncsResult<Self> {
        match value {
            ANCS_CMD_GET_NOTIFICATION_ATTRIBUTES => Ok(CommandId::GetNotificationAttributes),
            ANCS_CMD_GET_APP_ATTRIBUTES => Ok(CommandId::GetAppAttributes),
            ANCS_CMD_PERFORM_NOTIFICATION_ACTION => Ok(CommandId::PerformNotificationAction),
            other => Err(AncsError::UnknownCommand(other)),
        }
    }
}

/// Encode a Get Notification Attributes control point command
pub fn encode_get_notification_attributes(notification_id: u32, attributes: &[AttributeSpec]) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(5 + attributes.len() * 3);
    buffer.push(CommandId::GetNotificationAttributes.to_u8());
    buffer.extend_from_slice(&notification_id.to_le_bytes());

    for attribute in attributes {
        buffer.push(attribute.kind.to_u8());
        if let Some(max_length) = attribute.max_length {
            buffer.extend_from_slice(&max_length.to_le_bytes());
        }
    }

    buffer
}

/// Encode a Get App Attributes control point command
///
/// The identifier is written as given; callers pass it NUL-terminated.
pub fn encode_get_app_attributes(identifier: &[u8], attributes: &[AppAttributeKind]) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(1 + identifier.len() + attributes.len());
    buffer.push(CommandId::GetAppAttributes.to_u8());
    buffer.extend_from_slice(identifier);
    buffer.extend(attributes.iter().map(AppAttributeKind::to_u8));
    buffer
}

/// Status reported when the binding collaborator finishes initialising
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStatus {
    Success,
    Failed,
}

/// Head fragment of an attribute value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeFragmentHead {
    pub notification_id: u32,
    /// Attribute ID, 2-byte LE length, then the first payload slice
    pub bytes: Vec<u8>,
}

/// Continuation fragment carrying payload only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeFragmentContinuation {
    pub bytes: Vec<u8>,
}

/// Result of a Get App Attributes request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppAttributeResult {
    pub bytes: Vec<u8>,
}

/// Semantic value of a completed attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedValue {
    Length(u16),
    Identifier(Vec<u8>),
}

/// A fully reassembled attribute value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedAttribute {
    pub notification_id: u32,
    pub kind: AttributeKind,
    pub raw_value: Vec<u8>,
    pub decoded: Option<DecodedValue>,
}
