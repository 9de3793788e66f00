//! ANCS protocol constants

// Notification attribute IDs
pub const ANCS_ATTR_APP_IDENTIFIER: u8 = 0x00;
pub const ANCS_ATTR_TITLE: u8 = 0x01;
pub const ANCS_ATTR_SUBTITLE: u8 = 0x02;
pub const ANCS_ATTR_MESSAGE: u8 = 0x03;
pub const ANCS_ATTR_MESSAGE_SIZE: u8 = 0x04;
pub const ANCS_ATTR_DATE: u8 = 0x05;
pub const ANCS_ATTR_POSITIVE_ACTION_LABEL: u8 = 0x06;
pub const ANCS_ATTR_NEGATIVE_ACTION_LABEL: u8 = 0x07;

// App attribute IDs
pub const ANCS_APP_ATTR_DISPLAY_NAME: u8 = 0x00;

// Control point command IDs
pub const ANCS_CMD_GET_NOTIFICATION_ATTRIBUTES: u8 = 0x00;
pub const ANCS_CMD_GET_APP_ATTRIBUTES: u8 = 0x01;
pub const ANCS_CMD_PERFORM_NOTIFICATION_ACTION: u8 = 0x02;

// Notification source event IDs
pub const ANCS_EVENT_ADDED: u8 = 0x00;
pub const ANCS_EVENT_MODIFIED: u8 = 0x01;
pub const ANCS_EVENT_REMOVED: u8 = 0x02;

// Notification source event flags
pub const ANCS_EVENT_FLAG_SILENT: u8 = 0x01;
pub const ANCS_EVENT_FLAG_IMPORTANT: u8 = 0x02;
pub const ANCS_EVENT_FLAG_PRE_EXISTING: u8 = 0x04;
pub const ANCS_EVENT_FLAG_POSITIVE_ACTION: u8 = 0x08;
pub const ANCS_EVENT_FLAG_NEGATIVE_ACTION: u8 = 0x10;

// Category IDs
pub const ANCS_CATEGORY_OTHER: u8 = 0;
pub const ANCS_CATEGORY_INCOMING_CALL: u8 = 1;
pub const ANCS_CATEGORY_MISSED_CALL: u8 = 2;
pub const ANCS_CATEGORY_VOICEMAIL: u8 = 3;
pub const ANCS_CATEGORY_SOCIAL: u8 = 4;
pub const ANCS_CATEGORY_SCHEDULE: u8 = 5;
pub const ANCS_CATEGORY_EMAIL: u8 = 6;
pub const ANCS_CATEGORY_NEWS: u8 = 7;
pub const ANCS_CATEGORY_HEALTH_AND_FITNESS: u8 = 8;
pub const ANCS_CATEGORY_BUSINESS_AND_FINANCE: u8 = 9;
pub const ANCS_CATEGORY_LOCATION: u8 = 10;
pub const ANCS_CATEGORY_ENTERTAINMENT: u8 = 11;

/// Size of a notification source payload: event id, flags, category id,
/// category count and a 4-byte notification UID
pub const ANCS_NOTIFICATION_SOURCE_LEN: usize = 8;

/// Attribute header carried by the head fragment: attribute ID (1) + length (2)
pub const ANCS_ATTR_HEADER_SIZE: usize = 3;

// Fragment buffer and packet sizing
pub const ANCS_DEFAULT_BUFFER_CAPACITY: usize = 1024;
pub const ANCS_DEFAULT_PACKET_CAPACITY: usize = 20;
pub const ANCS_DEFAULT_PACKET_OVERHEAD: usize = 5;
pub const ANCS_DEFAULT_TITLE_MAX_LENGTH: u16 = 20;

// Client characteristic configuration values
pub const CCCD_NOTIFICATIONS_ENABLED: [u8; 2] = [0x01, 0x00];
pub const CCCD_DISABLED: [u8; 2] = [0x00, 0x00];

// 128-bit UUIDs, most significant byte first
pub const ANCS_SERVICE_UUID: u128 = 0x7905F431_B5CE_4E99_A40F_4B1E122D00D0;
pub const ANCS_NOTIFICATION_SOURCE_UUID: u128 = 0x9FBF120D_6301_42D9_8C58_25E699A21DBD;
pub const ANCS_CONTROL_POINT_UUID: u128 = 0x69D1D8F3_45E1_49A8_9821_9BBDFDAAD9D9;
pub const ANCS_DATA_SOURCE_UUID: u128 = 0x22EAC6E9_24D6_4BB5_BE44_B36ACE7C7BFB;
