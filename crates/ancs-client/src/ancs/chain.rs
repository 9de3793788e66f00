//! Attribute request chain
//!
//! Each notification is described by a chain of single-attribute requests
//! rooted at the date. What to request next depends only on which attribute
//! was just received, so the table lives here as pure functions over
//! `AttributeKind` and the controller only applies their result.

use super::buffer::AttributeHeader;
use super::config::AncsClientConfig;
use super::constants::ANCS_ATTR_HEADER_SIZE;
use super::decoder::{nul_terminate, parse_message_size};
use super::types::{
    AppAttributeKind, AppAttributeRequest, AttributeKind, AttributeRequest, CompletedAttribute,
    DecodedValue,
};

/// What the controller is waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    /// No request in flight
    Idle,
    /// Request sent, no fragment received yet
    AwaitingHead {
        notification_id: u32,
        pending: PendingRequest,
    },
    /// Head received, continuation fragments expected
    Accumulating {
        notification_id: u32,
        kind: AttributeKind,
    },
}

impl ChainState {
    pub fn is_idle(&self) -> bool {
        matches!(self, ChainState::Idle)
    }

    pub fn notification_id(&self) -> Option<u32> {
        match self {
            ChainState::Idle => None,
            ChainState::AwaitingHead {
                notification_id, ..
            }
            | ChainState::Accumulating {
                notification_id, ..
            } => Some(*notification_id),
        }
    }
}

/// The request currently outstanding on the control point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingRequest {
    Attribute(AttributeKind),
    AppAttributes,
}

/// The next request a chain step asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextRequest {
    Attribute(AttributeRequest),
    AppAttributes(AppAttributeRequest),
}

impl NextRequest {
    pub fn pending(&self) -> PendingRequest {
        match self {
            NextRequest::Attribute(request) => PendingRequest::Attribute(request.kind),
            NextRequest::AppAttributes(_) => PendingRequest::AppAttributes,
        }
    }
}

/// The fixed root of every chain
pub fn root_request(notification_id: u32) -> NextRequest {
    NextRequest::Attribute(AttributeRequest {
        notification_id,
        kind: AttributeKind::Date,
        max_length: None,
    })
}

/// Decision taken as soon as a head fragment arrives
///
/// A short title fits in one packet and never gets a continuation, and the
/// message size always fits, so both advance the chain here instead of
/// waiting for completion.
pub fn next_on_head(
    notification_id: u32,
    header: &AttributeHeader,
    head: &[u8],
    config: &AncsClientConfig,
) -> Option<NextRequest> {
    match header.kind {
        AttributeKind::Title if config.fits_in_one_packet(head.len()) => {
            Some(message_size_request(notification_id))
        }
        AttributeKind::MessageSize => {
            let end = head.len().min(header.total_len());
            let digits = head.get(ANCS_ATTR_HEADER_SIZE..end).unwrap_or(&[]);
            Some(message_request(notification_id, parse_message_size(digits), config))
        }
        _ => None,
    }
}

/// Decision taken once an attribute has been fully reassembled
pub fn next_on_complete(
    completed: &CompletedAttribute,
    config: &AncsClientConfig,
) -> Option<NextRequest> {
    let notification_id = completed.notification_id;

    match completed.kind {
        AttributeKind::Date => Some(NextRequest::Attribute(AttributeRequest {
            notification_id,
            kind: AttributeKind::Title,
            max_length: Some(config.title_max_length),
        })),
        AttributeKind::Title => Some(message_size_request(notification_id)),
        AttributeKind::MessageSize => {
            let length = match &completed.decoded {
                Some(DecodedValue::Length(length)) => *length,
                _ => parse_message_size(&completed.raw_value),
            };
            Some(message_request(notification_id, length, config))
        }
        AttributeKind::AppIdentifier => {
            let identifier = match &completed.decoded {
                Some(DecodedValue::Identifier(identifier)) => identifier.clone(),
                _ => nul_terminate(&completed.raw_value),
            };
            Some(NextRequest::AppAttributes(AppAttributeRequest {
                identifier,
                attributes: vec![AppAttributeKind::DisplayName],
            }))
        }
        AttributeKind::Message
        | AttributeKind::Subtitle
        | AttributeKind::PositiveActionLabel
        | AttributeKind::NegativeActionLabel => None,
    }
}

fn message_size_request(notification_id: u32) -> NextRequest {
    NextRequest::Attribute(AttributeRequest {
        notification_id,
        kind: AttributeKind::MessageSize,
        max_length: None,
    })
}

fn message_request(notification_id: u32, length: u16, config: &AncsClientConfig) -> NextRequest {
    NextRequest::Attribute(AttributeRequest {
        notification_id,
        kind: AttributeKind::Message,
        max_length: Some(length.min(config.max_message_length())),
    })
}
