//! Attribute value decoding

use super::buffer::FragmentBuffer;
use super::types::{AttributeKind, CompletedAttribute, DecodedValue};

/// Decode a completed raw value according to its attribute kind
///
/// Only the message size and the app identifier carry meaning for the
/// request chain; every other kind is passed through undecoded.
pub fn decode(kind: AttributeKind, raw_value: &[u8]) -> Option<DecodedValue> {
    match kind {
        AttributeKind::MessageSize => Some(DecodedValue::Length(parse_message_size(raw_value))),
        AttributeKind::AppIdentifier => Some(DecodedValue::Identifier(nul_terminate(raw_value))),
        _ => None,
    }
}

/// Parse the ASCII decimal message size
///
/// Reads leading digits only. Empty or non-numeric input yields 0 and
/// values past `u16::MAX` saturate.
pub fn parse_message_size(raw_value: &[u8]) -> u16 {
    raw_value
        .iter()
        .take_while(|byte| byte.is_ascii_digit())
        .fold(0u16, |acc, digit| {
            acc.saturating_mul(10).saturating_add(u16::from(digit - b'0'))
        })
}

/// Append the NUL terminator the app attribute command expects
pub fn nul_terminate(identifier: &[u8]) -> Vec<u8> {
    let mut terminated = Vec::with_capacity(identifier.len() + 1);
    terminated.extend_from_slice(identifier);
    terminated.push(0x00);
    terminated
}

/// Turn a complete buffer into a decoded attribute
pub fn complete(buffer: FragmentBuffer) -> CompletedAttribute {
    let mut completed = buffer.into_completed();
    completed.decoded = decode(completed.kind, &completed.raw_value);
    completed
}
