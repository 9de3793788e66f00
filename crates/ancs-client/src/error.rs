//! Error types for the ancsclient library
//!
//! This module defines the error type shared by the ANCS reassembly,
//! decoding and transport layers.

use crate::ancs::chain::PendingRequest;
use thiserror::Error;

/// Errors that can occur while driving an ANCS attribute chain
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AncsError {
    #[error("Malformed attribute head fragment ({len} bytes)")]
    MalformedHead { len: usize },

    #[error("Fragment buffer capacity exceeded: need {needed} bytes, capacity {capacity}")]
    CapacityExceeded { needed: usize, capacity: usize },

    #[error("No active fragment buffer")]
    NoActiveBuffer,

    #[error("Attribute request already outstanding: {pending:?}")]
    RequestOutstanding { pending: PendingRequest },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid notification source payload length: {len}")]
    InvalidNotificationSource { len: usize },

    #[error("Unknown attribute ID: {0}")]
    UnknownAttribute(u8),

    #[error("Unknown category ID: {0}")]
    UnknownCategory(u8),

    #[error("Unknown event ID: {0}")]
    UnknownEvent(u8),

    #[error("Unknown control point command ID: {0}")]
    UnknownCommand(u8),

    #[error("No notification to fetch attributes for")]
    NoNotification,

    #[error("Client detached from connection")]
    Detached,
}

/// Result type for ANCS operations
pub type AncsResult<T> = Result<T, AncsError>;
