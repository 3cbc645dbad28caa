//! Error types for the Orderbot domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Orderbot operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Row source errors ---
    #[error("Row source error: {0}")]
    Source(#[from] SourceError),

    // --- Channel errors ---
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Server I/O ---
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// A table fetch that did not produce a table.
///
/// Always distinct from "no row matched": a query that never saw data
/// cannot claim the record does not exist.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    #[error("Row source not configured: {0}")]
    NotConfigured(String),

    #[error("Table request failed: {0}")]
    Http(String),

    #[error("Table request rejected: {message} (status: {status_code})")]
    Status { status_code: u16, message: String },

    #[error("Malformed table response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Channel not configured: {0}")]
    NotConfigured(String),

    #[error("Message delivery failed to {channel}: {reason}")]
    DeliveryFailed { channel: String, reason: String },

    #[error("Invalid webhook signature")]
    InvalidSignature,

    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),
}
