//! Error types shared between the watchface and the companion.
//!
//! The `WatchError` enum unifies common failure cases for I/O, frame encoding,
//! feed parsing, channel communication and lock poisoning, allowing both binaries to
//! propagate a single error type.
use std::io;
use std::sync::PoisonError;

use thiserror::Error;

/// Unified error type shared by the watchface and the companion.
#[derive(Error, Debug)]
pub enum WatchError {
    /// I/O error originating from the standard library or sockets/files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic formatting/validation error with a human-readable message.
    #[error("Format error: {0}")]
    Format(String),

    /// Failure while decoding a frame with `bincode` (invalid or truncated datagrams, etc.).
    #[error("Frame decode error: {0}")]
    FrameDecode(#[from] bincode::error::DecodeError),

    /// Failure while encoding a frame with `bincode`.
    #[error("Frame encode error: {0}")]
    FrameEncode(#[from] bincode::error::EncodeError),

    /// Failure while decoding the market feed JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Market feed document is well-formed JSON but lacks a required entry.
    #[error("Market feed is missing entry: {0}")]
    MissingFeedEntry(String),

    /// Crossbeam/channel send failed (e.g., receiver dropped); contains a short context string.
    #[error("Channel send failed: {0}")]
    ChannelSend(String),

    /// Error indicating a poisoned mutex/lock was encountered.
    #[error("Mutex Lock Poisoned: {0}")]
    MutexLock(String),
}

impl<T> From<crossbeam_channel::SendError<T>> for WatchError {
    fn from(err: crossbeam_channel::SendError<T>) -> Self {
        WatchError::ChannelSend(err.to_string())
    }
}

impl<T> From<PoisonError<T>> for WatchError {
    fn from(err: PoisonError<T>) -> Self {
        WatchError::MutexLock(err.to_string())
    }
}
