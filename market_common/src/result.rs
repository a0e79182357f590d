//! Result type alias shared across the workspace.
//!
//! This module defines a convenient alias that defaults the error type to the
//! common `WatchError`, so functions can simply return `Result<T>`.
use crate::error::WatchError;

/// Workspace-wide `Result` alias with `WatchError` as the default error.
pub type Result<T, E = WatchError> = std::result::Result<T, E>;
