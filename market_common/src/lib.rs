//!
//! Common types and utilities shared by the watchface and its companion.
//!
//! This crate aggregates:
//! - `error` — unified error type `WatchError` used across the workspace.
//! - `result` — handy `Result<T, WatchError>` alias.
//! - `keys` — refresh key and the two inbound market schemas.
//! - `message` — `AppMessage` dictionaries and datagram `Frame`s.
//! - `outbox` — outbound transport trait and acknowledgement timeout tracking.
//! - `text` — fixed-capacity, truncating display buffers.
//! - `net` — networking constants and small helpers.
#![warn(missing_docs)]
pub mod error;
pub mod keys;
pub mod message;
pub mod net;
pub mod outbox;
pub mod result;
pub mod text;

pub use error::WatchError;
pub use message::{AppMessage, Frame, Tuple, TupleValue};
pub use result::Result;
pub use text::{DisplayText, FixedText};
