//! Market watchface application.
//!
//! The watch shows the time and a one-line market summary. Its modules, leaf first:
//! - `clock` — `HH:MM` rendering in 24h or 12h style.
//! - `diagnostics` — bounded on-watch log mirrored to the `log` facade.
//! - `display` — the two text regions behind the `DisplaySurface` trait.
//! - `parser` — inbound dictionary parsing into fixed-size field buffers.
//! - `scheduler` — minute ticks and the half-hourly refresh trigger.
//! - `event_loop` — `WatchEvent`s and the single-threaded dispatcher.
//! - `transport` — UDP outbox/inbox with acknowledgement tracking.
//! - `app` — `WatchApp`, the application state driven by the event loop.
#![warn(missing_docs)]
pub mod app;
pub mod clock;
pub mod diagnostics;
pub mod display;
pub mod event_loop;
pub mod parser;
pub mod scheduler;
pub mod transport;
