//! Domain models and utilities for the companion.
//!
//! - `market` — `MarketSnapshot`, per-instrument `Quote`s, feed document parsing and the
//!   mapping onto watch dictionaries.
//! - `source` — `MarketSource` trait and the feed-file source.
//! - `market_generator` — random-walk source used when no feed is configured.

pub mod market;
pub mod market_generator;
pub mod source;
