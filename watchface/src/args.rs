//! Command-line arguments for the watchface.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use clap::Parser;
use market_common::keys::Schema;
use market_common::net::{addr, COMPANION_PORT};

use watchface::clock::ClockStyle;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Companion address (`ip:port`) that answers refresh triggers.
    #[clap(long, default_value_t = addr("127.0.0.1", COMPANION_PORT))]
    pub companion_addr: String,

    /// Local UDP port to bind for market payloads and acknowledgements.
    #[clap(long, default_value_t = market_common::net::WATCH_PORT)]
    pub listen_port: u16,

    /// Key layout the companion sends.
    #[clap(long, value_enum, default_value_t = Schema::B)]
    pub schema: Schema,

    /// Clock display style.
    #[clap(long, value_enum, default_value_t = ClockStyle::H24)]
    pub clock: ClockStyle,

    /// How long an outbound message may stay unacknowledged before it counts as failed.
    #[clap(long, default_value_t = 5000)]
    pub ack_timeout_ms: u64,
}
