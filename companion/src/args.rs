//! Command-line arguments for the companion.
use clap::Parser;
use market_common::keys::Schema;
use market_common::net::COMPANION_PORT;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Local UDP port to bind for refresh triggers.
    #[clap(long, default_value_t = COMPANION_PORT)]
    pub listen_port: u16,

    /// Watch address (`ip:port`) to push a snapshot to as soon as the companion is ready.
    #[clap(long)]
    pub watch_addr: Option<String>,

    /// Key layout the watch expects.
    #[clap(long, value_enum, default_value_t = Schema::B)]
    pub schema: Schema,

    /// Markets feed JSON document. A random walk is used when absent.
    #[clap(long)]
    pub feed: Option<String>,

    /// Interval for acknowledgement timeout checks, in milliseconds.
    #[clap(long, default_value_t = 500)]
    pub poll_ms: u64,

    /// How long a pushed payload may stay unacknowledged, in milliseconds.
    #[clap(long, default_value_t = 5000)]
    pub ack_timeout_ms: u64,
}
