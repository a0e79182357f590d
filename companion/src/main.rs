//! Markets companion.
//!
//! This binary answers refresh triggers from the watchface with a market snapshot
//! (Nikkei 225, USD/JPY) encoded as a key/value dictionary. Internally it wires together
//! three building blocks:
//!
//! - `FrameReceiver` — reads UDP datagrams, decodes them into `Frame`s and forwards them
//!   with the sender's `SocketAddr` over a `crossbeam_channel`.
//! - `MarketSource` — produces snapshots, either from a feed JSON document
//!   (`FeedFileSource`) or from a random walk (`RandomWalkSource`).
//! - `CompanionService` — acknowledges requests, pushes snapshots and tracks the
//!   watch's acknowledgements.
//!
//! Concurrency and shutdown:
//! - Crossbeam `select!` multiplexes incoming frames, the timeout-check ticker and the
//!   Ctrl+C shutdown signal on the main thread, which owns all companion state.
//! - Errors while handling a single frame are logged; the loop keeps serving.
//!
//! When `--watch-addr` is given a snapshot is pushed right after startup, so the watch
//! does not have to wait for its next refresh minute.
#![warn(missing_docs)]
use crate::args::Args;
use crate::model::market_generator::RandomWalkSource;
use crate::model::source::{FeedFileSource, MarketSource};
use crate::receiver::FrameReceiver;
use crate::service::CompanionService;
use clap::Parser;
use crossbeam_channel::{select, tick, unbounded};
use log::{error, info};
use market_common::net::addr;
use market_common::{Frame, Result, WatchError};
use std::net::{SocketAddr, UdpSocket};
use std::path::PathBuf;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::Duration;

mod args;
pub mod model;
mod receiver;
mod service;

fn main() -> Result<(), WatchError> {
    init_logger();
    let args = Args::parse();

    let source: Box<dyn MarketSource> = match &args.feed {
        Some(path) => {
            info!("Using markets feed {}", path);
            Box::new(FeedFileSource::new(normalize_path(path)))
        }
        None => {
            info!("No feed given, generating random-walk quotes");
            Box::new(RandomWalkSource::default())
        }
    };
    let watch_addr = args
        .watch_addr
        .as_deref()
        .map(|raw| raw.trim().replace('"', "").parse::<SocketAddr>())
        .transpose()
        .map_err(|e| WatchError::Format(format!("Invalid --watch-addr: {}", e)))?;

    let socket = Arc::new(UdpSocket::bind(addr("0.0.0.0", args.listen_port))?);
    info!("Companion socket created on: {}", socket.local_addr()?);

    let shutdown = Arc::new(AtomicBool::new(false));
    let (stop_tx, stop_rx) = unbounded::<()>();
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            info!("Ctrl+C received. Shutting down companion...");
            shutdown.store(true, Ordering::SeqCst);
            let _ = stop_tx.send(());
        })
        .map_err(|e| WatchError::Format(format!("Error setting Ctrl+C handler: {}", e)))?;
    }

    let (frame_tx, frame_rx) = unbounded::<(Frame, SocketAddr)>();
    let receiver = FrameReceiver::new(Arc::clone(&socket))?;
    let receiver_shutdown = shutdown.clone();
    let receiver_thread = thread::spawn(move || {
        if let Err(e) = receiver.receive_loop_with_channel(frame_tx, receiver_shutdown) {
            error!("Receiver loop failed: {}", e);
        }
    });

    let mut service = CompanionService::new(
        socket,
        args.schema,
        source,
        Duration::from_millis(args.ack_timeout_ms),
    );
    info!("Companion ready, schema {}", args.schema);
    if let Some(watch) = watch_addr {
        service.announce_ready(watch)?;
    }

    let timeouts = tick(Duration::from_millis(args.poll_ms));
    loop {
        select! {
            recv(frame_rx) -> msg => match msg {
                Ok((frame, from)) => {
                    if let Err(e) = service.handle_frame(frame, from) {
                        error!("Failed to handle frame from {}: {}", from, e);
                    }
                }
                Err(_) => {
                    info!("Receiver closed");
                    break;
                }
            },
            recv(timeouts) -> _ => {
                service.check_timeouts();
            },
            recv(stop_rx) -> _ => break,
        }
    }

    shutdown.store(true, Ordering::SeqCst);
    let _ = receiver_thread.join();
    info!("Companion stopped");
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

/// Normalize a CLI-provided path string by trimming whitespace and matching quotes.
///
/// This allows passing Windows paths in quotes without breaking parsing.
fn normalize_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let no_quotes = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    PathBuf::from(no_quotes)
}
