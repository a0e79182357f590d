//! Market watchface — shows the time and a one-line market summary (Nikkei 225,
//! USD/JPY). Every minute the clock is redrawn; on the hour and half hour a refresh
//! trigger is sent to the companion, which answers with a key/value payload that is
//! parsed into the summary line.
//!
//! Usage example (CLI):
//! ```bash
//! watchface --companion-addr 127.0.0.1:9190 --listen-port 9191 --schema b --clock 24h
//! ```
//!
//! All application state lives in `WatchApp` and is only touched from the event loop
//! thread; the tick source and the UDP transport run on their own threads and post
//! events into the loop's channel.
#![warn(missing_docs)]
mod args;

use crate::args::Args;
use chrono::Local;
use clap::Parser;
use log::{Level, info};
use market_common::net::addr;
use market_common::{Result, WatchError};
use std::net::{SocketAddr, UdpSocket};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;
use watchface::app::WatchApp;
use watchface::display::ConsoleWindow;
use watchface::event_loop::{EventLoop, WatchEvent};
use watchface::scheduler::TickSource;
use watchface::transport::UdpTransport;

fn main() -> Result<(), WatchError> {
    init_logger();
    let args = Args::parse();
    let shutdown = Arc::new(AtomicBool::new(false));
    let (events_tx, event_loop) = EventLoop::new();
    {
        let shutdown = shutdown.clone();
        let events_tx = events_tx.clone();
        ctrlc::set_handler(move || {
            info!("Ctrl+C received. Shutting down watchface...");
            shutdown.store(true, Ordering::SeqCst);
            let _ = events_tx.send(WatchEvent::Shutdown);
        })
        .map_err(|e| WatchError::Format(format!("Error setting Ctrl+C handler: {}", e)))?;
    }

    let companion: SocketAddr = args
        .companion_addr
        .trim()
        .replace('"', "")
        .parse()
        .map_err(|e| WatchError::Format(format!("Invalid --companion-addr: {}", e)))?;
    let socket = UdpSocket::bind(addr("0.0.0.0", args.listen_port))?;
    info!("Watchface listening on: {}", socket.local_addr()?);
    info!(
        "Companion at {}, schema {}, clock {}",
        companion, args.schema, args.clock
    );

    let transport = UdpTransport::start(
        socket,
        companion,
        Duration::from_millis(args.ack_timeout_ms),
        events_tx.clone(),
        shutdown.clone(),
    )?;
    let ticker = TickSource::start(events_tx, shutdown.clone());

    let mut app = WatchApp::new(args.schema, args.clock, transport, ConsoleWindow::new());
    app.load(Local::now().naive_local());
    event_loop.run(&mut app);

    shutdown.store(true, Ordering::SeqCst);
    let _ = ticker.join();
    info!(
        "Watchface stopped showing [ {} ] {} ({} diagnostics, {} errors)",
        app.time_text(),
        app.markets_text(),
        app.diagnostics().len(),
        app.diagnostics().count(Level::Error)
    );
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
