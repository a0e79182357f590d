//! Minute ticks and the refresh trigger.
//!
//! `TickSource` runs a background thread that sleeps until the next wall-clock minute
//! boundary and posts a `WatchEvent::Tick` stamped with that boundary. Boundaries come
//! from [`next_tick`], which never repeats or skips a minute when the wake-up lands a
//! little early or late. Whether a tick also asks the
//! companion for fresh market data is decided by [`is_refresh_minute`].
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{Local, NaiveDateTime, TimeDelta, Timelike};
use crossbeam_channel::Sender;
use log::{debug, info};
use market_common::outbox::Outbox;
use market_common::{AppMessage, Result};

use crate::event_loop::WatchEvent;

/// Minutes between refresh triggers, aligned to the top of the hour.
pub const REFRESH_INTERVAL_MINUTES: u32 = 30;

/// Longest single sleep, so a shutdown is noticed promptly.
const MAX_NAP: Duration = Duration::from_millis(500);

/// Returns `true` on minutes that trigger a market refresh.
pub fn is_refresh_minute(minute: u32) -> bool {
    minute % REFRESH_INTERVAL_MINUTES == 0
}

/// Hand a refresh trigger to `outbox`.
pub fn emit_refresh<O: Outbox>(outbox: &mut O) -> Result<u8> {
    outbox.send(&AppMessage::refresh_request())
}

/// The minute boundary to tick next, given the wall clock and the last boundary ticked.
///
/// A clock that reads slightly behind `last` (woken early, or slewed back) continues
/// after `last`; a jump of a minute or more backwards starts over from `now`.
pub fn next_tick(now: NaiveDateTime, last: Option<NaiveDateTime>) -> NaiveDateTime {
    let from = match last {
        Some(last) if last > now && last - now < TimeDelta::minutes(1) => last,
        _ => now,
    };
    from - TimeDelta::seconds(from.second() as i64)
        - TimeDelta::nanoseconds(from.nanosecond() as i64)
        + TimeDelta::minutes(1)
}

/// Background minute timer.
pub struct TickSource;

impl TickSource {
    /// Spawn the timer thread. It stops once `shutdown` is set or the event channel closes.
    pub fn start(events: Sender<WatchEvent>, shutdown: Arc<AtomicBool>) -> JoinHandle<()> {
        thread::spawn(move || {
            info!("Tick source started");
            let mut last = None;
            while !shutdown.load(Ordering::Relaxed) {
                let now = Local::now().naive_local();
                let boundary = next_tick(now, last);
                let mut left = (boundary - now).to_std().unwrap_or(Duration::ZERO);
                while !left.is_zero() && !shutdown.load(Ordering::Relaxed) {
                    let nap = left.min(MAX_NAP);
                    thread::sleep(nap);
                    left -= nap;
                }
                if shutdown.load(Ordering::Relaxed) {
                    break;
                }
                debug!("Minute tick at {}", boundary.format("%H:%M"));
                if events.send(WatchEvent::Tick(boundary)).is_err() {
                    break;
                }
                last = Some(boundary);
            }
            info!("Tick source stopping...");
        })
    }
}
