//! Delivery state of outbound messages.
//!
//! `OutboxTracker` remembers when each unacknowledged transaction was sent and reports
//! the ones that waited longer than the configured timeout. It exposes three core
//! operations:
//!
//! - `OutboxTracker::record(id)` — a message with this transaction id just left.
//! - `OutboxTracker::acknowledge(id)` — an ACK/NACK arrived; returns whether the id was
//!   still pending, so late or duplicate acknowledgements are ignored.
//! - `OutboxTracker::check_timeouts()` — drain the transactions whose wait exceeded the
//!   timeout. Each transaction is reported at most once.
//!
//! Time is measured with `std::time::Instant`. The tracker is not synchronized; share
//! it behind a `Mutex` when acknowledgements and timeout checks run on different threads.
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use crate::message::AppMessage;
use crate::result::Result;

/// Why an outbound message was not delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendFailure {
    /// No acknowledgement within the timeout.
    Timeout,
    /// The peer answered with a NACK.
    Rejected,
    /// The datagram could not be handed to the socket.
    Io(String),
}

impl fmt::Display for SendFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendFailure::Timeout => f.write_str("no acknowledgement"),
            SendFailure::Rejected => f.write_str("rejected by peer"),
            SendFailure::Io(e) => write!(f, "socket error: {}", e),
        }
    }
}

/// Outbound half of the message transport.
pub trait Outbox {
    /// Submit `message` for delivery and return its transaction id.
    ///
    /// An `Err` means the message never left; completion of a message that did leave is
    /// reported later as an outbox event.
    fn send(&mut self, message: &AppMessage) -> Result<u8>;
}

/// Tracks unacknowledged transactions and detects delivery timeouts.
pub struct OutboxTracker {
    /// Send time of each pending transaction.
    pending: HashMap<u8, Instant>,
    /// Wait after which a transaction counts as failed.
    timeout: Duration,
}

impl OutboxTracker {
    /// Create a new tracker.
    pub fn new(timeout: Duration) -> Self {
        Self {
            pending: HashMap::new(),
            timeout,
        }
    }

    /// Record a transaction that was just sent.
    pub fn record(&mut self, id: u8) {
        self.record_at(id, Instant::now());
    }

    fn record_at(&mut self, id: u8, sent: Instant) {
        self.pending.insert(id, sent);
    }

    /// Settle a transaction. Returns `false` when it was not pending.
    pub fn acknowledge(&mut self, id: u8) -> bool {
        self.pending.remove(&id).is_some()
    }

    /// Drain transactions older than the timeout.
    pub fn check_timeouts(&mut self) -> Vec<u8> {
        self.check_timeouts_at(Instant::now())
    }

    fn check_timeouts_at(&mut self, now: Instant) -> Vec<u8> {
        let timeout = self.timeout;
        let mut timed_out = Vec::new();

        self.pending.retain(|id, sent| {
            if now.duration_since(*sent) > timeout {
                timed_out.push(*id);
                false
            } else {
                true
            }
        });
        timed_out.sort_unstable();
        timed_out
    }

    /// Check whether a transaction is still waiting for its acknowledgement.
    pub fn is_pending(&self, id: u8) -> bool {
        self.pending.contains_key(&id)
    }
}
