//! Companion request handling.
//!
//! `CompanionService` owns the sending side of the socket, the market source and the
//! acknowledgement tracker for pushed payloads. It is driven from the main loop only:
//!
//! - `Frame::Message` — fetch a snapshot; acknowledge and push it back to the sender,
//!   or refuse the request with a NACK when there is nothing to send.
//! - `Frame::Ack` / `Frame::Nack` — settle a pushed payload.
//! - timeout check — log pushes the watch never acknowledged.
//!
//! Failed pushes are logged and never retried; the watch asks again on its next
//! refresh minute.
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use market_common::keys::Schema;
use market_common::outbox::OutboxTracker;
use market_common::{Frame, Result};

use crate::model::market::MarketSnapshot;
use crate::model::source::MarketSource;

/// Companion state.
pub struct CompanionService<S: MarketSource> {
    socket: Arc<UdpSocket>,
    schema: Schema,
    source: S,
    tracker: OutboxTracker,
    next_id: u8,
}

impl<S: MarketSource> CompanionService<S> {
    /// Create a service sending through `socket`.
    pub fn new(socket: Arc<UdpSocket>, schema: Schema, source: S, ack_timeout: Duration) -> Self {
        Self {
            socket,
            schema,
            source,
            tracker: OutboxTracker::new(ack_timeout),
            next_id: 0,
        }
    }

    /// React to one inbound frame.
    pub fn handle_frame(&mut self, frame: Frame, from: SocketAddr) -> Result<()> {
        match frame {
            Frame::Message {
                transaction_id,
                message,
            } => {
                info!(
                    "Refresh request {} from {} ({} tuples)",
                    transaction_id,
                    from,
                    message.len()
                );
                let snapshot = match self.source.fetch() {
                    Ok(snapshot) => snapshot,
                    Err(e) => {
                        error!("Failed to fetch markets data: {}", e);
                        self.socket
                            .send_to(&Frame::Nack { transaction_id }.to_bytes()?, from)?;
                        return Ok(());
                    }
                };
                self.socket
                    .send_to(&Frame::Ack { transaction_id }.to_bytes()?, from)?;
                self.send_snapshot(from, &snapshot)?;
            }
            Frame::Ack { transaction_id } => {
                if self.tracker.acknowledge(transaction_id) {
                    info!("Markets data {} delivered to {}", transaction_id, from);
                } else {
                    debug!("Ignoring late ack {} from {}", transaction_id, from);
                }
            }
            Frame::Nack { transaction_id } => {
                if self.tracker.acknowledge(transaction_id) {
                    error!("Markets data {} rejected by {}", transaction_id, from);
                }
            }
        }
        Ok(())
    }

    /// Push the first snapshot to the configured watch once the socket is up.
    pub fn announce_ready(&mut self, watch: SocketAddr) -> Result<Option<u8>> {
        info!("Companion ready, pushing markets data to {}", watch);
        self.push(watch)
    }

    /// Fetch a snapshot and send it to `to`. Returns the transaction id, or `None` when
    /// the source had nothing to offer.
    pub fn push(&mut self, to: SocketAddr) -> Result<Option<u8>> {
        match self.source.fetch() {
            Ok(snapshot) => self.send_snapshot(to, &snapshot),
            Err(e) => {
                error!("Failed to fetch markets data: {}", e);
                Ok(None)
            }
        }
    }

    fn send_snapshot(&mut self, to: SocketAddr, snapshot: &MarketSnapshot) -> Result<Option<u8>> {
        let transaction_id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        let frame = Frame::Message {
            transaction_id,
            message: snapshot.to_message(self.schema),
        };
        let bytes = frame.to_bytes()?;
        self.tracker.record(transaction_id);
        if let Err(e) = self.socket.send_to(&bytes, to) {
            self.tracker.acknowledge(transaction_id);
            error!("Error sending markets data to {}: {}", to, e);
            return Ok(None);
        }
        info!(
            "Markets data {} sent to {}: N225 {} ({}), USDJPY {}",
            transaction_id, to, snapshot.n225.price, snapshot.n225.diff, snapshot.yen_dollar.price
        );
        Ok(Some(transaction_id))
    }

    /// Log and forget pushes whose acknowledgement timed out.
    pub fn check_timeouts(&mut self) -> Vec<u8> {
        let timed_out = self.tracker.check_timeouts();
        for id in &timed_out {
            warn!("Markets data {} was not acknowledged", id);
        }
        timed_out
    }

    /// Whether push `id` still waits for its acknowledgement.
    pub fn is_pending(&self, id: u8) -> bool {
        self.tracker.is_pending(id)
    }
}
