//! UDP message transport between the watch and its companion.
//!
//! Outbound dictionaries are wrapped in `Frame::Message` and sent to the companion;
//! their completion arrives later as an ACK/NACK datagram or not at all, which the
//! timeout thread turns into `OutboxFailed`. Inbound `Frame::Message`s are forwarded as
//! `InboxReceived` and acknowledged, or refused with a NACK once the event loop is gone;
//! undecodable datagrams become `InboxDropped`.
use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Sender, tick};
use log::{debug, error, info, warn};
use market_common::net::MAX_DATAGRAM;
use market_common::outbox::{Outbox, OutboxTracker, SendFailure};
use market_common::{AppMessage, Frame, Result, WatchError};

use crate::event_loop::WatchEvent;

/// How often pending transactions are checked for timeouts.
const TIMEOUT_CHECK_INTERVAL: Duration = Duration::from_millis(250);
/// Socket read timeout, so the receiver notices a shutdown.
const READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Outbox backed by a UDP socket.
pub struct UdpTransport {
    socket: Arc<UdpSocket>,
    companion: SocketAddr,
    tracker: Arc<Mutex<OutboxTracker>>,
    next_id: u8,
}

impl UdpTransport {
    /// Wrap `socket` and start the receiver and timeout threads.
    pub fn start(
        socket: UdpSocket,
        companion: SocketAddr,
        ack_timeout: Duration,
        events: Sender<WatchEvent>,
        shutdown: Arc<AtomicBool>,
    ) -> Result<Self> {
        socket.set_read_timeout(Some(READ_TIMEOUT))?;
        let socket = Arc::new(socket);
        let tracker = Arc::new(Mutex::new(OutboxTracker::new(ack_timeout)));

        {
            let socket = Arc::clone(&socket);
            let tracker = Arc::clone(&tracker);
            let events = events.clone();
            let shutdown = Arc::clone(&shutdown);
            thread::spawn(move || {
                if let Err(e) = receive_loop(socket, tracker, events, shutdown) {
                    error!("Receiver loop failed: {}", e);
                }
            });
        }
        {
            let tracker = Arc::clone(&tracker);
            thread::spawn(move || timeout_loop(tracker, events, shutdown));
        }

        Ok(Self {
            socket,
            companion,
            tracker,
            next_id: 0,
        })
    }
}

impl Outbox for UdpTransport {
    fn send(&mut self, message: &AppMessage) -> Result<u8> {
        let transaction_id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        let frame = Frame::Message {
            transaction_id,
            message: message.clone(),
        };
        let bytes = frame.to_bytes()?;
        // Record before sending so a fast ACK always finds the transaction.
        self.tracker.lock()?.record(transaction_id);
        if let Err(e) = self.socket.send_to(&bytes, self.companion) {
            self.tracker.lock()?.acknowledge(transaction_id);
            return Err(WatchError::Io(e));
        }
        debug!("Sent transaction {} to {}", transaction_id, self.companion);
        Ok(transaction_id)
    }
}

/// Blocking loop that turns datagrams into events.
fn receive_loop(
    socket: Arc<UdpSocket>,
    tracker: Arc<Mutex<OutboxTracker>>,
    events: Sender<WatchEvent>,
    shutdown: Arc<AtomicBool>,
) -> Result<()> {
    info!("Inbox receiver running on: {}", socket.local_addr()?);
    let mut buf = [0u8; MAX_DATAGRAM];

    while !shutdown.load(Ordering::Relaxed) {
        let (size, from) = match socket.recv_from(&mut buf) {
            Ok(received) => received,
            Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => {
                continue;
            }
            Err(e) if e.kind() == ErrorKind::ConnectionReset => {
                debug!("Companion port unreachable");
                continue;
            }
            Err(e) => return Err(WatchError::Io(e)),
        };

        let event = match Frame::from_bytes(&buf[..size]) {
            Ok(Frame::Message {
                transaction_id,
                message,
            }) => {
                // A message the event loop can no longer take is refused, not acked.
                let taken = events.send(WatchEvent::InboxReceived(message));
                let reply = match taken {
                    Ok(()) => Frame::Ack { transaction_id },
                    Err(_) => Frame::Nack { transaction_id },
                };
                if let Err(e) = socket.send_to(&reply.to_bytes()?, from) {
                    warn!("Failed to answer {} from {}: {}", transaction_id, from, e);
                }
                taken?;
                continue;
            }
            Ok(Frame::Ack { transaction_id }) => {
                if !tracker.lock()?.acknowledge(transaction_id) {
                    debug!("Ignoring late ack for {}", transaction_id);
                    continue;
                }
                WatchEvent::OutboxSent(transaction_id)
            }
            Ok(Frame::Nack { transaction_id }) => {
                if !tracker.lock()?.acknowledge(transaction_id) {
                    continue;
                }
                WatchEvent::OutboxFailed(transaction_id, SendFailure::Rejected)
            }
            Err(e) => {
                WatchEvent::InboxDropped(format!("{} byte datagram from {}: {}", size, from, e))
            }
        };

        events.send(event)?;
    }
    info!("Inbox receiver stopping...");
    Ok(())
}

/// Periodically reports transactions whose acknowledgement never came.
fn timeout_loop(
    tracker: Arc<Mutex<OutboxTracker>>,
    events: Sender<WatchEvent>,
    shutdown: Arc<AtomicBool>,
) {
    let ticker = tick(TIMEOUT_CHECK_INTERVAL);
    while !shutdown.load(Ordering::Relaxed) {
        if ticker.recv().is_err() {
            break;
        }
        let timed_out = match tracker.lock() {
            Ok(mut tracker) => tracker.check_timeouts(),
            Err(e) => {
                error!("Outbox tracker unavailable: {}", e);
                break;
            }
        };
        for id in timed_out {
            if events
                .send(WatchEvent::OutboxFailed(id, SendFailure::Timeout))
                .is_err()
            {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    fn loopback() -> UdpSocket {
        UdpSocket::bind("127.0.0.1:0").unwrap()
    }

    #[test]
    fn ack_from_companion_completes_the_send() {
        let companion = loopback();
        let watch = loopback();
        let (tx, rx) = unbounded();
        let shutdown = Arc::new(AtomicBool::new(false));
        let mut transport = UdpTransport::start(
            watch,
            companion.local_addr().unwrap(),
            Duration::from_secs(5),
            tx,
            shutdown.clone(),
        )
        .unwrap();

        let id = transport.send(&AppMessage::refresh_request()).unwrap();

        let mut buf = [0u8; MAX_DATAGRAM];
        let (size, from) = companion.recv_from(&mut buf).unwrap();
        let frame = Frame::from_bytes(&buf[..size]).unwrap();
        assert_eq!(frame.transaction_id(), id);
        companion
            .send_to(&Frame::Ack { transaction_id: id }.to_bytes().unwrap(), from)
            .unwrap();

        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            WatchEvent::OutboxSent(sent) => assert_eq!(sent, id),
            other => panic!("unexpected event {:?}", other),
        }
        shutdown.store(true, Ordering::SeqCst);
    }

    #[test]
    fn inbound_message_is_acked_and_forwarded() {
        let companion = loopback();
        let watch = loopback();
        let watch_addr = watch.local_addr().unwrap();
        let (tx, rx) = unbounded();
        let shutdown = Arc::new(AtomicBool::new(false));
        let _transport = UdpTransport::start(
            watch,
            companion.local_addr().unwrap(),
            Duration::from_secs(5),
            tx,
            shutdown.clone(),
        )
        .unwrap();

        let mut message = AppMessage::new();
        message.write_cstring(0, "19500").write_cstring(1, "+50");
        let frame = Frame::Message {
            transaction_id: 9,
            message: message.clone(),
        };
        companion
            .send_to(&frame.to_bytes().unwrap(), watch_addr)
            .unwrap();

        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            WatchEvent::InboxReceived(got) => assert_eq!(got, message),
            other => panic!("unexpected event {:?}", other),
        }
        let mut buf = [0u8; MAX_DATAGRAM];
        let (size, _) = companion.recv_from(&mut buf).unwrap();
        assert_eq!(
            Frame::from_bytes(&buf[..size]).unwrap(),
            Frame::Ack { transaction_id: 9 }
        );
        shutdown.store(true, Ordering::SeqCst);
    }

    #[test]
    fn garbage_datagram_is_reported_as_dropped() {
        let sender = loopback();
        let watch = loopback();
        let watch_addr = watch.local_addr().unwrap();
        let (tx, rx) = unbounded();
        let shutdown = Arc::new(AtomicBool::new(false));
        let _transport = UdpTransport::start(
            watch,
            sender.local_addr().unwrap(),
            Duration::from_secs(5),
            tx,
            shutdown.clone(),
        )
        .unwrap();

        sender.send_to(&[0xff, 0xfe, 0xfd], watch_addr).unwrap();
        assert!(matches!(
            rx.recv_timeout(Duration::from_secs(5)).unwrap(),
            WatchEvent::InboxDropped(_)
        ));
        shutdown.store(true, Ordering::SeqCst);
    }

    #[test]
    fn nack_from_companion_fails_the_send() {
        let companion = loopback();
        let (tx, rx) = unbounded();
        let shutdown = Arc::new(AtomicBool::new(false));
        let mut transport = UdpTransport::start(
            loopback(),
            companion.local_addr().unwrap(),
            Duration::from_secs(5),
            tx,
            shutdown.clone(),
        )
        .unwrap();

        let id = transport.send(&AppMessage::refresh_request()).unwrap();
        let mut buf = [0u8; MAX_DATAGRAM];
        let (_, from) = companion.recv_from(&mut buf).unwrap();
        companion
            .send_to(&Frame::Nack { transaction_id: id }.to_bytes().unwrap(), from)
            .unwrap();

        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            WatchEvent::OutboxFailed(failed, SendFailure::Rejected) => assert_eq!(failed, id),
            other => panic!("unexpected event {:?}", other),
        }
        // The settled transaction must not time out later.
        assert!(rx.recv_timeout(Duration::from_millis(600)).is_err());
        shutdown.store(true, Ordering::SeqCst);
    }

    #[test]
    fn message_is_refused_once_the_event_loop_is_gone() {
        let companion = loopback();
        companion
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        let watch = loopback();
        let watch_addr = watch.local_addr().unwrap();
        let (tx, rx) = unbounded();
        let shutdown = Arc::new(AtomicBool::new(false));
        let _transport = UdpTransport::start(
            watch,
            companion.local_addr().unwrap(),
            Duration::from_secs(5),
            tx,
            shutdown.clone(),
        )
        .unwrap();
        drop(rx);

        let frame = Frame::Message {
            transaction_id: 5,
            message: AppMessage::refresh_request(),
        };
        companion
            .send_to(&frame.to_bytes().unwrap(), watch_addr)
            .unwrap();

        let mut buf = [0u8; MAX_DATAGRAM];
        let (size, _) = companion.recv_from(&mut buf).unwrap();
        assert_eq!(
            Frame::from_bytes(&buf[..size]).unwrap(),
            Frame::Nack { transaction_id: 5 }
        );
        shutdown.store(true, Ordering::SeqCst);
    }

    #[test]
    fn unanswered_send_times_out() {
        let companion = loopback();
        let (tx, rx) = unbounded();
        let shutdown = Arc::new(AtomicBool::new(false));
        let mut transport = UdpTransport::start(
            loopback(),
            companion.local_addr().unwrap(),
            Duration::from_millis(50),
            tx,
            shutdown.clone(),
        )
        .unwrap();

        let id = transport.send(&AppMessage::refresh_request()).unwrap();
        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            WatchEvent::OutboxFailed(failed, SendFailure::Timeout) => assert_eq!(failed, id),
            other => panic!("unexpected event {:?}", other),
        }
        shutdown.store(true, Ordering::SeqCst);
    }
}
