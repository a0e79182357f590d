//! Single-threaded event dispatch.
//!
//! Producer threads (tick source, datagram receiver, outbox timeout checker) only push
//! [`WatchEvent`]s into one `crossbeam_channel`. [`EventLoop::run`] drains that channel
//! on the calling thread and hands each event to the registered [`EventHandler`], so
//! handlers never run concurrently and see events in arrival order.
use chrono::NaiveDateTime;
use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{debug, info};
use market_common::AppMessage;
use market_common::outbox::SendFailure;

/// Everything the watch application reacts to.
#[derive(Debug, Clone)]
pub enum WatchEvent {
    /// A wall-clock minute elapsed.
    Tick(NaiveDateTime),
    /// A dictionary arrived from the companion.
    InboxReceived(AppMessage),
    /// A datagram arrived but could not be decoded.
    InboxDropped(String),
    /// The companion acknowledged an outbound message.
    OutboxSent(u8),
    /// An outbound message was not delivered.
    OutboxFailed(u8, SendFailure),
    /// Stop the loop.
    Shutdown,
}

/// Callbacks invoked by the event loop.
pub trait EventHandler {
    /// Minute tick.
    fn on_tick(&mut self, now: NaiveDateTime);
    /// Inbound dictionary.
    fn on_inbox_received(&mut self, message: &AppMessage);
    /// Inbound datagram lost.
    fn on_inbox_dropped(&mut self, reason: &str);
    /// Outbound message delivered.
    fn on_outbox_sent(&mut self, transaction_id: u8);
    /// Outbound message not delivered.
    fn on_outbox_failed(&mut self, transaction_id: u8, reason: &SendFailure);
}

/// Receiving end of the event channel.
pub struct EventLoop {
    events: Receiver<WatchEvent>,
}

impl EventLoop {
    /// Create the loop together with the sender producers post into.
    pub fn new() -> (Sender<WatchEvent>, Self) {
        let (tx, rx) = unbounded();
        (tx, Self { events: rx })
    }

    /// Dispatch one event. Returns `false` for `Shutdown`.
    pub fn dispatch<H: EventHandler>(handler: &mut H, event: WatchEvent) -> bool {
        match event {
            WatchEvent::Tick(now) => handler.on_tick(now),
            WatchEvent::InboxReceived(message) => handler.on_inbox_received(&message),
            WatchEvent::InboxDropped(reason) => handler.on_inbox_dropped(&reason),
            WatchEvent::OutboxSent(id) => handler.on_outbox_sent(id),
            WatchEvent::OutboxFailed(id, reason) => handler.on_outbox_failed(id, &reason),
            WatchEvent::Shutdown => return false,
        }
        true
    }

    /// Run until `Shutdown` arrives or every sender is gone.
    pub fn run<H: EventHandler>(&self, handler: &mut H) {
        info!("Event loop running");
        for event in self.events.iter() {
            debug!("Dispatching {:?}", event);
            if !Self::dispatch(handler, event) {
                info!("Shutdown requested");
                return;
            }
        }
        info!("All event producers gone");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[derive(Default)]
    struct Recorder {
        seen: Vec<String>,
    }

    impl EventHandler for Recorder {
        fn on_tick(&mut self, now: NaiveDateTime) {
            self.seen.push(format!("tick {}", now.format("%H:%M")));
        }
        fn on_inbox_received(&mut self, message: &AppMessage) {
            self.seen.push(format!("inbox {}", message.len()));
        }
        fn on_inbox_dropped(&mut self, reason: &str) {
            self.seen.push(format!("dropped {}", reason));
        }
        fn on_outbox_sent(&mut self, transaction_id: u8) {
            self.seen.push(format!("sent {}", transaction_id));
        }
        fn on_outbox_failed(&mut self, transaction_id: u8, reason: &SendFailure) {
            self.seen.push(format!("failed {} {}", transaction_id, reason));
        }
    }

    #[test]
    fn events_are_dispatched_in_order_until_shutdown() {
        let (tx, event_loop) = EventLoop::new();
        let now = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        tx.send(WatchEvent::Tick(now)).unwrap();
        tx.send(WatchEvent::OutboxSent(1)).unwrap();
        tx.send(WatchEvent::InboxReceived(AppMessage::refresh_request()))
            .unwrap();
        tx.send(WatchEvent::OutboxFailed(2, SendFailure::Timeout))
            .unwrap();
        tx.send(WatchEvent::Shutdown).unwrap();
        tx.send(WatchEvent::InboxDropped("late".into())).unwrap();

        let mut recorder = Recorder::default();
        event_loop.run(&mut recorder);
        assert_eq!(
            recorder.seen,
            vec![
                "tick 09:30",
                "sent 1",
                "inbox 1",
                "failed 2 no acknowledgement",
            ]
        );
    }

    #[test]
    fn loop_ends_when_producers_disconnect() {
        let (tx, event_loop) = EventLoop::new();
        tx.send(WatchEvent::InboxDropped("bad frame".into())).unwrap();
        drop(tx);
        let mut recorder = Recorder::default();
        event_loop.run(&mut recorder);
        assert_eq!(recorder.seen, vec!["dropped bad frame"]);
    }
}
