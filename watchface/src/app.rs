//! Watch application state and its event handlers.
use chrono::{NaiveDateTime, Timelike};
use log::debug;
use market_common::keys::Schema;
use market_common::outbox::{Outbox, SendFailure};
use market_common::{AppMessage, DisplayText};

use crate::clock::{ClockStyle, ClockText, format_clock};
use crate::diagnostics::DiagnosticLog;
use crate::display::{DisplaySurface, LOADING_TEXT};
use crate::event_loop::EventHandler;
use crate::parser::ResponseParser;
use crate::scheduler::{emit_refresh, is_refresh_minute};

/// Everything the watchface owns for its lifetime.
pub struct WatchApp<O: Outbox, D: DisplaySurface> {
    clock_style: ClockStyle,
    parser: ResponseParser,
    outbox: O,
    display: D,
    time_text: ClockText,
    markets_text: DisplayText,
    diagnostics: DiagnosticLog,
}

impl<O: Outbox, D: DisplaySurface> WatchApp<O, D> {
    /// Build the application; nothing is shown until [`Self::load`].
    pub fn new(schema: Schema, clock_style: ClockStyle, outbox: O, display: D) -> Self {
        Self {
            clock_style,
            parser: ResponseParser::new(schema),
            outbox,
            display,
            time_text: ClockText::new(),
            markets_text: DisplayText::from_truncated(LOADING_TEXT),
            diagnostics: DiagnosticLog::new(),
        }
    }

    /// Show the placeholder summary and the current time.
    pub fn load(&mut self, now: NaiveDateTime) {
        self.display.set_markets(self.markets_text.as_str());
        self.update_time(now);
    }

    fn update_time(&mut self, now: NaiveDateTime) {
        self.time_text = format_clock(&now, self.clock_style);
        self.display.set_time(self.time_text.as_str());
    }

    /// Text currently in the time region.
    pub fn time_text(&self) -> &str {
        self.time_text.as_str()
    }

    /// Text currently in the market summary region.
    pub fn markets_text(&self) -> &str {
        self.markets_text.as_str()
    }

    /// Diagnostics recorded so far.
    pub fn diagnostics(&self) -> &DiagnosticLog {
        &self.diagnostics
    }

    /// Display surface.
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Outbound transport.
    pub fn outbox(&self) -> &O {
        &self.outbox
    }
}

impl<O: Outbox, D: DisplaySurface> EventHandler for WatchApp<O, D> {
    fn on_tick(&mut self, now: NaiveDateTime) {
        self.update_time(now);

        if is_refresh_minute(now.minute()) {
            match emit_refresh(&mut self.outbox) {
                Ok(id) => debug!("Refresh request {} submitted", id),
                Err(e) => self.diagnostics.error(format!("Outbox send failed! {}", e)),
            }
        }
    }

    fn on_inbox_received(&mut self, message: &AppMessage) {
        if let Some(line) = self.parser.parse(message, &mut self.diagnostics) {
            self.markets_text = line;
            self.display.set_markets(self.markets_text.as_str());
        }
    }

    fn on_inbox_dropped(&mut self, reason: &str) {
        self.diagnostics.error(format!("Message dropped! {}", reason));
    }

    fn on_outbox_sent(&mut self, transaction_id: u8) {
        self.diagnostics
            .info(format!("Outbox send success! ({})", transaction_id));
    }

    fn on_outbox_failed(&mut self, transaction_id: u8, reason: &SendFailure) {
        self.diagnostics.error(format!(
            "Outbox send failed! ({}: {})",
            transaction_id, reason
        ));
    }
}
