//! Text regions of the watchface.
//!
//! The watch shows two regions: the clock and a one-line market summary. Drawing is
//! behind [`DisplaySurface`] so the application state can drive either the console
//! renderer used by the binary or the plain in-memory window used in tests.
use log::info;
use market_common::DisplayText;

/// Placeholder shown in the market region until the first payload arrives.
pub const LOADING_TEXT: &str = "Loading...";
/// Placeholder shown in the time region before the first clock render.
pub const TIME_PLACEHOLDER: &str = "00:00";

/// Sink for the two text regions.
pub trait DisplaySurface {
    /// Replace the time region text.
    fn set_time(&mut self, text: &str);
    /// Replace the market summary region text.
    fn set_markets(&mut self, text: &str);
}

/// In-memory pair of text layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchWindow {
    /// Time region.
    pub time_layer: DisplayText,
    /// Market summary region.
    pub markets_layer: DisplayText,
}

impl Default for WatchWindow {
    fn default() -> Self {
        Self {
            time_layer: DisplayText::from_truncated(TIME_PLACEHOLDER),
            markets_layer: DisplayText::from_truncated(LOADING_TEXT),
        }
    }
}

impl DisplaySurface for WatchWindow {
    fn set_time(&mut self, text: &str) {
        self.time_layer.set(text);
    }

    fn set_markets(&mut self, text: &str) {
        self.markets_layer.set(text);
    }
}

/// Window that logs a rendered frame whenever one of its regions changes.
#[derive(Debug, Default)]
pub struct ConsoleWindow {
    window: WatchWindow,
}

impl ConsoleWindow {
    /// Create a console window showing the placeholders.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current layer contents.
    pub fn window(&self) -> &WatchWindow {
        &self.window
    }

    fn render(&self) {
        info!(
            "[ {} ] {}",
            self.window.time_layer, self.window.markets_layer
        );
    }
}

impl DisplaySurface for ConsoleWindow {
    fn set_time(&mut self, text: &str) {
        if self.window.time_layer != text {
            self.window.set_time(text);
            self.render();
        }
    }

    fn set_markets(&mut self, text: &str) {
        if self.window.markets_layer != text {
            self.window.set_markets(text);
            self.render();
        }
    }
}
