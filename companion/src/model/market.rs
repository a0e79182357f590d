//! Market snapshot model and its mapping onto watch dictionaries.
//!
//! A `MarketSnapshot` holds one display-ready `Quote` per instrument. All numbers are
//! already formatted as strings here; the watch copies them verbatim and never parses
//! them. Snapshots come either from a feed document (see [`MarketsFeed`]) or from the
//! random-walk generator.
use std::fmt;

use market_common::keys::{PriceKey, QuoteKey, Schema};
use market_common::{AppMessage, Result, WatchError};
use serde::Deserialize;

/// Display strings for one instrument.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Quote {
    /// Last price.
    pub price: String,
    /// Change since the reference price, signed.
    pub diff: String,
    /// Change in percent, signed, with a trailing `%`.
    pub diff_percent: String,
}

impl Quote {
    /// Format a quote from numbers with `decimals` fraction digits.
    pub fn from_values(price: f64, reference: f64, decimals: usize) -> Self {
        let diff = price - reference;
        let percent = if reference == 0.0 {
            0.0
        } else {
            diff / reference * 100.0
        };
        Quote {
            price: format!("{:.*}", decimals, price),
            diff: format!("{:+.*}", decimals, diff),
            diff_percent: format!("{:+.2}%", percent),
        }
    }
}

/// Both instruments shown on the watch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketSnapshot {
    /// Nikkei 225 index.
    pub n225: Quote,
    /// USD/JPY exchange rate.
    pub yen_dollar: Quote,
}

impl MarketSnapshot {
    /// Build the dictionary the watch expects for `schema`.
    pub fn to_message(&self, schema: Schema) -> AppMessage {
        let mut message = AppMessage::new();
        match schema {
            Schema::A => {
                message
                    .write_cstring(PriceKey::N225.key(), &self.n225.price)
                    .write_cstring(PriceKey::YenDollar.key(), &self.yen_dollar.price);
            }
            Schema::B => {
                message
                    .write_cstring(QuoteKey::N225Price.key(), &self.n225.price)
                    .write_cstring(QuoteKey::N225Diff.key(), &self.n225.diff)
                    .write_cstring(QuoteKey::N225DiffPercent.key(), &self.n225.diff_percent)
                    .write_cstring(QuoteKey::YenDollarPrice.key(), &self.yen_dollar.price)
                    .write_cstring(QuoteKey::YenDollarDiff.key(), &self.yen_dollar.diff)
                    .write_cstring(
                        QuoteKey::YenDollarDiffPercent.key(),
                        &self.yen_dollar.diff_percent,
                    );
            }
        }
        message
    }
}

/// Feed value that may arrive as a JSON string or number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FeedValue {
    /// Already formatted text.
    Text(String),
    /// Raw number, rendered as JSON prints it.
    Number(serde_json::Number),
}

impl Default for FeedValue {
    fn default() -> Self {
        FeedValue::Text(String::new())
    }
}

impl fmt::Display for FeedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedValue::Text(s) => f.write_str(s),
            FeedValue::Number(n) => write!(f, "{}", n),
        }
    }
}

/// One entry of the feed's `results` array.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FeedEntry {
    /// Last price.
    pub price: FeedValue,
    /// Change, if the feed provides it.
    #[serde(default)]
    pub diff: FeedValue,
    /// Change in percent, if the feed provides it.
    #[serde(default)]
    pub diff_percent: FeedValue,
}

impl From<&FeedEntry> for Quote {
    fn from(entry: &FeedEntry) -> Self {
        Quote {
            price: entry.price.to_string(),
            diff: entry.diff.to_string(),
            diff_percent: entry.diff_percent.to_string(),
        }
    }
}

/// Markets feed document: the index at `results[0]`, the rate at `results[1]`.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketsFeed {
    /// Instrument entries in fixed order.
    pub results: Vec<FeedEntry>,
}

impl MarketsFeed {
    /// Parse a feed document from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Extract the snapshot shown on the watch.
    pub fn snapshot(&self) -> Result<MarketSnapshot> {
        let entry = |index: usize, name: &str| {
            self.results.get(index).ok_or_else(|| {
                WatchError::MissingFeedEntry(format!("results[{}] ({})", index, name))
            })
        };
        Ok(MarketSnapshot {
            n225: entry(0, "N225")?.into(),
            yen_dollar: entry(1, "USD/JPY")?.into(),
        })
    }
}
