//! Inbound market payload parsing.
//!
//! A [`ResponseParser`] walks an [`AppMessage`] in delivery order, copies every
//! recognized value into its fixed-size field buffer and then composes the market
//! summary line from those buffers. Unknown keys are reported to the diagnostic log and
//! leave every buffer untouched.
//!
//! The summary is composed only from field buffers, never from the previous summary.
//! Fields missing from a payload keep their last received value, and a payload without
//! any recognized field does not produce a summary at all.
use std::fmt::Write;

use log::debug;
use market_common::keys::{PriceKey, QuoteKey, Schema};
use market_common::{AppMessage, DisplayText, TupleValue};

use crate::diagnostics::DiagnosticLog;

/// Field buffers for one inbound schema.
pub trait MarketFields {
    /// Store `value` under `key`. Returns `false` when the key is not part of the schema.
    fn store(&mut self, key: u32, value: &TupleValue) -> bool;

    /// Build the summary line from the current buffers.
    fn compose(&self) -> DisplayText;
}

fn copy_into(buf: &mut DisplayText, value: &TupleValue) {
    buf.clear();
    let _ = write!(buf, "{}", value);
    if buf.is_truncated() {
        debug!("Value truncated to {:?}", buf);
    }
}

/// Schema A: index price and exchange rate, shown as `"price, rate"`.
#[derive(Debug, Default)]
pub struct PriceFields {
    /// Nikkei 225 price.
    pub n225: DisplayText,
    /// USD/JPY rate.
    pub yen_dollar: DisplayText,
}

impl MarketFields for PriceFields {
    fn store(&mut self, key: u32, value: &TupleValue) -> bool {
        let buf = match PriceKey::from_repr(key) {
            Some(PriceKey::N225) => &mut self.n225,
            Some(PriceKey::YenDollar) => &mut self.yen_dollar,
            None => return false,
        };
        copy_into(buf, value);
        true
    }

    fn compose(&self) -> DisplayText {
        let mut out = DisplayText::new();
        let _ = write!(out, "{}, {}", self.n225, self.yen_dollar);
        out
    }
}

/// Schema B: price, diff and diff-percent for both instruments, shown as `"price(diff)"`
/// of the index.
#[derive(Debug, Default)]
pub struct QuoteFields {
    /// Nikkei 225 price.
    pub n225_price: DisplayText,
    /// Nikkei 225 change.
    pub n225_diff: DisplayText,
    /// Nikkei 225 change in percent; stored, not displayed.
    pub n225_diff_percent: DisplayText,
    /// USD/JPY rate.
    pub yen_dollar_price: DisplayText,
    /// USD/JPY change.
    pub yen_dollar_diff: DisplayText,
    /// USD/JPY change in percent; stored, not displayed.
    pub yen_dollar_diff_percent: DisplayText,
}

impl MarketFields for QuoteFields {
    fn store(&mut self, key: u32, value: &TupleValue) -> bool {
        let buf = match QuoteKey::from_repr(key) {
            Some(QuoteKey::N225Price) => &mut self.n225_price,
            Some(QuoteKey::N225Diff) => &mut self.n225_diff,
            Some(QuoteKey::N225DiffPercent) => &mut self.n225_diff_percent,
            Some(QuoteKey::YenDollarPrice) => &mut self.yen_dollar_price,
            Some(QuoteKey::YenDollarDiff) => &mut self.yen_dollar_diff,
            Some(QuoteKey::YenDollarDiffPercent) => &mut self.yen_dollar_diff_percent,
            None => return false,
        };
        copy_into(buf, value);
        true
    }

    fn compose(&self) -> DisplayText {
        let mut out = DisplayText::new();
        let _ = write!(out, "{}({})", self.n225_price, self.n225_diff);
        out
    }
}

/// Dispatches inbound tuples into the field buffers of one schema.
pub struct ResponseParser {
    fields: Box<dyn MarketFields>,
}

impl ResponseParser {
    /// Create a parser for `schema` with empty field buffers.
    pub fn new(schema: Schema) -> Self {
        let fields: Box<dyn MarketFields> = match schema {
            Schema::A => Box::new(PriceFields::default()),
            Schema::B => Box::new(QuoteFields::default()),
        };
        Self { fields }
    }

    /// Consume `message` and return the new summary line, if any field was recognized.
    pub fn parse(
        &mut self,
        message: &AppMessage,
        diagnostics: &mut DiagnosticLog,
    ) -> Option<DisplayText> {
        let mut recognized = 0usize;
        for tuple in message.iter() {
            if self.fields.store(tuple.key, &tuple.value) {
                recognized += 1;
            } else {
                diagnostics.error(format!("Key {} not recognized!", tuple.key));
            }
        }
        (recognized > 0).then(|| self.fields.compose())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(pairs: &[(u32, &str)]) -> AppMessage {
        let mut msg = AppMessage::new();
        for (k, v) in pairs {
            msg.write_cstring(*k, v);
        }
        msg
    }

    #[test]
    fn schema_b_shows_index_price_and_diff() {
        let mut parser = ResponseParser::new(Schema::B);
        let mut diag = DiagnosticLog::new();
        let line = parser.parse(&payload(&[(0, "19500"), (1, "+50")]), &mut diag);
        assert_eq!(line.unwrap(), "19500(+50)");
        assert!(diag.is_empty());
    }

    #[test]
    fn schema_b_accepts_all_six_keys_in_any_order() {
        let mut parser = ResponseParser::new(Schema::B);
        let mut diag = DiagnosticLog::new();
        let msg = payload(&[
            (5, "+0.10%"),
            (3, "110.25"),
            (1, "-12.5"),
            (4, "+0.11"),
            (2, "-0.06%"),
            (0, "19432.10"),
        ]);
        let line = parser.parse(&msg, &mut diag).unwrap();
        assert_eq!(line, "19432.10(-12.5)");
        assert!(diag.is_empty());
    }

    #[test]
    fn schema_a_joins_index_and_rate() {
        let mut parser = ResponseParser::new(Schema::A);
        let mut diag = DiagnosticLog::new();
        let line = parser.parse(&payload(&[(1, "110.25"), (0, "19500")]), &mut diag);
        assert_eq!(line.unwrap(), "19500, 110.25");
    }

    #[test]
    fn schema_a_missing_field_keeps_last_value() {
        let mut parser = ResponseParser::new(Schema::A);
        let mut diag = DiagnosticLog::new();
        parser.parse(&payload(&[(0, "19500"), (1, "110.25")]), &mut diag);
        let line = parser.parse(&payload(&[(0, "19600")]), &mut diag).unwrap();
        assert_eq!(line, "19600, 110.25");
    }

    #[test]
    fn schema_a_never_reads_its_own_output() {
        let mut parser = ResponseParser::new(Schema::A);
        let mut diag = DiagnosticLog::new();
        let first = parser.parse(&payload(&[(0, "1"), (1, "2")]), &mut diag).unwrap();
        let second = parser.parse(&payload(&[(0, "1"), (1, "2")]), &mut diag).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_key_is_logged_and_changes_nothing() {
        let mut fields = QuoteFields::default();
        assert!(!fields.store(9, &TupleValue::CString("junk".into())));
        assert!(fields.n225_price.is_empty());

        let mut parser = ResponseParser::new(Schema::B);
        let mut diag = DiagnosticLog::new();
        parser.parse(&payload(&[(0, "19500"), (1, "+50")]), &mut diag);
        let line = parser.parse(&payload(&[(42, "junk")]), &mut diag);
        assert!(line.is_none());
        assert_eq!(diag.len(), 1);
        assert_eq!(diag.entries().next().unwrap().message, "Key 42 not recognized!");
        let again = parser.parse(&payload(&[(1, "+50")]), &mut diag).unwrap();
        assert_eq!(again, "19500(+50)");
    }

    #[test]
    fn stored_values_are_truncated_to_31_bytes() {
        let long = "9".repeat(40);
        let mut fields = QuoteFields::default();
        fields.store(0, &TupleValue::CString(long.clone()));
        assert_eq!(fields.n225_price.as_str(), &long[..31]);
    }

    #[test]
    fn composed_line_is_truncated_not_grown() {
        let mut parser = ResponseParser::new(Schema::B);
        let mut diag = DiagnosticLog::new();
        let price = "1".repeat(31);
        let line = parser
            .parse(&payload(&[(0, price.as_str()), (1, "+50")]), &mut diag)
            .unwrap();
        assert_eq!(line.len(), 31);
        assert_eq!(line.as_str(), price);
    }

    #[test]
    fn integer_values_are_rendered() {
        let mut msg = AppMessage::new();
        msg.write_int32(0, 19500).write_cstring(1, "+50");
        let mut parser = ResponseParser::new(Schema::B);
        let mut diag = DiagnosticLog::new();
        assert_eq!(parser.parse(&msg, &mut diag).unwrap(), "19500(+50)");
    }
}
