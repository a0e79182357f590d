//! Wall-clock rendering for the time region.
use std::fmt::Write;

use chrono::Timelike;
use clap::ValueEnum;
use market_common::FixedText;
use strum::Display;

/// Buffer sized for `"00:00"`.
pub type ClockText = FixedText<5>;

/// 24h/12h display preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Display)]
pub enum ClockStyle {
    /// `%H:%M`
    #[default]
    #[value(name = "24h")]
    #[strum(serialize = "24h")]
    H24,
    /// `%I:%M`, no AM/PM marker.
    #[value(name = "12h")]
    #[strum(serialize = "12h")]
    H12,
}

/// Render `time` as a five character `HH:MM` string.
pub fn format_clock<T: Timelike>(time: &T, style: ClockStyle) -> ClockText {
    let hour = match style {
        ClockStyle::H24 => time.hour(),
        ClockStyle::H12 => time.hour12().1,
    };
    let mut text = ClockText::new();
    let _ = write!(text, "{:02}:{:02}", hour, time.minute());
    text
}
