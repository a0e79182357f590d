//! Message keys for the refresh request and both inbound market schemas.
//!
//! Keys travel as plain `u32` values inside an [`AppMessage`](crate::message::AppMessage);
//! the enums here give them names and map them back with `from_repr`.
use clap::ValueEnum;
use strum::{Display, EnumIter, EnumString, FromRepr};

/// Key of the single pair in a refresh request.
pub const REFRESH_KEY: u32 = 0;
/// Value of the refresh pair. The companion never reads it.
pub const REFRESH_VALUE: u8 = 0;

/// Inbound key layout spoken between a watchface and its companion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum, Display, EnumString)]
#[clap(rename_all = "lower")]
#[strum(ascii_case_insensitive)]
pub enum Schema {
    /// Index price and exchange-rate price only.
    A,
    /// Price, diff and diff-percent for both instruments.
    #[default]
    B,
}

/// Schema A keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, FromRepr)]
#[repr(u32)]
pub enum PriceKey {
    /// Nikkei 225 price.
    N225 = 0,
    /// USD/JPY rate.
    YenDollar = 1,
}

/// Schema B keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, FromRepr)]
#[repr(u32)]
pub enum QuoteKey {
    /// Nikkei 225 price.
    N225Price = 0,
    /// Nikkei 225 change.
    N225Diff = 1,
    /// Nikkei 225 change in percent.
    N225DiffPercent = 2,
    /// USD/JPY rate.
    YenDollarPrice = 3,
    /// USD/JPY change.
    YenDollarDiff = 4,
    /// USD/JPY change in percent.
    YenDollarDiffPercent = 5,
}

impl PriceKey {
    /// Numeric key on the wire.
    pub fn key(self) -> u32 {
        self as u32
    }
}

impl QuoteKey {
    /// Numeric key on the wire.
    pub fn key(self) -> u32 {
        self as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn quote_keys_are_dense_from_zero() {
        let keys: Vec<u32> = QuoteKey::iter().map(QuoteKey::key).collect();
        assert_eq!(keys, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(QuoteKey::from_repr(6), None);
    }

    #[test]
    fn price_keys_map_back() {
        assert_eq!(PriceKey::from_repr(1), Some(PriceKey::YenDollar));
        assert_eq!(PriceKey::from_repr(2), None);
    }

    #[test]
    fn schema_parses_case_insensitively() {
        assert_eq!("a".parse::<Schema>().unwrap(), Schema::A);
        assert_eq!("B".parse::<Schema>().unwrap(), Schema::B);
    }
}
