//! Synthetic market data.
//!
//! `RandomWalkSource` keeps a last price per instrument and moves it by a small random
//! step on every fetch, the change being measured against the opening price it started
//! from. It stands in for a real feed when the companion runs without one.
use log::debug;
use market_common::Result;
use rand::Rng;

use crate::model::market::{MarketSnapshot, Quote};
use crate::model::source::MarketSource;

/// Opening level of the index.
const N225_OPEN: f64 = 19_500.0;
/// Opening USD/JPY rate.
const YEN_DOLLAR_OPEN: f64 = 110.0;

/// One simulated instrument.
struct Walk {
    open: f64,
    last: f64,
    decimals: usize,
}

impl Walk {
    fn new(open: f64, decimals: usize) -> Self {
        Self {
            open,
            last: open,
            decimals,
        }
    }

    /// Move the price uniformly within `[-1%, +1%]`, never below one cent.
    fn step<R: Rng>(&mut self, rng: &mut R) -> Quote {
        let change: f64 = rng.random_range(-0.01..0.01);
        self.last = (self.last * (1.0 + change)).max(0.01);
        Quote::from_values(self.last, self.open, self.decimals)
    }
}

/// Random-walk snapshot generator.
pub struct RandomWalkSource {
    n225: Walk,
    yen_dollar: Walk,
}

impl Default for RandomWalkSource {
    fn default() -> Self {
        Self::new(N225_OPEN, YEN_DOLLAR_OPEN)
    }
}

impl RandomWalkSource {
    /// Start both walks at the given opening levels.
    pub fn new(n225_open: f64, yen_dollar_open: f64) -> Self {
        Self {
            n225: Walk::new(n225_open, 2),
            yen_dollar: Walk::new(yen_dollar_open, 3),
        }
    }
}

impl MarketSource for RandomWalkSource {
    fn fetch(&mut self) -> Result<MarketSnapshot> {
        let mut rng = rand::rng();
        let snapshot = MarketSnapshot {
            n225: self.n225.step(&mut rng),
            yen_dollar: self.yen_dollar.step(&mut rng),
        };
        debug!(
            "Generated N225={} USDJPY={}",
            snapshot.n225.price, snapshot.yen_dollar.price
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_step_stays_within_one_percent() {
        let mut source = RandomWalkSource::default();
        let mut last = N225_OPEN;
        for _ in 0..100 {
            let snapshot = source.fetch().unwrap();
            let price: f64 = snapshot.n225.price.parse().unwrap();
            assert!((price - last).abs() <= last * 0.01 + 0.01);
            last = price;
        }
    }

    #[test]
    fn generated_fields_fit_a_display_buffer() {
        let mut source = RandomWalkSource::default();
        let snapshot = source.fetch().unwrap();
        let line = format!("{}({})", snapshot.n225.price, snapshot.n225.diff);
        assert!(line.len() <= 31, "{}", line);
        assert!(snapshot.yen_dollar.diff_percent.ends_with('%'));
        assert!(snapshot.n225.diff.starts_with('+') || snapshot.n225.diff.starts_with('-'));
    }
}
