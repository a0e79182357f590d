//! Where market snapshots come from.
use std::fs;
use std::path::PathBuf;

use log::debug;
use market_common::Result;

use crate::model::market::{MarketSnapshot, MarketsFeed};

/// Producer of market snapshots, asked once per refresh.
pub trait MarketSource {
    /// Fetch the current snapshot.
    fn fetch(&mut self) -> Result<MarketSnapshot>;
}

impl<T: MarketSource + ?Sized> MarketSource for Box<T> {
    fn fetch(&mut self) -> Result<MarketSnapshot> {
        (**self).fetch()
    }
}

/// Reads a markets feed document from disk on every fetch, so an external job can keep
/// rewriting it.
pub struct FeedFileSource {
    path: PathBuf,
}

impl FeedFileSource {
    /// Create a source for the document at `path`.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl MarketSource for FeedFileSource {
    fn fetch(&mut self) -> Result<MarketSnapshot> {
        debug!("Reading markets feed {}", self.path.display());
        let text = fs::read_to_string(&self.path)?;
        MarketsFeed::from_json(&text)?.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn file_source_rereads_the_document() {
        let path = std::env::temp_dir().join(format!("markets-feed-{}.json", std::process::id()));
        let write = |price: &str| {
            let mut file = fs::File::create(&path).unwrap();
            write!(
                file,
                r#"{{"results": [{{"Price": "{}"}}, {{"Price": "110.25"}}]}}"#,
                price
            )
            .unwrap();
        };

        let mut source = FeedFileSource::new(path.clone());
        write("19500");
        assert_eq!(source.fetch().unwrap().n225.price, "19500");
        write("19600");
        assert_eq!(source.fetch().unwrap().n225.price, "19600");
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_file_is_an_error() {
        let mut source = FeedFileSource::new(PathBuf::from("/nonexistent/markets.json"));
        assert!(source.fetch().is_err());
    }
}
