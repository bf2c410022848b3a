mod fetcher;

pub use fetcher::{parse_feed, NewsSearchClient};
