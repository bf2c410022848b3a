mod digest;
mod news;

pub use digest::{CategoryCounts, DailyDigest};
pub use news::{FeedItem, NewPublishedItem, NewRawItem, PublishedNewsItem, RawNewsItem};
