pub mod aggregator;
pub mod feed;
pub mod ranking;

pub use aggregator::Aggregator;
pub use feed::FeedService;
pub use ranking::Ranker;
