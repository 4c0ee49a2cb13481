pub mod crawler;
pub mod error;
pub mod scope;
pub mod summary;

pub use crawler::Crawler;
pub use error::CrawlError;
pub use scope::CrawlScope;
pub use summary::CrawlSummary;
