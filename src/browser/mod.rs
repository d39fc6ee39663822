pub mod engine;
pub mod fetcher;

pub use engine::{BrowserEngine, BrowserSession};
pub use fetcher::BrowserFetcher;
