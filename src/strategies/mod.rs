//! 求解策略
//!
//! 每种题型一个策略，彼此独立，只通过注入的协作者访问外部资源。

pub mod document;
pub mod scraping;
pub mod simple;
pub mod tabular;

pub use document::DocumentStrategy;
pub use scraping::ScrapingStrategy;
pub use simple::{SimpleStrategy, CANNED_ANSWER, FALLBACK_ANSWER};
pub use tabular::TabularStrategy;
