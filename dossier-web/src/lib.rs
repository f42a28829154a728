//! Web discovery and acquisition utilities.
//!
//! - SerpAPI client behind the [`search::SourceLocator`] trait for discovery
//! - Page fetch + paragraph extraction behind [`extract::ContentExtractor`]
//!
//! Both traits are the seams the aggregation pipeline is written against, so
//! tests and alternative providers can stand in for the network.

pub mod extract;
pub mod search;

pub use extract::{ContentExtractor, HttpContentExtractor};
pub use search::{SearchError, SerpApiLocator, SourceLocator};
