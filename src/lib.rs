//! Concurrent M3U/TXT subscription aggregation
//!
//! Fetches playlist-style channel listings from subscription URLs,
//! parses each into structured channel entries, and merges everything
//! into a single deduplicated catalog with whitelist-priority ordering
//! and progress reporting.

pub mod catalog;
pub mod config;
pub mod errors;
pub mod ingestor;
pub mod models;
pub mod playlist;
pub mod utils;

pub use catalog::{MulticastCatalog, PlainCatalog, SubscribeCatalog};
pub use config::Config;
pub use errors::{AppError, AppResult, SourceError};
pub use ingestor::progress::ProgressCallback;
pub use ingestor::{order_sources, SubscribeIngestor, SubscribeOptions};
pub use models::{EntryOrigin, StreamEntry, SubscribeMode, SubscribeSource};
