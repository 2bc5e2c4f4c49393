//! Error types for the subscription aggregator

pub mod types;

pub use types::{AppError, AppResult, SourceError};
