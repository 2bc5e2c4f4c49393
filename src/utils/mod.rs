//! Shared utilities

pub mod channel_name;
pub mod human_format;
pub mod retry;

pub use channel_name::format_channel_name;
pub use human_format::format_eta;
pub use retry::{with_retry, IsRetryable, RetryConfig};
