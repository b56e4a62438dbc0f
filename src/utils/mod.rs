pub mod retry;
pub mod timestamp;

pub use retry::{RetryPolicy, retry_with_backoff};
pub use timestamp::{days_remaining, deserialize_lenient, parse_timestamp};
