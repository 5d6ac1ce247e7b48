pub mod retry;

pub use retry::{attempt, attempt_while, RetryExhausted, RetryPolicy};
