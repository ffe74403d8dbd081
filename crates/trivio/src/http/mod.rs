//! Unauthenticated HTTP plumbing: call descriptors, backoff and the
//! retrying requester, plus the buffered response type shared with
//! [`crate::TokenSession`].

mod backoff;
mod call;
mod requester;
mod response;

pub use backoff::{Backoff, DEFAULT_MULTIPLIER};
pub use call::{Call, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_INTERVAL, DEFAULT_TIMEOUT};
pub use requester::{CallOutcome, RetryingRequester, Sleeper, TokioSleeper};
pub use response::ApiResponse;
