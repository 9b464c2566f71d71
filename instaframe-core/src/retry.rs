//! Upload retry policy
//!
//! Two policies with different liveness trade-offs:
//!
//! - [`RetryPolicy::Forever`]: keep retrying until the put succeeds. The
//!   capture loop blocks for as long as connectivity is gone, but a photo
//!   is never dropped.
//! - [`RetryPolicy::Once`]: one retry after the backoff, then give up so
//!   the caller can rewind its cooldown and drop the photo.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Attempts allowed under [`RetryPolicy::Once`]
pub const RETRY_ONCE_ATTEMPTS: u32 = 2;

/// What to do after a failed upload attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RetryPolicy {
    /// Never give up
    #[default]
    Forever,
    /// A single retry, then report failure
    Once,
}

impl RetryPolicy {
    /// Map the `keep_trying_forever` config flag to a policy
    pub fn from_flag(keep_trying_forever: bool) -> Self {
        if keep_trying_forever {
            RetryPolicy::Forever
        } else {
            RetryPolicy::Once
        }
    }

    /// Whether another attempt may follow `failures` failed attempts
    pub fn should_retry(self, failures: u32) -> bool {
        match self {
            RetryPolicy::Forever => true,
            RetryPolicy::Once => failures < RETRY_ONCE_ATTEMPTS,
        }
    }
}
