//! Convoys module - domain models, the repository trait, and the feed.

mod convoy_feed;
mod convoys_model;
mod convoys_traits;
mod retry_policy;

#[cfg(test)]
mod convoy_feed_tests;
#[cfg(test)]
mod convoys_model_tests;

// Re-export the public interface
pub use convoy_feed::{ConvoyFeed, FeedState, FetchOutcome, DEFAULT_FETCH_ERROR};
pub use convoys_model::{Convoy, ConvoyRow};
pub use convoys_traits::ConvoyRepositoryTrait;
pub use retry_policy::{RetryPolicy, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY};
