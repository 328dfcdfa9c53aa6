//! IZI Core - Domain entities, services, and traits.
//!
//! This crate contains the client-side logic of the IZI forwarding service:
//! the convoy feed with its session-recovery retries, loyalty lookups and
//! signups, and support requests. It is backend-agnostic and defines traits
//! that are implemented by the `izi-supabase` crate.

pub mod constants;
pub mod contact;
pub mod convoys;
pub mod errors;
pub mod loyalty;
pub mod session;

// Re-export the types views use most
pub use convoys::{Convoy, ConvoyFeed, FeedState, FetchOutcome};
pub use session::{Session, SessionProviderTrait};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
pub use errors::{StoreError, StoreErrorKind};
