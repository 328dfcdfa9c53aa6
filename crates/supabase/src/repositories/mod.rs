//! Repositories implementing the core traits over PostgREST.

mod contact;
mod convoys;
mod loyalty;

pub use contact::ContactRepository;
pub use convoys::ConvoyRepository;
pub use loyalty::LoyaltyRepository;
