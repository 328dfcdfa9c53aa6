//! Loyalty module - accounts, point history, and program signup.

mod loyalty_model;
mod loyalty_service;
mod loyalty_traits;


// Re-export the public interface
pub use loyalty_model::{
    client_code_for_phone, normalize_client_code, points_to_fcfa, LoyaltyAccount,
    LoyaltyOverview, LoyaltySignup, LoyaltySignupRequest, LoyaltyTier, LoyaltyTransaction,
    TransactionType,
};
pub use loyalty_service::{LoyaltyService, LOYALTY_CODE_NOT_FOUND};
pub use loyalty_traits::{LoyaltyRepositoryTrait, LoyaltyServiceTrait, LoyaltySignupSinkTrait};
