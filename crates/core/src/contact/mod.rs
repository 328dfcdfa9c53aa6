//! Contact module - support requests sent by customers.

mod contact_model;
mod contact_service;
mod contact_traits;

// Re-export the public interface
pub use contact_model::{ContactStatus, NewContactMessage, SupportPriority};
pub use contact_service::ContactService;
pub use contact_traits::{ContactRepositoryTrait, ContactServiceTrait};
